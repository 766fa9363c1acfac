use serde::Serialize;

/// Lifecycle flags of the latest generate request.
///
/// All false before the first request; exactly one true afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestState {
    pub pending: bool,
    pub success: bool,
    pub failure: bool,
}

impl RequestState {
    pub const PENDING: Self = Self { pending: true, success: false, failure: false };
    pub const SUCCESS: Self = Self { pending: false, success: true, failure: false };
    pub const FAILURE: Self = Self { pending: false, success: false, failure: true };
}

/// Body of the last successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseData {
    /// Base64 image bytes or raw diagram source.
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreState {
    pub request: RequestState,
    /// Survives later `Pending`/`Failure` events.
    pub response: Option<ResponseData>,
    pub last_error: Option<String>,
}

impl StoreState {
    pub fn payload(&self) -> Option<&str> {
        self.response.as_ref().map(|r| r.payload.as_str())
    }
}
