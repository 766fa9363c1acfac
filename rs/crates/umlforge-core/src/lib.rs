//! umlforge-core: the pure half of the studio
//!
//! Lifecycle events are folded into [`StoreState`] by [`reduce`]; the view
//! turns that state plus the draft prompt into a `DomNode` tree, decoding the
//! response payload as an image and falling back to text.
//!
//! Nothing here performs I/O. The client crate owns the HTTP call, the
//! runtime store and the UI server.

pub mod decode;
mod parse;
pub mod state;
pub mod view;

pub use decode::{decode_payload, DecodeError, DecodeOptions, ImageHandle};
pub use parse::parse_action;
pub use state::{RequestState, ResponseData, StoreState};
pub use view::{
    display_result, render_view, result_region, DisplayResult, ResultRegion, ViewModel,
};

/// Lifecycle of one generate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Applied synchronously before the outbound call starts.
    Pending,
    /// The call resolved; carries the response payload.
    Success(String),
    /// The call rejected; carries a human-readable reason.
    Failure(String),
}

impl Event {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Pending => "pending",
            Event::Success(_) => "success",
            Event::Failure(_) => "failure",
        }
    }
}

/// Actions sent by the browser (`POST /actions/:name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The prompt field changed.
    DraftInput(String),
    /// Trigger a generate request. `None` means "use the current draft".
    Generate(Option<String>),
    Unknown,
}

/// Pure reducer: fold one lifecycle event into a new state.
pub fn reduce(state: &StoreState, event: Event) -> StoreState {
    match event {
        Event::Pending => StoreState {
            request: RequestState::PENDING,
            response: state.response.clone(),
            last_error: None,
        },
        Event::Success(payload) => StoreState {
            request: RequestState::SUCCESS,
            response: Some(ResponseData { payload }),
            last_error: None,
        },
        Event::Failure(reason) => StoreState {
            request: RequestState::FAILURE,
            response: state.response.clone(),
            last_error: Some(reason),
        },
    }
}
