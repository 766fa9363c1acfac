use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned by the UI server's own handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unavailable(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(e) => write!(f, "bad request: {}", e),
            Self::Unavailable(e) => write!(f, "unavailable: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            Self::BadRequest(e) => (StatusCode::BAD_REQUEST, e.as_str()),
            Self::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e.as_str()),
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

/// Why a generate call did not produce a payload.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generator base URL is not configured (set UMLFORGE_SERVER_BASE_URL)")]
    MissingBaseUrl,

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("generator returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unreadable response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl GenerateError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) | Self::Body(e) => e.is_timeout(),
            _ => false,
        }
    }
}
