use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors produced while answering a prayer-times request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// Caller input was missing or malformed; the upstream is never contacted
    #[error("{0}")]
    Validation(String),

    /// The timings provider was unreachable, answered with a failure status,
    /// or returned a payload we could not decode
    #[error("{0}")]
    Upstream(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::Validation(message) => json!({ "error": message }),
            ProxyError::Upstream(cause) => json!({
                "error": "Internal server error",
                "message": format!("Failed to get prayer times: {cause}"),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Errors surfaced by the form client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The form itself rejected the input before anything was sent
    #[error("{0}")]
    InvalidInput(String),

    /// The proxy answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Reverse geocoding failed or returned no usable place
    #[error("Reverse geocoding failed: {0}")]
    Geocode(String),

    /// Reading or writing the local recent-searches store failed
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
