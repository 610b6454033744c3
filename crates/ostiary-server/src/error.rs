//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ostiary_consent::ConsentError;
use serde::Serialize;
use thiserror::Error;

use crate::outcome::no_store;

/// Server error type.
///
/// The browser only ever sees the code and a fixed message; the detail goes
/// to the log.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The protocol engine could not be used.
    #[error("Engine error: {0}")]
    Engine(#[from] ostiary_engine::EngineError),

    /// The session could not be persisted.
    #[error("Session error: {0}")]
    Session(#[from] ostiary_session::SessionError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConsentError> for ServerError {
    fn from(e: ConsentError) -> Self {
        match e {
            ConsentError::Engine(e) => ServerError::Engine(e),
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ServerError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "The request could not be processed.",
            ),
            ServerError::Engine(_) => (
                StatusCode::BAD_GATEWAY,
                "engine_error",
                "The authorization service is unavailable.",
            ),
            ServerError::Session(_) | ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred.",
            ),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_and_code();

        match &self {
            ServerError::BadRequest(_) => {
                tracing::warn!(status = %status, code, error = %self, "Client error");
            }
            _ => {
                tracing::error!(status = %status, code, error = %self, "Server error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
        };

        no_store((status, Json(body)).into_response())
    }
}
