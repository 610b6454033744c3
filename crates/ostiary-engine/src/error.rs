//! Error types for engine calls.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors from talking to the protocol engine.
///
/// These are transport or contract failures. A request the engine rejects on
/// protocol grounds is not an error: it comes back as a verdict or outcome
/// with an error action.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// The engine API answered with a non-success status.
    #[error("Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The engine answered with something we could not understand.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            EngineError::InvalidResponse(e.to_string())
        } else {
            EngineError::Network(e.to_string())
        }
    }
}
