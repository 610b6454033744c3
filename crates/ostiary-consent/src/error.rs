//! Error types for the consent pipeline.

use ostiary_engine::EngineError;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ConsentError>;

/// Errors that abort a pipeline phase.
///
/// Directory misses and unsupported claims are not errors; they resolve to
/// "not found" and are handled inside the phase. The pipeline only mutates
/// the in-memory session, so persisting it is the caller's concern.
#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    /// The protocol engine could not be reached or answered nonsense.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}
