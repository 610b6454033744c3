//! Error types for directory construction.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors raised while building a [`UserDirectory`](crate::UserDirectory).
///
/// Lookups never fail; a miss is `None`.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Two records share a subject.
    #[error("duplicate subject '{0}' in user directory")]
    DuplicateSubject(String),

    /// Two records share a login identifier.
    #[error("duplicate login id '{0}' in user directory")]
    DuplicateLoginId(String),

    /// A record has an empty subject or login identifier.
    #[error("user record is missing required field '{0}'")]
    MissingField(&'static str),

    /// Failed to read a users file.
    #[error("failed to read users file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a users file.
    #[error("failed to parse users file: {0}")]
    Parse(#[from] serde_json::Error),
}
