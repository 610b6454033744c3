//! Typed session schema.

use ostiary_identity::UserRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// The signed-in user and when they authenticated.
///
/// The timestamp lives next to the user so that it cannot outlive them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Snapshot of the directory record taken at login.
    pub user: UserRecord,
    /// Seconds since the Unix epoch.
    pub authenticated_at: u64,
}

/// Correlation data carried from the authorization request to the decision.
///
/// Set and cleared as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInteraction {
    /// Opaque ticket issued by the protocol engine.
    pub ticket: String,
    /// Claim names the client requested, possibly with `#tag` suffixes.
    #[serde(default)]
    pub claim_names: Vec<String>,
    /// Claim locales the client requested, in preference order.
    #[serde(default)]
    pub claim_locales: Vec<String>,
}

impl PendingInteraction {
    pub fn new(
        ticket: impl Into<String>,
        claim_names: Vec<String>,
        claim_locales: Vec<String>,
    ) -> Self {
        Self {
            ticket: ticket.into(),
            claim_names,
            claim_locales,
        }
    }
}

/// Everything stored for one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthenticatedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingInteraction>,
}

impl SessionState {
    /// Encode for storage.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored blob. A blob that does not match the schema yields an
    /// empty state.
    pub fn decode(blob: &[u8]) -> Self {
        match serde_json::from_slice(blob) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session state");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.pending.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> UserRecord {
        UserRecord::new("1001", "john", "john").with_name("John", "Smith")
    }

    #[test]
    fn test_encode_decode() {
        let state = SessionState {
            user: Some(AuthenticatedUser {
                user: john(),
                authenticated_at: 1_700_000_000,
            }),
            pending: Some(PendingInteraction::new(
                "ticket-1",
                vec!["name".into()],
                vec!["en".into()],
            )),
        };

        let decoded = SessionState::decode(&state.encode().unwrap());
        let user = decoded.user.as_ref().unwrap();
        assert_eq!(user.user.subject, "1001");
        assert_eq!(user.authenticated_at, 1_700_000_000);
        assert_eq!(decoded.pending, state.pending);
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(SessionState::decode(b"not json").is_empty());
        assert!(SessionState::decode(b"").is_empty());
    }

    #[test]
    fn test_decode_schema_mismatch_is_empty() {
        // User snapshot without a timestamp.
        let blob = br#"{"user":{"user":{"subject":"1"}}}"#;
        assert!(SessionState::decode(blob).is_empty());

        // Loosely-typed legacy layout.
        let blob = br#"{"ticket":"t","authenticatedAt":"yesterday"}"#;
        assert!(SessionState::decode(blob).is_empty());
    }

    #[test]
    fn test_empty_state_encodes_small() {
        let blob = SessionState::default().encode().unwrap();
        assert_eq!(blob, b"{}");
    }
}
