//! In-memory engine for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::engine::ProtocolEngine;
use crate::error::{EngineError, Result};
use crate::types::{
    AuthorizationAction, AuthorizationResponse, EndpointAction, EndpointRequest, EndpointResponse,
    EngineOutcome, FailReason, IssueRequest, OutcomeAction, TokenFailReason, TokenResponse,
};

/// Redirect target the mock returns from a successful issue.
pub const MOCK_ISSUE_LOCATION: &str = "https://client.example.org/cb?code=mock-code";

/// Redirect target prefix the mock returns from a fail call.
pub const MOCK_FAIL_LOCATION: &str = "https://client.example.org/cb?error=";

/// Body the mock returns from a successful token issue.
pub const MOCK_TOKEN_CONTENT: &str =
    r#"{"access_token":"mock-access-token","token_type":"Bearer","expires_in":3600}"#;

/// Body the mock returns from a token fail call.
pub const MOCK_INVALID_GRANT_CONTENT: &str = r#"{"error":"invalid_grant"}"#;

/// Issuer in the mock's discovery document.
pub const MOCK_ISSUER: &str = "https://as.example.org";

/// A call recorded by [`MockEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Authorize(String),
    Issue(IssueRequest),
    Fail { ticket: String, reason: FailReason },
    Token(EndpointRequest),
    TokenIssue { ticket: String, subject: String },
    TokenFail { ticket: String, reason: TokenFailReason },
    Introspect(String),
    Revoke(EndpointRequest),
    Jwks,
    Discovery,
}

/// Engine that replays canned verdicts and records every call.
///
/// `issue` answers with a `LOCATION` outcome pointing at
/// [`MOCK_ISSUE_LOCATION`]; `fail` answers with a `LOCATION` whose `error`
/// parameter is the reason. Token requests replay queued [`TokenResponse`]s;
/// token issue answers `OK` with [`MOCK_TOKEN_CONTENT`] and token fail answers
/// `BAD_REQUEST` with [`MOCK_INVALID_GRANT_CONTENT`]. Introspection reports
/// every token active, revocation always succeeds, and the service documents
/// are fixed.
pub struct MockEngine {
    verdicts: Mutex<VecDeque<AuthorizationResponse>>,
    token_verdicts: Mutex<VecDeque<TokenResponse>>,
    calls: Mutex<Vec<EngineCall>>,
    unreachable: bool,
}

impl MockEngine {
    /// Create a mock that returns `verdicts` in order from `authorize`.
    pub fn new(verdicts: Vec<AuthorizationResponse>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into()),
            token_verdicts: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            unreachable: false,
        }
    }

    /// Create a mock with a single verdict.
    pub fn with_verdict(verdict: AuthorizationResponse) -> Self {
        Self::new(vec![verdict])
    }

    /// Create a mock whose every call fails with a network error.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new(Vec::new())
        }
    }

    /// Queue another verdict for `authorize`.
    pub fn push_verdict(&self, verdict: AuthorizationResponse) {
        self.verdicts.lock().push_back(verdict);
    }

    /// Queue an answer for `token`.
    pub fn push_token_verdict(&self, verdict: TokenResponse) {
        self.token_verdicts.lock().push_back(verdict);
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// The last call made, if any.
    pub fn last_call(&self) -> Option<EngineCall> {
        self.calls.lock().last().cloned()
    }

    fn record(&self, call: EngineCall) -> Result<()> {
        self.calls.lock().push(call);
        if self.unreachable {
            return Err(EngineError::Network("mock engine unreachable".to_string()));
        }
        Ok(())
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ProtocolEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn authorize(&self, parameters: &str) -> Result<AuthorizationResponse> {
        self.record(EngineCall::Authorize(parameters.to_string()))?;
        self.verdicts.lock().pop_front().ok_or_else(|| {
            EngineError::InvalidResponse("MockEngine: no more verdicts available".to_string())
        })
    }

    async fn issue(&self, request: &IssueRequest) -> Result<EngineOutcome> {
        self.record(EngineCall::Issue(request.clone()))?;
        Ok(EngineOutcome {
            action: OutcomeAction::Location,
            response_content: Some(MOCK_ISSUE_LOCATION.to_string()),
            result_message: String::new(),
        })
    }

    async fn fail(&self, ticket: &str, reason: FailReason) -> Result<EngineOutcome> {
        self.record(EngineCall::Fail {
            ticket: ticket.to_string(),
            reason,
        })?;
        Ok(EngineOutcome {
            action: OutcomeAction::Location,
            response_content: Some(format!("{}{}", MOCK_FAIL_LOCATION, reason)),
            result_message: String::new(),
        })
    }

    async fn token(&self, request: &EndpointRequest) -> Result<TokenResponse> {
        self.record(EngineCall::Token(request.clone()))?;
        self.token_verdicts.lock().pop_front().ok_or_else(|| {
            EngineError::InvalidResponse("MockEngine: no more token verdicts available".to_string())
        })
    }

    async fn token_issue(&self, ticket: &str, subject: &str) -> Result<EndpointResponse> {
        self.record(EngineCall::TokenIssue {
            ticket: ticket.to_string(),
            subject: subject.to_string(),
        })?;
        Ok(EndpointResponse::new(
            EndpointAction::Ok,
            Some(MOCK_TOKEN_CONTENT.to_string()),
        ))
    }

    async fn token_fail(&self, ticket: &str, reason: TokenFailReason) -> Result<EndpointResponse> {
        self.record(EngineCall::TokenFail {
            ticket: ticket.to_string(),
            reason,
        })?;
        Ok(EndpointResponse::new(
            EndpointAction::BadRequest,
            Some(MOCK_INVALID_GRANT_CONTENT.to_string()),
        ))
    }

    async fn introspect(&self, parameters: &str) -> Result<EndpointResponse> {
        self.record(EngineCall::Introspect(parameters.to_string()))?;
        Ok(EndpointResponse::new(
            EndpointAction::Ok,
            Some(json!({ "active": true }).to_string()),
        ))
    }

    async fn revoke(&self, request: &EndpointRequest) -> Result<EndpointResponse> {
        self.record(EngineCall::Revoke(request.clone()))?;
        Ok(EndpointResponse::new(EndpointAction::Ok, None))
    }

    async fn jwks(&self) -> Result<Value> {
        self.record(EngineCall::Jwks)?;
        Ok(json!({ "keys": [] }))
    }

    async fn discovery(&self) -> Result<Value> {
        self.record(EngineCall::Discovery)?;
        Ok(json!({
            "issuer": MOCK_ISSUER,
            "authorization_endpoint": format!("{}/api/authorization", MOCK_ISSUER),
            "token_endpoint": format!("{}/api/token", MOCK_ISSUER),
            "jwks_uri": format!("{}/api/jwks", MOCK_ISSUER),
        }))
    }
}

/// Verdict helper for tests: an `INTERACTION` with the given ticket.
pub fn interaction(ticket: &str) -> AuthorizationResponse {
    AuthorizationResponse::new(AuthorizationAction::Interaction, ticket)
}
