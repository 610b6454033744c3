//! The protocol-engine seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::types::{
    AuthorizationResponse, DecisionReport, EndpointRequest, EndpointResponse, EngineOutcome,
    FailReason, IssueRequest, TokenFailReason, TokenResponse,
};

/// Operations ostiary needs from an authorization-protocol engine.
///
/// Calls are not retried here; timeouts belong to the implementation.
#[async_trait]
pub trait ProtocolEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Hand the raw authorization request parameters to the engine.
    ///
    /// `parameters` is the request's query or form body in
    /// `application/x-www-form-urlencoded` form.
    async fn authorize(&self, parameters: &str) -> Result<AuthorizationResponse>;

    /// Finish the flow for `request.ticket` successfully.
    async fn issue(&self, request: &IssueRequest) -> Result<EngineOutcome>;

    /// Finish the flow for `ticket` with an error.
    async fn fail(&self, ticket: &str, reason: FailReason) -> Result<EngineOutcome>;

    /// Hand a token request to the engine.
    async fn token(&self, request: &EndpointRequest) -> Result<TokenResponse>;

    /// Issue tokens for a `PASSWORD` ticket once the resource owner is known.
    async fn token_issue(&self, ticket: &str, subject: &str) -> Result<EndpointResponse>;

    /// Fail a `PASSWORD` ticket.
    async fn token_fail(&self, ticket: &str, reason: TokenFailReason) -> Result<EndpointResponse>;

    /// Hand a token introspection request (RFC 7662) to the engine.
    async fn introspect(&self, parameters: &str) -> Result<EndpointResponse>;

    /// Hand a token revocation request (RFC 7009) to the engine.
    async fn revoke(&self, request: &EndpointRequest) -> Result<EndpointResponse>;

    /// The service's JWK set document.
    async fn jwks(&self) -> Result<Value>;

    /// The service's OpenID Provider configuration document.
    async fn discovery(&self) -> Result<Value>;

    /// Report the user's decision for a pending interaction.
    ///
    /// A refusal fails the ticket with `DENIED`; an authorization without a
    /// signed-in subject fails it with `NOT_AUTHENTICATED`; anything else is
    /// issued.
    async fn report_decision(&self, report: &DecisionReport) -> Result<EngineOutcome> {
        if let Some(reason) = report.fail_reason() {
            debug!(engine = self.name(), %reason, "Decision does not grant authorization");
            return self.fail(&report.ticket, reason).await;
        }

        match report.issue_request() {
            Some(request) => self.issue(&request).await,
            None => self.fail(&report.ticket, FailReason::Unknown).await,
        }
    }
}

/// A shareable engine handle.
pub type SharedEngine = Arc<dyn ProtocolEngine>;
