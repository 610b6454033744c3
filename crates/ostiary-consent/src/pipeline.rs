//! The two-phase decision pipeline.

use std::sync::Arc;

use ostiary_engine::{
    AuthorizationAction, AuthorizationResponse, ClientSummary, EndpointAction, EndpointRequest,
    EndpointResponse, EngineOutcome, FailReason, ScopeSummary, SharedEngine, TokenFailReason,
};
use ostiary_identity::UserDirectory;
use ostiary_session::{PendingInteraction, Session, unix_now};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::decision::{DecisionForm, SessionDecision, build_report};
use crate::error::Result;
use crate::evaluator::{Evaluation, evaluate, max_age_exceeded};

/// Source of the current time in seconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Presentation model handed to the renderer for the interaction page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPage {
    pub login_required: bool,
    pub login_id: String,
    pub login_id_fixed: bool,
    /// Given name of the signed-in user when no login is required.
    pub display_name: Option<String>,
    /// Claims the client asked for.
    pub claims: Vec<String>,
    pub client: Option<ClientSummary>,
    pub scopes: Vec<ScopeSummary>,
}

/// Where an authorization request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationStep {
    /// Show the interaction page; the session holds the pending interaction.
    Interaction(InteractionPage),
    /// The engine finished the flow.
    Finished(EngineOutcome),
}

/// Drives authorization requests and user decisions through the engine.
///
/// Holds no per-request state; everything that has to survive between the
/// two phases lives in the [`Session`].
#[derive(Clone)]
pub struct ConsentPipeline {
    engine: SharedEngine,
    directory: Arc<UserDirectory>,
    clock: Clock,
}

impl ConsentPipeline {
    pub fn new(engine: SharedEngine, directory: Arc<UserDirectory>) -> Self {
        Self {
            engine,
            directory,
            clock: Arc::new(unix_now),
        }
    }

    /// Replace the clock used for login times and max-age checks.
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    fn now(&self) -> u64 {
        (self.clock)()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authorization request
    // ─────────────────────────────────────────────────────────────────────

    /// Pass the request parameters to the engine and act on its verdict.
    pub async fn authorize(
        &self,
        session: &mut Session,
        parameters: &str,
    ) -> Result<AuthorizationStep> {
        let request = self.engine.authorize(parameters).await?;

        if let Some(outcome) = request.error_outcome() {
            debug!(
                action = ?request.action,
                result_message = %request.result_message,
                "Authorization request ends with the engine's response"
            );
            return Ok(AuthorizationStep::Finished(outcome));
        }

        if request.action == AuthorizationAction::NoInteraction {
            let outcome = self.finish_without_interaction(session, &request).await?;
            return Ok(AuthorizationStep::Finished(outcome));
        }

        self.begin_interaction(session, &request).await
    }

    /// Phase 1: prepare the interaction page for an `INTERACTION` verdict.
    ///
    /// Signs the current user out when login is required and records the
    /// ticket and requested claims as the pending interaction. A pinned
    /// subject unknown to the directory fails the ticket instead.
    pub async fn begin_interaction(
        &self,
        session: &mut Session,
        request: &AuthorizationResponse,
    ) -> Result<AuthorizationStep> {
        debug!(session_id = %session.id(), "Processing the request with user interaction");

        let evaluation = evaluate(
            request,
            session.current_user(),
            session.authenticated_at(),
            &self.directory,
            self.now(),
        );

        let verdict = match evaluation {
            Evaluation::Interaction(verdict) => verdict,
            Evaluation::NoSuchSubject { subject } => {
                session.logout();
                debug!(%subject, "No user has the required subject; failing the request");
                let outcome = self
                    .engine
                    .fail(&request.ticket, FailReason::NotAuthenticated)
                    .await?;
                return Ok(AuthorizationStep::Finished(outcome));
            }
        };

        let display_name = if verdict.login_required {
            session.logout();
            None
        } else {
            session
                .current_user()
                .map(|user| user.display_name().to_string())
        };

        session.set_pending_interaction(PendingInteraction::new(
            request.ticket.clone(),
            request.claims.clone(),
            request.claims_locales.clone(),
        ));

        Ok(AuthorizationStep::Interaction(InteractionPage {
            login_required: verdict.login_required,
            login_id: verdict.login_id,
            login_id_fixed: verdict.login_id_fixed,
            display_name,
            claims: request.claims.clone(),
            client: request.client.clone(),
            scopes: request.scopes.clone(),
        }))
    }

    /// Finish a `NO_INTERACTION` verdict (`prompt=none`) from the session alone.
    pub async fn finish_without_interaction(
        &self,
        session: &Session,
        request: &AuthorizationResponse,
    ) -> Result<EngineOutcome> {
        debug!(session_id = %session.id(), "Processing the request without user interaction");

        if let Some(reason) = self.no_interaction_failure(session, request) {
            debug!(%reason, "Request cannot be completed without interaction");
            return Ok(self.engine.fail(&request.ticket, reason).await?);
        }

        let pending = PendingInteraction::new(
            request.ticket.clone(),
            request.claims.clone(),
            request.claims_locales.clone(),
        );
        let report = build_report(&SessionDecision::new(true, session, &self.directory), &pending);

        Ok(self.engine.report_decision(&report).await?)
    }

    fn no_interaction_failure(
        &self,
        session: &Session,
        request: &AuthorizationResponse,
    ) -> Option<FailReason> {
        let Some(user) = session.current_user() else {
            return Some(FailReason::NotLoggedIn);
        };

        if max_age_exceeded(request.max_age, session.authenticated_at(), self.now()) {
            return Some(FailReason::ExceedsMaxAge);
        }

        match request.required_subject() {
            Some(required) if required != user.subject => Some(FailReason::DifferentSubject),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Decision
    // ─────────────────────────────────────────────────────────────────────

    /// Phase 2: report the submitted decision for the pending interaction.
    ///
    /// Signs the user in with the submitted credentials when nobody is signed
    /// in yet. A failed login is not an error here: the report then carries
    /// no subject and the engine fails the ticket.
    pub async fn submit_decision(
        &self,
        session: &mut Session,
        form: &DecisionForm,
    ) -> Result<EngineOutcome> {
        if session.current_user().is_none() {
            self.authenticate(session, &form.login_id, &form.password);
        }

        let authorized = form.is_authorized();

        let pending = match session.pending_interaction() {
            Some(pending) => pending.clone(),
            None => {
                warn!(session_id = %session.id(), "Decision submitted without a pending interaction");
                PendingInteraction::default()
            }
        };

        let report = build_report(
            &SessionDecision::new(authorized, session, &self.directory),
            &pending,
        );
        debug!(
            session_id = %session.id(),
            authorized,
            signed_in = report.subject.is_some(),
            "Reporting decision"
        );

        Ok(self.engine.report_decision(&report).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Token endpoint
    // ─────────────────────────────────────────────────────────────────────

    /// Pass a token request to the engine.
    ///
    /// A resource owner password grant comes back as `PASSWORD`; the
    /// credentials are checked against the directory and the ticket is
    /// issued for the matching subject or failed. Every other verdict is
    /// returned as is.
    pub async fn token(&self, request: &EndpointRequest) -> Result<EndpointResponse> {
        let response = self.engine.token(request).await?;
        if response.action != EndpointAction::Password {
            debug!(action = ?response.action, "Token request ends with the engine's response");
            return Ok(response.into_endpoint_response());
        }

        let username = response.username.as_deref().unwrap_or_default();
        let password = response.password.as_deref().unwrap_or_default();

        match self.directory.find_by_credentials(username, password) {
            Some(user) => {
                info!(%username, subject = %user.subject, "Password grant accepted");
                Ok(self.engine.token_issue(&response.ticket, &user.subject).await?)
            }
            None => {
                debug!(%username, "Password grant rejected");
                Ok(self
                    .engine
                    .token_fail(
                        &response.ticket,
                        TokenFailReason::InvalidResourceOwnerCredentials,
                    )
                    .await?)
            }
        }
    }

    /// Sign the user in when the credentials match a directory record.
    ///
    /// A successful login moves the session to a fresh id.
    fn authenticate(&self, session: &mut Session, login_id: &str, password: &str) -> bool {
        match self.directory.find_by_credentials(login_id, password) {
            Some(user) => {
                info!(session_id = %session.id(), %login_id, "User authentication succeeded");
                session.login_at(user, self.now());
                session.rotate_id();
                true
            }
            None => {
                debug!(session_id = %session.id(), %login_id, "User authentication failed");
                false
            }
        }
    }
}
