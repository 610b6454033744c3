//! Types exchanged with the protocol engine.
//!
//! Field names follow the engine's camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the engine wants done with an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationAction {
    /// The engine failed internally; `responseContent` holds a JSON error.
    InternalServerError,
    /// The request is malformed and cannot be redirected back to the client.
    BadRequest,
    /// Redirect the user agent to `responseContent`.
    Location,
    /// Return `responseContent` as an auto-submitting HTML form.
    Form,
    /// `prompt=none`: finish without showing anything to the user.
    NoInteraction,
    /// Show the login/consent page.
    Interaction,
}

/// Values of the `prompt` request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Prompt {
    None,
    Login,
    Consent,
    SelectAccount,
}

/// The requesting client, as much as the interaction page needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// A requested scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The engine's verdict on an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResponse {
    pub action: AuthorizationAction,
    /// Correlates the later issue/fail call with this request.
    #[serde(default)]
    pub ticket: String,
    /// Subject the request insists on (`id_token_hint` or `sub` claim).
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    /// `max_age` or the client's `default_max_age`; 0 when neither is set.
    #[serde(default)]
    pub max_age: u64,
    #[serde(default)]
    pub login_hint: Option<String>,
    /// Claims to embed in the ID token, possibly with `#tag` suffixes.
    #[serde(default)]
    pub claims: Vec<String>,
    #[serde(default)]
    pub claims_locales: Vec<String>,
    #[serde(default)]
    pub client: Option<ClientSummary>,
    #[serde(default)]
    pub scopes: Vec<ScopeSummary>,
    #[serde(default)]
    pub result_message: String,
    /// Prepared response for the error actions.
    #[serde(default)]
    pub response_content: Option<String>,
}

impl AuthorizationResponse {
    /// A verdict with the given action and ticket and everything else empty.
    pub fn new(action: AuthorizationAction, ticket: impl Into<String>) -> Self {
        Self {
            action,
            ticket: ticket.into(),
            subject: None,
            prompts: Vec::new(),
            max_age: 0,
            login_hint: None,
            claims: Vec::new(),
            claims_locales: Vec::new(),
            client: None,
            scopes: Vec::new(),
            result_message: String::new(),
            response_content: None,
        }
    }

    pub fn has_prompt(&self, prompt: Prompt) -> bool {
        self.prompts.contains(&prompt)
    }

    /// The required subject, treating an empty string as none.
    pub fn required_subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    /// The login hint, treating an empty string as none.
    pub fn login_hint(&self) -> Option<&str> {
        self.login_hint.as_deref().filter(|s| !s.is_empty())
    }

    /// The engine's prepared response when the verdict is an error.
    pub fn error_outcome(&self) -> Option<EngineOutcome> {
        let action = OutcomeAction::try_from(self.action).ok()?;
        Some(EngineOutcome {
            action,
            response_content: self.response_content.clone(),
            result_message: self.result_message.clone(),
        })
    }
}

/// How the HTTP boundary must answer once the engine has finished a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeAction {
    InternalServerError,
    BadRequest,
    Location,
    Form,
}

impl TryFrom<AuthorizationAction> for OutcomeAction {
    type Error = AuthorizationAction;

    fn try_from(action: AuthorizationAction) -> std::result::Result<Self, Self::Error> {
        match action {
            AuthorizationAction::InternalServerError => Ok(OutcomeAction::InternalServerError),
            AuthorizationAction::BadRequest => Ok(OutcomeAction::BadRequest),
            AuthorizationAction::Location => Ok(OutcomeAction::Location),
            AuthorizationAction::Form => Ok(OutcomeAction::Form),
            other => Err(other),
        }
    }
}

/// Final answer from an issue or fail call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOutcome {
    pub action: OutcomeAction,
    #[serde(default)]
    pub response_content: Option<String>,
    #[serde(default)]
    pub result_message: String,
}

/// Why an authorization request is being failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailReason {
    Unknown,
    NotLoggedIn,
    MaxAgeNotSupported,
    ExceedsMaxAge,
    DifferentSubject,
    AccountSelectionRequired,
    ConsentRequired,
    InteractionRequired,
    NotAuthenticated,
    Denied,
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailReason::Unknown => "unknown",
            FailReason::NotLoggedIn => "not_logged_in",
            FailReason::MaxAgeNotSupported => "max_age_not_supported",
            FailReason::ExceedsMaxAge => "exceeds_max_age",
            FailReason::DifferentSubject => "different_subject",
            FailReason::AccountSelectionRequired => "account_selection_required",
            FailReason::ConsentRequired => "consent_required",
            FailReason::InteractionRequired => "interaction_required",
            FailReason::NotAuthenticated => "not_authenticated",
            FailReason::Denied => "denied",
        };
        f.write_str(s)
    }
}

/// Request to issue the authorization response for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub ticket: String,
    pub subject: String,
    /// Seconds since the epoch; 0 when unknown.
    pub auth_time: u64,
    /// Claim values as a JSON object string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<String>,
}

/// The user's decision on a pending interaction, ready for the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionReport {
    pub ticket: String,
    pub authorized: bool,
    /// Subject of the signed-in user, if anybody is signed in.
    pub subject: Option<String>,
    /// When the signed-in user authenticated.
    pub authenticated_at: Option<u64>,
    pub claims: Map<String, Value>,
}

impl DecisionReport {
    /// The issue request this report turns into, if it grants authorization.
    pub fn issue_request(&self) -> Option<IssueRequest> {
        if !self.authorized {
            return None;
        }
        let subject = self.subject.as_deref().filter(|s| !s.is_empty())?;

        let claims = if self.claims.is_empty() {
            None
        } else {
            Some(Value::Object(self.claims.clone()).to_string())
        };

        Some(IssueRequest {
            ticket: self.ticket.clone(),
            subject: subject.to_string(),
            auth_time: self.authenticated_at.unwrap_or(0),
            claims,
        })
    }

    /// The reason to fail the ticket with, if the report does not grant authorization.
    pub fn fail_reason(&self) -> Option<FailReason> {
        if !self.authorized {
            Some(FailReason::Denied)
        } else if self.subject.as_deref().is_none_or(str::is_empty) {
            Some(FailReason::NotAuthenticated)
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token, introspection and revocation endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// What the engine wants done with a token, introspection or revocation
/// request, or with a token ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointAction {
    InternalServerError,
    /// Client authentication failed.
    InvalidClient,
    BadRequest,
    /// Resource owner password grant: the credentials must be checked
    /// before the ticket is issued or failed.
    Password,
    /// The ticket passed to a token issue call is unknown or expired.
    InvalidTicket,
    Ok,
}

/// Parameters of a token or revocation request as the engine wants them.
///
/// Client credentials come from the `Authorization: Basic` header, if any;
/// credentials sent in the form body stay inside `parameters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRequest {
    pub parameters: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl EndpointRequest {
    pub fn new(parameters: impl Into<String>) -> Self {
        Self {
            parameters: parameters.into(),
            ..Default::default()
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = client_secret;
        self
    }
}

/// The engine's answer for introspection, revocation and token tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    pub action: EndpointAction,
    /// JSON body to return to the caller as is.
    #[serde(default)]
    pub response_content: Option<String>,
    #[serde(default)]
    pub result_message: String,
}

impl EndpointResponse {
    pub fn new(action: EndpointAction, response_content: Option<String>) -> Self {
        Self {
            action,
            response_content,
            result_message: String::new(),
        }
    }
}

/// The engine's answer for a token request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub action: EndpointAction,
    #[serde(default)]
    pub response_content: Option<String>,
    #[serde(default)]
    pub result_message: String,
    /// Set for `PASSWORD`: pass to the token issue or fail call.
    #[serde(default)]
    pub ticket: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl TokenResponse {
    pub fn new(action: EndpointAction, response_content: Option<String>) -> Self {
        Self {
            action,
            response_content,
            result_message: String::new(),
            ticket: String::new(),
            username: None,
            password: None,
        }
    }

    /// A `PASSWORD` verdict carrying the resource owner's credentials.
    pub fn password_grant(
        ticket: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            ticket: ticket.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::new(EndpointAction::Password, None)
        }
    }

    /// Everything but the password-grant fields.
    pub fn into_endpoint_response(self) -> EndpointResponse {
        EndpointResponse {
            action: self.action,
            response_content: self.response_content,
            result_message: self.result_message,
        }
    }
}

/// Why a token ticket is being failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenFailReason {
    Unknown,
    InvalidResourceOwnerCredentials,
}
