//! Building the decision report from what a phase knows.

use ostiary_engine::DecisionReport;
use ostiary_identity::{ClaimValue, UserDirectory, resolve_claim};
use ostiary_session::{PendingInteraction, Session};
use serde::Deserialize;

use crate::claims::collect_claims;

/// What a decision needs to be reported to the engine.
pub trait DecisionSource {
    /// Whether the user granted the client's request.
    fn is_client_authorized(&self) -> bool;

    /// Subject of the signed-in user.
    fn user_subject(&self) -> Option<&str>;

    /// When the signed-in user authenticated; 0 when nobody is signed in.
    fn user_authenticated_at(&self) -> u64;

    /// Value of a claim for the signed-in user.
    fn user_claim(&self, claim_name: &str, language_tag: &str) -> Option<ClaimValue>;
}

/// A decision backed by the browser session and the user directory.
///
/// Claim values come from the directory record of the session's subject,
/// not from the snapshot taken at login.
pub struct SessionDecision<'a> {
    authorized: bool,
    session: &'a Session,
    directory: &'a UserDirectory,
}

impl<'a> SessionDecision<'a> {
    pub fn new(authorized: bool, session: &'a Session, directory: &'a UserDirectory) -> Self {
        Self {
            authorized,
            session,
            directory,
        }
    }
}

impl DecisionSource for SessionDecision<'_> {
    fn is_client_authorized(&self) -> bool {
        self.authorized
    }

    fn user_subject(&self) -> Option<&str> {
        self.session.current_user().map(|u| u.subject.as_str())
    }

    fn user_authenticated_at(&self) -> u64 {
        self.session.authenticated_at()
    }

    fn user_claim(&self, claim_name: &str, language_tag: &str) -> Option<ClaimValue> {
        let subject = self.user_subject()?;
        let user = self.directory.find_by_subject(subject)?;
        resolve_claim(user, claim_name, language_tag)
    }
}

/// Assemble the report for `pending` from `source`.
///
/// Subject, authentication time and claims are only gathered when the
/// decision grants authorization.
pub fn build_report(source: &impl DecisionSource, pending: &PendingInteraction) -> DecisionReport {
    let authorized = source.is_client_authorized();

    let subject = if authorized {
        source.user_subject().map(str::to_string)
    } else {
        None
    };

    let Some(subject) = subject else {
        return DecisionReport {
            ticket: pending.ticket.clone(),
            authorized,
            ..Default::default()
        };
    };

    let claims = collect_claims(&pending.claim_names, &pending.claim_locales, |name, tag| {
        source.user_claim(name, tag)
    });

    DecisionReport {
        ticket: pending.ticket.clone(),
        authorized,
        subject: Some(subject),
        authenticated_at: Some(source.user_authenticated_at()),
        claims,
    }
}

/// Fields submitted from the interaction page.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionForm {
    #[serde(default)]
    pub login_id: String,
    #[serde(default)]
    pub password: String,
    /// Any non-empty value means the user granted the request.
    #[serde(default)]
    pub authorized: Option<String>,
}

impl DecisionForm {
    pub fn is_authorized(&self) -> bool {
        self.authorized.as_deref().is_some_and(|v| !v.is_empty())
    }
}

impl std::fmt::Debug for DecisionForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionForm")
            .field("login_id", &self.login_id)
            .field("password", &"[REDACTED]")
            .field("authorized", &self.authorized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostiary_session::SessionId;
    use serde_json::json;

    fn pending() -> PendingInteraction {
        PendingInteraction::new("t-1", vec!["name".into(), "email".into()], vec![])
    }

    #[test]
    fn test_form_authorized_flag() {
        let absent: DecisionForm = serde_json::from_value(json!({ "loginId": "john" })).unwrap();
        assert!(!absent.is_authorized());

        let empty: DecisionForm = serde_json::from_value(json!({ "authorized": "" })).unwrap();
        assert!(!empty.is_authorized());

        let granted: DecisionForm =
            serde_json::from_value(json!({ "authorized": "Authorize" })).unwrap();
        assert!(granted.is_authorized());
    }

    #[test]
    fn test_form_debug_hides_password() {
        let form = DecisionForm {
            login_id: "john".into(),
            password: "hunter2".into(),
            authorized: None,
        };
        assert!(!format!("{:?}", form).contains("hunter2"));
    }

    #[test]
    fn test_report_with_signed_in_user() {
        let directory = UserDirectory::demo();
        let mut session = Session::new(SessionId::generate());
        session.login_at(directory.find_by_subject("1001").unwrap(), 1_700_000_000);

        let report = build_report(&SessionDecision::new(true, &session, &directory), &pending());

        assert_eq!(report.ticket, "t-1");
        assert!(report.authorized);
        assert_eq!(report.subject.as_deref(), Some("1001"));
        assert_eq!(report.authenticated_at, Some(1_700_000_000));
        assert_eq!(report.claims.get("name"), Some(&json!("John Smith")));
        assert_eq!(report.claims.get("email"), Some(&json!("john@example.com")));
    }

    #[test]
    fn test_denied_report_carries_no_identity() {
        let directory = UserDirectory::demo();
        let mut session = Session::new(SessionId::generate());
        session.login_at(directory.find_by_subject("1001").unwrap(), 1_700_000_000);

        let report = build_report(&SessionDecision::new(false, &session, &directory), &pending());

        assert!(!report.authorized);
        assert_eq!(report.subject, None);
        assert_eq!(report.authenticated_at, None);
        assert!(report.claims.is_empty());
    }

    #[test]
    fn test_report_without_user() {
        let directory = UserDirectory::demo();
        let session = Session::new(SessionId::generate());

        let report = build_report(&SessionDecision::new(true, &session, &directory), &pending());

        assert!(report.authorized);
        assert_eq!(report.subject, None);
        assert!(report.claims.is_empty());
    }
}
