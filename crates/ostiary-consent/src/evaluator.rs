//! Login-requirement evaluation.
//!
//! [`evaluate`] is a pure function of the engine's verdict, the session's
//! signed-in user, the directory and the current time.

use ostiary_engine::{AuthorizationResponse, Prompt};
use ostiary_identity::{UserDirectory, UserRecord};
use tracing::debug;

/// Why the user has to (re)authenticate. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    /// Nobody is signed in.
    NotLoggedIn,
    /// The request carries `prompt=login`.
    PromptLogin,
    /// The request requires a subject other than the signed-in user's.
    DifferentSubject,
    /// More than `max_age` seconds have passed since the last login.
    MaxAgeExceeded,
}

impl std::fmt::Display for LoginReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoginReason::NotLoggedIn => "no user is signed in",
            LoginReason::PromptLogin => "prompt includes login",
            LoginReason::DifferentSubject => "signed-in subject differs from the required one",
            LoginReason::MaxAgeExceeded => "max age has passed since the last login",
        };
        f.write_str(s)
    }
}

/// What the interaction page needs to know about signing in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionVerdict {
    pub login_required: bool,
    /// Initial value of the login id field; may be empty.
    pub login_id: String,
    /// The login id belongs to the required subject and must not be edited.
    pub login_id_fixed: bool,
    pub reason: Option<LoginReason>,
}

impl InteractionVerdict {
    fn signed_in() -> Self {
        Self {
            login_required: false,
            login_id: String::new(),
            login_id_fixed: false,
            reason: None,
        }
    }
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Show the interaction page.
    Interaction(InteractionVerdict),
    /// Login is required for a subject the directory does not know.
    NoSuchSubject { subject: String },
}

impl Evaluation {
    pub fn verdict(&self) -> Option<&InteractionVerdict> {
        match self {
            Evaluation::Interaction(v) => Some(v),
            Evaluation::NoSuchSubject { .. } => None,
        }
    }
}

/// First reason the user must sign in again, or `None` if the current
/// session user may proceed.
///
/// `authenticated_at` is only consulted when a user is present. A `max_age`
/// of 0 disables the age check.
pub fn login_reason(
    request: &AuthorizationResponse,
    current_user: Option<&UserRecord>,
    authenticated_at: u64,
    now: u64,
) -> Option<LoginReason> {
    let Some(user) = current_user else {
        return Some(LoginReason::NotLoggedIn);
    };

    if request.has_prompt(Prompt::Login) {
        return Some(LoginReason::PromptLogin);
    }

    if let Some(required) = request.required_subject()
        && user.subject != required
    {
        return Some(LoginReason::DifferentSubject);
    }

    if max_age_exceeded(request.max_age, authenticated_at, now) {
        return Some(LoginReason::MaxAgeExceeded);
    }

    None
}

/// Whether more than `max_age` seconds separate `authenticated_at` and `now`.
pub(crate) fn max_age_exceeded(max_age: u64, authenticated_at: u64, now: u64) -> bool {
    max_age > 0 && now.saturating_sub(authenticated_at) > max_age
}

/// Decide whether the interaction must include a login step.
///
/// When it must and the request pins a subject, the subject's login id is
/// offered read-only; a subject missing from the directory yields
/// [`Evaluation::NoSuchSubject`]. Without a pinned subject the request's
/// login hint seeds the login id.
pub fn evaluate(
    request: &AuthorizationResponse,
    current_user: Option<&UserRecord>,
    authenticated_at: u64,
    directory: &UserDirectory,
    now: u64,
) -> Evaluation {
    let Some(reason) = login_reason(request, current_user, authenticated_at, now) else {
        return Evaluation::Interaction(InteractionVerdict::signed_in());
    };

    debug!(%reason, "Login is required");

    let Some(required) = request.required_subject() else {
        return Evaluation::Interaction(InteractionVerdict {
            login_required: true,
            login_id: request.login_hint().unwrap_or_default().to_string(),
            login_id_fixed: false,
            reason: Some(reason),
        });
    };

    match directory.find_by_subject(required) {
        Some(user) => Evaluation::Interaction(InteractionVerdict {
            login_required: true,
            login_id: user.login_id.clone(),
            login_id_fixed: true,
            reason: Some(reason),
        }),
        None => {
            debug!("No user has the required subject");
            Evaluation::NoSuchSubject {
                subject: required.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostiary_engine::AuthorizationAction;

    const NOW: u64 = 1_700_000_000;

    fn request() -> AuthorizationResponse {
        AuthorizationResponse::new(AuthorizationAction::Interaction, "ticket")
    }

    fn john(directory: &UserDirectory) -> &UserRecord {
        directory.find_by_subject("1001").unwrap()
    }

    fn jane(directory: &UserDirectory) -> &UserRecord {
        directory.find_by_subject("1002").unwrap()
    }

    fn verdict(evaluation: Evaluation) -> InteractionVerdict {
        match evaluation {
            Evaluation::Interaction(v) => v,
            other => panic!("expected an interaction verdict, got {:?}", other),
        }
    }

    #[test]
    fn test_no_user_always_requires_login() {
        let directory = UserDirectory::demo();

        let mut req = request();
        let v = verdict(evaluate(&req, None, 0, &directory, NOW));
        assert!(v.login_required);
        assert!(!v.login_id_fixed);
        assert_eq!(v.reason, Some(LoginReason::NotLoggedIn));

        req.prompts = vec![Prompt::Consent];
        req.max_age = 10;
        let v = verdict(evaluate(&req, None, NOW, &directory, NOW));
        assert!(v.login_required);
        assert!(!v.login_id_fixed);
    }

    #[test]
    fn test_no_user_uses_login_hint() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.login_hint = Some("jane".into());

        let v = verdict(evaluate(&req, None, 0, &directory, NOW));
        assert_eq!(v.login_id, "jane");
        assert!(!v.login_id_fixed);
    }

    #[test]
    fn test_no_user_with_required_subject_fixes_login_id() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.subject = Some("1002".into());

        let v = verdict(evaluate(&req, None, 0, &directory, NOW));
        assert!(v.login_required);
        assert_eq!(v.login_id, "jane");
        assert!(v.login_id_fixed);
    }

    #[test]
    fn test_prompt_login_forces_login() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.prompts = vec![Prompt::Login, Prompt::Consent];

        let v = verdict(evaluate(&req, Some(john(&directory)), NOW, &directory, NOW));
        assert!(v.login_required);
        assert_eq!(v.reason, Some(LoginReason::PromptLogin));
    }

    #[test]
    fn test_prompt_login_takes_precedence_over_subject_mismatch() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.prompts = vec![Prompt::Login];
        req.subject = Some("1001".into());

        let reason = login_reason(&req, Some(jane(&directory)), NOW, NOW);
        assert_eq!(reason, Some(LoginReason::PromptLogin));
    }

    #[test]
    fn test_subject_mismatch_fixes_required_login_id() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.subject = Some("1001".into());

        let v = verdict(evaluate(&req, Some(jane(&directory)), NOW, &directory, NOW));
        assert!(v.login_required);
        assert_eq!(v.login_id, "john");
        assert!(v.login_id_fixed);
        assert_eq!(v.reason, Some(LoginReason::DifferentSubject));
    }

    #[test]
    fn test_matching_subject_does_not_require_login() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.subject = Some("1001".into());

        let v = verdict(evaluate(&req, Some(john(&directory)), NOW, &directory, NOW));
        assert!(!v.login_required);
        assert_eq!(v.reason, None);
    }

    #[test]
    fn test_unknown_subject() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.subject = Some("9999".into());

        let evaluation = evaluate(&req, Some(jane(&directory)), NOW, &directory, NOW);
        assert_eq!(
            evaluation,
            Evaluation::NoSuchSubject {
                subject: "9999".into()
            }
        );
        assert!(evaluation.verdict().is_none());

        let evaluation = evaluate(&req, None, 0, &directory, NOW);
        assert!(matches!(evaluation, Evaluation::NoSuchSubject { .. }));
    }

    #[test]
    fn test_empty_subject_is_not_a_requirement() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.subject = Some(String::new());

        let v = verdict(evaluate(&req, Some(jane(&directory)), NOW, &directory, NOW));
        assert!(!v.login_required);
    }

    #[test]
    fn test_max_age_boundary() {
        let directory = UserDirectory::demo();
        let user = john(&directory);
        let mut req = request();
        req.max_age = 600;

        let at_limit = login_reason(&req, Some(user), NOW - 600, NOW);
        assert_eq!(at_limit, None);

        let past_limit = login_reason(&req, Some(user), NOW - 601, NOW);
        assert_eq!(past_limit, Some(LoginReason::MaxAgeExceeded));
    }

    #[test]
    fn test_zero_max_age_never_expires() {
        let directory = UserDirectory::demo();
        let req = request();

        let v = verdict(evaluate(&req, Some(john(&directory)), 0, &directory, NOW));
        assert!(!v.login_required);
    }

    #[test]
    fn test_future_authentication_time_does_not_underflow() {
        assert!(!max_age_exceeded(10, NOW + 100, NOW));
        assert!(max_age_exceeded(10, 0, NOW));
        assert!(!max_age_exceeded(0, 0, NOW));
    }

    #[test]
    fn test_signed_in_verdict_has_no_login_id() {
        let directory = UserDirectory::demo();
        let mut req = request();
        req.login_hint = Some("jane".into());

        let v = verdict(evaluate(&req, Some(john(&directory)), NOW, &directory, NOW));
        assert!(!v.login_required);
        assert!(v.login_id.is_empty());
        assert!(!v.login_id_fixed);
    }
}
