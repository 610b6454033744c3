//! Decision endpoint the interaction page posts to.

use axum::extract::{Form, State};
use axum::response::Response;
use axum_extra::extract::PrivateCookieJar;
use ostiary_consent::DecisionForm;

use crate::cookie::{commit_session, load_session};
use crate::error::Result;
use crate::outcome::outcome_response;
use crate::state::AppState;

/// Accepts `loginId`, `password` and `authorized` form fields.
pub async fn decision_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<DecisionForm>,
) -> Result<(PrivateCookieJar, Response)> {
    let mut session = load_session(&state, &jar).await;

    let outcome = state.pipeline.submit_decision(&mut session, &form).await?;
    let response = outcome_response(outcome)?;

    let jar = commit_session(&state, jar, &mut session).await?;
    Ok((jar, response))
}
