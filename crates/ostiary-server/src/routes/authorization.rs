//! Authorization endpoint.
//!
//! OpenID Connect requires both GET and POST. Either way the parameters are
//! re-encoded as `application/x-www-form-urlencoded` and handed to the engine.

use axum::extract::{Form, Query, State};
use axum::response::Response;
use axum_extra::extract::PrivateCookieJar;
use ostiary_consent::AuthorizationStep;
use tracing::debug;

use super::{Parameters, encode_parameters};
use crate::cookie::{commit_session, load_session};
use crate::error::Result;
use crate::outcome::{no_store, outcome_response};
use crate::state::AppState;

/// `GET` with query parameters.
pub async fn authorization_get_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<Parameters>,
) -> Result<(PrivateCookieJar, Response)> {
    handle_authorization(state, jar, params).await
}

/// `POST` with form parameters.
pub async fn authorization_post_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(params): Form<Parameters>,
) -> Result<(PrivateCookieJar, Response)> {
    handle_authorization(state, jar, params).await
}

async fn handle_authorization(
    state: AppState,
    jar: PrivateCookieJar,
    params: Parameters,
) -> Result<(PrivateCookieJar, Response)> {
    let parameters = encode_parameters(&params)?;

    let mut session = load_session(&state, &jar).await;
    debug!(session_id = %session.id(), "Authorization request");

    let response = match state.pipeline.authorize(&mut session, &parameters).await? {
        AuthorizationStep::Interaction(page) => no_store(
            state
                .renderer
                .render_interaction(&page, &state.config.decision_path),
        ),
        AuthorizationStep::Finished(outcome) => outcome_response(outcome)?,
    };

    let jar = commit_session(&state, jar, &mut session).await?;
    Ok((jar, response))
}
