//! Binding sessions to the encrypted session cookie.

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use ostiary_session::Session;
use time::Duration;
use tracing::trace;

use crate::error::Result;
use crate::state::AppState;

/// The session named by the request's cookie, or a fresh one.
pub async fn load_session(state: &AppState, jar: &PrivateCookieJar) -> Session {
    let cookie = jar.get(&state.config.cookie_name);
    let id = cookie.as_ref().map(|c| c.value());
    state.sessions.load_or_create(id).await
}

/// Persist `session` and set its cookie when it changed.
///
/// An unchanged session leaves the store and the jar alone.
pub async fn commit_session(
    state: &AppState,
    jar: PrivateCookieJar,
    session: &mut Session,
) -> Result<PrivateCookieJar> {
    if !session.is_dirty() {
        return Ok(jar);
    }

    state.sessions.save(session).await?;
    trace!(session_id = %session.id(), new = session.is_new(), "Session saved");

    Ok(jar.add(session_cookie(state, session.id().as_str())))
}

fn session_cookie(state: &AppState, session_id: &str) -> Cookie<'static> {
    let ttl = i64::try_from(state.config.session_ttl.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((state.config.cookie_name.clone(), session_id.to_string()))
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(ttl))
        .build()
}
