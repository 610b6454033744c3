//! Client-facing endpoints passed through to the engine.
//!
//! Token, introspection and revocation requests are re-encoded and forwarded
//! with any Basic client credentials; the engine's JSON goes back unchanged.
//! The JWK set and discovery documents are fetched from the engine on every
//! request.

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, warn};

use super::{Parameters, encode_parameters};
use crate::credentials::{BasicCredentials, endpoint_request};
use crate::error::{ErrorResponse, Result};
use crate::outcome::{endpoint_response, no_store, unauthorized};
use crate::state::AppState;

pub const TOKEN_PATH: &str = "/api/token";
pub const INTROSPECTION_PATH: &str = "/api/introspection";
pub const REVOCATION_PATH: &str = "/api/revocation";
pub const JWKS_PATH: &str = "/api/jwks";
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Caller refused by the introspection endpoint whatever its password.
const REFUSED_INTROSPECTION_CALLER: &str = "nobody";

/// Token endpoint (RFC 6749). Password grants are resolved against the directory.
pub async fn token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<Parameters>,
) -> Result<Response> {
    let request = endpoint_request(&headers, encode_parameters(&params)?);
    let response = state.pipeline.token(&request).await?;
    endpoint_response(response, TOKEN_PATH)
}

/// Introspection endpoint (RFC 7662).
///
/// The caller must present Basic credentials; the user id `nobody` is refused.
pub async fn introspection_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<Parameters>,
) -> Result<Response> {
    match BasicCredentials::from_headers(&headers) {
        Some(caller) if caller.user_id != REFUSED_INTROSPECTION_CALLER => {
            debug!(caller = %caller.user_id, "Introspection request");
        }
        _ => {
            warn!("Introspection request without acceptable credentials");
            return Ok(introspection_refused());
        }
    }

    let response = state
        .pipeline
        .engine()
        .introspect(&encode_parameters(&params)?)
        .await?;
    endpoint_response(response, INTROSPECTION_PATH)
}

fn introspection_refused() -> Response {
    let body = ErrorResponse {
        code: "unauthorized".to_string(),
        message: "Authentication is required.".to_string(),
    };
    no_store(unauthorized(
        (StatusCode::UNAUTHORIZED, Json(body)).into_response(),
        INTROSPECTION_PATH,
    ))
}

/// Revocation endpoint (RFC 7009).
pub async fn revocation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<Parameters>,
) -> Result<Response> {
    let request = endpoint_request(&headers, encode_parameters(&params)?);
    let response = state.pipeline.engine().revoke(&request).await?;
    endpoint_response(response, REVOCATION_PATH)
}

/// JWK set document (RFC 7517).
pub async fn jwks_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    Ok(Json(state.pipeline.engine().jwks().await?))
}

/// OpenID Provider configuration (OpenID Connect Discovery 1.0).
pub async fn discovery_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    Ok(Json(state.pipeline.engine().discovery().await?))
}

/// Create the pass-through endpoint routes.
pub fn endpoint_routes() -> Router<AppState> {
    Router::new()
        .route(TOKEN_PATH, post(token_handler))
        .route(INTROSPECTION_PATH, post(introspection_handler))
        .route(REVOCATION_PATH, post(revocation_handler))
        .route(JWKS_PATH, get(jwks_handler))
        .route(DISCOVERY_PATH, get(discovery_handler))
}
