//! HTTP routes.

pub mod authorization;
pub mod decision;
pub mod endpoints;
pub mod health;

pub use authorization::{authorization_get_handler, authorization_post_handler};
pub use decision::decision_handler;
pub use endpoints::{
    DISCOVERY_PATH, INTROSPECTION_PATH, JWKS_PATH, REVOCATION_PATH, TOKEN_PATH, endpoint_routes,
};
pub use health::{HEALTH_PATH, HealthResponse, health_routes};

use crate::error::{Result, ServerError};

/// Request parameters in arrival order, repeated names kept.
pub(crate) type Parameters = Vec<(String, String)>;

/// Re-encode parameters as `application/x-www-form-urlencoded` for the engine.
pub(crate) fn encode_parameters(params: &Parameters) -> Result<String> {
    serde_urlencoded::to_string(params)
        .map_err(|e| ServerError::BadRequest(format!("unencodable parameters: {}", e)))
}
