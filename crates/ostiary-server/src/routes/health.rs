//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use ostiary_session::StoreStats;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub const HEALTH_PATH: &str = "/health";

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Which protocol engine the server talks to.
    pub engine: String,
    /// Session store occupancy.
    pub sessions: StoreStats,
}

/// Report liveness plus engine and session store details. Does not call the engine.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.pipeline.engine().name().to_string(),
        sessions: state.sessions.stats().await,
    })
}

/// Create health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health))
}
