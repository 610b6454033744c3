//! HTTP boundary for ostiary.
//!
//! Serves the authorization endpoint (GET and POST), the decision endpoint
//! the interaction page posts to, and a health check. The token,
//! introspection, revocation, JWK set and discovery endpoints are passed
//! through to the engine. Sessions are bound to an encrypted cookie and kept
//! in memory.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ostiary_engine::{EngineConfig, HttpEngine};
//! use ostiary_identity::UserDirectory;
//! use ostiary_server::{AppState, Server, ServerConfig};
//!
//! let engine = HttpEngine::new(EngineConfig::new(base_url, api_key, api_secret))?;
//! let state = AppState::from_parts(Arc::new(engine), UserDirectory::demo(), 10_000, ServerConfig::new());
//! Server::from_state(state).run().await?;
//! ```

pub mod config;
pub mod cookie;
pub mod credentials;
pub mod error;
pub mod outcome;
pub mod render;
pub mod routes;
pub mod state;

pub use axum_extra::extract::cookie::Key;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use outcome::{endpoint_response, no_store, outcome_response};
pub use render::{JsonRenderer, Renderer, SharedRenderer};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The ostiary HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let config = &self.state.config;

        let router = Router::new()
            .merge(routes::health_routes())
            .merge(routes::endpoint_routes())
            .route(
                &config.authorization_path,
                get(routes::authorization_get_handler).post(routes::authorization_post_handler),
            )
            .route(&config.decision_path, post(routes::decision_handler));

        let router = if config.request_logging {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        };

        router.with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
