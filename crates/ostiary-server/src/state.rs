//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use ostiary_consent::ConsentPipeline;
use ostiary_engine::SharedEngine;
use ostiary_identity::UserDirectory;
use ostiary_session::{SessionStore, StoreConfig};

use crate::config::ServerConfig;
use crate::render::{JsonRenderer, SharedRenderer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The consent pipeline (engine + directory).
    pub pipeline: ConsentPipeline,

    /// In-memory session store.
    pub sessions: SessionStore,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Interaction page renderer.
    pub renderer: SharedRenderer,
}

impl AppState {
    /// Create a new application state.
    pub fn new(pipeline: ConsentPipeline, sessions: SessionStore, config: ServerConfig) -> Self {
        Self {
            pipeline,
            sessions,
            config: Arc::new(config),
            renderer: Arc::new(JsonRenderer),
        }
    }

    /// Build the state from its collaborators, with a store whose TTL
    /// matches the cookie lifetime.
    pub fn from_parts(
        engine: SharedEngine,
        directory: UserDirectory,
        max_sessions: usize,
        config: ServerConfig,
    ) -> Self {
        let store = SessionStore::new(
            StoreConfig::default()
                .with_max_sessions(max_sessions)
                .with_ttl(config.session_ttl),
        );
        Self::new(
            ConsentPipeline::new(engine, Arc::new(directory)),
            store,
            config,
        )
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.config.cookie_key.clone()
    }
}
