//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum_extra::extract::cookie::Key;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "AuthorizationServerSession";

/// Default session lifetime (1 hour).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable request logging.
    pub request_logging: bool,

    /// Authorization endpoint path.
    pub authorization_path: String,

    /// Decision endpoint path.
    pub decision_path: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Session cookie
    // ─────────────────────────────────────────────────────────────────────────
    pub cookie_name: String,

    /// Cookie max-age.
    pub session_ttl: Duration,

    /// Mark the cookie `Secure`.
    pub secure_cookies: bool,

    /// Key encrypting the session cookie.
    pub cookie_key: Key,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            request_logging: true,
            authorization_path: "/api/authorization".to_string(),
            decision_path: "/api/authorization/decision".to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
            secure_cookies: true,
            cookie_key: Key::generate(),
        }
    }
}

impl ServerConfig {
    /// Create a config with defaults and an ephemeral cookie key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set the authorization and decision endpoint paths.
    pub fn with_paths(
        mut self,
        authorization_path: impl Into<String>,
        decision_path: impl Into<String>,
    ) -> Self {
        self.authorization_path = authorization_path.into();
        self.decision_path = decision_path.into();
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.cookie_key = key;
        self
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_address", &self.bind_address)
            .field("request_logging", &self.request_logging)
            .field("authorization_path", &self.authorization_path)
            .field("decision_path", &self.decision_path)
            .field("cookie_name", &self.cookie_name)
            .field("session_ttl", &self.session_ttl)
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}
