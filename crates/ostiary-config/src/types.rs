//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]       # listen address and endpoint paths
//! [engine]       # protocol engine connection
//! [session]      # session cookie and store
//! [directory]    # user directory source
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Built-in defaults.
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const BIND: &str = "127.0.0.1";
    pub const AUTHORIZATION_PATH: &str = "/api/authorization";
    pub const DECISION_PATH: &str = "/api/authorization/decision";
    pub const ENGINE_BASE_URL: &str = "https://api.authlete.com";
    pub const ENGINE_TIMEOUT_SECS: u64 = 30;
    pub const COOKIE_NAME: &str = "AuthorizationServerSession";
    pub const MAX_SESSIONS: usize = 10_000;
    pub const SESSION_TTL_SECS: u64 = 3600;
    /// Minimum length of a cookie encryption key, in bytes.
    pub const MIN_COOKIE_KEY_LEN: usize = 64;

    /// Paths the server always serves; the configurable endpoints may not use them.
    pub const RESERVED_PATHS: &[&str] = &[
        "/health",
        "/api/token",
        "/api/introspection",
        "/api/revocation",
        "/api/jwks",
        "/.well-known/openid-configuration",
    ];
}

const REDACTED: &str = "********";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OstiaryConfig {
    pub server: Option<ServerConfig>,
    pub engine: Option<EngineConfig>,
    pub session: Option<SessionConfig>,
    pub directory: Option<DirectoryConfig>,
}

impl OstiaryConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole.
    pub fn merge(&mut self, other: OstiaryConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.engine.is_some() {
            self.engine = other.engine;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
        if other.directory.is_some() {
            self.directory = other.directory;
        }
    }

    /// `[server]` with defaults filled in.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// `[engine]` with defaults filled in.
    pub fn engine(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }

    /// `[session]` with defaults filled in.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// `[directory]` with defaults filled in.
    pub fn directory(&self) -> DirectoryConfig {
        self.directory.clone().unwrap_or_default()
    }

    /// A copy with every section present and secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut engine = self.engine();
        if engine.api_secret.is_some() {
            engine.api_secret = Some(REDACTED.to_string());
        }
        let mut session = self.session();
        if session.cookie_key.is_some() {
            session.cookie_key = Some(REDACTED.to_string());
        }

        Self {
            server: Some(self.server()),
            engine: Some(engine),
            session: Some(session),
            directory: Some(self.directory()),
        }
    }

    /// Reject values the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        let server = self.server();
        for (field, path) in [
            ("server.authorization_path", &server.authorization_path),
            ("server.decision_path", &server.decision_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::invalid(field, "must start with '/'"));
            }
            if path.contains(['{', '}']) {
                return Err(ConfigError::invalid(field, "must not contain '{' or '}'"));
            }
            if defaults::RESERVED_PATHS.contains(&path.as_str()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{}' is reserved for a built-in endpoint", path),
                ));
            }
        }
        if server.authorization_path == server.decision_path {
            return Err(ConfigError::invalid(
                "server.decision_path",
                "must differ from server.authorization_path",
            ));
        }

        self.engine().base_url()?;

        if self.session().max_sessions == 0 {
            return Err(ConfigError::invalid("session.max_sessions", "must be at least 1"));
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP listener and endpoint paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Enable request logging.
    pub request_logging: bool,
    /// Authorization endpoint (GET and POST).
    pub authorization_path: String,
    /// Decision endpoint the interaction page posts to.
    pub decision_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            bind: defaults::BIND.to_string(),
            request_logging: true,
            authorization_path: defaults::AUTHORIZATION_PATH.to_string(),
            decision_path: defaults::DECISION_PATH.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Protocol engine connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Prefer `OSTIARY_ENGINE_API_SECRET` over storing this in a file.
    pub api_secret: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::ENGINE_BASE_URL.to_string(),
            api_key: None,
            api_secret: None,
            timeout_secs: defaults::ENGINE_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// The parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::invalid("engine.base_url", e.to_string()))
    }

    pub fn has_plaintext_secret(&self) -> bool {
        self.api_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session cookie and in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// LRU capacity of the session store.
    pub max_sessions: usize,
    /// Idle lifetime of a session; also the cookie max-age.
    pub ttl_secs: u64,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// Cookie encryption key (at least 64 bytes). Ephemeral when unset.
    pub cookie_key: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::COOKIE_NAME.to_string(),
            max_sessions: defaults::MAX_SESSIONS,
            ttl_secs: defaults::SESSION_TTL_SECS,
            secure_cookies: true,
            cookie_key: None,
        }
    }
}

impl SessionConfig {
    /// The cookie key, if one is set and long enough to use.
    pub fn usable_cookie_key(&self) -> Option<&[u8]> {
        self.cookie_key
            .as_deref()
            .map(str::as_bytes)
            .filter(|k| k.len() >= defaults::MIN_COOKIE_KEY_LEN)
    }

    pub fn has_short_cookie_key(&self) -> bool {
        self.cookie_key.is_some() && self.usable_cookie_key().is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Directory Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Where users come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// JSON array of user records. The demo users are seeded when unset.
    pub users_file: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
