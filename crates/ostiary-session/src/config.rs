//! Configuration for the session store.

use std::time::Duration;

/// Default maximum number of live sessions before LRU eviction.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default idle lifetime of a session.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of sessions to keep before evicting the least recently used.
    pub max_sessions: usize,

    /// Idle lifetime. A session not touched within this duration is gone.
    /// `None` keeps sessions until evicted.
    pub ttl: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            ttl: Some(DEFAULT_TTL),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sessions never expire by age.
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }
}
