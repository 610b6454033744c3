//! In-memory session store with LRU eviction and idle TTL.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::session::{Session, SessionId};
use crate::state::SessionState;

/// A stored session blob.
struct Entry {
    blob: Vec<u8>,
    last_access: Instant,
}

/// Process-memory session store.
///
/// Sessions are keyed by the id in the session cookie. Concurrent requests
/// for the same session are not coordinated: the last save wins.
///
/// Expired sessions are dropped when they are next looked up, or in bulk
/// when a new session is saved at capacity; there is no background task.
pub struct SessionStore {
    inner: Arc<RwLock<LruCache<SessionId, Entry>>>,
    config: StoreConfig,
}

impl SessionStore {
    pub fn new(config: StoreConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner: Arc::new(RwLock::new(LruCache::new(cap))),
            config,
        }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.config
            .ttl
            .is_some_and(|ttl| entry.last_access.elapsed() > ttl)
    }

    /// Load the session named by the cookie, or start a new one.
    ///
    /// A missing, unknown or expired id yields a fresh session with a new id.
    pub async fn load_or_create(&self, id: Option<&str>) -> Session {
        if let Some(id) = id
            && let Some(state) = self.load(&SessionId::from(id)).await
        {
            return Session::restore(SessionId::from(id), state);
        }

        let session = Session::new(SessionId::generate());
        trace!(session_id = %session.id(), "Started new session");
        session
    }

    /// Load and decode a stored session. Touches its LRU position and TTL.
    pub async fn load(&self, id: &SessionId) -> Option<SessionState> {
        let mut inner = self.inner.write().await;

        let expired = match inner.peek(id) {
            None => return None,
            Some(entry) => self.is_expired(entry),
        };

        if expired {
            debug!(session_id = %id, "Session expired, removing from store");
            inner.pop(id);
            return None;
        }

        let entry = inner.get_mut(id)?;
        entry.last_access = Instant::now();
        Some(SessionState::decode(&entry.blob))
    }

    /// Persist the session if it has unsaved changes.
    ///
    /// A rotated session also drops the entry under its previous id. Saving
    /// a new session at capacity first purges expired sessions and only then
    /// evicts the least recently used one.
    pub async fn save(&self, session: &mut Session) -> Result<()> {
        if !session.is_dirty() {
            return Ok(());
        }

        let blob = session.state().encode()?;
        let mut inner = self.inner.write().await;

        if let Some(previous) = session.replaced_id()
            && inner.pop(previous).is_some()
        {
            debug!(session_id = %session.id(), %previous, "Dropped session stored under rotated id");
        }

        if inner.len() >= inner.cap().get() && !inner.contains(session.id()) {
            self.purge_expired(&mut inner);
        }

        if let Some((evicted, _)) = inner.push(
            session.id().clone(),
            Entry {
                blob,
                last_access: Instant::now(),
            },
        ) && &evicted != session.id()
        {
            debug!(session_id = %evicted, "Evicted least recently used session");
        }

        trace!(session_id = %session.id(), size = inner.len(), "Session saved");
        drop(inner);

        session.mark_clean();
        Ok(())
    }

    /// Drop every expired session. Returns how many were dropped.
    fn purge_expired(&self, inner: &mut LruCache<SessionId, Entry>) -> usize {
        if self.config.ttl.is_none() {
            return 0;
        }

        let expired: Vec<SessionId> = inner
            .iter()
            .filter(|(_, entry)| self.is_expired(entry))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            inner.pop(id);
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "Purged expired sessions");
        }

        expired.len()
    }

    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        StoreStats {
            size: inner.len(),
            capacity: inner.cap().get(),
        }
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub size: usize,
    pub capacity: usize,
}
