//! Session handle used by request code.

use ostiary_identity::UserRecord;
use tracing::debug;

use crate::state::{AuthenticatedUser, PendingInteraction, SessionState};

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single authority over one browser's [`SessionState`].
///
/// Mutations only touch the in-memory copy; call
/// [`SessionStore::save`](crate::SessionStore::save) to persist them.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    state: SessionState,
    is_new: bool,
    dirty: bool,
    /// Id this session was stored under before the last unsaved rotation.
    replaced: Option<SessionId>,
}

impl Session {
    /// A brand-new, empty session.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::default(),
            is_new: true,
            dirty: false,
            replaced: None,
        }
    }

    /// A session restored from the store.
    pub fn restore(id: SessionId, state: SessionState) -> Self {
        Self {
            id,
            state,
            is_new: false,
            dirty: false,
            replaced: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True when the browser did not present a live session.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// True when there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
        self.is_new = false;
        self.replaced = None;
    }

    /// Move the session to a fresh random id, keeping its state.
    ///
    /// The store drops the entry under the old id on the next save, so a
    /// cookie value planted before login is worthless afterwards.
    pub fn rotate_id(&mut self) {
        let previous = std::mem::replace(&mut self.id, SessionId::generate());
        debug!(session_id = %self.id, "Session id rotated");
        if !self.is_new && self.replaced.is_none() {
            self.replaced = Some(previous);
        }
        self.dirty = true;
    }

    /// The stored id this session will replace when saved.
    pub fn replaced_id(&self) -> Option<&SessionId> {
        self.replaced.as_ref()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<&UserRecord> {
        self.state.user.as_ref().map(|a| &a.user)
    }

    /// When the current user authenticated, or 0 when nobody is signed in.
    pub fn authenticated_at(&self) -> u64 {
        self.state.user.as_ref().map_or(0, |a| a.authenticated_at)
    }

    /// Sign `user` in with an explicit authentication time.
    pub fn login_at(&mut self, user: &UserRecord, authenticated_at: u64) {
        debug!(session_id = %self.id, subject = %user.subject, "Session login");
        self.state.user = Some(AuthenticatedUser {
            user: user.clone(),
            authenticated_at,
        });
        self.dirty = true;
    }

    /// Sign the current user out. Pending interaction data is left alone.
    pub fn logout(&mut self) {
        if self.state.user.take().is_some() {
            debug!(session_id = %self.id, "Session logout");
            self.dirty = true;
        }
    }

    /// Record the correlation data for an interaction in progress.
    pub fn set_pending_interaction(&mut self, pending: PendingInteraction) {
        self.state.pending = Some(pending);
        self.dirty = true;
    }

    /// The correlation data recorded by the last interaction setup.
    pub fn pending_interaction(&self) -> Option<&PendingInteraction> {
        self.state.pending.as_ref()
    }
}

/// Current time in seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
