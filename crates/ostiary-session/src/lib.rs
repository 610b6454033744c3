//! Per-browser session state.
//!
//! This crate owns everything ostiary remembers about a browser between the
//! two halves of an interactive authorization:
//!
//! - [`SessionState`] — the typed session schema: the signed-in user and, while
//!   an interaction is pending, the engine's correlation data
//! - [`Session`] — the handle request code reads and mutates
//! - [`SessionStore`] — in-memory store with LRU eviction and idle TTL
//!
//! Stored sessions are opaque blobs. They are decoded into [`SessionState`]
//! once when loaded; a blob that no longer matches the schema is dropped and
//! the browser starts over with an empty session.
//!
//! # Example
//!
//! ```rust,ignore
//! use ostiary_session::{SessionStore, StoreConfig, unix_now};
//!
//! let store = SessionStore::new(StoreConfig::default());
//! let mut session = store.load_or_create(cookie_value.as_deref()).await;
//! session.login_at(&user, unix_now());
//! session.rotate_id();
//! store.save(&mut session).await?;
//! ```

mod config;
mod error;
mod session;
mod state;
mod store;

pub use config::{DEFAULT_MAX_SESSIONS, DEFAULT_TTL, StoreConfig};
pub use error::{Result, SessionError};
pub use session::{Session, SessionId, unix_now};
pub use state::{AuthenticatedUser, PendingInteraction, SessionState};
pub use store::{SessionStore, StoreStats};
