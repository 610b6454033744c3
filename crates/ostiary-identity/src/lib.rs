//! User directory and claim resolution.
//!
//! This crate is the identity leaf of ostiary:
//!
//! - [`user`] — the [`UserRecord`] held by the directory and snapshotted into sessions
//! - [`directory`] — lookup by credentials or by stable subject
//! - [`claims`] — maps a user and a claim name to a claim value
//!
//! The directory is constructed once at startup and is read-only afterwards.
//! Callers share it behind an `Arc`.

pub mod claims;
pub mod directory;
pub mod error;
pub mod user;

pub use claims::{ClaimValue, resolve_claim};
pub use directory::UserDirectory;
pub use error::{IdentityError, Result};
pub use user::{PostalAddress, UserRecord};
