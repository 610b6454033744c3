//! In-memory user directory.
//!
//! Stands in for a real identity store. Built once at startup, then only read.

use std::collections::HashSet;
use std::path::Path;

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::{IdentityError, Result};
use crate::user::{PostalAddress, UserRecord};

/// Read-only collection of [`UserRecord`]s with unique subjects and login ids.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    /// Build a directory, rejecting duplicate subjects or login ids.
    pub fn new(users: Vec<UserRecord>) -> Result<Self> {
        let mut subjects = HashSet::new();
        let mut login_ids = HashSet::new();

        for user in &users {
            if user.subject.is_empty() {
                return Err(IdentityError::MissingField("subject"));
            }
            if user.login_id.is_empty() {
                return Err(IdentityError::MissingField("loginId"));
            }
            if !subjects.insert(user.subject.as_str()) {
                return Err(IdentityError::DuplicateSubject(user.subject.clone()));
            }
            if !login_ids.insert(user.login_id.as_str()) {
                return Err(IdentityError::DuplicateLoginId(user.login_id.clone()));
            }
        }

        Ok(Self { users })
    }

    /// The two demonstration accounts.
    pub fn demo() -> Self {
        Self {
            users: vec![
                UserRecord::new("1001", "john", "john")
                    .with_name("John", "Smith")
                    .with_email("john@example.com")
                    .with_phone_number("+1 (425) 555-1212")
                    .with_address(PostalAddress::country("USA")),
                UserRecord::new("1002", "jane", "jane")
                    .with_name("Jane", "Smith")
                    .with_email("jane@example.com")
                    .with_phone_number("+56 (2) 687 2400")
                    .with_address(PostalAddress::country("Chile")),
            ],
        }
    }

    /// Load a directory from a JSON array of user records.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| IdentityError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let users: Vec<UserRecord> = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), count = users.len(), "Loaded users file");
        Self::new(users)
    }

    /// Find the user whose login id matches and whose password is correct.
    ///
    /// Login ids are unique, so the search stops at the first login id match
    /// whether or not the password is right.
    pub fn find_by_credentials(&self, login_id: &str, password: &str) -> Option<&UserRecord> {
        let user = self.users.iter().find(|u| u.login_id == login_id)?;

        if password_matches(&user.password, password) {
            Some(user)
        } else {
            None
        }
    }

    /// Find the user with the given subject.
    pub fn find_by_subject(&self, subject: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.subject == subject)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Compare passwords without leaking how many leading bytes match.
fn password_matches(expected: &str, presented: &str) -> bool {
    let expected = expected.as_bytes();
    let presented = presented.as_bytes();

    if expected.len() == presented.len() {
        expected.ct_eq(presented).into()
    } else {
        let _ = expected.ct_eq(expected);
        false
    }
}
