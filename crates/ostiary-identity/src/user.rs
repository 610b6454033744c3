//! User records.

use serde::{Deserialize, Serialize};

/// Structured postal address (OpenID Connect Core 1.0, 5.1.1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PostalAddress {
    /// Address with only a country.
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Default::default()
        }
    }
}

/// A user known to the directory.
///
/// `subject` is the stable identifier handed to the protocol engine; it never
/// changes. `login_id` is what the user types into the login form.
///
/// The password is accepted when deserializing a users file but is never
/// serialized, so session snapshots do not carry it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub subject: String,
    pub login_id: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: PostalAddress,
}

impl UserRecord {
    /// Create a record with the identifying fields set.
    pub fn new(
        subject: impl Into<String>,
        login_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            login_id: login_id.into(),
            password: password.into(),
            given_name: String::new(),
            family_name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            address: PostalAddress::default(),
        }
    }

    pub fn with_name(mut self, given: impl Into<String>, family: impl Into<String>) -> Self {
        self.given_name = given.into();
        self.family_name = family.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = phone.into();
        self
    }

    pub fn with_address(mut self, address: PostalAddress) -> Self {
        self.address = address;
        self
    }

    /// Given name followed by family name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// Name shown on the interaction page for a signed-in user.
    pub fn display_name(&self) -> &str {
        &self.given_name
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("subject", &self.subject)
            .field("login_id", &self.login_id)
            .field("password", &"[REDACTED]")
            .field("given_name", &self.given_name)
            .field("family_name", &self.family_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("address", &self.address)
            .finish()
    }
}
