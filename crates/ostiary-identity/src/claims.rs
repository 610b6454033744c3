//! Claim resolution (OpenID Connect Core 1.0, 5.1).
//!
//! Only language-neutral values are supported. A non-empty language tag
//! resolves to nothing, as does any claim name outside the fixed set below.

use serde_json::Value;

use crate::user::UserRecord;

/// A resolved claim value. Most claims are strings; `address` is an object.
pub type ClaimValue = Value;

pub const NAME: &str = "name";
pub const GIVEN_NAME: &str = "given_name";
pub const FAMILY_NAME: &str = "family_name";
pub const EMAIL: &str = "email";
pub const PHONE_NUMBER: &str = "phone_number";
pub const ADDRESS: &str = "address";

/// Claim names this resolver can answer.
pub const SUPPORTED_CLAIMS: &[&str] = &[NAME, GIVEN_NAME, FAMILY_NAME, EMAIL, PHONE_NUMBER, ADDRESS];

/// Resolve `claim_name` for `user` in the language `language_tag`.
pub fn resolve_claim(user: &UserRecord, claim_name: &str, language_tag: &str) -> Option<ClaimValue> {
    if claim_name.is_empty() || !language_tag.is_empty() {
        return None;
    }

    match claim_name {
        NAME => Some(Value::String(user.full_name())),
        GIVEN_NAME => Some(Value::String(user.given_name.clone())),
        FAMILY_NAME => Some(Value::String(user.family_name.clone())),
        EMAIL => Some(Value::String(user.email.clone())),
        PHONE_NUMBER => Some(Value::String(user.phone_number.clone())),
        ADDRESS => serde_json::to_value(&user.address).ok(),
        _ => None,
    }
}
