//! `Authorization: Basic` parsing for the client-facing endpoints.

use axum::http::{HeaderMap, header};
use base64::{Engine, engine::general_purpose::STANDARD};
use ostiary_engine::EndpointRequest;

/// A user id and password from a Basic authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user_id: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse the request's `Authorization` header.
    ///
    /// Anything other than a well-formed `Basic` value yields `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user_id, password) = decoded.split_once(':')?;

        Some(Self {
            user_id: user_id.to_string(),
            password: password.to_string(),
        })
    }
}

/// The engine request for a token or revocation call.
///
/// Basic credentials, when present, identify the client.
pub fn endpoint_request(headers: &HeaderMap, parameters: String) -> EndpointRequest {
    let request = EndpointRequest::new(parameters);
    match BasicCredentials::from_headers(headers) {
        Some(credentials) => {
            request.with_client(credentials.user_id, Some(credentials.password))
        }
        None => request,
    }
}
