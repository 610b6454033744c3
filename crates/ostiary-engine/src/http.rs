//! JSON-over-HTTP engine client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::engine::ProtocolEngine;
use crate::error::{EngineError, Result};
use crate::types::{
    AuthorizationResponse, EndpointRequest, EndpointResponse, EngineOutcome, FailReason,
    IssueRequest, TokenFailReason, TokenResponse,
};

/// Default timeout for engine calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AUTHORIZATION_PATH: &str = "api/auth/authorization";
const ISSUE_PATH: &str = "api/auth/authorization/issue";
const FAIL_PATH: &str = "api/auth/authorization/fail";
const TOKEN_PATH: &str = "api/auth/token";
const TOKEN_ISSUE_PATH: &str = "api/auth/token/issue";
const TOKEN_FAIL_PATH: &str = "api/auth/token/fail";
const INTROSPECTION_PATH: &str = "api/auth/introspection/standard";
const REVOCATION_PATH: &str = "api/auth/revocation";
const JWKS_PATH: &str = "api/service/jwks/get";
const DISCOVERY_PATH: &str = "api/service/configuration";

/// Connection settings for [`HttpEngine`].
#[derive(Clone)]
pub struct EngineConfig {
    pub base_url: Url,
    pub api_key: String,
    pub api_secret: String,
    pub timeout: Duration,
}

impl EngineConfig {
    pub fn new(base_url: Url, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Body of calls that only carry the raw request parameters.
#[derive(Serialize)]
struct ParametersBody<'a> {
    parameters: &'a str,
}

#[derive(Serialize)]
struct FailRequest<'a> {
    ticket: &'a str,
    reason: FailReason,
}

#[derive(Serialize)]
struct TokenIssueRequest<'a> {
    ticket: &'a str,
    subject: &'a str,
}

#[derive(Serialize)]
struct TokenFailRequest<'a> {
    ticket: &'a str,
    reason: TokenFailReason,
}

/// Engine client speaking JSON over HTTP with basic authentication.
#[derive(Clone)]
pub struct HttpEngine {
    http: reqwest::Client,
    config: EngineConfig,
}

impl HttpEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(EngineError::Config("engine api_key is required".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<Url> {
        let mut base = self.config.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(path)
            .map_err(|e| EngineError::Config(format!("Invalid engine URL: {}", e)))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(url = %url, "Calling protocol engine");

        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!(url = %url, "Calling protocol engine");

        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(status = status.as_u16(), "Protocol engine returned an error status");

        Err(EngineError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ProtocolEngine for HttpEngine {
    fn name(&self) -> &str {
        "http"
    }

    async fn authorize(&self, parameters: &str) -> Result<AuthorizationResponse> {
        self.post(AUTHORIZATION_PATH, &ParametersBody { parameters })
            .await
    }

    async fn issue(&self, request: &IssueRequest) -> Result<EngineOutcome> {
        self.post(ISSUE_PATH, request).await
    }

    async fn fail(&self, ticket: &str, reason: FailReason) -> Result<EngineOutcome> {
        self.post(FAIL_PATH, &FailRequest { ticket, reason }).await
    }

    async fn token(&self, request: &EndpointRequest) -> Result<TokenResponse> {
        self.post(TOKEN_PATH, request).await
    }

    async fn token_issue(&self, ticket: &str, subject: &str) -> Result<EndpointResponse> {
        self.post(TOKEN_ISSUE_PATH, &TokenIssueRequest { ticket, subject })
            .await
    }

    async fn token_fail(&self, ticket: &str, reason: TokenFailReason) -> Result<EndpointResponse> {
        self.post(TOKEN_FAIL_PATH, &TokenFailRequest { ticket, reason })
            .await
    }

    async fn introspect(&self, parameters: &str) -> Result<EndpointResponse> {
        self.post(INTROSPECTION_PATH, &ParametersBody { parameters })
            .await
    }

    async fn revoke(&self, request: &EndpointRequest) -> Result<EndpointResponse> {
        self.post(REVOCATION_PATH, request).await
    }

    async fn jwks(&self) -> Result<Value> {
        self.get(JWKS_PATH).await
    }

    async fn discovery(&self) -> Result<Value> {
        self.get(DISCOVERY_PATH).await
    }
}
