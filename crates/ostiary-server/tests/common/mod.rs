//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, Response, redirect};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use ostiary_engine::{AuthorizationResponse, MockEngine};
use ostiary_identity::UserDirectory;
use ostiary_server::{AppState, Server, ServerConfig};

/// A test server that runs in the background, backed by a [`MockEngine`].
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// The engine the server talks to.
    pub engine: Arc<MockEngine>,
    /// HTTP client that does not follow redirects.
    pub client: Client,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server whose engine answers `authorize` with `verdicts` in order.
    pub async fn start(verdicts: Vec<AuthorizationResponse>) -> Result<Self> {
        let addr = find_available_port().await?;
        let engine = Arc::new(MockEngine::new(verdicts));

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_request_logging(false)
            .with_secure_cookies(false);
        let state = AppState::from_parts(engine.clone(), UserDirectory::demo(), 100, config);

        let server = Server::from_state(state);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            engine,
            client,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A browser with an empty cookie jar.
    pub fn browser(&self) -> Browser<'_> {
        Browser {
            server: self,
            cookie: None,
        }
    }
}

/// Carries the session cookie between requests like a browser would.
pub struct Browser<'a> {
    server: &'a TestServer,
    cookie: Option<String>,
}

impl Browser<'_> {
    /// `GET` the authorization endpoint with `query`.
    pub async fn authorize(&mut self, query: &str) -> Result<Response> {
        let url = format!("{}/api/authorization?{}", self.server.base_url(), query);
        let resp = self.with_cookie(self.server.client.get(url)).send().await?;
        self.remember(resp.headers());
        Ok(resp)
    }

    /// Submit the decision form.
    pub async fn decide(&mut self, fields: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}/api/authorization/decision", self.server.base_url());
        let resp = self
            .with_cookie(self.server.client.post(url))
            .form(fields)
            .send()
            .await?;
        self.remember(resp.headers());
        Ok(resp)
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    /// The session cookie as sent in the `Cookie` header.
    pub fn cookie(&self) -> Option<String> {
        self.cookie.clone()
    }

    /// Replace the session cookie, e.g. to replay an old one.
    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    fn with_cookie(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    fn remember(&mut self, headers: &HeaderMap) {
        if let Some(value) = headers.get(SET_COOKIE).and_then(|v| v.to_str().ok())
            && let Some(pair) = value.split(';').next()
        {
            self.cookie = Some(pair.trim().to_string());
        }
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
