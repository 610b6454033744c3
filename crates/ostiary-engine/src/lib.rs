//! Client for the external authorization-protocol engine.
//!
//! ostiary does not validate authorization requests or mint tokens itself.
//! It hands the raw request parameters to an engine, receives a verdict, and
//! later reports the user's decision back so the engine can finish the flow.
//! Token, introspection and revocation requests, the JWK set and the
//! discovery document are passed through the same way.
//!
//! # Components
//!
//! - [`types`] — request/response types exchanged with the engine
//! - [`engine`] — the [`ProtocolEngine`] trait every engine client implements
//! - [`http`] — [`HttpEngine`], a JSON-over-HTTP client
//! - `mock` — [`MockEngine`] for tests (feature `testing`)

pub mod engine;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod types;

pub use engine::{ProtocolEngine, SharedEngine};
pub use error::{EngineError, Result};
pub use http::{EngineConfig, HttpEngine};
#[cfg(any(test, feature = "testing"))]
pub use mock::{EngineCall, MockEngine};
pub use types::{
    AuthorizationAction, AuthorizationResponse, ClientSummary, DecisionReport, EndpointAction,
    EndpointRequest, EndpointResponse, EngineOutcome, FailReason, IssueRequest, OutcomeAction,
    Prompt, ScopeSummary, TokenFailReason, TokenResponse,
};
