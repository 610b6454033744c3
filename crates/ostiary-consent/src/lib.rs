//! The interactive-consent decision pipeline.
//!
//! An authorization request that needs the user's attention crosses two HTTP
//! round trips. The first evaluates whether the user must (re)authenticate,
//! records what the engine handed us in the session, and produces a model for
//! the interaction page. The second takes the submitted form, signs the user
//! in if needed, and reports the decision back to the protocol engine.
//!
//! The two phases share nothing but the [`Session`](ostiary_session::Session).
//!
//! # Components
//!
//! - [`evaluator`] — the pure login-requirement decision
//! - [`claims`] — collection of requested claim values, `#tag` aware
//! - [`decision`] — the capability set a decision is built from
//! - [`pipeline`] — [`ConsentPipeline`], which drives both phases and
//!   resolves resource owner password grants

pub mod claims;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod pipeline;

pub use claims::collect_claims;
pub use decision::{DecisionForm, DecisionSource, SessionDecision, build_report};
pub use error::{ConsentError, Result};
pub use evaluator::{Evaluation, InteractionVerdict, LoginReason, evaluate, login_reason};
pub use pipeline::{AuthorizationStep, Clock, ConsentPipeline, InteractionPage};
