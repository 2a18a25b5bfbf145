//! xthreads-agent: a daily content pipeline for xthreads.app.
//!
//! The stages live in their own crates; this crate wires them together from
//! configuration and runs them in order.

pub mod logging;
pub mod pipeline;
pub mod readiness;
pub mod sources;

pub use pipeline::{Pipeline, RunOutput};
pub use readiness::{check, CheckStatus, ReadinessReport};
pub use sources::{build_generator, build_listener, build_sources, SourceMode};
