//! # ModKit - shared HTTP plumbing
//!
//! Small set of building blocks shared by the server modules:
//!
//! - [`api::problem`]: RFC 9457 Problem Details rendered as axum responses.
//! - [`runtime::shutdown`]: OS signal handling wired into a [`CancellationToken`].
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub use anyhow::Result;

pub mod api;
pub use api::problem::{
    bad_request, conflict, internal_error, not_found, unauthorized, Problem, ProblemResponse,
    ValidationError,
};

pub mod runtime;
pub use runtime::shutdown::{shutdown_token, wait_for_shutdown};
