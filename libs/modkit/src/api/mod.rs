//! API helpers shared by REST modules.

pub mod problem;

pub use problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
