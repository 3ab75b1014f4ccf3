//! Test support for the Tally backend.
//!
//! Shared between unit and integration tests: logging initialization that
//! is safe to call from anywhere, and assertions for the problem-details
//! error contract that do not depend on backend types.

pub mod logging;
pub mod problem_details;
