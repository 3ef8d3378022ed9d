//! Shared helpers for the parlor unit and integration tests: one logging
//! initializer and assertions for `application/problem+json` responses.

pub mod problem_details;
pub mod test_logging;
