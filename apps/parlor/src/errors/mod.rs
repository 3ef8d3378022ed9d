//! Error handling for the parlor game server.

pub mod domain;
pub mod error_code;

#[cfg(test)]
mod tests_error_mapping;

pub use domain::{ConfigError, GameError};
pub use error_code::ErrorCode;
