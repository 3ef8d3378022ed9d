//! Game-level error type shared by the rules engines and the session hub.
//!
//! This error type is transport-agnostic. The hub turns it into an `error`
//! notification addressed to the sender; HTTP handlers convert it with
//! `From<GameError> for AppError`.
//!
//! Round and game completion are *not* errors; see
//! [`crate::domain::outcome::Outcome`].

use thiserror::Error;

use super::error_code::ErrorCode;

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {parameter}: {value}; allowed: {allowed}")]
pub struct ConfigError {
    pub parameter: &'static str,
    pub value: String,
    pub allowed: String,
}

impl ConfigError {
    pub fn new(parameter: &'static str, value: impl ToString, allowed: impl Into<String>) -> Self {
        Self {
            parameter,
            value: value.to_string(),
            allowed: allowed.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Precondition failure: wrong turn, unknown card, bad bid. State is untouched.
    #[error("{0}")]
    Validation(String),
    /// Invalid game configuration, reported to the owner.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Malformed envelope or unknown message type.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// An internal contract was broken. Never expected under correct usage.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl GameError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    pub fn config(parameter: &'static str, value: impl ToString, allowed: impl Into<String>) -> Self {
        Self::Config(ConfigError::new(parameter, value, allowed))
    }

    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol(detail.into())
    }

    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant(detail.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::Validation(_) => ErrorCode::ValidationError,
            GameError::Config(_) => ErrorCode::ConfigError,
            GameError::Protocol(_) => ErrorCode::ProtocolError,
            GameError::Invariant(_) => ErrorCode::Internal,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GameError::Validation(_))
    }
}

impl From<serde_json::Error> for GameError {
    fn from(e: serde_json::Error) -> Self {
        GameError::protocol(format!("malformed payload: {e}"))
    }
}
