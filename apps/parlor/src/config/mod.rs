//! Process configuration, read once from `PARLOR_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::hub::SessionSettings;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DICTIONARY: &str = "/usr/share/dict/words";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub dictionary_path: PathBuf,
    pub session: SessionSettings,
}

impl ServerConfig {
    /// Read the environment. `PARLOR_JWT_SECRET` is required; everything
    /// else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = env::var("PARLOR_JWT_SECRET")
            .map_err(|_| AppError::config("PARLOR_JWT_SECRET must be set".to_string()))?;
        if jwt_secret.trim().is_empty() {
            return Err(AppError::config("PARLOR_JWT_SECRET must not be empty".to_string()));
        }

        let defaults = SessionSettings::default();
        let delay_ms = parse_or("PARLOR_COUNTDOWN_DELAY_MS", defaults.countdown_delay.as_millis() as u64)?;
        let outbox_capacity = parse_or("PARLOR_OUTBOX_CAPACITY", defaults.outbox_capacity)?;
        if outbox_capacity == 0 {
            return Err(AppError::config(
                "PARLOR_OUTBOX_CAPACITY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: env::var("PARLOR_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_or("PARLOR_PORT", DEFAULT_PORT)?,
            jwt_secret,
            dictionary_path: env::var("PARLOR_DICTIONARY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DICTIONARY)),
            session: SessionSettings {
                countdown_delay: Duration::from_millis(delay_ms),
                outbox_capacity,
            },
        })
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
