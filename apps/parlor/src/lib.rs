#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod hub;
pub mod middleware;
pub mod modes;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod store;
pub mod ws;

// Re-exports for public API
pub use auth::jwt::{mint_access_token, verify_access_token, Claims};
pub use config::ServerConfig;
pub use domain::dictionary::Dictionary;
pub use domain::rules::GameMode;
pub use error::AppError;
pub use extractors::current_user::CurrentUser;
pub use hub::{Connection, Hub, SessionSettings};
pub use middleware::cors::cors_middleware;
pub use middleware::request_log::RequestLog;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;
pub use store::{MemoryStore, Store};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    parlor_test_support::test_logging::init();
}
