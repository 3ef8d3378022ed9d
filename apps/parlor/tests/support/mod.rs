pub mod auth;
pub mod logging;

pub use app_builder::create_test_app;
