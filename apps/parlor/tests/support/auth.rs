use std::time::SystemTime;

use parlor::auth::jwt::mint_access_token;
use parlor::protocol::UserId;
use parlor::state::security_config::SecurityConfig;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET.as_bytes())
}

pub fn token_for(user: UserId) -> String {
    mint_access_token(user, SystemTime::now(), &security()).expect("mint token")
}

pub fn bearer(user: UserId) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user)))
}
