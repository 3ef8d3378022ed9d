use jsonwebtoken::Algorithm;

/// Default lifetime of a minted access token.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT signing settings shared by every handler.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Vec<u8>,
    /// Always HS256 in production; kept configurable for tests.
    pub algorithm: Algorithm,
    pub token_ttl_secs: i64,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn with_token_ttl(mut self, ttl_secs: i64) -> Self {
        self.token_ttl_secs = ttl_secs;
        self
    }
}
