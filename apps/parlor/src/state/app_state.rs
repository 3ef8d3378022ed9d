use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::domain::dictionary::Dictionary;
use crate::hub::{Hub, SessionSettings};
use crate::store::{MemoryStore, Store};

/// Shared handles every handler can reach through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub security: SecurityConfig,
}

impl AppState {
    pub fn new(hub: Arc<Hub>, security: SecurityConfig) -> Self {
        Self { hub, security }
    }

    /// Wire a hub over `store`.
    pub fn build(
        store: Arc<dyn Store>,
        dictionary: Arc<Dictionary>,
        settings: SessionSettings,
        security: SecurityConfig,
    ) -> Self {
        Self::new(Arc::new(Hub::new(store, dictionary, settings)), security)
    }

    /// In-memory store, empty dictionary and default session settings.
    pub fn in_memory(security: SecurityConfig) -> Self {
        Self::build(
            Arc::new(MemoryStore::new()),
            Arc::new(Dictionary::empty()),
            SessionSettings::default(),
            security,
        )
    }
}
