use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::DocumentStore;

/// Shared handler state: immutable configuration plus the persistence handle
/// acquired at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
