//! Application state shared across handlers.

use std::sync::Arc;

use meridian_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Shared application state. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.secret_key.clone(), config.access_token_expire_minutes);
        AppState {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
        }
    }
}
