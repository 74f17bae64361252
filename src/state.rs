use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, SurveyRepository, UserRepository};

/// Per-process handles shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub surveys: Arc<dyn SurveyRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        surveys: Arc<dyn SurveyRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            surveys,
            users,
        }
    }

    /// State backed by Postgres for both surveys and users.
    pub fn postgres(config: AppConfig, store: PgStore) -> Self {
        let store = Arc::new(store);
        Self::new(config, store.clone(), store)
    }

    /// State backed by a fresh in-memory store, which is also returned so
    /// callers can seed data the API has no writer for.
    pub fn in_memory(config: AppConfig) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = Self::new(config, store.clone(), store.clone());
        (state, store)
    }
}
