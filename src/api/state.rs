use std::sync::Arc;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use crate::ai::Assistant;
use crate::chat::{ChatService, SqliteStore};
use crate::core::AppConfig;
use crate::travel::TravelService;

/// State shared by every handler. Nothing in it is mutated after
/// startup so it is shared without a lock.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Result<Self, Error> {
        let assistant = Assistant::from_config(&config)?;
        let store = Arc::new(SqliteStore::new(db.clone()));
        let chat = ChatService::new(store, assistant, TravelService::new());
        Ok(Self { db, config, chat })
    }
}
