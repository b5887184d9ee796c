use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::ai::Assistant;
use crate::chat::{ChatService, ChatStore, SqliteStore};
use crate::core::AppConfig;
use crate::travel::TravelService;

/// Titles sessions whose inline title generation never completed.
#[derive(Debug)]
pub struct RetitleSessions;

impl RetitleSessions {
    pub async fn run(&self, service: &ChatService) -> anyhow::Result<usize> {
        let session_ids = service.store().list_untitled_sessions().await?;
        let mut titled = 0;

        for session_id in session_ids {
            let messages = match service.store().list_messages(&session_id).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::error!("Failed to fetch messages for session {}: {}", session_id, e);
                    continue;
                }
            };
            let Some(first) = messages.iter().find(|m| m.is_user()) else {
                continue;
            };
            match service.update_title(&session_id, &first.content).await {
                Ok(true) => titled += 1,
                Ok(false) => {}
                Err(e) => tracing::error!("Failed to claim title for session {}: {}", session_id, e),
            }
        }

        Ok(titled)
    }
}

#[async_trait]
impl crate::jobs::PeriodicJob for RetitleSessions {
    fn interval(&self) -> Duration {
        // Run every 15 minutes
        Duration::from_secs(60 * 15)
    }

    async fn run_job(&self, config: &AppConfig, db_conn: &Connection) {
        tracing::info!("Starting session retitle job");

        let assistant = match Assistant::from_config(config) {
            Ok(assistant) => assistant,
            Err(e) => {
                tracing::error!("Failed to configure assistant: {}", e);
                return;
            }
        };
        let store: Arc<dyn ChatStore> = Arc::new(SqliteStore::new(db_conn.clone()));
        let service = ChatService::new(store, assistant, TravelService::new());

        match self.run(&service).await {
            Ok(count) => tracing::info!("Completed session retitle job, titled {} sessions", count),
            Err(e) => tracing::error!("Session retitle job failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::NewMessage;
    use crate::core::db::memory_db;

    #[tokio::test]
    async fn test_titles_sessions_left_untitled() {
        let store = Arc::new(SqliteStore::new(memory_db().await.unwrap()));
        let service = ChatService::new(store.clone(), Assistant::default(), TravelService::new());

        // Simulate a send whose title update never happened
        let pending = service.create_session(None, None).await.unwrap();
        store
            .append_message(NewMessage::user(&pending.id, "Flights to Lisbon"))
            .await
            .unwrap();
        // Sessions without user messages are left alone
        let empty = service.create_session(None, None).await.unwrap();

        assert_eq!(RetitleSessions.run(&service).await.unwrap(), 1);
        assert_eq!(
            service.get_session(&pending.id).await.unwrap().title,
            "Trip to Lisbon"
        );
        assert_eq!(
            service.get_session(&empty.id).await.unwrap().title,
            "New Chat"
        );

        // Nothing left to do on the next pass
        assert_eq!(RetitleSessions.run(&service).await.unwrap(), 0);
    }
}
