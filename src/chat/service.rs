//! The send-message flow: persist the user's message, run the
//! assistant, attach travel results, persist the reply and give the
//! session a title after its first exchange.
use std::sync::Arc;

use anyhow::{Error, Result};

use super::db::ChatStore;
use super::error::ChatError;
use super::models::{
    DEFAULT_SESSION_TITLE, Message, NewMessage, NewTravelSearch, Session, SessionSummary,
    TravelResults, TravelSearch, WELCOME_MESSAGE,
};
use crate::ai::{Assistant, AssistantResponse};
use crate::travel::TravelService;

#[derive(Clone, Debug)]
pub struct SendMessageResult {
    pub user_message: Message,
    pub assistant_message: Message,
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    assistant: Assistant,
    travel: TravelService,
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>, assistant: Assistant, travel: TravelService) -> Self {
        Self {
            store,
            assistant,
            travel,
        }
    }

    pub fn store(&self) -> &dyn ChatStore {
        self.store.as_ref()
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn travel(&self) -> &TravelService {
        &self.travel
    }

    /// Create a session that opens with the assistant's welcome.
    pub async fn create_session(
        &self,
        title: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Session, Error> {
        let title = title.unwrap_or(DEFAULT_SESSION_TITLE);
        let session = self.store.create_session(title, user_id).await?;
        let welcome = self
            .store
            .append_message(NewMessage::assistant(&session.id, WELCOME_MESSAGE, None))
            .await?;
        tracing::debug!("Created session {}", session.id);

        Ok(Session {
            updated_at: welcome.created_at,
            ..session
        })
    }

    pub async fn get_session(&self, id: &str) -> Result<Session, Error> {
        self.store
            .get_session(id)
            .await?
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()).into())
    }

    pub async fn list_sessions(&self, user_id: Option<&str>) -> Result<Vec<SessionSummary>, Error> {
        self.store.list_sessions_for_user(user_id).await
    }

    pub async fn rename_session(&self, id: &str, title: &str) -> Result<Session, Error> {
        self.store
            .rename_session(id, title)
            .await?
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()).into())
    }

    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, Error> {
        self.get_session(session_id).await?;
        self.store.list_messages(session_id).await
    }

    pub async fn list_travel_searches(&self, session_id: &str) -> Result<Vec<TravelSearch>, Error> {
        self.get_session(session_id).await?;
        self.store.list_travel_searches(session_id).await
    }

    /// Run one full exchange. Validation happens before anything is
    /// written. Provider failures degrade inside the assistant so the
    /// caller always gets a reply.
    pub async fn send_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<SendMessageResult, Error> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage.into());
        }
        let session = self.get_session(session_id).await?;

        // History is read before the new message is stored so it only
        // holds prior turns
        let history = self.store.list_messages(session_id).await?;
        let user_message = self
            .store
            .append_message(NewMessage::user(session_id, content))
            .await?;

        let response = self.assistant.respond(content, &history).await;
        let metadata = self.travel_results(session_id, &response).await;

        let assistant_message = self
            .store
            .append_message(NewMessage::assistant(
                session_id,
                &response.message,
                metadata,
            ))
            .await?;

        let is_first_exchange = !history.iter().any(Message::is_user);
        if is_first_exchange && !session.titled {
            if let Err(e) = self.update_title(session_id, content).await {
                tracing::error!("Failed to title session {}: {}", session_id, e);
            }
        }

        Ok(SendMessageResult {
            user_message,
            assistant_message,
        })
    }

    /// Build the metadata for the reply, running the travel lookup and
    /// recording it when the message asked for one.
    async fn travel_results(
        &self,
        session_id: &str,
        response: &AssistantResponse,
    ) -> Option<TravelResults> {
        let query = response.travel_query.clone()?;
        if !response.should_search_travel {
            return Some(TravelResults {
                query_type: query.query_type,
                query,
                data: None,
            });
        }

        let data = self.travel.search(&query).await;
        if let Some(search_type) = query.query_type.search_type() {
            let audit = NewTravelSearch {
                session_id: session_id.to_string(),
                search_type,
                query: query.clone(),
                results: Some(data.clone()),
            };
            if let Err(e) = self.store.record_travel_search(audit).await {
                tracing::error!("Failed to record travel search for {}: {}", session_id, e);
            }
        }

        Some(TravelResults {
            query_type: query.query_type,
            query,
            data: Some(data),
        })
    }

    /// Generate and store a title unless the session already has one.
    /// Concurrent first messages race on the claim so only one of them
    /// asks for a title. Returns whether this call titled the session.
    pub async fn update_title(&self, session_id: &str, first_message: &str) -> Result<bool, Error> {
        if !self.store.claim_title(session_id).await? {
            return Ok(false);
        }

        let title = self.assistant.title(first_message).await;
        match self.store.rename_session(session_id, &title).await {
            Ok(_) => tracing::debug!("Titled session {} '{}'", session_id, title),
            Err(e) => tracing::error!("Failed to title session {}: {}", session_id, e),
        }
        Ok(true)
    }
}
