//! Records persisted by the chat store.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::travel::{QueryType, SearchType, TravelQuery, TravelSearchResults};

pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

pub const WELCOME_MESSAGE: &str = "Hello! I'm your AI travel assistant. I can help you find hotels, flights, plan itineraries, and answer any travel questions you have. Where would you like to go or what can I help you with today?";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: Option<String>,
    pub title: String,
    // Set once the title has been generated or chosen by the user
    #[serde(skip)]
    pub titled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(flatten)]
    pub session: Session,
    pub message_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Author::User),
            "assistant" => Some(Author::Assistant),
            _ => None,
        }
    }
}

/// Travel data attached to an assistant message. `data` is only
/// present when a travel lookup actually ran.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelResults {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub query: TravelQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TravelSearchResults>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub author: Author,
    pub metadata: Option<TravelResults>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

#[derive(Clone, Debug)]
pub struct NewMessage {
    pub session_id: String,
    pub content: String,
    pub author: Author,
    pub metadata: Option<TravelResults>,
}

impl NewMessage {
    pub fn user(session_id: &str, content: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            content: content.to_string(),
            author: Author::User,
            metadata: None,
        }
    }

    pub fn assistant(session_id: &str, content: &str, metadata: Option<TravelResults>) -> Self {
        Self {
            session_id: session_id.to_string(),
            content: content.to_string(),
            author: Author::Assistant,
            metadata,
        }
    }
}

/// Audit record of a travel lookup. Written once, never updated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelSearch {
    pub id: String,
    pub session_id: String,
    pub search_type: SearchType,
    pub query: TravelQuery,
    pub results: Option<TravelSearchResults>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewTravelSearch {
    pub session_id: String,
    pub search_type: SearchType,
    pub query: TravelQuery,
    pub results: Option<TravelSearchResults>,
}
