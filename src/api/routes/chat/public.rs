//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::{Message, SendMessageResult, TravelResults};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub title: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsQuery {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct RenameSessionRequest {
    pub title: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    // Missing content is rejected the same way as empty content
    #[serde(default)]
    pub content: String,
}

/// A message as the client renders it, with any travel payload
/// lifted out of the metadata.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(flatten)]
    pub message: Message,
    pub travel_results: Option<TravelResults>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            travel_results: message.metadata.clone(),
            message,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: MessageResponse,
    pub assistant_message: MessageResponse,
}

impl From<SendMessageResult> for SendMessageResponse {
    fn from(result: SendMessageResult) -> Self {
        Self {
            user_message: result.user_message.into(),
            assistant_message: result.assistant_message.into(),
        }
    }
}
