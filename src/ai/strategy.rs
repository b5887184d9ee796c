use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::fallback::fallback_reply;
use super::prompt::{Prompt, render};
use crate::chat::{Author, Message as ChatMessage};
use crate::openai::{CompletionRequest, LanguageModel, Message, Role};
use crate::search::Enrichment;
use crate::travel::TravelQuery;

/// Prior messages passed to the model as context.
pub const HISTORY_WINDOW: usize = 6;

const CONTEXT_SNIPPETS: usize = 3;

/// The text of a reply and the travel query it suggests, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub message: String,
    pub travel_query: Option<TravelQuery>,
}

/// Everything a strategy may use to answer one user message.
pub struct Turn<'a> {
    pub message: &'a str,
    pub history: &'a [ChatMessage],
    pub enrichment: Option<&'a Enrichment>,
}

/// Produces the assistant's reply for a turn. Implementations must
/// always return a non-empty message.
#[async_trait]
pub trait ResponseStrategy: Send + Sync {
    async fn reply(&self, turn: &Turn<'_>) -> Reply;
}

/// Keyword routed canned replies.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackStrategy;

#[async_trait]
impl ResponseStrategy for FallbackStrategy {
    async fn reply(&self, turn: &Turn<'_>) -> Reply {
        fallback_reply(turn.message)
    }
}

/// Replies from a language model, degrading to `FallbackStrategy`
/// when the call fails or comes back empty.
pub struct GenerativeStrategy {
    model: Arc<dyn LanguageModel>,
}

impl GenerativeStrategy {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ResponseStrategy for GenerativeStrategy {
    async fn reply(&self, turn: &Turn<'_>) -> Reply {
        let request = match completion_request(turn) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("Failed to build completion request: {}", e);
                return fallback_reply(turn.message);
            }
        };

        match self.model.complete(&request).await {
            Ok(content) => parse_model_reply(&content).unwrap_or_else(|| {
                tracing::warn!("Model returned an empty reply, using fallback");
                fallback_reply(turn.message)
            }),
            Err(e) => {
                tracing::warn!("Model request failed, using fallback: {}", e);
                fallback_reply(turn.message)
            }
        }
    }
}

fn system_prompt(enrichment: Option<&Enrichment>) -> anyhow::Result<String> {
    let data = match enrichment {
        Some(enrichment) => {
            let snippets: Vec<Value> = enrichment
                .web_results
                .results
                .iter()
                .take(CONTEXT_SNIPPETS)
                .map(|r| json!({"title": r.title, "link": r.link, "snippet": r.snippet}))
                .collect();
            json!({
                "has_context": true,
                "summary": enrichment.web_results.summary,
                "snippets": snippets,
            })
        }
        None => json!({"has_context": false, "summary": "", "snippets": []}),
    };
    render(Prompt::TravelAssistant, &data)
}

/// Map stored messages to model messages, keeping the most recent
/// `HISTORY_WINDOW`. Roles follow each message's author, not its
/// position in the window. Sessions open with the assistant's welcome
/// and a failed send can leave two user messages in a row, so
/// alternating by position would mislabel turns.
pub fn history_messages(history: &[ChatMessage]) -> Vec<Message> {
    let skip = history.len().saturating_sub(HISTORY_WINDOW);
    history
        .iter()
        .skip(skip)
        .map(|m| {
            let role = match m.author {
                Author::User => Role::User,
                Author::Assistant => Role::Assistant,
            };
            Message::new(role, &m.content)
        })
        .collect()
}

fn completion_request(turn: &Turn<'_>) -> anyhow::Result<CompletionRequest> {
    let mut messages = vec![Message::new(Role::System, &system_prompt(turn.enrichment)?)];
    messages.extend(history_messages(turn.history));
    messages.push(Message::new(Role::User, turn.message));

    Ok(CompletionRequest::new(messages)
        .temperature(0.7)
        .max_tokens(1000)
        .json_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    message: String,
    #[serde(default)]
    travel_query: Option<Value>,
}

fn strip_code_fence(content: &str) -> &str {
    content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(content)
}

/// Parse the model output. JSON replies yield a message plus an
/// optional query; anything else is taken as the message itself.
/// Returns `None` when there is no usable text.
pub fn parse_model_reply(content: &str) -> Option<Reply> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    match serde_json::from_str::<ModelReply>(strip_code_fence(content)) {
        Ok(reply) => {
            let message = reply.message.trim();
            if message.is_empty() {
                return None;
            }
            // A malformed query is dropped rather than failing the reply
            let travel_query = reply
                .travel_query
                .filter(|v| !v.is_null())
                .and_then(|v| serde_json::from_value(v).ok());
            Some(Reply {
                message: message.to_string(),
                travel_query,
            })
        }
        Err(_) => Some(Reply {
            message: content.to_string(),
            travel_query: None,
        }),
    }
}
