//! The response generator. Turns a user message plus recent history
//! into the assistant's reply, a decision on whether to run a travel
//! lookup, and any live search context used along the way.
use std::sync::Arc;

use anyhow::{Error, Result};
use serde::Serialize;

use super::intent::{self, contains_any};
use super::strategy::{FallbackStrategy, GenerativeStrategy, Reply, ResponseStrategy, Turn};
use super::title::generate_title;
use crate::chat::Message as ChatMessage;
use crate::core::AppConfig;
use crate::openai::{LanguageModel, OpenAiModel};
use crate::search::{self, EnrichOptions, Enrichment, SearchProvider, SerpApi};
use crate::travel::{QueryType, TravelQuery};

const MAX_RESOURCE_LINKS: usize = 3;
const RESOURCE_SNIPPET_CHARS: usize = 120;

const NEWS_KEYWORDS: &[&str] = &["news", "latest", "recent", "current", "update", "happening"];
const IMAGE_KEYWORDS: &[&str] = &["photo", "picture", "image", "show me", "look like"];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub message: String,
    pub should_search_travel: bool,
    pub travel_query: Option<TravelQuery>,
    pub search_results: Option<Enrichment>,
}

#[derive(Clone, Default)]
pub struct Assistant {
    model: Option<Arc<dyn LanguageModel>>,
    search: Option<Arc<dyn SearchProvider>>,
    search_location: Option<String>,
}

impl Assistant {
    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        Self {
            model,
            search,
            search_location: None,
        }
    }

    /// Wire up the OpenAI model and SerpAPI search when their keys are
    /// set. Missing keys leave the capability off.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let model = config.openai_api_key.as_ref().map(|key| {
            Arc::new(OpenAiModel::new(
                &config.openai_api_hostname,
                key,
                &config.openai_model,
                config.request_timeout,
            )) as Arc<dyn LanguageModel>
        });
        let search = match &config.serpapi_api_key {
            Some(key) => Some(Arc::new(SerpApi::new(
                &config.serpapi_api_hostname,
                key,
                &config.search_location,
                config.request_timeout,
            )?) as Arc<dyn SearchProvider>),
            None => None,
        };

        tracing::info!(
            "Assistant configured (model: {}, search: {})",
            model.is_some(),
            search.is_some()
        );

        Ok(Self {
            model,
            search,
            search_location: Some(config.search_location.clone()),
        })
    }

    pub fn model(&self) -> Option<&dyn LanguageModel> {
        self.model.as_deref()
    }

    pub fn search_provider(&self) -> Option<&dyn SearchProvider> {
        self.search.as_deref()
    }

    // Chosen once per call so a reply never mixes strategies
    fn strategy(&self) -> Box<dyn ResponseStrategy + '_> {
        match &self.model {
            Some(model) => Box::new(GenerativeStrategy::new(Arc::clone(model))),
            None => Box::new(FallbackStrategy),
        }
    }

    async fn enrichment(&self, message: &str) -> Option<Enrichment> {
        let provider = self.search.as_deref()?;
        let text = message.to_lowercase();
        let options = EnrichOptions {
            location: self.search_location.clone(),
            include_news: contains_any(&text, NEWS_KEYWORDS),
            include_images: contains_any(&text, IMAGE_KEYWORDS),
        };
        // Best effort, a failed search never fails the reply
        search::enrich(provider, message, &options).await.ok()
    }

    /// Generate the reply to `message`. `history` holds the session's
    /// messages before this one, oldest first.
    pub async fn respond(&self, message: &str, history: &[ChatMessage]) -> AssistantResponse {
        let search_results = self.enrichment(message).await;

        let Reply {
            message: mut reply,
            travel_query: suggested,
        } = self
            .strategy()
            .reply(&Turn {
                message,
                history,
                enrichment: search_results.as_ref(),
            })
            .await;

        if let Some(enrichment) = &search_results {
            reply.push_str(&resources_section(enrichment));
        }

        let should_search_travel = intent::wants_travel_search(message);
        let travel_query = if should_search_travel {
            Some(merge_query(intent::infer_travel_query(message), suggested))
        } else {
            suggested
        };

        AssistantResponse {
            message: reply,
            should_search_travel,
            travel_query,
            search_results,
        }
    }

    /// A short title for a session that starts with `first_message`.
    pub async fn title(&self, first_message: &str) -> String {
        generate_title(self.model(), first_message).await
    }
}

// Rule based extraction wins, the suggested query fills the gaps
fn merge_query(extracted: TravelQuery, suggested: Option<TravelQuery>) -> TravelQuery {
    let Some(suggested) = suggested else {
        return extracted;
    };
    let query_type = match extracted.query_type {
        QueryType::Mixed => suggested.query_type,
        query_type => query_type,
    };
    TravelQuery {
        query_type,
        ..extracted.or(suggested)
    }
}

fn truncate_snippet(snippet: &str) -> String {
    if snippet.chars().count() <= RESOURCE_SNIPPET_CHARS {
        return snippet.to_string();
    }
    let head: String = snippet.chars().take(RESOURCE_SNIPPET_CHARS - 3).collect();
    format!("{}...", head.trim_end())
}

/// Markdown list of the top web results, empty when there are none.
pub fn resources_section(enrichment: &Enrichment) -> String {
    let results = &enrichment.web_results.results;
    if results.is_empty() {
        return String::new();
    }

    let mut section = String::from("\n\n**📚 Additional Resources:**\n");
    for (idx, result) in results.iter().take(MAX_RESOURCE_LINKS).enumerate() {
        section.push_str(&format!("\n{}. **[{}]({})**", idx + 1, result.title, result.link));
        if !result.snippet.is_empty() {
            section.push_str(&format!("\n   {}", truncate_snippet(&result.snippet)));
        }
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback::fallback_reply;
    use crate::ai::strategy::tests::StubModel;
    use crate::search::SearchKind;
    use crate::search::tests::{StubProvider, result};

    #[tokio::test]
    async fn test_fallback_reply_without_model_or_search() {
        let assistant = Assistant::default();
        let response = assistant
            .respond("Find hotels in Tokyo for 2 adults", &[])
            .await;

        assert_eq!(
            response.message,
            fallback_reply("Find hotels in Tokyo for 2 adults").message
        );
        assert!(response.should_search_travel);
        assert!(response.search_results.is_none());
        let query = response.travel_query.unwrap();
        assert_eq!(query.query_type, QueryType::Hotels);
        assert_eq!(query.destination.as_deref(), Some("Tokyo"));
        assert_eq!(query.guests.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_no_travel_search_for_general_questions() {
        let response = Assistant::default().respond("Tell me about Kyoto", &[]).await;
        assert!(!response.should_search_travel);
        assert!(response.message.starts_with("Kyoto is an amazing destination!"));
        // Kept as context for the reply, no lookup runs
        let query = response.travel_query.unwrap();
        assert_eq!(query.query_type, QueryType::Mixed);
        assert_eq!(query.destination.as_deref(), Some("Kyoto"));
    }

    #[tokio::test]
    async fn test_appends_resources_from_enrichment() {
        let long = "y".repeat(200);
        let provider = Arc::new(StubProvider::new(vec![
            result(1, "Short"),
            result(2, &long),
            result(3, ""),
            result(4, "Not shown"),
        ]));
        let assistant = Assistant::new(None, Some(provider.clone()));
        let response = assistant.respond("What's the latest in Lisbon?", &[]).await;

        let enrichment = response.search_results.unwrap();
        assert!(enrichment.news_results.is_some());
        assert!(enrichment.image_results.is_none());

        assert!(response.message.contains("**📚 Additional Resources:**"));
        assert!(response.message.contains("1. **[Result 1](https://example.com/1)**\n   Short"));
        assert!(response.message.contains(&format!("   {}...", "y".repeat(117))));
        assert!(response.message.contains("3. **[Result 3](https://example.com/3)**"));
        assert!(!response.message.contains("Result 4"));
    }

    #[tokio::test]
    async fn test_search_failure_is_ignored() {
        let provider = Arc::new(StubProvider::failing_on(SearchKind::Web));
        let assistant = Assistant::new(None, Some(provider));
        let response = assistant.respond("hello", &[]).await;

        assert!(response.search_results.is_none());
        assert!(!response.message.contains("Additional Resources"));
        assert!(!response.message.is_empty());
    }

    #[tokio::test]
    async fn test_extracted_query_wins_over_model_query() {
        let model = Arc::new(StubModel::replying(
            r#"{"message": "Let me look", "travelQuery": {"type": "flights", "destination": "Paris", "budget": "cheap"}}"#,
        ));
        let assistant = Assistant::new(Some(model), None);
        let response = assistant.respond("Book something in Rome", &[]).await;

        assert_eq!(response.message, "Let me look");
        assert!(response.should_search_travel);
        let query = response.travel_query.unwrap();
        // Mixed from the rules so the model's type is used
        assert_eq!(query.query_type, QueryType::Flights);
        assert_eq!(query.destination.as_deref(), Some("Rome"));
        assert_eq!(query.budget.as_deref(), Some("cheap"));
    }

    #[tokio::test]
    async fn test_model_query_kept_without_booking_intent() {
        let model = Arc::new(StubModel::replying(
            r#"{"message": "Kyoto is lovely", "travelQuery": {"type": "activities", "destination": "Kyoto"}}"#,
        ));
        let assistant = Assistant::new(Some(model), None);
        let response = assistant.respond("Is Kyoto nice in spring?", &[]).await;

        assert!(!response.should_search_travel);
        assert_eq!(
            response.travel_query.unwrap().query_type,
            QueryType::Activities
        );
    }

    #[tokio::test]
    async fn test_title_uses_model_when_present() {
        let assistant = Assistant::new(Some(Arc::new(StubModel::replying("Rome Getaway"))), None);
        assert_eq!(assistant.title("Flights to Rome").await, "Rome Getaway");
        assert_eq!(Assistant::default().title("Flights to Rome").await, "Trip to Rome");
    }
}
