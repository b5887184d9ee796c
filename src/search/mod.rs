//! Live search enrichment. A `SearchProvider` fetches normalized
//! results for one kind of search; this module bounds them, writes a
//! short summary, and fans out web/news/image searches for the chat
//! pipeline.
pub mod serpapi;

pub use serpapi::SerpApi;

use std::fmt;

use anyhow::{Error, Result};
use async_trait::async_trait;
use futures::future::{OptionFuture, try_join3};
use serde::{Deserialize, Serialize};

const DEFAULT_WEB_RESULTS: usize = 8;
const DEFAULT_NEWS_RESULTS: usize = 6;
const DEFAULT_IMAGE_RESULTS: usize = 6;

const ENRICH_WEB_RESULTS: usize = 6;
const ENRICH_NEWS_RESULTS: usize = 4;
const ENRICH_IMAGE_RESULTS: usize = 4;

const SUMMARY_SNIPPET_CHARS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Web,
    News,
    Images,
}

impl SearchKind {
    fn default_results(&self) -> usize {
        match self {
            SearchKind::Web => DEFAULT_WEB_RESULTS,
            SearchKind::News => DEFAULT_NEWS_RESULTS,
            SearchKind::Images => DEFAULT_IMAGE_RESULTS,
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            SearchKind::Web => "web",
            SearchKind::News => "news",
            SearchKind::Images => "images",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Device::Desktop => f.write_str("desktop"),
            Device::Mobile => f.write_str("mobile"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    pub location: Option<String>,
    pub num: Option<usize>,
    pub device: Device,
}

/// A single normalized search hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub position: usize,
    pub displayed_link: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub search_parameters: SearchParameters,
    pub results: Vec<SearchResult>,
    pub summary: String,
}

/// The combined output of an enrichment fan-out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub web_results: SearchResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_results: Option<SearchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_results: Option<SearchResponse>,
}

#[derive(Clone, Debug, Default)]
pub struct EnrichOptions {
    pub location: Option<String>,
    pub include_news: bool,
    pub include_images: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search is not configured")]
    NotConfigured,
    #[error("{kind} search failed: {message}")]
    Failed { kind: SearchKind, message: String },
}

/// A capability that can run one kind of search and return results in
/// provider order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn fetch(
        &self,
        kind: SearchKind,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, Error>;
}

const TRAVEL_KEYWORDS: &[&str] = &[
    "hotel", "flight", "travel", "vacation", "trip", "destination", "booking",
    "airline", "airport", "accommodation", "resort", "tour", "activity",
    "restaurant", "attraction", "visa", "passport", "currency", "weather",
    "visit", "explore", "journey", "adventure", "holiday", "tourism",
];

pub fn is_travel_query(query: &str) -> bool {
    let query = query.to_lowercase();
    TRAVEL_KEYWORDS.iter().any(|k| query.contains(k))
}

/// Summarize results as "Found N <kind> for "<query>". Key information: ...".
pub fn summarize(kind: SearchKind, query: &str, results: &[SearchResult]) -> String {
    if kind == SearchKind::Images {
        return format!(
            "Found {} images related to \"{}\". These images can help visualize and plan your travel experience.",
            results.len(),
            query
        );
    }

    if results.is_empty() {
        let label = if kind == SearchKind::News { "news" } else { "web" };
        return format!(
            "No {} results found for \"{}\". Try a different search term or check your spelling.",
            label, query
        );
    }

    let label = if kind == SearchKind::News {
        "news articles"
    } else {
        "search results"
    };
    let mut summary = format!("Found {} {} for \"{}\". ", results.len(), label, query);

    let snippets = results
        .iter()
        .take(3)
        .map(|r| r.snippet.as_str())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();
    if !snippets.is_empty() {
        let joined = snippets.join(" ");
        let key_info: String = joined.chars().take(SUMMARY_SNIPPET_CHARS).collect();
        let ellipsis = if joined.chars().count() >= SUMMARY_SNIPPET_CHARS {
            "..."
        } else {
            ""
        };
        summary.push_str(&format!("Key information: {}{}", key_info, ellipsis));
    }

    summary
}

/// Run one search, bound the result count and summarize it. Provider
/// failures come back labeled with the kind of search that failed.
pub async fn search(
    provider: &dyn SearchProvider,
    kind: SearchKind,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchResponse, SearchError> {
    let num = options.num.unwrap_or_else(|| kind.default_results());
    let options = SearchOptions {
        num: Some(num),
        ..options.clone()
    };

    let mut results = provider
        .fetch(kind, query, &options)
        .await
        .map_err(|e| SearchError::Failed {
            kind,
            message: e.to_string(),
        })?;
    results.truncate(num);

    tracing::debug!("{} search for '{}' returned {} results", kind, query, results.len());

    let summary = summarize(kind, query, &results);
    Ok(SearchResponse {
        search_parameters: SearchParameters {
            query: query.to_string(),
            kind,
            location: options.location.clone(),
        },
        results,
        summary,
    })
}

/// Run the web search plus the optional news and image searches
/// concurrently. Fails as a whole if any requested search fails.
pub async fn enrich(
    provider: &dyn SearchProvider,
    query: &str,
    options: &EnrichOptions,
) -> Result<Enrichment, SearchError> {
    let web_options = SearchOptions {
        location: options.location.clone(),
        num: Some(ENRICH_WEB_RESULTS),
        ..Default::default()
    };
    let news_options = SearchOptions {
        location: options.location.clone(),
        num: Some(ENRICH_NEWS_RESULTS),
        ..Default::default()
    };
    let image_options = SearchOptions {
        num: Some(ENRICH_IMAGE_RESULTS),
        ..Default::default()
    };

    let news_query = if is_travel_query(query) {
        format!("{} travel guide tips recommendations", query)
    } else {
        query.to_string()
    };

    let web = search(provider, SearchKind::Web, query, &web_options);
    let news: OptionFuture<_> = options
        .include_news
        .then(|| search(provider, SearchKind::News, &news_query, &news_options))
        .into();
    let images: OptionFuture<_> = options
        .include_images
        .then(|| search(provider, SearchKind::Images, query, &image_options))
        .into();

    let (web_results, news_results, image_results) = try_join3(
        web,
        async { news.await.transpose() },
        async { images.await.transpose() },
    )
    .await
    .inspect_err(|e| tracing::warn!("Enrichment failed: {}", e))?;

    Ok(Enrichment {
        web_results,
        news_results,
        image_results,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider returning canned results and recording each call.
    pub(crate) struct StubProvider {
        pub results: Vec<SearchResult>,
        pub fail_on: Option<SearchKind>,
        pub calls: Mutex<Vec<(SearchKind, String, Option<usize>)>>,
    }

    impl StubProvider {
        pub(crate) fn new(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                fail_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing_on(kind: SearchKind) -> Self {
            Self {
                fail_on: Some(kind),
                ..Self::new(vec![result(1, "snippet")])
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn fetch(
            &self,
            kind: SearchKind,
            query: &str,
            options: &SearchOptions,
        ) -> Result<Vec<SearchResult>, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((kind, query.to_string(), options.num));
            if self.fail_on == Some(kind) {
                anyhow::bail!("provider unavailable");
            }
            Ok(self.results.clone())
        }
    }

    pub(crate) fn result(position: usize, snippet: &str) -> SearchResult {
        SearchResult {
            title: format!("Result {}", position),
            link: format!("https://example.com/{}", position),
            snippet: snippet.to_string(),
            position,
            displayed_link: "example.com".to_string(),
        }
    }

    #[test]
    fn test_summary_truncates_key_information() {
        let long = "x".repeat(150);
        let results = vec![result(1, &long), result(2, &long), result(3, "ignored?")];
        let summary = summarize(SearchKind::Web, "kyoto", &results);

        assert!(summary.starts_with("Found 3 search results for \"kyoto\". Key information: "));
        assert!(summary.ends_with("..."));
        let key_info = summary
            .split("Key information: ")
            .nth(1)
            .unwrap()
            .trim_end_matches("...");
        assert_eq!(key_info.chars().count(), SUMMARY_SNIPPET_CHARS);
    }

    #[test]
    fn test_summary_for_empty_and_image_results() {
        assert_eq!(
            summarize(SearchKind::News, "bali", &[]),
            "No news results found for \"bali\". Try a different search term or check your spelling."
        );
        assert!(summarize(SearchKind::Images, "bali", &[result(1, "")])
            .starts_with("Found 1 images related to \"bali\""));
        assert_eq!(
            summarize(SearchKind::Web, "bali", &[result(1, "")]),
            "Found 1 search results for \"bali\". "
        );
    }

    #[tokio::test]
    async fn test_search_bounds_results() {
        let provider = StubProvider::new((1..=10).map(|i| result(i, "s")).collect());
        let resp = search(&provider, SearchKind::Web, "rome", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.results.len(), DEFAULT_WEB_RESULTS);
        assert_eq!(resp.search_parameters.kind, SearchKind::Web);
        assert_eq!(provider.calls.lock().unwrap()[0].2, Some(DEFAULT_WEB_RESULTS));
    }

    #[tokio::test]
    async fn test_enrich_runs_requested_searches() {
        let provider = StubProvider::new(vec![result(1, "Great food")]);
        let enrichment = enrich(
            &provider,
            "best hotel in lisbon",
            &EnrichOptions {
                include_news: true,
                include_images: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(enrichment.news_results.is_some());
        assert!(enrichment.image_results.is_none());

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        let news = calls.iter().find(|c| c.0 == SearchKind::News).unwrap();
        assert_eq!(news.1, "best hotel in lisbon travel guide tips recommendations");
        assert_eq!(news.2, Some(ENRICH_NEWS_RESULTS));
    }

    #[tokio::test]
    async fn test_enrich_fails_if_any_search_fails() {
        let provider = StubProvider::failing_on(SearchKind::Images);
        let err = enrich(
            &provider,
            "show me photos of santorini",
            &EnrichOptions {
                include_news: true,
                include_images: true,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Failed {
                kind: SearchKind::Images,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "images search failed: provider unavailable"
        );
    }
}
