//! SerpAPI implementation of `SearchProvider`.
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;

use super::{SearchKind, SearchOptions, SearchProvider, SearchResult};

#[derive(Clone, Debug)]
pub struct SerpApi {
    api_hostname: String,
    api_key: String,
    default_location: String,
    client: reqwest::Client,
}

impl SerpApi {
    pub fn new(
        api_hostname: &str,
        api_key: &str,
        default_location: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_hostname: api_hostname.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            default_location: default_location.to_string(),
            client,
        })
    }

    fn query_params(
        &self,
        kind: SearchKind,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<(&'static str, String)> {
        let num = options.num.unwrap_or(8).to_string();
        let location = options
            .location
            .clone()
            .unwrap_or_else(|| self.default_location.clone());
        let mut params = vec![
            ("q", query.to_string()),
            ("api_key", self.api_key.clone()),
            ("num", num),
        ];
        match kind {
            SearchKind::Web => params.extend([
                ("engine", "google".to_string()),
                ("location", location),
                ("google_domain", "google.com".to_string()),
                ("gl", "us".to_string()),
                ("hl", "en".to_string()),
                ("device", options.device.to_string()),
            ]),
            SearchKind::News => params.extend([
                ("engine", "google_news".to_string()),
                ("location", location),
                ("gl", "us".to_string()),
                ("hl", "en".to_string()),
            ]),
            SearchKind::Images => params.push(("engine", "google_images".to_string())),
        }
        params
    }
}

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item[key].as_str().filter(|s| !s.is_empty())
}

// News sources come back either as a plain string or as an object
// with a `name`
fn source_name(item: &Value) -> Option<&str> {
    item["source"]
        .as_str()
        .or_else(|| item["source"]["name"].as_str())
        .filter(|s| !s.is_empty())
}

/// Map a raw SerpAPI response into normalized results.
pub fn parse_results(kind: SearchKind, body: &Value) -> Vec<SearchResult> {
    let key = match kind {
        SearchKind::Web => "organic_results",
        SearchKind::News => "news_results",
        SearchKind::Images => "images_results",
    };
    let Some(items) = body[key].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let title = str_field(item, "title").unwrap_or_default().to_string();
            match kind {
                SearchKind::Web => {
                    let link = str_field(item, "link").unwrap_or_default().to_string();
                    SearchResult {
                        title,
                        snippet: str_field(item, "snippet").unwrap_or_default().to_string(),
                        position: item["position"].as_u64().map_or(idx + 1, |p| p as usize),
                        displayed_link: str_field(item, "displayed_link")
                            .map(String::from)
                            .unwrap_or_else(|| link.clone()),
                        link,
                    }
                }
                SearchKind::News => {
                    let link = str_field(item, "link").unwrap_or_default().to_string();
                    SearchResult {
                        title,
                        snippet: str_field(item, "snippet").unwrap_or_default().to_string(),
                        position: idx + 1,
                        displayed_link: source_name(item)
                            .map(String::from)
                            .unwrap_or_else(|| link.clone()),
                        link,
                    }
                }
                SearchKind::Images => {
                    let source = source_name(item).unwrap_or_default().to_string();
                    SearchResult {
                        title,
                        link: str_field(item, "original")
                            .or_else(|| str_field(item, "link"))
                            .unwrap_or_default()
                            .to_string(),
                        snippet: source.clone(),
                        position: idx + 1,
                        displayed_link: source,
                    }
                }
            }
        })
        .collect()
}

#[async_trait]
impl SearchProvider for SerpApi {
    async fn fetch(
        &self,
        kind: SearchKind,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, Error> {
        let url = format!("{}/search.json", self.api_hostname);
        let params = self.query_params(kind, query, options);

        let body: Value = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = body["error"].as_str() {
            return Err(anyhow!("SerpAPI error: {}", err));
        }

        Ok(parse_results(kind, &body))
    }
}
