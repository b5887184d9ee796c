//! Public types for the web API
use serde::Deserialize;

use crate::search::{Device, SearchKind};
pub use crate::search::{SearchParameters, SearchResponse, SearchResult};

#[derive(Deserialize)]
pub struct WebSearchParams {
    pub query: String,
    pub limit: Option<usize>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: SearchKind,
    pub location: Option<String>,
    #[serde(default)]
    pub device: Device,
}

fn default_kind() -> SearchKind {
    SearchKind::Web
}
