//! Router for the web API

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::search::{self, SearchError, SearchOptions, SearchResponse};

async fn web_search(
    State(state): State<SharedState>,
    Query(params): Query<public::WebSearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let provider = state
        .chat
        .assistant()
        .search_provider()
        .ok_or(SearchError::NotConfigured)?;

    let options = SearchOptions {
        location: params.location,
        num: params.limit,
        device: params.device,
    };
    let resp = search::search(provider, params.kind, &params.query, &options).await?;
    Ok(Json(resp))
}

/// Create the web router
pub fn router() -> Router<SharedState> {
    Router::new().route("/search", axum::routing::get(web_search))
}
