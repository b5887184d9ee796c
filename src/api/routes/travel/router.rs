//! Router for the travel API

use axum::{Json, Router, extract::State, routing::post};

use super::public::{TravelQuery, TravelSearchResults};
use crate::api::state::SharedState;

/// Run a travel lookup without going through a chat session
async fn travel_search(
    State(state): State<SharedState>,
    Json(query): Json<TravelQuery>,
) -> Json<TravelSearchResults> {
    Json(state.chat.travel().search(&query).await)
}

/// Create the travel router
pub fn router() -> Router<SharedState> {
    Router::new().route("/search", post(travel_search))
}
