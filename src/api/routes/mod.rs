//! API routes module

pub mod chat;
pub mod travel;
pub mod web;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat sessions and messages
        .nest("/chat", chat::router())
        // Direct travel lookups
        .nest("/travel", travel::router())
        // Web search routes
        .nest("/web", web::router())
}
