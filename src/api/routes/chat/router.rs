//! Router for the chat API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::chat::{Session, SessionSummary, TravelSearch};

/// Create a session seeded with the welcome message
async fn create_session(
    State(state): State<SharedState>,
    payload: Option<Json<public::CreateSessionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    let session = state
        .chat
        .create_session(payload.title.as_deref(), payload.user_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// List sessions, most recently updated first
async fn list_sessions(
    State(state): State<SharedState>,
    Query(params): Query<public::SessionsQuery>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state.chat.list_sessions(params.user_id.as_deref()).await?;
    Ok(Json(sessions))
}

async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.chat.get_session(&id).await?))
}

async fn rename_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::RenameSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.chat.rename_session(&id, &payload.title).await?))
}

async fn list_messages(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<public::MessageResponse>>, ApiError> {
    let messages = state.chat.list_messages(&id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Send a message and get the assistant's reply
async fn send_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::SendMessageRequest>,
) -> Result<Json<public::SendMessageResponse>, ApiError> {
    let result = state.chat.send_message(&id, &payload.content).await?;
    Ok(Json(result.into()))
}

async fn list_travel_searches(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TravelSearch>>, ApiError> {
    Ok(Json(state.chat.list_travel_searches(&id).await?))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{id}", get(get_session).patch(rename_session))
        .route(
            "/sessions/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/sessions/{id}/searches", get(list_travel_searches))
}
