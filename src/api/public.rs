//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::chat::ChatError;
use crate::search::SearchError;

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<ChatError>() {
            return match err {
                ChatError::EmptyMessage | ChatError::EmptyTitle => StatusCode::BAD_REQUEST,
                ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            };
        }
        if let Some(SearchError::NotConfigured) = self.0.downcast_ref::<SearchError>() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{:#}", self.0);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod travel {
    pub use crate::api::routes::travel::public::*;
}

pub mod web {
    pub use crate::api::routes::web::public::*;
}
