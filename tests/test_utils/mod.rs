//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};
use tempfile::TempDir;

use wayfarer::api::AppState;
use wayfarer::api::app;
use wayfarer::core::AppConfig;
use wayfarer::core::db::async_db;

/// A config pointing at `dir` with no model or search credentials so
/// every reply comes from the fallback templates and no network call
/// is made.
pub fn test_config(dir: &TempDir) -> AppConfig {
    let storage_path = dir.path().display().to_string();
    AppConfig {
        db_path: format!("{}/wayfarer.db", storage_path),
        storage_path,
        openai_api_hostname: String::from("http://127.0.0.1:1"),
        openai_api_key: None,
        openai_model: String::from("gpt-4o"),
        serpapi_api_hostname: String::from("http://127.0.0.1:1"),
        serpapi_api_key: None,
        search_location: String::from("United States"),
        request_timeout: Duration::from_secs(5),
    }
}

/// Creates a router backed by a fresh database built from `config`.
pub async fn test_app_with_config(config: AppConfig) -> Router {
    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    let app_state = AppState::new(db, config).expect("Failed to build app state");
    app(Arc::new(app_state))
}

/// Creates a test application router with a temporary database. The
/// directory is removed when the returned `TempDir` is dropped so keep
/// it alive for the duration of the test.
pub async fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let app = test_app_with_config(test_config(&dir)).await;
    (app, dir)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body was not utf8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body was not json")
}
