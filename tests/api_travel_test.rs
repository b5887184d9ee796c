//! Integration tests for the travel API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_json, test_app};

    fn search(body: Value) -> Request<Body> {
        Request::builder()
            .uri("/api/travel/search")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Tests each query type fills only its own list
    #[tokio::test]
    #[serial]
    async fn it_returns_list_for_query_type() {
        let (app, _dir) = test_app().await;

        let cases = [
            ("hotels", json!({"hotels": []})),
            ("flights", json!({"flights": []})),
            ("activities", json!({"activities": []})),
            ("mixed", json!({})),
        ];
        for (query_type, expected) in cases {
            let response = app
                .clone()
                .oneshot(search(json!({"type": query_type, "destination": "Bali"})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_to_json(response.into_body()).await, expected);
        }
    }

    /// Tests an unknown query type is rejected by the extractor
    #[tokio::test]
    #[serial]
    async fn it_rejects_unknown_query_type() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(search(json!({"type": "cruises"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
