pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod router;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::state::testing::test_state;

    const KEY: &str = "test-key";

    async fn test_app() -> (Router, tempfile::TempDir) {
        let (state, dir) = test_state(vec![KEY.to_string()]).await;
        (create_router(state), dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn authed(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {KEY}"));
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn protected_route_requires_auth() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"oi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "unauthorized");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["database"]["status"], "ok");
        assert_eq!(json["data"]["llm"]["status"], "unavailable");
        assert_eq!(json["data"]["llm"]["analysis"], "heuristic");
        assert_eq!(json["data"]["rpc"]["status"], "unavailable");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn openapi_json_is_public_and_lists_chat() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(version.starts_with('3'), "got: {version}");
        assert!(json["paths"].get("/api/v1/chat/turns").is_some());
        assert!(json["paths"].get("/api/v1/secret-santa:draw").is_some());
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_request() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/chat/turns")
                    .header("Authorization", format!("Bearer {KEY}"))
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn churrasco_estimate_lists_items() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(authed(
                "POST",
                "/api/v1/estimates/churrasco",
                Some(json!({ "headcount": 10 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["headcount"], 10);
        assert!(!json["data"]["items"].as_array().unwrap().is_empty());
        assert!(json["data"]["totalEstimatedValue"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn churrasco_estimate_rejects_zero_headcount() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(authed(
                "POST",
                "/api/v1/estimates/churrasco",
                Some(json!({ "headcount": 0 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("headcount"));
    }

    #[tokio::test]
    async fn seeded_draw_is_reproducible() {
        let (app, _dir) = test_app().await;
        let body = json!({ "participants": ["ana", "bia", "caio", "duda"], "seed": 42 });

        let first = body_json(
            app.clone()
                .oneshot(authed("POST", "/api/v1/secret-santa:draw", Some(body.clone())))
                .await
                .unwrap(),
        )
        .await;
        let second = body_json(
            app.oneshot(authed("POST", "/api/v1/secret-santa:draw", Some(body)))
                .await
                .unwrap(),
        )
        .await;

        let pairs = first["data"]["pairs"].as_array().unwrap();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.iter().all(|p| p["giverId"] != p["receiverId"]));
        assert_eq!(first["data"], second["data"]);
    }

    #[tokio::test]
    async fn draw_with_duplicates_is_invalid_request() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(authed(
                "POST",
                "/api/v1/secret-santa:draw",
                Some(json!({ "participants": ["ana", "ana", "bia"] })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn date_validation_flags_past_dates() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(authed(
                "POST",
                "/api/v1/dates:validate",
                Some(json!({ "text": "10/03/2025", "today": "2025-06-01" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["valid"], false);
        assert_eq!(json["data"]["warning"], "past");
        assert_eq!(json["data"]["suggestedDate"], "2026-03-10");
    }

    #[tokio::test]
    async fn chat_turn_persists_history_until_cleared() {
        let (app, _dir) = test_app().await;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/v1/chat/turns",
                Some(json!({ "userId": "u1", "message": "Churrasco para 20 pessoas sábado às 14h" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["intent"], "criar_evento");
        assert_eq!(json["data"]["context"]["collectedData"]["headcount"], 20);
        assert!(!json["data"]["reply"].as_str().unwrap().is_empty());

        let history = body_json(
            app.clone()
                .oneshot(authed("GET", "/api/v1/chat/u1/messages", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(history["meta"]["total"], 2);
        assert_eq!(history["data"][0]["role"], "user");
        assert_eq!(history["data"][1]["role"], "assistant");

        let cleared = app
            .clone()
            .oneshot(authed("DELETE", "/api/v1/chat/u1/context", None))
            .await
            .unwrap();
        assert_eq!(cleared.status(), StatusCode::OK);

        let history = body_json(
            app.oneshot(authed("GET", "/api/v1/chat/u1/messages", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(history["meta"]["total"], 0);
    }

    #[tokio::test]
    async fn feedback_is_created() {
        let (app, _dir) = test_app().await;

        let response = app
            .oneshot(authed(
                "POST",
                "/api/v1/feedback",
                Some(json!({ "userId": "u1", "feedbackType": "thumbs_up", "rating": 5 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["feedbackType"], "thumbs_up");
    }
}
