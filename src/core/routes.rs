// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Dashboard page
        .route("/", get(crate::handlers::dashboard::index_handler))

        // Monitoring endpoints
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))

        // Shared state mirrored from the store
        .route("/api/state", get(crate::handlers::dashboard::state_handler))
        .route("/api/logs", get(crate::handlers::logs::logs_handler))

        // Per-page-load lock sessions
        .route("/api/session", post(crate::handlers::session::create_session_handler))
        .route("/api/session/{id}", get(crate::handlers::session::session_handler))
        .route("/api/session/{id}/toggle", post(crate::handlers::lock::toggle_handler))
        .route("/api/session/{id}/rfid", post(crate::handlers::lock::submit_rfid_handler))

        // User management
        .route(
            "/api/users",
            get(crate::handlers::users::list_users_handler)
                .post(crate::handlers::users::add_user_handler),
        )
        .route("/api/users/{rfid}", delete(crate::handlers::users::delete_user_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::create_test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_dashboard_flow() {
        let router = build_router(create_test_state());

        let (status, session) = send(&router, post_json("/api/session", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["locked"], true);
        let id = session["session_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &router,
            post_json("/api/users", serde_json::json!({ "rfid": "1234", "name": "Alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &router,
            post_json(&format!("/api/session/{}/rfid", id), serde_json::json!({ "rfid": "1234" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locked"], false);

        let (status, state) = send(
            &router,
            Request::builder().uri("/api/state").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["users"][0]["name"], "Alice");
        assert_eq!(state["logs"][0]["message"], "Access Granted: RFID 1234 - Alice");

        let (status, _) = send(
            &router,
            Request::builder()
                .method("DELETE")
                .uri("/api/users/1234?confirm=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let router = build_router(create_test_state());
        let (status, body) = send(
            &router,
            post_json("/api/session/deadbeef/toggle", serde_json::json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_delete_without_confirmation() {
        let router = build_router(create_test_state());
        let (status, _) = send(
            &router,
            Request::builder()
                .method("DELETE")
                .uri("/api/users/1234")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    }

    #[tokio::test]
    async fn test_unmatched_route() {
        let router = build_router(create_test_state());
        let (status, _) = send(
            &router,
            Request::builder().uri("/nope").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
