use crate::core::state::AppState;
use crate::utils::time::current_timestamp;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub store_connected: bool,
    pub persistent: bool,
}

/// Health check handler. Reports "degraded" while the store is unreachable.
///
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_connected = state.service.is_connected();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: if store_connected { "ok" } else { "degraded" }.to_string(),
            timestamp: current_timestamp(),
            store_connected,
            persistent: state.service.is_persistent(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::create_test_state;

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(create_test_state())).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_response_has_timestamp() {
        use axum::body::Body;
        use http_body_util::BodyExt;

        let response = health_handler(State(create_test_state())).await.into_response();

        let (parts, body) = response.into_parts();
        assert_eq!(parts.status, StatusCode::OK);

        let body = Body::new(body);
        let bytes = body.collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(health.status, "ok");
        assert!(health.timestamp > 0);
        assert!(health.store_connected);
        assert!(!health.persistent);
    }
}
