use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Access log, newest first
///
/// GET /api/logs
pub async fn logs_handler(State(state): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(state.service.log_feed())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::create_test_state;
    use crate::models::log_entry::LogEntry;
    use axum::body::Body;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_logs_newest_first() {
        let state = create_test_state();
        let session = state.sessions.create();
        state.service.toggle_lock(&session).await;
        state.service.toggle_lock(&session).await;

        let response = logs_handler(State(state)).await;
        let bytes = Body::new(response.into_body()).collect().await.unwrap().to_bytes();
        let logs: Vec<LogEntry> = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "Lock Engaged");
        assert_eq!(logs[1].message, "Lock Disengaged");
        assert!(logs[0].timestamp > logs[1].timestamp);
    }
}
