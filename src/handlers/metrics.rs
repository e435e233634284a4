// Metrics endpoint

use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Returns JSON with dashboard statistics including:
/// - Lock toggles, granted/denied access counts, grant rate
/// - Re-locks fired, users added/deleted, store errors
/// - Active sessions, authorized users, log entries, uptime
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.metrics.get_snapshot(
        state.sessions.len(),
        state.service.users().len(),
        state.service.log_feed().len(),
    );

    (StatusCode::OK, Json(snapshot)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::create_test_state;
    use crate::metrics::collector::MetricsSnapshot;
    use axum::body::Body;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_metrics_counts_access_attempts() {
        let state = create_test_state();
        let session = state.sessions.create();

        state.service.add_user("1234", "Alice").await.unwrap();
        state.service.submit_rfid(&session, "1234").await;
        state.service.submit_rfid(&session, "0000").await;

        let response = metrics_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = Body::new(response.into_body()).collect().await.unwrap().to_bytes();
        let snapshot: MetricsSnapshot = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(snapshot.access_granted, 1);
        assert_eq!(snapshot.access_denied, 1);
        assert_eq!(snapshot.users_added, 1);
        assert_eq!(snapshot.active_sessions, 1);
        assert_eq!(snapshot.user_count, 1);
        assert_eq!(snapshot.log_entries, 3);
    }
}
