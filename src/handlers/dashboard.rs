use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// The single-page dashboard
///
/// GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Users, log feed and store status in one snapshot, polled by the page
///
/// GET /api/state
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(state.service.dashboard_state())).into_response()
}
