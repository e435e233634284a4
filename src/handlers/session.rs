use crate::core::error::DashboardError;
use crate::core::state::AppState;
use crate::models::api::{SessionCreatedResponse, SessionView};
use crate::models::session::LockSession;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

/// Resolve a session id or fail with 404 so the page can start over
pub fn lookup_session(state: &AppState, id: &str) -> Result<Arc<LockSession>, DashboardError> {
    state.sessions.get(id).ok_or(DashboardError::SessionNotFound)
}

/// Start a new lock session for a page load
///
/// POST /api/session
pub async fn create_session_handler(State(state): State<Arc<AppState>>) -> Response {
    let session = state.sessions.create();

    info!(
        session = %session.id,
        active_sessions = state.sessions.len(),
        "Session created"
    );

    (
        StatusCode::OK,
        Json(SessionCreatedResponse {
            session_id: session.id.clone(),
            locked: session.is_locked(),
        }),
    )
        .into_response()
}

/// Current lock state of a session, draining its queued notifications
///
/// GET /api/session/{id}
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, DashboardError> {
    let session = lookup_session(&state, &id)?;

    Ok((
        StatusCode::OK,
        Json(SessionView {
            session_id: session.id.clone(),
            locked: session.is_locked(),
            relock_pending: session.relock_pending(),
            notifications: session.drain_notifications(),
        }),
    )
        .into_response())
}
