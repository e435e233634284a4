use crate::core::error::DashboardError;
use crate::core::state::AppState;
use crate::handlers::session::lookup_session;
use crate::models::api::SubmitRfidRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Manually lock or unlock
///
/// POST /api/session/{id}/toggle
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, DashboardError> {
    let session = lookup_session(&state, &id)?;
    let response = state.service.toggle_lock(&session).await;

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Check an RFID against the authorized users
///
/// POST /api/session/{id}/rfid  {"rfid": "..."}
pub async fn submit_rfid_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SubmitRfidRequest>,
) -> Result<Response, DashboardError> {
    let session = lookup_session(&state, &id)?;
    let response = state.service.submit_rfid(&session, &request.rfid).await;

    Ok((StatusCode::OK, Json(response)).into_response())
}
