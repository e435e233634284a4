use crate::core::error::DashboardError;
use crate::core::state::AppState;
use crate::models::api::{AddUserRequest, DeleteUserQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Authorized users ordered by RFID
///
/// GET /api/users
pub async fn list_users_handler(State(state): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(state.service.user_list())).into_response()
}

/// Add or overwrite a user
///
/// POST /api/users  {"rfid": "...", "name": "..."}
pub async fn add_user_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddUserRequest>,
) -> Result<Response, DashboardError> {
    let response = state.service.add_user(&request.rfid, &request.name).await?;

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Remove a user. The page asks for confirmation first and passes it along.
///
/// DELETE /api/users/{rfid}?confirm=true
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(rfid): Path<String>,
    Query(params): Query<DeleteUserQuery>,
) -> Result<Response, DashboardError> {
    let response = state.service.delete_user(&rfid, params.confirm).await?;

    Ok((StatusCode::OK, Json(response)).into_response())
}
