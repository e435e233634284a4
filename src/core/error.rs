// Centralized error handling for the dashboard

use crate::models::api::{ErrorResponse, Notification};
use crate::stores::client::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("RFID and Name cannot be empty.")]
    MissingFields,

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter format: {0}")]
    InvalidFormat(String),
}

/// Errors surfaced to the dashboard page
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Deleting RFID {0} requires confirmation")]
    ConfirmationRequired(String),

    #[error("RFID {0} is already assigned")]
    Conflict(String),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl DashboardError {
    pub fn store(action: &'static str, source: StoreError) -> Self {
        DashboardError::Store { action, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            DashboardError::Conflict(_) => StatusCode::CONFLICT,
            DashboardError::SessionNotFound => StatusCode::NOT_FOUND,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Store { source: StoreError::InvalidPath(_), .. } => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::Store { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Toast shown by the page for this error
    pub fn notification(&self) -> Notification {
        Notification::destructive("Error", self.to_string())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
                notification: self.notification(),
            }),
        )
            .into_response()
    }
}
