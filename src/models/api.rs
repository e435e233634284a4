use crate::models::log_entry::LogEntry;
use crate::models::user::User;
use serde::{Deserialize, Serialize};

/// Toast variant shown by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRfidRequest {
    pub rfid: String,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    #[serde(default)]
    pub rfid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Result of a dashboard action
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    pub notifications: Vec<Notification>,
}

impl ActionResponse {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            success: true,
            locked: None,
            notifications,
        }
    }

    pub fn with_lock(locked: bool, notifications: Vec<Notification>) -> Self {
        Self {
            success: true,
            locked: Some(locked),
            notifications,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub notification: Notification,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub locked: bool,
}

/// Per-session lock view; polling it drains queued notifications
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub locked: bool,
    pub relock_pending: bool,
    pub notifications: Vec<Notification>,
}

/// Shared dashboard state mirrored from the store
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardState {
    pub connected: bool,
    pub persistent: bool,
    pub users: Vec<User>,
    pub logs: Vec<LogEntry>,
}
