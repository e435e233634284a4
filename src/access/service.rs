use crate::access::log_writer::LogWriter;
use crate::access::relock::RelockScheduler;
use crate::core::config::ConflictPolicy;
use crate::core::error::DashboardError;
use crate::metrics::collector::Metrics;
use crate::models::api::{ActionResponse, DashboardState, Notification};
use crate::models::log_entry::{project_log_feed, LogEntry, LOGS_PATH};
use crate::models::session::LockSession;
use crate::models::user::{project_user_list, project_users, user_path, User, USERS_PATH};
use crate::stores::client::{StoreClient, StoreError};
use crate::validation::params::{validate_new_user, validate_rfid};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// The lock dashboard's operations.
///
/// Users and logs are read through live store subscriptions; the mapping
/// consulted by an RFID check is whatever the users subscription holds at
/// the moment of submission.
pub struct AccessService {
    store: Arc<dyn StoreClient>,
    users: watch::Receiver<Option<Value>>,
    logs: watch::Receiver<Option<Value>>,
    log: Arc<LogWriter>,
    relock: RelockScheduler,
    conflict_policy: ConflictPolicy,
    metrics: Arc<Metrics>,
}

impl AccessService {
    pub fn new(
        store: Arc<dyn StoreClient>,
        relock_delay: Duration,
        conflict_policy: ConflictPolicy,
        metrics: Arc<Metrics>,
    ) -> Result<Self, StoreError> {
        let users = store.subscribe(USERS_PATH)?;
        let logs = store.subscribe(LOGS_PATH)?;
        let log = Arc::new(LogWriter::new(Arc::clone(&store)));
        let relock = RelockScheduler::new(relock_delay, Arc::clone(&log), Arc::clone(&metrics));

        Ok(Self {
            store,
            users,
            logs,
            log,
            relock,
            conflict_policy,
            metrics,
        })
    }

    /// Current RFID → name mapping
    pub fn users(&self) -> BTreeMap<String, String> {
        project_users(self.users.borrow().as_ref())
    }

    pub fn user_list(&self) -> Vec<User> {
        project_user_list(self.users.borrow().as_ref())
    }

    /// All log entries, newest first
    pub fn log_feed(&self) -> Vec<LogEntry> {
        project_log_feed(self.logs.borrow().as_ref())
    }

    pub fn is_connected(&self) -> bool {
        *self.store.connected().borrow()
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }

    pub fn dashboard_state(&self) -> DashboardState {
        DashboardState {
            connected: self.is_connected(),
            persistent: self.is_persistent(),
            users: self.user_list(),
            logs: self.log_feed(),
        }
    }

    /// Append a log entry; a failed write becomes an extra notification
    async fn write_log(&self, message: &str, notifications: &mut Vec<Notification>) {
        if self.log.append(message).await.is_err() {
            self.metrics.increment_store_errors();
            notifications.push(Notification::destructive("Error", "Failed to write log"));
        }
    }

    /// Manually invert the session's lock, cancelling any pending re-lock
    pub async fn toggle_lock(&self, session: &LockSession) -> ActionResponse {
        let locked = session.toggle();
        self.metrics.increment_toggles();

        let message = if locked { "Lock Engaged" } else { "Lock Disengaged" };
        info!(session = %session.id, locked, "Lock toggled");

        let mut notifications = vec![Notification::info(
            message,
            format!("The lock is now {}.", if locked { "locked" } else { "unlocked" }),
        )];
        self.write_log(message, &mut notifications).await;

        ActionResponse::with_lock(locked, notifications)
    }

    /// Grant access when `rfid` is a known tag, deny otherwise
    pub async fn submit_rfid(&self, session: &Arc<LockSession>, rfid: &str) -> ActionResponse {
        let name = self.users().remove(rfid);

        let mut notifications = Vec::new();
        match name {
            Some(name) => {
                let generation = session.grant();
                self.relock.schedule(Arc::clone(session), generation);
                self.metrics.increment_granted();

                let message = format!("Access Granted: RFID {} - {}", rfid, name);
                info!(session = %session.id, rfid = %rfid, name = %name, "Access granted");

                notifications.push(Notification::info("Access Granted", message.clone()));
                self.write_log(&message, &mut notifications).await;
            }
            None => {
                self.metrics.increment_denied();

                let message = format!("Access Denied: Unknown RFID {}", rfid);
                warn!(session = %session.id, rfid = %rfid, "Access denied");

                notifications.push(Notification::destructive("Access Denied", message.clone()));
                self.write_log(&message, &mut notifications).await;
            }
        }

        ActionResponse::with_lock(session.is_locked(), notifications)
    }

    /// Upsert an RFID → name mapping
    pub async fn add_user(&self, rfid: &str, name: &str) -> Result<ActionResponse, DashboardError> {
        let user = validate_new_user(rfid, name)?;

        if self.conflict_policy == ConflictPolicy::Reject && self.users().contains_key(&user.rfid) {
            warn!(rfid = %user.rfid, "Rejected add for already assigned RFID");
            return Err(DashboardError::Conflict(user.rfid));
        }

        self.store
            .write(&user_path(&user.rfid), Value::String(user.name.clone()))
            .await
            .map_err(|e| {
                self.metrics.increment_store_errors();
                warn!(rfid = %user.rfid, error = %e, "Failed to add user");
                DashboardError::store("add user", e)
            })?;

        self.metrics.increment_users_added();
        info!(rfid = %user.rfid, name = %user.name, "User added");

        let mut notifications = vec![Notification::info(
            "User Added",
            format!("User {} added with RFID {}.", user.name, user.rfid),
        )];
        self.write_log(
            &format!("User Added: RFID {} - {}", user.rfid, user.name),
            &mut notifications,
        )
        .await;

        Ok(ActionResponse::new(notifications))
    }

    /// Remove a mapping. Requires explicit confirmation; removing an absent
    /// RFID succeeds.
    pub async fn delete_user(
        &self,
        rfid: &str,
        confirmed: bool,
    ) -> Result<ActionResponse, DashboardError> {
        validate_rfid(rfid)?;

        if !confirmed {
            return Err(DashboardError::ConfirmationRequired(rfid.to_string()));
        }

        self.store.remove(&user_path(rfid)).await.map_err(|e| {
            self.metrics.increment_store_errors();
            warn!(rfid = %rfid, error = %e, "Failed to delete user");
            DashboardError::store("delete user", e)
        })?;

        self.metrics.increment_users_deleted();
        info!(rfid = %rfid, "User deleted");

        let mut notifications = vec![Notification::info(
            "User Deleted",
            format!("User with RFID {} has been deleted.", rfid),
        )];
        self.write_log(&format!("User Deleted: RFID {}", rfid), &mut notifications)
            .await;

        Ok(ActionResponse::new(notifications))
    }

    pub fn relock_delay(&self) -> Duration {
        self.relock.delay()
    }
}
