use crate::access::log_writer::LogWriter;
use crate::metrics::collector::Metrics;
use crate::models::api::Notification;
use crate::models::session::LockSession;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const RELOCK_MESSAGE: &str = "Lock Re-engaged";

/// Schedules the automatic re-lock that follows a granted access.
///
/// Each scheduled re-lock carries the session generation it was created for;
/// a manual toggle or a newer grant bumps the generation and aborts the task,
/// so only the most recent re-lock can ever fire.
#[derive(Clone)]
pub struct RelockScheduler {
    delay: Duration,
    log: Arc<LogWriter>,
    metrics: Arc<Metrics>,
}

impl RelockScheduler {
    pub fn new(delay: Duration, log: Arc<LogWriter>, metrics: Arc<Metrics>) -> Self {
        Self { delay, log, metrics }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Spawn the re-lock for `generation` and attach its handle to the session
    pub fn schedule(&self, session: Arc<LockSession>, generation: u64) {
        let delay = self.delay;
        let log = Arc::clone(&self.log);
        let metrics = Arc::clone(&self.metrics);
        let task_session = Arc::clone(&session);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if !task_session.fire_relock(generation) {
                debug!(session = %task_session.id, generation, "Re-lock superseded");
                return;
            }

            metrics.increment_relocks();
            info!(session = %task_session.id, "Lock automatically re-engaged");

            if log.append(RELOCK_MESSAGE).await.is_err() {
                metrics.increment_store_errors();
                task_session.push_notification(Notification::destructive(
                    "Error",
                    "Failed to write log",
                ));
            }
            task_session.push_notification(Notification::info(
                RELOCK_MESSAGE,
                "The lock has been automatically re-engaged.",
            ));
        });

        session.attach_relock(generation, handle);
        debug!(session = %session.id, generation, delay_ms = delay.as_millis() as u64, "Re-lock scheduled");
    }
}
