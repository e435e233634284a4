use crate::models::api::Notification;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Lock state of one dashboard page load.
///
/// Lock state never leaves the process: every session starts locked and is
/// independent of every other session.
pub struct LockSession {
    pub id: String,
    state: Mutex<LockState>,
    last_seen: AtomicI64,
}

struct LockState {
    locked: bool,
    /// Bumped whenever a pending re-lock is scheduled or cancelled
    generation: u64,
    /// Generation of the re-lock that is allowed to fire, if any
    scheduled: Option<u64>,
    relock_task: Option<JoinHandle<()>>,
    notifications: Vec<Notification>,
}

impl LockState {
    fn cancel_relock(&mut self) -> bool {
        self.generation += 1;
        if let Some(handle) = self.relock_task.take() {
            handle.abort();
        }
        self.scheduled.take().is_some()
    }
}

impl LockSession {
    pub fn new(id: String, now: i64) -> Self {
        Self {
            id,
            state: Mutex::new(LockState {
                locked: true,
                generation: 0,
                scheduled: None,
                relock_task: None,
                notifications: Vec::new(),
            }),
            last_seen: AtomicI64::new(now),
        }
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    pub fn relock_pending(&self) -> bool {
        self.state().scheduled.is_some()
    }

    /// Manual lock/unlock. Cancels any pending re-lock and returns the new state.
    pub fn toggle(&self) -> bool {
        let mut state = self.state();
        state.cancel_relock();
        state.locked = !state.locked;
        state.locked
    }

    /// Unlock after a granted access. Supersedes any earlier pending re-lock
    /// and returns the generation the new re-lock must present to fire.
    pub fn grant(&self) -> u64 {
        let mut state = self.state();
        state.cancel_relock();
        state.locked = false;
        state.scheduled = Some(state.generation);
        state.generation
    }

    /// Keep the task handle of a scheduled re-lock so it can be aborted.
    /// A handle for a superseded generation is aborted right away.
    pub fn attach_relock(&self, generation: u64, handle: JoinHandle<()>) {
        let mut state = self.state();
        if state.scheduled == Some(generation) {
            state.relock_task = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Re-engage the lock if `generation` is still the scheduled one.
    /// Returns false for cancelled or superseded re-locks.
    pub fn fire_relock(&self, generation: u64) -> bool {
        let mut state = self.state();
        if state.scheduled != Some(generation) {
            return false;
        }
        state.scheduled = None;
        state.relock_task = None;
        state.locked = true;
        true
    }

    /// Cancel any pending re-lock. Returns true if one was pending.
    pub fn cancel_relock(&self) -> bool {
        self.state().cancel_relock()
    }

    pub fn push_notification(&self, notification: Notification) {
        self.state().notifications.push(notification);
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state().notifications)
    }

    pub fn touch(&self, now: i64) {
        self.last_seen.store(now, Ordering::Relaxed);
    }

    pub fn last_seen(&self) -> i64 {
        self.last_seen.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> LockSession {
        LockSession::new("s1".to_string(), 1000)
    }

    #[test]
    fn test_new_session_is_locked() {
        let session = session();
        assert!(session.is_locked());
        assert!(!session.relock_pending());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let session = session();
        assert!(!session.toggle());
        assert!(session.toggle());
        assert!(session.is_locked());
    }

    #[test]
    fn test_grant_unlocks_and_schedules() {
        let session = session();
        let generation = session.grant();

        assert!(!session.is_locked());
        assert!(session.relock_pending());
        assert!(session.fire_relock(generation));
        assert!(session.is_locked());
        assert!(!session.relock_pending());
    }

    #[test]
    fn test_toggle_cancels_pending_relock() {
        let session = session();
        let generation = session.grant();

        // manual lock then manual unlock during the window
        assert!(session.toggle());
        assert!(!session.toggle());

        assert!(!session.fire_relock(generation));
        assert!(!session.is_locked());
    }

    #[test]
    fn test_second_grant_supersedes_first() {
        let session = session();
        let first = session.grant();
        let second = session.grant();

        assert!(!session.fire_relock(first));
        assert!(!session.is_locked());
        assert!(session.fire_relock(second));
        assert!(session.is_locked());
    }

    #[test]
    fn test_relock_fires_once() {
        let session = session();
        let generation = session.grant();
        assert!(session.fire_relock(generation));
        assert!(!session.fire_relock(generation));
    }

    #[test]
    fn test_cancel_relock_reports_pending() {
        let session = session();
        assert!(!session.cancel_relock());
        session.grant();
        assert!(session.cancel_relock());
        assert!(!session.relock_pending());
    }

    #[test]
    fn test_drain_notifications() {
        let session = session();
        session.push_notification(Notification::info("Lock Re-engaged", "x"));

        assert_eq!(session.drain_notifications().len(), 1);
        assert!(session.drain_notifications().is_empty());
    }

    #[test]
    fn test_touch_updates_last_seen() {
        let session = session();
        session.touch(2000);
        assert_eq!(session.last_seen(), 2000);
    }
}
