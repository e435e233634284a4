use crate::utils::time::current_timestamp;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub lock_toggles: AtomicU64,
    pub access_granted: AtomicU64,
    pub access_denied: AtomicU64,
    pub relocks_fired: AtomicU64,
    pub users_added: AtomicU64,
    pub users_deleted: AtomicU64,
    pub store_errors: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub lock_toggles: u64,
    pub access_granted: u64,
    pub access_denied: u64,
    pub grant_rate: f64,
    pub relocks_fired: u64,
    pub users_added: u64,
    pub users_deleted: u64,
    pub store_errors: u64,
    pub active_sessions: usize,
    #[serde(rename = "authorized_users")]
    pub user_count: usize,
    pub log_entries: usize,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            lock_toggles: AtomicU64::new(0),
            access_granted: AtomicU64::new(0),
            access_denied: AtomicU64::new(0),
            relocks_fired: AtomicU64::new(0),
            users_added: AtomicU64::new(0),
            users_deleted: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_toggles(&self) {
        self.lock_toggles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_granted(&self) {
        self.access_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_denied(&self) {
        self.access_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_relocks(&self) {
        self.relocks_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_users_added(&self) {
        self.users_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_users_deleted(&self) {
        self.users_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_errors(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Combine the counters with the gauges supplied by the caller
    pub fn get_snapshot(
        &self,
        active_sessions: usize,
        user_count: usize,
        log_entries: usize,
    ) -> MetricsSnapshot {
        let access_granted = self.access_granted.load(Ordering::Relaxed);
        let access_denied = self.access_denied.load(Ordering::Relaxed);
        let attempts = access_granted + access_denied;

        let grant_rate = if attempts > 0 {
            (access_granted as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            lock_toggles: self.lock_toggles.load(Ordering::Relaxed),
            access_granted,
            access_denied,
            grant_rate,
            relocks_fired: self.relocks_fired.load(Ordering::Relaxed),
            users_added: self.users_added.load(Ordering::Relaxed),
            users_deleted: self.users_deleted.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            active_sessions,
            user_count,
            log_entries,
            uptime_seconds: current_timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics() {
        let snapshot = Metrics::new().get_snapshot(0, 0, 0);
        assert_eq!(snapshot.access_granted, 0);
        assert_eq!(snapshot.access_denied, 0);
        assert_eq!(snapshot.grant_rate, 0.0);
        assert!(snapshot.uptime_seconds >= 0);
    }

    #[test]
    fn test_grant_rate() {
        let metrics = Metrics::new();
        metrics.increment_granted();
        metrics.increment_granted();
        metrics.increment_granted();
        metrics.increment_denied();

        let snapshot = metrics.get_snapshot(1, 2, 3);
        assert_eq!(snapshot.grant_rate, 75.0);
        assert_eq!(snapshot.active_sessions, 1);
        assert_eq!(snapshot.user_count, 2);
        assert_eq!(snapshot.log_entries, 3);
    }

    #[test]
    fn test_snapshot_serializes_renamed_field() {
        let snapshot = Metrics::new().get_snapshot(0, 4, 0);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["authorized_users"], 4);
    }
}
