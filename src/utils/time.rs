use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub fn elapsed_seconds(start: i64, end: i64) -> i64 {
    end - start
}

pub fn is_expired(timestamp: i64, timeout: i64, current_time: i64) -> bool {
    elapsed_seconds(timestamp, current_time) > timeout
}

/// Hands out log keys: millisecond timestamps, strictly increasing within
/// the process even when two entries land in the same millisecond
pub struct LogKeyGenerator {
    last: AtomicI64,
}

impl LogKeyGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next_key(&self) -> i64 {
        self.next_key_at(current_timestamp_millis())
    }

    pub fn next_key_at(&self, now_millis: i64) -> i64 {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

impl Default for LogKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_current_timestamp() {
        let ts = current_timestamp();
        // Should be a reasonable timestamp (after 2020-01-01)
        assert!(ts > 1577836800);
        // Should be before 2100-01-01
        assert!(ts < 4102444800);
    }

    #[test]
    fn test_current_timestamp_millis() {
        let ts_millis = current_timestamp_millis();
        let ts_secs = current_timestamp();

        let diff = (ts_millis / 1000 - ts_secs).abs();
        assert!(diff <= 1);
    }

    #[test]
    fn test_is_expired() {
        let current = 1000;

        assert!(!is_expired(950, 100, current));
        assert!(is_expired(800, 100, current));

        // Edge case: exactly at timeout
        assert!(!is_expired(900, 100, current));
        assert!(is_expired(899, 100, current));
    }

    #[test]
    fn test_log_keys_strictly_increase_within_same_millisecond() {
        let keys = LogKeyGenerator::new();
        assert_eq!(keys.next_key_at(5000), 5000);
        assert_eq!(keys.next_key_at(5000), 5001);
        assert_eq!(keys.next_key_at(5000), 5002);
        assert_eq!(keys.next_key_at(9000), 9000);
    }

    #[test]
    fn test_log_keys_never_go_backwards() {
        let keys = LogKeyGenerator::new();
        assert_eq!(keys.next_key_at(5000), 5000);
        // clock stepped back
        assert_eq!(keys.next_key_at(4000), 5001);
    }

    #[test]
    fn test_log_keys_unique_across_threads() {
        let keys = Arc::new(LogKeyGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let keys = Arc::clone(&keys);
                std::thread::spawn(move || (0..250).map(|_| keys.next_key_at(42)).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                assert!(seen.insert(key));
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
