use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;

/// Store path holding the access log
pub const LOGS_PATH: &str = "logs";

/// A single access log record as stored at `logs/{key}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Store path of the log entry with the given key
pub fn log_path(key: i64) -> String {
    let mut buf = itoa::Buffer::new();
    format!("{}/{}", LOGS_PATH, buf.format(key))
}

/// Project a `logs` snapshot into the feed, newest first.
///
/// Sorting happens here and only here, so the feed order never depends on the
/// order in which the store delivered the entries. Malformed entries are skipped.
pub fn project_log_feed(snapshot: Option<&Value>) -> Vec<LogEntry> {
    let Some(Value::Object(map)) = snapshot else {
        return Vec::new();
    };

    let mut keyed: Vec<(&str, LogEntry)> = map
        .iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<LogEntry>(value.clone())
                .ok()
                .map(|entry| (key.as_str(), entry))
        })
        .collect();

    keyed.sort_by_key(|(key, entry)| Reverse((entry.timestamp, key.parse::<i64>().unwrap_or(0))));

    keyed.into_iter().map(|(_, entry)| entry).collect()
}
