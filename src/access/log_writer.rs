use crate::models::log_entry::{log_path, LogEntry};
use crate::stores::client::{StoreClient, StoreError};
use crate::utils::time::LogKeyGenerator;
use std::sync::Arc;
use tracing::{info, warn};

/// Appends entries to the access log in the store
pub struct LogWriter {
    store: Arc<dyn StoreClient>,
    keys: LogKeyGenerator,
}

impl LogWriter {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self {
            store,
            keys: LogKeyGenerator::new(),
        }
    }

    pub async fn append(&self, message: &str) -> Result<LogEntry, StoreError> {
        let key = self.keys.next_key();
        let entry = LogEntry {
            message: message.to_string(),
            timestamp: key,
        };

        let value = serde_json::to_value(&entry).map_err(|e| StoreError::Decode(e.to_string()))?;

        match self.store.write(&log_path(key), value).await {
            Ok(()) => {
                info!(key = key, message = %message, "Log entry written");
                Ok(entry)
            }
            Err(e) => {
                warn!(key = key, message = %message, error = %e, "Failed to write log entry");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::log_entry::{project_log_feed, LOGS_PATH};
    use crate::stores::memory_store::MemoryStore;

    #[tokio::test]
    async fn test_append_writes_entry() {
        let store = Arc::new(MemoryStore::new());
        let writer = LogWriter::new(store.clone());

        let entry = writer.append("Lock Engaged").await.unwrap();
        assert_eq!(entry.message, "Lock Engaged");

        let logs = store.read(LOGS_PATH).await.unwrap();
        let feed = project_log_feed(logs.as_ref());
        assert_eq!(feed, vec![entry]);
    }

    #[tokio::test]
    async fn test_rapid_appends_get_distinct_keys() {
        let store = Arc::new(MemoryStore::new());
        let writer = LogWriter::new(store.clone());

        for i in 0..20 {
            writer.append(&format!("entry {}", i)).await.unwrap();
        }

        let logs = store.read(LOGS_PATH).await.unwrap();
        let feed = project_log_feed(logs.as_ref());
        assert_eq!(feed.len(), 20);
        assert_eq!(feed[0].message, "entry 19");
        assert_eq!(feed[19].message, "entry 0");
    }
}
