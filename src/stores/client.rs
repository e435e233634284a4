use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

/// Characters the document store refuses inside a key
const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '$', '#', '[', ']'];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store returned error status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

/// Path-addressed client for the real-time document store.
///
/// Implementations are shared as `Arc<dyn StoreClient>` and injected into
/// the access service at startup.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Live snapshot of the value at `path`. `None` while the path is absent.
    fn subscribe(&self, path: &str) -> Result<watch::Receiver<Option<Value>>, StoreError>;

    /// One-shot read of the value at `path`
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Set or overwrite the value at `path`
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Delete the value at `path`. Removing an absent path is not an error.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Liveness of the connection to the store
    fn connected(&self) -> watch::Receiver<bool>;

    /// Whether writes survive a process restart
    fn is_persistent(&self) -> bool;
}

/// Split a store path into its segments, rejecting empty segments and
/// characters the store does not allow in keys. The empty path addresses the root.
pub fn split_path(path: &str) -> Result<Vec<&str>, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    trimmed
        .split('/')
        .map(|segment| {
            if !is_valid_key(segment) {
                return Err(StoreError::InvalidPath(path.to_string()));
            }
            Ok(segment)
        })
        .collect()
}

/// A single key is valid when non-empty and free of forbidden characters
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| FORBIDDEN_KEY_CHARS.contains(&c) || c == '/' || c.is_control())
}

/// Publish `snapshot` to a watch channel only if it differs from the current value
pub fn publish_if_changed(sender: &watch::Sender<Option<Value>>, snapshot: Option<Value>) -> bool {
    sender.send_if_modified(|current| {
        if *current != snapshot {
            *current = snapshot;
            true
        } else {
            false
        }
    })
}
