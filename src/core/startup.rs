use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::client::FirebaseClient;
use crate::core::config::StoreConfig;
use crate::stores::client::StoreClient;
use crate::stores::memory_store::MemoryStore;

/// Build the store client. A missing database URL is not fatal: the
/// dashboard falls back to a local store that keeps nothing across restarts.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn StoreClient>> {
    let Some(database_url) = &config.database_url else {
        warn!("No database_url configured, running in local-only mode; users and logs will not be persisted");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let client = FirebaseClient::new(
        database_url,
        config.auth_token.clone(),
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("Failed to create database client")?;

    info!(database_url = %database_url, "Database client initialized");

    // Nothing is seeded on an empty root: the database drops empty objects,
    // and the first user or log write creates its parent.
    match client.has_data().await {
        Ok(true) => info!("Database structure: Data exists"),
        Ok(false) => info!("Database structure: No data"),
        Err(e) => warn!(error = %e, "Initial database probe failed, continuing"),
    }

    Ok(Arc::new(client))
}

/// Log transitions of the store's liveness signal
pub fn spawn_connection_watcher(store: Arc<dyn StoreClient>) {
    let mut connected = store.connected();

    tokio::spawn(async move {
        let mut last = *connected.borrow_and_update();
        if last {
            info!("Connected to database");
        }

        while connected.changed().await.is_ok() {
            let now = *connected.borrow_and_update();
            if now == last {
                continue;
            }
            last = now;

            if now {
                info!("Connected to database");
            } else {
                warn!("Disconnected from database; check that the database rules allow read and write access");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_falls_back_to_memory() {
        let store = build_store(&StoreConfig::default()).await.unwrap();
        assert!(!store.is_persistent());
        assert!(*store.connected().borrow());
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let config = StoreConfig {
            database_url: Some("not-a-url".to_string()),
            ..StoreConfig::default()
        };
        assert!(build_store(&config).await.is_err());
    }
}
