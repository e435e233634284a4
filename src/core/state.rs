// Application state (AppState)

use crate::access::service::AccessService;
use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::stores::client::{StoreClient, StoreError};
use crate::stores::session_store::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
///
/// Contains all shared components that are accessed by request handlers.
/// The store client is injected once here and reaches the handlers only
/// through the access service.
#[derive(Clone)]
pub struct AppState {
    /// Lock, access and user management operations
    pub service: Arc<AccessService>,

    /// Per-page-load lock sessions
    pub sessions: Arc<SessionStore>,

    /// Metrics collector for tracking statistics
    pub metrics: Arc<Metrics>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn StoreClient>) -> Result<Self, StoreError> {
        let config = Arc::new(config);
        let metrics = Arc::new(Metrics::new());

        let service = AccessService::new(
            store,
            Duration::from_secs(config.lock.relock_delay_secs),
            config.users.conflict_policy,
            Arc::clone(&metrics),
        )?;

        Ok(Self {
            service: Arc::new(service),
            sessions: Arc::new(SessionStore::new()),
            metrics,
            config,
        })
    }
}
