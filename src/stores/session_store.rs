use crate::models::session::LockSession;
use crate::utils::time::{current_timestamp, is_expired};
use dashmap::DashMap;
use rand::RngCore;
use std::sync::Arc;

/// In-memory registry of dashboard sessions
pub struct SessionStore {
    sessions: DashMap<String, Arc<LockSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a fresh, locked session with a random 128-bit id
    pub fn create(&self) -> Arc<LockSession> {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        let id = hex::encode(bytes);

        let session = Arc::new(LockSession::new(id.clone(), current_timestamp()));
        self.sessions.insert(id, Arc::clone(&session));
        session
    }

    /// Look up a session and mark it as seen
    pub fn get(&self, id: &str) -> Option<Arc<LockSession>> {
        let session = self.sessions.get(id).map(|entry| Arc::clone(entry.value()))?;
        session.touch(current_timestamp());
        Some(session)
    }

    pub fn remove(&self, id: &str) -> Option<Arc<LockSession>> {
        let (_, session) = self.sessions.remove(id)?;
        session.cancel_relock();
        Some(session)
    }

    /// Drop sessions idle for longer than `idle_timeout` seconds, cancelling
    /// their pending re-locks. Returns the number removed.
    pub fn cleanup_idle(&self, idle_timeout: i64, now: i64) -> usize {
        let stale: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| is_expired(entry.value().last_seen(), idle_timeout, now))
            .map(|entry| entry.key().clone())
            .collect();

        stale.iter().filter(|id| self.remove(id).is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
