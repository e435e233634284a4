use crate::stores::client::{publish_if_changed, split_path, StoreClient, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::RwLock;
use tokio::sync::watch;

/// In-process document store used when no database is configured.
///
/// Mirrors the path semantics of the hosted store: writes create intermediate
/// objects, removals prune parents left empty, and writing `null` removes.
/// Nothing survives a restart.
pub struct MemoryStore {
    root: RwLock<Value>,
    subscribers: DashMap<String, watch::Sender<Option<Value>>>,
    connected: watch::Sender<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (connected, _) = watch::channel(true);
        Self {
            root: RwLock::new(Value::Null),
            subscribers: DashMap::new(),
            connected,
        }
    }

    fn snapshot(&self, segments: &[&str]) -> Option<Value> {
        let root = self.root.read().unwrap_or_else(|e| e.into_inner());
        value_at(&root, segments).cloned()
    }

    /// Push fresh snapshots to every subscription whose value changed
    fn notify(&self) {
        let root = self.root.read().unwrap_or_else(|e| e.into_inner());
        for entry in self.subscribers.iter() {
            let Ok(segments) = split_path(entry.key()) else {
                continue;
            };
            publish_if_changed(entry.value(), value_at(&root, &segments).cloned());
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    fn subscribe(&self, path: &str) -> Result<watch::Receiver<Option<Value>>, StoreError> {
        let segments = split_path(path)?;
        let initial = self.snapshot(&segments);
        let receiver = self
            .subscribers
            .entry(segments.join("/"))
            .or_insert_with(|| watch::channel(initial).0)
            .subscribe();
        Ok(receiver)
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = split_path(path)?;
        Ok(self.snapshot(&segments))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segments = split_path(path)?;
        {
            let mut root = self.root.write().unwrap_or_else(|e| e.into_inner());
            if value.is_null() {
                if remove_at(&mut root, &segments) {
                    *root = Value::Null;
                }
            } else {
                set_at(&mut root, &segments, value);
            }
        }
        self.notify();
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let segments = split_path(path)?;
        {
            let mut root = self.root.write().unwrap_or_else(|e| e.into_inner());
            if remove_at(&mut root, &segments) {
                *root = Value::Null;
            }
        }
        self.notify();
        Ok(())
    }

    fn connected(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

pub(crate) fn value_at<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(*segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

pub(crate) fn set_at(current: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *current = value;
        return;
    };

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        set_at(child, rest, value);
    }
}

/// Remove the value at `segments`. Returns true when the container at this
/// level became empty and should be pruned by its parent.
pub(crate) fn remove_at(current: &mut Value, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        *current = Value::Null;
        return true;
    };

    let Some(map) = current.as_object_mut() else {
        return false;
    };

    let prune_child = if rest.is_empty() {
        map.remove(*first);
        false
    } else {
        match map.get_mut(*first) {
            Some(child) => remove_at(child, rest),
            None => false,
        }
    };
    if prune_child {
        map.remove(*first);
    }

    map.is_empty()
}
