//! Versioned listener snapshots with lock-free hand-off

use crate::codec;
use crate::envoy::listener::{Listener, LISTENER_TYPE_URL};
use arc_swap::ArcSwap;
use prost_types::Any;
use std::sync::Arc;

/// Immutable listener set at one cache version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerSnapshot {
    version: i64,
    listeners: Arc<Vec<Listener>>,
}

impl ListenerSnapshot {
    pub fn new(version: i64, listeners: Vec<Listener>) -> Self {
        Self {
            version,
            listeners: Arc::new(listeners),
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Version string handed to the discovery server as-is
    pub fn version_info(&self) -> String {
        self.version.to_string()
    }

    pub fn type_url(&self) -> &'static str {
        LISTENER_TYPE_URL
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn find(&self, name: &str) -> Option<&Listener> {
        self.listeners.iter().find(|l| l.name == name)
    }

    /// Listeners wrapped as LDS resources
    pub fn resources(&self) -> Vec<Any> {
        self.listeners.iter().map(codec::encode).collect()
    }
}

/// Latest published snapshot (atomically swappable)
pub struct SnapshotHandle {
    current: ArcSwap<ListenerSnapshot>,
}

impl SnapshotHandle {
    /// Create with the empty version-0 snapshot
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(ListenerSnapshot::default()),
        }
    }

    /// Atomically replace the current snapshot
    pub fn publish(&self, snapshot: ListenerSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<ListenerSnapshot> {
        self.current.load_full()
    }

    #[inline]
    pub fn version(&self) -> i64 {
        self.current.load().version
    }
}

impl Default for SnapshotHandle {
    fn default() -> Self {
        Self::new()
    }
}
