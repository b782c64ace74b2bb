//! Listener cache
//!
//! Ordered listeners plus a monotonic version, kept together so that a
//! snapshot always pairs a listener list with the version it was taken at.
//! Not synchronised; the work loop owns it.

use crate::envoy::listener::Listener;
use crate::snapshot::ListenerSnapshot;
use crate::{Result, XdsError};

/// Listener cache
#[derive(Debug, Clone, Default)]
pub struct ListenerCache {
    /// Listeners in insertion order
    listeners: Vec<Listener>,

    /// Version counter
    version: i64,
}

impl ListenerCache {
    /// Create empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current version
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Increment version
    pub fn bump(&mut self) -> i64 {
        self.version += 1;
        self.version
    }

    /// Index of the listener named `name`
    pub fn find(&self, name: &str) -> Option<usize> {
        self.listeners.iter().position(|l| l.name == name)
    }

    /// Append a listener, keeping insertion order. Names must stay unique.
    pub fn append(&mut self, listener: Listener) -> Result<usize> {
        if self.find(&listener.name).is_some() {
            return Err(XdsError::DuplicateListener(listener.name));
        }
        self.listeners.push(listener);
        Ok(self.listeners.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&Listener> {
        self.listeners.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Listener> {
        self.listeners.get_mut(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Listener> {
        self.listeners.iter().find(|l| l.name == name)
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Consistent copy of the listeners at the current version
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot::new(self.version, self.listeners.clone())
    }
}
