//! Serialised work loop
//!
//! Mutating operations on the listener cache run one at a time on a single
//! worker task. Producers submit work through a cloneable `WorkQueue` and get
//! the outcome back on a oneshot channel. After every change the worker
//! publishes a new snapshot for the discovery server.

use crate::cache::ListenerCache;
use crate::listener::ListenerComposer;
use crate::snapshot::SnapshotHandle;
use crate::{Result, XdsError};
use edgeshim_common::{ChallengeParams, ListenerIntent, TlsParams};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Operation on the listener cache
#[derive(Debug, Clone)]
pub enum WorkAction {
    /// Create the listener for an intent, or fold the intent into it
    ApplyListener {
        intent: ListenerIntent,
        tls: Option<TlsParams>,
    },
    /// Rotate the certificate of a TLS listener
    UpdateCert(TlsParams),
    /// Serve an ACME HTTP-01 challenge
    InjectChallenge(ChallengeParams),
}

impl WorkAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::ApplyListener { .. } => "apply_listener",
            Self::UpdateCert(_) => "update_cert",
            Self::InjectChallenge(_) => "inject_challenge",
        }
    }
}

/// Queued action with its id
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub id: Uuid,
    pub action: WorkAction,
}

impl WorkItem {
    pub fn new(action: WorkAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
        }
    }
}

/// Result of a processed work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkOutcome {
    pub id: Uuid,
    /// Cache version after the item ran
    pub version: i64,
}

struct Submission {
    item: WorkItem,
    reply: oneshot::Sender<Result<WorkOutcome>>,
}

/// Producer side of the work loop
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::Sender<Submission>,
}

impl WorkQueue {
    /// Submit an action and wait for it to be processed
    pub async fn submit(&self, action: WorkAction) -> Result<WorkOutcome> {
        self.submit_item(WorkItem::new(action)).await
    }

    pub async fn submit_item(&self, item: WorkItem) -> Result<WorkOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Submission { item, reply })
            .await
            .map_err(|_| XdsError::QueueClosed)?;
        rx.await.map_err(|_| XdsError::QueueClosed)?
    }
}

/// Consumer side of the work loop; owns the cache
pub struct Worker {
    composer: ListenerComposer,
    cache: ListenerCache,
    snapshots: Arc<SnapshotHandle>,
    rx: mpsc::Receiver<Submission>,
}

/// Create a work queue of the given capacity and the worker draining it
pub fn work_queue(composer: ListenerComposer, capacity: usize) -> (WorkQueue, Worker) {
    let (tx, rx) = mpsc::channel(capacity);
    let worker = Worker {
        composer,
        cache: ListenerCache::new(),
        snapshots: Arc::new(SnapshotHandle::new()),
        rx,
    };
    (WorkQueue { tx }, worker)
}

impl Worker {
    /// Handle readers load published snapshots from
    pub fn snapshots(&self) -> Arc<SnapshotHandle> {
        Arc::clone(&self.snapshots)
    }

    pub fn cache(&self) -> &ListenerCache {
        &self.cache
    }

    /// Run one action against the cache and publish on change. Returns the
    /// cache version afterwards.
    pub fn apply(&mut self, action: &WorkAction) -> Result<i64> {
        match action {
            WorkAction::ApplyListener { intent, tls } => {
                let attrs = self.composer.attributes(intent, tls.as_ref());
                if self.cache.find(&attrs.listener_name).is_some() {
                    self.composer.update_listener(&mut self.cache, intent, tls.as_ref())?;
                } else {
                    let listener = self.composer.create_listener(intent, tls.as_ref());
                    self.cache.append(listener)?;
                    self.cache.bump();
                }
            }
            WorkAction::UpdateCert(params) => {
                self.composer.update_listener_with_new_cert(&mut self.cache, params)?;
            }
            WorkAction::InjectChallenge(challenge) => {
                self.composer.update_listener_with_challenge(&mut self.cache, challenge)?;
            }
        }

        let version = self.cache.version();
        if version != self.snapshots.version() {
            self.snapshots.publish(self.cache.snapshot());
            debug!("Published listener snapshot version {}", version);
        }
        Ok(version)
    }

    /// Drain the queue until every `WorkQueue` is dropped
    pub async fn run(mut self) {
        info!("Listener work loop started");

        while let Some(Submission { item, reply }) = self.rx.recv().await {
            let result = self.apply(&item.action).map(|version| WorkOutcome { id: item.id, version });
            if let Err(e) = &result {
                warn!("Work item {} ({}) failed: {}", item.id, item.action.kind(), e);
            }
            // submitter may have given up waiting
            let _ = reply.send(result);
        }

        info!("Listener work loop stopped at version {}", self.cache.version());
    }
}
