//! Edgeshim xDS Listener Composition
//!
//! Turns declarative route intents into Envoy v3 listener resources.
//!
//! ## Components
//!
//! - **Resource model**: prost messages for listeners, HCM, routes, TLS
//! - **Codec**: typed-config (`Any`) encode/decode per embedded message
//! - **Attributes**: canonical listener, virtual host and route config names
//! - **Cache**: ordered listeners plus a monotonic version
//! - **Composer**: create/update listeners, rotate certs, inject ACME challenges,
//!   attach JWT and external authorization filters
//! - **Snapshot / Queue**: serialising work loop publishing versioned snapshots
//!
//! ## Usage
//!
//! ```rust,ignore
//! use edgeshim_common::{ComposerConfig, ListenerIntent};
//! use edgeshim_xds::{ListenerCache, ListenerComposer};
//!
//! let composer = ListenerComposer::new(ComposerConfig::default());
//! let mut cache = ListenerCache::new();
//! let intent = ListenerIntent::new("web", "web.internal").with_hostname("example.com");
//! cache.append(composer.create_listener(&intent, None))?;
//! cache.bump();
//! ```

pub mod attributes;
pub mod cache;
pub mod codec;
pub mod envoy;
pub mod equality;
pub mod listener;
pub mod queue;
pub mod snapshot;

pub use attributes::{ListenerAttributes, PathMatch};
pub use cache::ListenerCache;
pub use codec::{CodecError, TypedMessage};
pub use listener::ListenerComposer;
pub use queue::{work_queue, WorkAction, WorkItem, WorkOutcome, WorkQueue, Worker};
pub use snapshot::{ListenerSnapshot, SnapshotHandle};

use thiserror::Error;

/// Listener composition errors
#[derive(Error, Debug)]
pub enum XdsError {
    /// No listener with the resolved canonical name
    #[error("no matching listener found: {0}")]
    NoMatchingListener(String),

    /// No TLS listener for a certificate rotation
    #[error("no tls listener found: {0}")]
    NoTlsListener(String),

    /// Listener without filter chains
    #[error("no filterchains found in listener {0}")]
    NoFilterChains(String),

    /// Filter chain without filters
    #[error("no filters found in listener {0}")]
    NoFilters(String),

    /// Route config without virtual hosts
    #[error("no virtualhosts found in routeconfig of listener {0}")]
    NoVirtualHosts(String),

    /// HCM without an inline route config
    #[error("no inline routeconfig in listener {0}")]
    NoRouteConfig(String),

    /// A listener with this name is already cached
    #[error("listener already exists: {0}")]
    DuplicateListener(String),

    /// Typed config could not be decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The work loop is gone
    #[error("work queue closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, XdsError>;
