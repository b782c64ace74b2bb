//! Edgeshim Common - Shared types for the Envoy listener control plane
//!
//! This crate provides the plain records exchanged with the composition
//! engine:
//! - Route intents (`ListenerIntent`, `Conditions`)
//! - TLS material and ACME challenge parameters
//! - Composer configuration and its error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod intent;

pub use config::*;
pub use error::*;
pub use intent::*;
