//! # Core Runtime Module
//!
//! Foundational infrastructure for the operation result gateway:
//! - Operation outcomes
//! - Event catalog, event types and the in-process event bus
//! - Event dispatcher (the only path to the host binding)
//! - Configuration management
//! - Logging and tracing infrastructure
//!
//! ## Overview
//!
//! Subsystem adapters depend on this crate for the shared vocabulary: they
//! reduce each backend call to an [`Outcome`](outcome::Outcome), translate it
//! into [`CoreEvent`](events::CoreEvent)s and hand those to the
//! [`EventDispatcher`](dispatcher::EventDispatcher).

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod logging;
pub mod outcome;

pub use error::{Error, Result};
pub use outcome::Outcome;

/// Spawned backend operation. Dropping it does not cancel the operation.
pub type OperationHandle = tokio::task::JoinHandle<()>;
