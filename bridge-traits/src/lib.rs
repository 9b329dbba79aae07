//! # Host Bridge Traits
//!
//! Contracts between the gateway core and everything outside it.
//!
//! ## Overview
//!
//! The core never touches a host runtime or a backend SDK directly. Each
//! capability it needs is expressed as a trait here and implemented once per
//! platform (Android plugin, desktop harness, tests).
//!
//! ## Traits
//!
//! ### Host runtime
//! - [`HostScheduler`](host::HostScheduler) - Marshal jobs onto the host's event context
//! - [`HostEventSink`](host::HostEventSink) - Deliver named signals with payloads
//! - [`HostContext`](host::HostContext) - Resource lookup and host-native UI launch
//!
//! ### Backends
//! - [`IdentityBackend`](identity::IdentityBackend) - Sessions and account lifecycle
//! - [`ExternalIdentityProvider`](identity::ExternalIdentityProvider) - Provider sign-in UI and credentials
//! - [`DocumentBackend`](document::DocumentBackend) - Collections of keyed documents
//! - [`BlobBackend`](blob::BlobBackend) - Path-addressed file storage
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Data Model
//!
//! Structured payloads use [`Record`](record::Record), an insertion-ordered map of
//! [`Value`](record::Value)s. Dynamic documents from backends are converted into it
//! at the bridge boundary so the core never handles untyped maps.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Backends report
//! their failures as [`BridgeError::Backend`] carrying the reason text the host
//! should see; the gateway forwards it verbatim.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: backend completions arrive on
//! arbitrary worker threads.
//!
//! ## Examples
//!
//! ### Implementing HostEventSink
//!
//! ```ignore
//! use bridge_traits::host::{EventPayload, HostEventSink};
//!
//! struct EngineSignals {
//!     object: EngineObjectRef,
//! }
//!
//! impl HostEventSink for EngineSignals {
//!     fn emit_signal(&self, name: &str, payload: EventPayload) {
//!         self.object.emit(name, payload.into_variant());
//!     }
//! }
//! ```

pub mod blob;
pub mod document;
pub mod error;
pub mod host;
pub mod identity;
pub mod logging;
pub mod record;

pub use error::BridgeError;

// Re-export commonly used types
pub use blob::{BlobBackend, BlobListing};
pub use document::DocumentBackend;
pub use host::{
    EventPayload, ExternalResult, HostContext, HostEventSink, HostJob, HostScheduler, PayloadKind,
};
pub use identity::{
    ExternalIdentityProvider, IdentityBackend, ProviderCredential, SignInIntent, UserProfile,
};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use record::{Record, Value};
