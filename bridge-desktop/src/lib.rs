//! # Desktop Bridge Implementations
//!
//! Implementations of the bridge traits for desktop harnesses and tests.
//!
//! ## Overview
//!
//! - `MainThreadScheduler`: dedicated thread standing in for the host main loop
//! - `InlineScheduler`: runs jobs on the caller's thread
//! - `ChannelEventSink`: delivers signals into a tokio channel
//! - `StaticHostContext`: fixed resources, records UI launches
//! - `InMemoryIdentityBackend` / `ScriptedIdentityProvider`: identity without a network
//! - `InMemoryDocumentStore`: collections held in memory
//! - `LocalBlobStore`: blob paths mapped onto a local directory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ChannelEventSink, InMemoryDocumentStore, LocalBlobStore};
//!
//! let (sink, mut signals) = ChannelEventSink::new();
//! let config = GatewayConfig::builder()
//!     .event_sink(Arc::new(sink))
//!     .document_backend(Arc::new(InMemoryDocumentStore::new()))
//!     .blob_backend(Arc::new(LocalBlobStore::new("/tmp/bucket")))
//!     // ...
//!     .build()?;
//! ```

mod blobs;
mod documents;
mod host;
mod identity;
mod scheduler;

pub use blobs::{LocalBlobStore, OBJECT_NOT_FOUND};
pub use documents::InMemoryDocumentStore;
pub use host::{ChannelEventSink, HostSignal, StaticHostContext};
pub use identity::{
    InMemoryIdentityBackend, ScriptedIdentityProvider, EMAIL_IN_USE, MISSING_ID_TOKEN,
    NO_CURRENT_USER, USER_NOT_FOUND, WEAK_PASSWORD, WRONG_PASSWORD,
};
pub use scheduler::{InlineScheduler, MainThreadScheduler, HOST_THREAD_NAME};
