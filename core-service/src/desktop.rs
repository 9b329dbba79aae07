//! Desktop bootstrap using the `bridge-desktop` shims.

use bridge_desktop::{
    ChannelEventSink, HostSignal, InMemoryDocumentStore, InMemoryIdentityBackend, LocalBlobStore,
    ScriptedIdentityProvider,
};
use core_runtime::config::{GatewayConfig, GatewayConfigBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Config builder wired to in-memory identity and documents, a local blob
/// directory and the scripted external provider.
///
/// The scheduler is left unset so `build()` starts a `MainThreadScheduler`.
/// Signals arrive on the returned receiver.
pub fn desktop_builder(
    bucket_root: impl Into<PathBuf>,
) -> (GatewayConfigBuilder, UnboundedReceiver<HostSignal>) {
    let (sink, signals) = ChannelEventSink::new();

    let builder = GatewayConfig::builder()
        .event_sink(Arc::new(sink))
        .identity_backend(Arc::new(InMemoryIdentityBackend::new()))
        .document_backend(Arc::new(InMemoryDocumentStore::new()))
        .blob_backend(Arc::new(LocalBlobStore::new(bucket_root)))
        .external_provider(Arc::new(ScriptedIdentityProvider::google()));

    (builder, signals)
}
