//! # Gateway Configuration Module
//!
//! Builder-based configuration for the operation result gateway.
//!
//! ## Overview
//!
//! `GatewayConfig` holds every bridge the gateway needs plus a handful of
//! settings. The builder fails fast: a missing capability is reported at
//! `build()` time with an actionable message, never at the first operation.
//!
//! ## Required Dependencies
//!
//! - `HostEventSink` - Receives host-visible events
//! - `IdentityBackend` - Identity service
//! - `DocumentBackend` - Document store
//! - `BlobBackend` - Blob store
//! - `HostScheduler` - Host event context (desktop default: `MainThreadScheduler`)
//!
//! ## Optional Dependencies
//!
//! - `ExternalIdentityProvider` - Without it, external sign-in is unavailable
//! - `tokio::runtime::Handle` - Defaults to the runtime `build()` is called from
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::GatewayConfig;
//! use std::sync::Arc;
//!
//! let config = GatewayConfig::builder()
//!     .event_sink(Arc::new(EngineSignals::new(plugin)))
//!     .scheduler(Arc::new(EngineMainThread::new(plugin)))
//!     .identity_backend(Arc::new(FirebaseAuthBridge::new()))
//!     .document_backend(Arc::new(FirestoreBridge::new()))
//!     .blob_backend(Arc::new(StorageBridge::new()))
//!     .external_provider(Arc::new(GoogleSignInBridge::new()))
//!     .build()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    BlobBackend, DocumentBackend, ExternalIdentityProvider, HostEventSink, HostScheduler,
    IdentityBackend,
};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Resource name of the pre-registered web client identifier.
pub const DEFAULT_CLIENT_ID_RESOURCE: &str = "default_web_client_id";

const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Gateway configuration. Use [`GatewayConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct GatewayConfig {
    pub event_sink: Arc<dyn HostEventSink>,
    pub scheduler: Arc<dyn HostScheduler>,
    pub identity_backend: Arc<dyn IdentityBackend>,
    pub document_backend: Arc<dyn DocumentBackend>,
    pub blob_backend: Arc<dyn BlobBackend>,
    pub external_provider: Option<Arc<dyn ExternalIdentityProvider>>,

    /// Runtime that backend futures are spawned on.
    pub runtime_handle: Handle,

    /// Host resource holding the external provider's client identifier.
    pub client_id_resource: String,

    /// Buffer size of the in-process event tap.
    pub event_buffer_size: usize,

    /// Emit `auth_failure` when the external sign-in UI cannot be launched.
    /// When `false`, the failure is only logged.
    pub report_external_sign_in_start_failures: bool,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("event_sink", &"HostEventSink { ... }")
            .field("scheduler", &"HostScheduler { ... }")
            .field("identity_backend", &"IdentityBackend { ... }")
            .field("document_backend", &"DocumentBackend { ... }")
            .field("blob_backend", &"BlobBackend { ... }")
            .field(
                "external_provider",
                &self
                    .external_provider
                    .as_ref()
                    .map(|p| format!("ExternalIdentityProvider({})", p.provider_id())),
            )
            .field("client_id_resource", &self.client_id_resource)
            .field("event_buffer_size", &self.event_buffer_size)
            .field(
                "report_external_sign_in_start_failures",
                &self.report_external_sign_in_start_failures,
            )
            .finish()
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Validates settings that do not depend on bridges.
    pub fn validate(&self) -> Result<()> {
        if self.client_id_resource.trim().is_empty() {
            return Err(Error::Config(
                "Client id resource name cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        Ok(())
    }
}

fn missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_scheduler() -> Result<Arc<dyn HostScheduler>> {
    use bridge_desktop::MainThreadScheduler;

    let scheduler = MainThreadScheduler::spawn().map_err(|e| {
        Error::Internal(format!("Failed to start default host scheduler: {}", e))
    })?;
    let scheduler: Arc<dyn HostScheduler> = Arc::new(scheduler);
    Ok(scheduler)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_scheduler() -> Result<Arc<dyn HostScheduler>> {
    Err(missing(
        "HostScheduler",
        "HostScheduler implementation is required to deliver events on the host's event context. \
         Desktop: enable the 'desktop-shims' feature to use MainThreadScheduler. \
         Engine plugins: post to the engine's main-thread dispatcher.",
    ))
}

/// Builder for [`GatewayConfig`].
#[derive(Default)]
pub struct GatewayConfigBuilder {
    event_sink: Option<Arc<dyn HostEventSink>>,
    scheduler: Option<Arc<dyn HostScheduler>>,
    identity_backend: Option<Arc<dyn IdentityBackend>>,
    document_backend: Option<Arc<dyn DocumentBackend>>,
    blob_backend: Option<Arc<dyn BlobBackend>>,
    external_provider: Option<Arc<dyn ExternalIdentityProvider>>,
    runtime_handle: Option<Handle>,
    client_id_resource: Option<String>,
    event_buffer_size: Option<usize>,
    report_external_sign_in_start_failures: Option<bool>,
}

impl GatewayConfigBuilder {
    pub fn event_sink(mut self, sink: Arc<dyn HostEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn HostScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn identity_backend(mut self, backend: Arc<dyn IdentityBackend>) -> Self {
        self.identity_backend = Some(backend);
        self
    }

    pub fn document_backend(mut self, backend: Arc<dyn DocumentBackend>) -> Self {
        self.document_backend = Some(backend);
        self
    }

    pub fn blob_backend(mut self, backend: Arc<dyn BlobBackend>) -> Self {
        self.blob_backend = Some(backend);
        self
    }

    pub fn external_provider(mut self, provider: Arc<dyn ExternalIdentityProvider>) -> Self {
        self.external_provider = Some(provider);
        self
    }

    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.runtime_handle = Some(handle);
        self
    }

    pub fn client_id_resource(mut self, name: impl Into<String>) -> Self {
        self.client_id_resource = Some(name.into());
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn report_external_sign_in_start_failures(mut self, enabled: bool) -> Self {
        self.report_external_sign_in_start_failures = Some(enabled);
        self
    }

    /// Builds the final `GatewayConfig`.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when a required bridge or the runtime is absent
    /// - `Config` when a setting is out of range
    pub fn build(self) -> Result<GatewayConfig> {
        let event_sink = self.event_sink.ok_or_else(|| {
            missing(
                "HostEventSink",
                "HostEventSink implementation is required to deliver events to the host. \
                 Use .event_sink() to inject the host's signal emitter.",
            )
        })?;

        let identity_backend = self.identity_backend.ok_or_else(|| {
            missing(
                "IdentityBackend",
                "IdentityBackend implementation is required for sign-in and account operations. \
                 Use .identity_backend() to inject it.",
            )
        })?;

        let document_backend = self.document_backend.ok_or_else(|| {
            missing(
                "DocumentBackend",
                "DocumentBackend implementation is required for document operations. \
                 Use .document_backend() to inject it.",
            )
        })?;

        let blob_backend = self.blob_backend.ok_or_else(|| {
            missing(
                "BlobBackend",
                "BlobBackend implementation is required for blob operations. \
                 Use .blob_backend() to inject it.",
            )
        })?;

        let runtime_handle = match self.runtime_handle {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| {
                missing(
                    "TokioRuntime",
                    "No Tokio runtime available to run backend calls. \
                     Call build() from within a runtime or use .runtime_handle().",
                )
            })?,
        };

        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => provide_default_scheduler()?,
        };

        let config = GatewayConfig {
            event_sink,
            scheduler,
            identity_backend,
            document_backend,
            blob_backend,
            external_provider: self.external_provider,
            runtime_handle,
            client_id_resource: self
                .client_id_resource
                .unwrap_or_else(|| DEFAULT_CLIENT_ID_RESOURCE.to_string()),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            report_external_sign_in_start_failures: self
                .report_external_sign_in_start_failures
                .unwrap_or(true),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::host::{EventPayload, HostJob};
    use bridge_traits::{BlobListing, ProviderCredential, Record, UserProfile};
    use std::path::Path;

    struct NullSink;
    impl HostEventSink for NullSink {
        fn emit_signal(&self, _name: &str, _payload: EventPayload) {}
    }

    struct InlineScheduler;
    impl HostScheduler for InlineScheduler {
        fn post(&self, job: HostJob) -> BridgeResult<()> {
            job();
            Ok(())
        }
    }

    struct NullIdentity;
    #[async_trait]
    impl IdentityBackend for NullIdentity {
        async fn sign_in_anonymously(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn create_user_with_email_password(&self, _: &str, _: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn sign_in_with_email_password(&self, _: &str, _: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn sign_in_with_credential(&self, _: ProviderCredential) -> BridgeResult<()> {
            Ok(())
        }
        async fn send_email_verification(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn send_password_reset_email(&self, _: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn delete_user(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn sign_out(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn current_user(&self) -> Option<UserProfile> {
            None
        }
    }

    struct NullDocuments;
    #[async_trait]
    impl DocumentBackend for NullDocuments {
        async fn add(&self, _: &str, _: Record) -> BridgeResult<String> {
            Ok("generated".to_string())
        }
        async fn set(&self, _: &str, _: &str, _: Record) -> BridgeResult<()> {
            Ok(())
        }
        async fn get(&self, _: &str, _: &str) -> BridgeResult<Option<Record>> {
            Ok(None)
        }
        async fn update(&self, _: &str, _: &str, _: Record) -> BridgeResult<()> {
            Ok(())
        }
        async fn delete(&self, _: &str, _: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullBlobs;
    #[async_trait]
    impl BlobBackend for NullBlobs {
        async fn upload(&self, _: &str, _: &Path) -> BridgeResult<()> {
            Ok(())
        }
        async fn download(&self, _: &str, _: &Path) -> BridgeResult<()> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn list_all(&self, _: &str) -> BridgeResult<BlobListing> {
            Ok(BlobListing::default())
        }
    }

    fn complete_builder() -> GatewayConfigBuilder {
        GatewayConfig::builder()
            .event_sink(Arc::new(NullSink))
            .scheduler(Arc::new(InlineScheduler))
            .identity_backend(Arc::new(NullIdentity))
            .document_backend(Arc::new(NullDocuments))
            .blob_backend(Arc::new(NullBlobs))
    }

    #[tokio::test]
    async fn test_builder_with_all_required_fields() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.client_id_resource, DEFAULT_CLIENT_ID_RESOURCE);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.report_external_sign_in_start_failures);
        assert!(config.external_provider.is_none());
    }

    #[tokio::test]
    async fn test_builder_requires_event_sink() {
        let result = GatewayConfig::builder()
            .scheduler(Arc::new(InlineScheduler))
            .identity_backend(Arc::new(NullIdentity))
            .document_backend(Arc::new(NullDocuments))
            .blob_backend(Arc::new(NullBlobs))
            .build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("HostEventSink"));
    }

    #[tokio::test]
    async fn test_builder_requires_document_backend() {
        let result = GatewayConfig::builder()
            .event_sink(Arc::new(NullSink))
            .scheduler(Arc::new(InlineScheduler))
            .identity_backend(Arc::new(NullIdentity))
            .blob_backend(Arc::new(NullBlobs))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "DocumentBackend"
        ));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[tokio::test]
    async fn test_builder_requires_scheduler_without_desktop_shims() {
        let result = GatewayConfig::builder()
            .event_sink(Arc::new(NullSink))
            .identity_backend(Arc::new(NullIdentity))
            .document_backend(Arc::new(NullDocuments))
            .blob_backend(Arc::new(NullBlobs))
            .build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("HostScheduler"));
    }

    #[test]
    fn test_builder_requires_runtime() {
        let result = complete_builder().build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "TokioRuntime"
        ));
    }

    #[test]
    fn test_builder_accepts_explicit_runtime_handle() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let config = complete_builder()
            .runtime_handle(runtime.handle().clone())
            .build();
        assert!(config.is_ok());
    }

    #[tokio::test]
    async fn test_event_buffer_size_bounds() {
        let zero = complete_builder().event_buffer_size(0).build();
        assert!(zero.unwrap_err().to_string().contains("greater than 0"));

        let huge = complete_builder().event_buffer_size(10_001).build();
        assert!(huge.unwrap_err().to_string().contains("exceeds maximum"));

        let max = complete_builder().event_buffer_size(10_000).build();
        assert!(max.is_ok());
    }

    #[tokio::test]
    async fn test_empty_client_id_resource_is_rejected() {
        let result = complete_builder().client_id_resource("  ").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_debug_hides_bridges() {
        let config = complete_builder()
            .report_external_sign_in_start_failures(false)
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("HostEventSink { ... }"));
        assert!(debug.contains("report_external_sign_in_start_failures: false"));
    }
}
