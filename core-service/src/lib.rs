//! Gateway façade and bootstrap helpers.
//!
//! [`GatewayService`] is the surface a host binds to: one method per
//! host-callable operation, the two lifecycle hooks, and the merged event
//! catalog. It owns no mapping logic; every call is forwarded to the adapter
//! that owns it.
//!
//! Desktop harnesses enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and can start from [`desktop::desktop_builder`].
//!
//! ```ignore
//! use core_service::GatewayService;
//! use core_runtime::config::GatewayConfig;
//!
//! let gateway = GatewayService::new(config)?;
//! for descriptor in gateway.catalog().iter() {
//!     host.register_signal(descriptor.name, descriptor.payload);
//! }
//! gateway.init(host_context);
//! gateway.sign_in_anonymously();
//! ```

pub mod error;

#[cfg(feature = "desktop-shims")]
pub mod desktop;

pub use error::{CoreError, Result};

use bridge_traits::{ExternalResult, HostContext, Record};
use core_auth::IdentityManager;
use core_firestore::FirestoreManager;
use core_runtime::config::GatewayConfig;
use core_runtime::dispatcher::EventDispatcher;
use core_runtime::events::{CoreEvent, EventCatalog, Receiver};
use core_runtime::OperationHandle;
use core_storage::StorageManager;
use std::sync::Arc;
use tracing::{info, instrument};

/// Primary façade exposed to host applications.
pub struct GatewayService {
    dispatcher: EventDispatcher,
    identity: IdentityManager,
    firestore: FirestoreManager,
    storage: StorageManager,
}

impl GatewayService {
    /// Name the gateway registers under with the host.
    pub const PLUGIN_NAME: &'static str = "Firebase";

    /// Build every adapter from `config` and merge their event catalogs.
    ///
    /// # Errors
    ///
    /// A duplicate event name across adapters is fatal
    /// (`core_runtime::Error::DuplicateEvent`).
    #[instrument(skip_all)]
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        let catalog = EventCatalog::from_subsystems([
            IdentityManager::describe_events(),
            FirestoreManager::describe_events(),
            StorageManager::describe_events(),
        ])?;
        info!(events = catalog.len(), "Event catalog assembled");

        let dispatcher = EventDispatcher::new(
            catalog,
            config.event_sink,
            config.scheduler,
            config.event_buffer_size,
        );
        let runtime = config.runtime_handle;

        let mut identity =
            IdentityManager::new(config.identity_backend, dispatcher.clone(), runtime.clone())?
                .with_client_id_resource(config.client_id_resource)
                .with_start_failure_reporting(config.report_external_sign_in_start_failures);
        if let Some(provider) = config.external_provider {
            identity = identity.with_external_provider(provider);
        }

        let firestore =
            FirestoreManager::new(config.document_backend, dispatcher.clone(), runtime.clone());
        let storage = StorageManager::new(config.blob_backend, dispatcher.clone(), runtime);

        Ok(Self {
            dispatcher,
            identity,
            firestore,
            storage,
        })
    }

    /// Every event this gateway can emit. Available before any operation.
    pub fn catalog(&self) -> &EventCatalog {
        self.dispatcher.catalog()
    }

    /// The catalog as `[{"name": ..., "payload": ...}]`.
    pub fn catalog_json(&self) -> serde_json::Value {
        self.catalog().to_json()
    }

    /// Observe delivered events in-process.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.dispatcher.subscribe()
    }

    // ------------------------------------------------------------------
    // Lifecycle hooks
    // ------------------------------------------------------------------

    pub fn init(&self, context: Arc<dyn HostContext>) {
        self.identity.init(context);
    }

    /// Route a result delivered by host-native UI. `None` when the request
    /// code belongs to some other flow.
    pub fn on_external_result(
        &self,
        request_code: i32,
        result: ExternalResult,
    ) -> Option<OperationHandle> {
        self.identity.on_external_result(request_code, result)
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn sign_in_anonymously(&self) -> OperationHandle {
        self.identity.sign_in_anonymously()
    }

    pub fn create_user_with_email_password(&self, email: &str, password: &str) -> OperationHandle {
        self.identity.create_user_with_email_password(email, password)
    }

    pub fn sign_in_with_email_password(&self, email: &str, password: &str) -> OperationHandle {
        self.identity.sign_in_with_email_password(email, password)
    }

    pub fn send_email_verification(&self) -> OperationHandle {
        self.identity.send_email_verification()
    }

    pub fn send_password_reset_email(&self, email: &str) -> OperationHandle {
        self.identity.send_password_reset_email(email)
    }

    pub fn sign_in_with_google(&self) {
        self.identity.sign_in_with_external_provider()
    }

    pub fn get_current_user(&self) -> Record {
        self.identity.current_user()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_signed_in()
    }

    pub fn sign_out(&self) -> OperationHandle {
        self.identity.sign_out()
    }

    pub fn delete_user(&self) -> OperationHandle {
        self.identity.delete_user()
    }

    // ------------------------------------------------------------------
    // Document store
    // ------------------------------------------------------------------

    pub fn firestore_add_or_set_document(
        &self,
        collection: &str,
        document_id: Option<&str>,
        data: Record,
    ) -> OperationHandle {
        self.firestore.write_document(collection, document_id, data)
    }

    pub fn firestore_get_document(&self, collection: &str, document_id: &str) -> OperationHandle {
        self.firestore.get_document(collection, document_id)
    }

    pub fn firestore_update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Record,
    ) -> OperationHandle {
        self.firestore.update_document(collection, document_id, data)
    }

    pub fn firestore_delete_document(&self, collection: &str, document_id: &str) -> OperationHandle {
        self.firestore.delete_document(collection, document_id)
    }

    // ------------------------------------------------------------------
    // Blob store
    // ------------------------------------------------------------------

    pub fn storage_upload(&self, path: &str, local_path: &str) -> OperationHandle {
        self.storage.upload(path, local_path)
    }

    pub fn storage_download(&self, path: &str, dest_path: &str) -> OperationHandle {
        self.storage.download(path, dest_path)
    }

    pub fn storage_delete(&self, path: &str) -> OperationHandle {
        self.storage.delete(path)
    }

    pub fn storage_list(&self, path: &str) -> OperationHandle {
        self.storage.list(path)
    }
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("plugin", &Self::PLUGIN_NAME)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
