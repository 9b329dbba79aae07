//! # Firestore Manager
//!
//! Each operation issues one [`DocumentBackend`] call on the runtime and
//! reports exactly one event:
//!
//! | Operation | Success | Failure |
//! |-----------|---------|---------|
//! | `write_document` | `firestore_write_success(id)` | `firestore_failure` |
//! | `get_document` | `firestore_get_success(record)` | `firestore_failure` |
//! | `update_document` | `firestore_update_success(id)` | `firestore_failure` |
//! | `delete_document` | `firestore_delete_success(id)` | `firestore_failure` |
//!
//! ```ignore
//! let firestore = FirestoreManager::new(backend, dispatcher, runtime);
//! firestore.write_document("scores", None, Record::new().with("points", 120_i64));
//! ```

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{DocumentBackend, Record};
use core_runtime::dispatcher::EventDispatcher;
use core_runtime::events::{EventDescriptor, FirestoreEvent};
use core_runtime::outcome::{capture, Outcome};
use core_runtime::OperationHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info_span, instrument, warn, Instrument};

use crate::error::FirestoreError;

pub struct FirestoreManager {
    backend: Arc<dyn DocumentBackend>,
    dispatcher: EventDispatcher,
    runtime: Handle,
}

impl FirestoreManager {
    pub fn new(backend: Arc<dyn DocumentBackend>, dispatcher: EventDispatcher, runtime: Handle) -> Self {
        Self {
            backend,
            dispatcher,
            runtime,
        }
    }

    /// Events this adapter can emit.
    pub fn describe_events() -> Vec<EventDescriptor> {
        FirestoreEvent::descriptors()
    }

    /// Create or fully replace a document.
    ///
    /// Without a document id (or with an empty one) the backend allocates
    /// one, and that allocated id is what `firestore_write_success` carries.
    #[instrument(skip(self, data), fields(fields = data.len()))]
    pub fn write_document(
        &self,
        collection: &str,
        document_id: Option<&str>,
        data: Record,
    ) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let collection = collection.to_string();

        match document_id.filter(|id| !id.is_empty()) {
            None => self.spawn_operation(
                "addDocument",
                async move { backend.add(&collection, data).await },
                |document_id| Ok(FirestoreEvent::WriteSuccess { document_id }),
            ),
            Some(document_id) => {
                let document_id = document_id.to_string();
                let reported = document_id.clone();
                self.spawn_operation(
                    "setDocument",
                    async move { backend.set(&collection, &document_id, data).await },
                    move |()| {
                        Ok(FirestoreEvent::WriteSuccess {
                            document_id: reported,
                        })
                    },
                )
            }
        }
    }

    #[instrument(skip(self))]
    pub fn get_document(&self, collection: &str, document_id: &str) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let collection = collection.to_string();
        let document_id = document_id.to_string();

        self.spawn_operation(
            "getDocument",
            async move { backend.get(&collection, &document_id).await },
            |document| match document {
                Some(data) => Ok(FirestoreEvent::GetSuccess { data }),
                None => Err(FirestoreError::NotFound),
            },
        )
    }

    /// Merge `data` into an existing document.
    #[instrument(skip(self, data), fields(fields = data.len()))]
    pub fn update_document(&self, collection: &str, document_id: &str, data: Record) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let collection = collection.to_string();
        let document_id = document_id.to_string();
        let reported = document_id.clone();

        self.spawn_operation(
            "updateDocument",
            async move { backend.update(&collection, &document_id, data).await },
            move |()| {
                Ok(FirestoreEvent::UpdateSuccess {
                    document_id: reported,
                })
            },
        )
    }

    #[instrument(skip(self))]
    pub fn delete_document(&self, collection: &str, document_id: &str) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let collection = collection.to_string();
        let document_id = document_id.to_string();
        let reported = document_id.clone();

        self.spawn_operation(
            "deleteDocument",
            async move { backend.delete(&collection, &document_id).await },
            move |()| {
                Ok(FirestoreEvent::DeleteSuccess {
                    document_id: reported,
                })
            },
        )
    }

    /// Run `call`, then turn its value into the success event via `settle`.
    /// Backend failures are prefixed with the operation name.
    fn spawn_operation<T, Fut, S>(&self, operation: &'static str, call: Fut, settle: S) -> OperationHandle
    where
        T: Send + 'static,
        Fut: Future<Output = BridgeResult<T>> + Send + 'static,
        S: FnOnce(T) -> Result<FirestoreEvent, FirestoreError> + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();

        self.runtime.spawn(
            async move {
                let outcome = capture(call)
                    .await
                    .map_failure(|reason| FirestoreError::backend(operation, reason).to_string());

                let event = match outcome {
                    Outcome::Success(value) => match settle(value) {
                        Ok(event) => event,
                        Err(error) => FirestoreEvent::Failure {
                            reason: error.to_string(),
                        },
                    },
                    Outcome::Failure(reason) => FirestoreEvent::Failure { reason },
                };

                match &event {
                    FirestoreEvent::Failure { reason } => {
                        warn!(operation, reason = %reason, "Document operation failed")
                    }
                    _ => debug!(operation, "Document operation succeeded"),
                }
                dispatcher.emit(event).ok();
            }
            .instrument(info_span!("document_operation", operation)),
        )
    }
}
