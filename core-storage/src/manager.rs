//! # Storage Manager
//!
//! Blob operations against a [`BlobBackend`], one spawned task per call.
//!
//! Local file paths are logged by basename only.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BlobBackend, BlobListing};
use core_runtime::dispatcher::EventDispatcher;
use core_runtime::events::{EventDescriptor, StorageEvent};
use core_runtime::logging::strip_path;
use core_runtime::outcome::{capture, Outcome};
use core_runtime::OperationHandle;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info_span, instrument, warn, Instrument};

use crate::error::StorageError;

pub struct StorageManager {
    backend: Arc<dyn BlobBackend>,
    dispatcher: EventDispatcher,
    runtime: Handle,
}

impl StorageManager {
    pub fn new(backend: Arc<dyn BlobBackend>, dispatcher: EventDispatcher, runtime: Handle) -> Self {
        Self {
            backend,
            dispatcher,
            runtime,
        }
    }

    /// Events this adapter can emit.
    pub fn describe_events() -> Vec<EventDescriptor> {
        StorageEvent::descriptors()
    }

    #[instrument(skip(self, local_path), fields(file = strip_path(local_path)))]
    pub fn upload(&self, path: &str, local_path: &str) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let path = path.to_string();
        let local_path = PathBuf::from(local_path);

        self.spawn_transfer(
            "upload",
            async move { backend.upload(&path, &local_path).await },
            |success| StorageEvent::UploadCompleted { success },
            StorageError::Upload,
        )
    }

    /// Download `path` into `dest_path`, replacing any existing file.
    #[instrument(skip(self, dest_path), fields(file = strip_path(dest_path)))]
    pub fn download(&self, path: &str, dest_path: &str) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let path = path.to_string();
        let dest_path = PathBuf::from(dest_path);

        self.spawn_transfer(
            "download",
            async move { backend.download(&path, &dest_path).await },
            |success| StorageEvent::DownloadCompleted { success },
            StorageError::Download,
        )
    }

    #[instrument(skip(self))]
    pub fn delete(&self, path: &str) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let path = path.to_string();

        self.spawn_transfer(
            "delete",
            async move { backend.delete(&path).await },
            |success| StorageEvent::DeleteCompleted { success },
            StorageError::Delete,
        )
    }

    /// List immediate children of `path`.
    #[instrument(skip(self))]
    pub fn list(&self, path: &str) -> OperationHandle {
        let backend = Arc::clone(&self.backend);
        let dispatcher = self.dispatcher.clone();
        let path = path.to_string();

        self.runtime.spawn(
            async move {
                let event = match capture(async move { backend.list_all(&path).await }).await {
                    Outcome::Success(BlobListing { items, prefixes }) => {
                        debug!(files = items.len(), folders = prefixes.len(), "Listing retrieved");
                        StorageEvent::ListSuccess {
                            files: items,
                            folders: prefixes,
                        }
                    }
                    Outcome::Failure(reason) => {
                        let reason = StorageError::List(reason).to_string();
                        warn!(reason = %reason, "Blob operation failed");
                        StorageEvent::Failure { reason }
                    }
                };
                dispatcher.emit(event).ok();
            }
            .instrument(info_span!("blob_operation", operation = "list")),
        )
    }

    /// Upload, download and delete share one reporting shape: the boolean
    /// event always, then `storage_failure` on failure.
    fn spawn_transfer<Fut>(
        &self,
        operation: &'static str,
        call: Fut,
        event: fn(bool) -> StorageEvent,
        failure: fn(String) -> StorageError,
    ) -> OperationHandle
    where
        Fut: Future<Output = BridgeResult<()>> + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();

        self.runtime.spawn(
            async move {
                match capture(call).await {
                    Outcome::Success(()) => {
                        debug!(operation, "Blob operation succeeded");
                        dispatcher.emit(event(true)).ok();
                    }
                    Outcome::Failure(reason) => {
                        let reason = failure(reason).to_string();
                        warn!(operation, reason = %reason, "Blob operation failed");
                        dispatcher.emit(event(false)).ok();
                        dispatcher.emit(StorageEvent::Failure { reason }).ok();
                    }
                }
            }
            .instrument(info_span!("blob_operation", operation)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::host::{EventPayload, HostEventSink, HostJob, HostScheduler};
    use bridge_traits::Value;
    use core_runtime::events::EventCatalog;
    use mockall::mock;
    use parking_lot::Mutex;
    use std::path::Path;

    mock! {
        Blobs {}

        #[async_trait]
        impl BlobBackend for Blobs {
            async fn upload(&self, path: &str, local_path: &Path) -> BridgeResult<()>;
            async fn download(&self, path: &str, dest_path: &Path) -> BridgeResult<()>;
            async fn delete(&self, path: &str) -> BridgeResult<()>;
            async fn list_all(&self, path: &str) -> BridgeResult<BlobListing>;
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        signals: Mutex<Vec<(String, EventPayload)>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<(String, EventPayload)> {
            std::mem::take(&mut *self.signals.lock())
        }
    }

    impl HostEventSink for RecordingSink {
        fn emit_signal(&self, name: &str, payload: EventPayload) {
            self.signals.lock().push((name.to_string(), payload));
        }
    }

    struct InlineScheduler;

    impl HostScheduler for InlineScheduler {
        fn post(&self, job: HostJob) -> BridgeResult<()> {
            job();
            Ok(())
        }
    }

    fn manager(backend: MockBlobs) -> (StorageManager, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let catalog = EventCatalog::from_subsystems([StorageManager::describe_events()]).unwrap();
        let dispatcher = EventDispatcher::new(catalog, sink.clone(), Arc::new(InlineScheduler), 16);
        (
            StorageManager::new(Arc::new(backend), dispatcher, Handle::current()),
            sink,
        )
    }

    #[tokio::test]
    async fn test_list_reports_files_and_folders() {
        let mut backend = MockBlobs::new();
        backend.expect_list_all().times(1).returning(|path| {
            assert_eq!(path, "images/");
            Ok(BlobListing {
                items: vec!["a.png".to_string(), "b.png".to_string()],
                prefixes: vec!["thumbs/".to_string()],
            })
        });

        let (manager, sink) = manager(backend);
        manager.list("images/").await.unwrap();

        let signals = sink.take();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, "storage_list_success");
        let EventPayload::Record(listing) = &signals[0].1 else {
            panic!("expected record payload");
        };
        assert_eq!(listing.keys().collect::<Vec<_>>(), vec!["files", "folders"]);
        assert_eq!(
            listing.get("files").and_then(Value::as_text_list),
            Some(&["a.png".to_string(), "b.png".to_string()][..])
        );
        assert_eq!(
            listing.get("folders").and_then(Value::as_text_list),
            Some(&["thumbs/".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_list_failure_has_no_boolean_event() {
        let mut backend = MockBlobs::new();
        backend
            .expect_list_all()
            .returning(|_| Err(BridgeError::backend("bucket not found")));

        let (manager, sink) = manager(backend);
        manager.list("missing/").await.unwrap();

        assert_eq!(
            sink.take(),
            vec![(
                "storage_failure".to_string(),
                EventPayload::Text("List failed: bucket not found".into())
            )]
        );
    }

    #[tokio::test]
    async fn test_upload_success() {
        let mut backend = MockBlobs::new();
        backend
            .expect_upload()
            .times(1)
            .returning(|path, local_path| {
                assert_eq!(path, "saves/slot1.dat");
                assert_eq!(local_path, Path::new("/data/user/0/saves/slot1.dat"));
                Ok(())
            });

        let (manager, sink) = manager(backend);
        manager
            .upload("saves/slot1.dat", "/data/user/0/saves/slot1.dat")
            .await
            .unwrap();

        assert_eq!(
            sink.take(),
            vec![(
                "storage_upload_success".to_string(),
                EventPayload::Boolean(true)
            )]
        );
    }

    #[tokio::test]
    async fn test_download_failure_reports_both_events() {
        let mut backend = MockBlobs::new();
        backend
            .expect_download()
            .returning(|_, _| Err(BridgeError::backend("Object does not exist at location.")));

        let (manager, sink) = manager(backend);
        manager.download("saves/none.dat", "/tmp/none.dat").await.unwrap();

        assert_eq!(
            sink.take(),
            vec![
                (
                    "storage_download_success".to_string(),
                    EventPayload::Boolean(false)
                ),
                (
                    "storage_failure".to_string(),
                    EventPayload::Text("Download failed: Object does not exist at location.".into())
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_failure_and_success() {
        let mut backend = MockBlobs::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BridgeError::backend("permission denied")));
        backend
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let (manager, sink) = manager(backend);
        manager.delete("a.png").await.unwrap();
        manager.delete("a.png").await.unwrap();

        assert_eq!(
            sink.take(),
            vec![
                (
                    "storage_delete_success".to_string(),
                    EventPayload::Boolean(false)
                ),
                (
                    "storage_failure".to_string(),
                    EventPayload::Text("Delete failed: permission denied".into())
                ),
                (
                    "storage_delete_success".to_string(),
                    EventPayload::Boolean(true)
                ),
            ]
        );
    }

    /// Panics while building the future, before anything is polled.
    struct CrashingBlobs;

    type BoxedCall<'a, T> =
        std::pin::Pin<Box<dyn std::future::Future<Output = BridgeResult<T>> + Send + 'a>>;

    #[async_trait]
    impl BlobBackend for CrashingBlobs {
        fn upload<'life0, 'life1, 'life2, 'async_trait>(
            &'life0 self,
            _path: &'life1 str,
            _local_path: &'life2 Path,
        ) -> BoxedCall<'async_trait, ()>
        where
            'life0: 'async_trait,
            'life1: 'async_trait,
            'life2: 'async_trait,
            Self: 'async_trait,
        {
            panic!("sdk crashed")
        }

        fn download<'life0, 'life1, 'life2, 'async_trait>(
            &'life0 self,
            _path: &'life1 str,
            _dest_path: &'life2 Path,
        ) -> BoxedCall<'async_trait, ()>
        where
            'life0: 'async_trait,
            'life1: 'async_trait,
            'life2: 'async_trait,
            Self: 'async_trait,
        {
            panic!("sdk crashed")
        }

        fn delete<'life0, 'life1, 'async_trait>(
            &'life0 self,
            _path: &'life1 str,
        ) -> BoxedCall<'async_trait, ()>
        where
            'life0: 'async_trait,
            'life1: 'async_trait,
            Self: 'async_trait,
        {
            panic!("sdk crashed")
        }

        fn list_all<'life0, 'life1, 'async_trait>(
            &'life0 self,
            _path: &'life1 str,
        ) -> BoxedCall<'async_trait, BlobListing>
        where
            'life0: 'async_trait,
            'life1: 'async_trait,
            Self: 'async_trait,
        {
            panic!("sdk crashed")
        }
    }

    #[tokio::test]
    async fn test_backend_crash_still_reports_every_operation() {
        let sink = Arc::new(RecordingSink::default());
        let catalog = EventCatalog::from_subsystems([StorageManager::describe_events()]).unwrap();
        let dispatcher = EventDispatcher::new(catalog, sink.clone(), Arc::new(InlineScheduler), 16);
        let manager = StorageManager::new(Arc::new(CrashingBlobs), dispatcher, Handle::current());

        manager.list("images/").await.unwrap();
        let signals = sink.take();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, "storage_failure");
        assert_eq!(
            signals[0].1,
            EventPayload::Text("List failed: sdk crashed".into())
        );

        manager.delete("images/a.png").await.unwrap();
        let names: Vec<_> = sink.take().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["storage_delete_success", "storage_failure"]);

        manager.upload("images/a.png", "/tmp/a.png").await.unwrap();
        let names: Vec<_> = sink.take().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["storage_upload_success", "storage_failure"]);
    }
}
