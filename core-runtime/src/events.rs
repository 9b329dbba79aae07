//! # Event Catalog and Event Bus
//!
//! Every host-visible event the gateway can emit is declared here, together
//! with the payload shape it carries. Hosts bind their listeners against the
//! catalog before any operation runs, so the set is static and enumerable.
//!
//! ## Overview
//!
//! - **Event Types**: one enum per subsystem ([`AuthEvent`], [`FirestoreEvent`],
//!   [`StorageEvent`]) wrapped by [`CoreEvent`]. Each variant maps to exactly
//!   one catalog name and one [`EventPayload`].
//! - **Event Catalog**: [`EventCatalog`] merges the per-subsystem
//!   [`EventDescriptor`] sets and rejects duplicate names.
//! - **EventBus**: in-process broadcast tap. The dispatcher publishes every
//!   delivered event to it so Rust-side observers (tests, diagnostics) can
//!   follow along without touching the host binding.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Auth adapter ├──────┐
//! └──────────────┘      │            ┌────────────┐  post   ┌────────────────┐
//! ┌──────────────┐      │  emit      │            ├────────>│ HostScheduler  │
//! │ Firestore    ├──────┼───────────>│ Dispatcher │         │  └ emit_signal │
//! └──────────────┘      │            │            │         │  └ EventBus    │
//! ┌──────────────┐      │            └────────────┘         └────────────────┘
//! │ Storage      ├──────┘
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Building the catalog
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, EventCatalog, FirestoreEvent, StorageEvent};
//!
//! let catalog = EventCatalog::from_subsystems([
//!     AuthEvent::descriptors(),
//!     FirestoreEvent::descriptors(),
//!     StorageEvent::descriptors(),
//! ])
//! .unwrap();
//!
//! assert!(catalog.contains("auth_success"));
//! assert!(catalog.contains("storage_list_success"));
//! ```
//!
//! ### Subscribing to the tap
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, StorageEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Storage(StorageEvent::DeleteCompleted { success: true }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.name(), "storage_delete_success");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The bus uses `tokio::sync::broadcast`:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: all senders dropped, treat as shutdown.
//!
//! Host delivery never depends on the bus; a lagging observer cannot drop a
//! host event.

use bridge_traits::host::{EventPayload, PayloadKind};
use bridge_traits::record::Record;
use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

use crate::error::{Error, Result};

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Catalog event names.
pub mod names {
    pub const AUTH_SUCCESS: &str = "auth_success";
    pub const AUTH_FAILURE: &str = "auth_failure";
    pub const SIGN_OUT_SUCCESS: &str = "sign_out_success";
    pub const EMAIL_VERIFICATION_SENT: &str = "email_verification_sent";
    pub const PASSWORD_RESET_SENT: &str = "password_reset_sent";
    pub const USER_DELETED: &str = "user_deleted";

    pub const FIRESTORE_WRITE_SUCCESS: &str = "firestore_write_success";
    pub const FIRESTORE_GET_SUCCESS: &str = "firestore_get_success";
    pub const FIRESTORE_UPDATE_SUCCESS: &str = "firestore_update_success";
    pub const FIRESTORE_DELETE_SUCCESS: &str = "firestore_delete_success";
    pub const FIRESTORE_FAILURE: &str = "firestore_failure";

    pub const STORAGE_UPLOAD_SUCCESS: &str = "storage_upload_success";
    pub const STORAGE_DOWNLOAD_SUCCESS: &str = "storage_download_success";
    pub const STORAGE_DELETE_SUCCESS: &str = "storage_delete_success";
    pub const STORAGE_LIST_SUCCESS: &str = "storage_list_success";
    pub const STORAGE_FAILURE: &str = "storage_failure";
}

// ============================================================================
// Event Catalog
// ============================================================================

/// One entry of the event catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EventDescriptor {
    pub name: &'static str,
    pub payload: PayloadKind,
}

impl EventDescriptor {
    pub const fn new(name: &'static str, payload: PayloadKind) -> Self {
        Self { name, payload }
    }
}

/// Merged, duplicate-free registry of every event the gateway can emit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCatalog {
    descriptors: Vec<EventDescriptor>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge several subsystem descriptor sets, failing on the first
    /// duplicate name.
    pub fn from_subsystems<I>(subsystems: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<EventDescriptor>>,
    {
        let mut catalog = Self::new();
        for descriptors in subsystems {
            catalog.merge(descriptors)?;
        }
        Ok(catalog)
    }

    /// Add a subsystem's descriptors. Nothing is added if any name collides.
    pub fn merge(&mut self, descriptors: Vec<EventDescriptor>) -> Result<()> {
        for (index, descriptor) in descriptors.iter().enumerate() {
            let seen_earlier = descriptors[..index]
                .iter()
                .any(|other| other.name == descriptor.name);
            if seen_earlier || self.contains(descriptor.name) {
                return Err(Error::DuplicateEvent {
                    name: descriptor.name.to_string(),
                });
            }
        }
        self.descriptors.extend(descriptors);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    pub fn descriptor(&self, name: &str) -> Option<&EventDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// `true` when `name` is declared with exactly this payload kind.
    pub fn accepts(&self, name: &str, payload: PayloadKind) -> bool {
        self.descriptor(name).map_or(false, |d| d.payload == payload)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Declarative listing for hosts: `[{"name": ..., "payload": ...}]`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.descriptors
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.name,
                        "payload": d.payload.as_str(),
                    })
                })
                .collect(),
        )
    }
}

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all subsystems.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Auth(AuthEvent),
    Firestore(FirestoreEvent),
    Storage(StorageEvent),
}

impl CoreEvent {
    /// Catalog name the host sees.
    pub fn name(&self) -> &'static str {
        match self {
            CoreEvent::Auth(e) => e.name(),
            CoreEvent::Firestore(e) => e.name(),
            CoreEvent::Storage(e) => e.name(),
        }
    }

    /// Payload handed to the host together with [`name`](Self::name).
    pub fn payload(&self) -> EventPayload {
        match self {
            CoreEvent::Auth(e) => e.payload(),
            CoreEvent::Firestore(e) => e.payload(),
            CoreEvent::Storage(e) => e.payload(),
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Firestore(e) => e.description(),
            CoreEvent::Storage(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::Failure { .. })
            | CoreEvent::Firestore(FirestoreEvent::Failure { .. })
            | CoreEvent::Storage(StorageEvent::Failure { .. }) => EventSeverity::Error,
            other if other.payload() == EventPayload::Boolean(false) => EventSeverity::Warning,
            _ => EventSeverity::Info,
        }
    }
}

impl From<AuthEvent> for CoreEvent {
    fn from(event: AuthEvent) -> Self {
        CoreEvent::Auth(event)
    }
}

impl From<FirestoreEvent> for CoreEvent {
    fn from(event: FirestoreEvent) -> Self {
        CoreEvent::Firestore(event)
    }
}

impl From<StorageEvent> for CoreEvent {
    fn from(event: StorageEvent) -> Self {
        CoreEvent::Storage(event)
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Events emitted by the identity adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A sign-in or account creation completed. Carries the current user.
    Success { user: Record },
    /// Any identity operation failed.
    Failure { reason: String },
    SignOut { success: bool },
    EmailVerificationSent { success: bool },
    PasswordResetSent { success: bool },
    UserDeleted { success: bool },
}

impl AuthEvent {
    pub fn descriptors() -> Vec<EventDescriptor> {
        vec![
            EventDescriptor::new(names::AUTH_SUCCESS, PayloadKind::StructuredRecord),
            EventDescriptor::new(names::AUTH_FAILURE, PayloadKind::Text),
            EventDescriptor::new(names::SIGN_OUT_SUCCESS, PayloadKind::Boolean),
            EventDescriptor::new(names::EMAIL_VERIFICATION_SENT, PayloadKind::Boolean),
            EventDescriptor::new(names::PASSWORD_RESET_SENT, PayloadKind::Boolean),
            EventDescriptor::new(names::USER_DELETED, PayloadKind::Boolean),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::Success { .. } => names::AUTH_SUCCESS,
            AuthEvent::Failure { .. } => names::AUTH_FAILURE,
            AuthEvent::SignOut { .. } => names::SIGN_OUT_SUCCESS,
            AuthEvent::EmailVerificationSent { .. } => names::EMAIL_VERIFICATION_SENT,
            AuthEvent::PasswordResetSent { .. } => names::PASSWORD_RESET_SENT,
            AuthEvent::UserDeleted { .. } => names::USER_DELETED,
        }
    }

    pub fn payload(&self) -> EventPayload {
        match self {
            AuthEvent::Success { user } => EventPayload::Record(user.clone()),
            AuthEvent::Failure { reason } => EventPayload::Text(reason.clone()),
            AuthEvent::SignOut { success }
            | AuthEvent::EmailVerificationSent { success }
            | AuthEvent::PasswordResetSent { success }
            | AuthEvent::UserDeleted { success } => EventPayload::Boolean(*success),
        }
    }

    fn description(&self) -> &str {
        match self {
            AuthEvent::Success { .. } => "User signed in successfully",
            AuthEvent::Failure { .. } => "Authentication error",
            AuthEvent::SignOut { .. } => "Sign-out finished",
            AuthEvent::EmailVerificationSent { .. } => "Verification e-mail request finished",
            AuthEvent::PasswordResetSent { .. } => "Password reset e-mail request finished",
            AuthEvent::UserDeleted { .. } => "Account deletion finished",
        }
    }
}

// ============================================================================
// Document Store Events
// ============================================================================

/// Events emitted by the document-store adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum FirestoreEvent {
    /// Carries the identifier actually written (allocated by the backend
    /// when the caller supplied none).
    WriteSuccess { document_id: String },
    GetSuccess { data: Record },
    UpdateSuccess { document_id: String },
    DeleteSuccess { document_id: String },
    Failure { reason: String },
}

impl FirestoreEvent {
    pub fn descriptors() -> Vec<EventDescriptor> {
        vec![
            EventDescriptor::new(names::FIRESTORE_WRITE_SUCCESS, PayloadKind::Text),
            EventDescriptor::new(names::FIRESTORE_GET_SUCCESS, PayloadKind::StructuredRecord),
            EventDescriptor::new(names::FIRESTORE_UPDATE_SUCCESS, PayloadKind::Text),
            EventDescriptor::new(names::FIRESTORE_DELETE_SUCCESS, PayloadKind::Text),
            EventDescriptor::new(names::FIRESTORE_FAILURE, PayloadKind::Text),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FirestoreEvent::WriteSuccess { .. } => names::FIRESTORE_WRITE_SUCCESS,
            FirestoreEvent::GetSuccess { .. } => names::FIRESTORE_GET_SUCCESS,
            FirestoreEvent::UpdateSuccess { .. } => names::FIRESTORE_UPDATE_SUCCESS,
            FirestoreEvent::DeleteSuccess { .. } => names::FIRESTORE_DELETE_SUCCESS,
            FirestoreEvent::Failure { .. } => names::FIRESTORE_FAILURE,
        }
    }

    pub fn payload(&self) -> EventPayload {
        match self {
            FirestoreEvent::WriteSuccess { document_id }
            | FirestoreEvent::UpdateSuccess { document_id }
            | FirestoreEvent::DeleteSuccess { document_id } => {
                EventPayload::Text(document_id.clone())
            }
            FirestoreEvent::GetSuccess { data } => EventPayload::Record(data.clone()),
            FirestoreEvent::Failure { reason } => EventPayload::Text(reason.clone()),
        }
    }

    fn description(&self) -> &str {
        match self {
            FirestoreEvent::WriteSuccess { .. } => "Document written",
            FirestoreEvent::GetSuccess { .. } => "Document read",
            FirestoreEvent::UpdateSuccess { .. } => "Document updated",
            FirestoreEvent::DeleteSuccess { .. } => "Document deleted",
            FirestoreEvent::Failure { .. } => "Document store error",
        }
    }
}

// ============================================================================
// Blob Store Events
// ============================================================================

/// Events emitted by the blob-store adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum StorageEvent {
    UploadCompleted { success: bool },
    DownloadCompleted { success: bool },
    DeleteCompleted { success: bool },
    /// Immediate children of the listed path.
    ListSuccess {
        files: Vec<String>,
        folders: Vec<String>,
    },
    Failure { reason: String },
}

impl StorageEvent {
    pub fn descriptors() -> Vec<EventDescriptor> {
        vec![
            EventDescriptor::new(names::STORAGE_UPLOAD_SUCCESS, PayloadKind::Boolean),
            EventDescriptor::new(names::STORAGE_DOWNLOAD_SUCCESS, PayloadKind::Boolean),
            EventDescriptor::new(names::STORAGE_DELETE_SUCCESS, PayloadKind::Boolean),
            EventDescriptor::new(names::STORAGE_LIST_SUCCESS, PayloadKind::StructuredRecord),
            EventDescriptor::new(names::STORAGE_FAILURE, PayloadKind::Text),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageEvent::UploadCompleted { .. } => names::STORAGE_UPLOAD_SUCCESS,
            StorageEvent::DownloadCompleted { .. } => names::STORAGE_DOWNLOAD_SUCCESS,
            StorageEvent::DeleteCompleted { .. } => names::STORAGE_DELETE_SUCCESS,
            StorageEvent::ListSuccess { .. } => names::STORAGE_LIST_SUCCESS,
            StorageEvent::Failure { .. } => names::STORAGE_FAILURE,
        }
    }

    pub fn payload(&self) -> EventPayload {
        match self {
            StorageEvent::UploadCompleted { success }
            | StorageEvent::DownloadCompleted { success }
            | StorageEvent::DeleteCompleted { success } => EventPayload::Boolean(*success),
            StorageEvent::ListSuccess { files, folders } => EventPayload::Record(
                Record::new()
                    .with("files", files.clone())
                    .with("folders", folders.clone()),
            ),
            StorageEvent::Failure { reason } => EventPayload::Text(reason.clone()),
        }
    }

    fn description(&self) -> &str {
        match self {
            StorageEvent::UploadCompleted { .. } => "Upload finished",
            StorageEvent::DownloadCompleted { .. } => "Download finished",
            StorageEvent::DeleteCompleted { .. } => "Blob deletion finished",
            StorageEvent::ListSuccess { .. } => "Listing retrieved",
            StorageEvent::Failure { .. } => "Blob store error",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// In-process broadcast tap for delivered events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> std::result::Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_catalog() -> EventCatalog {
        EventCatalog::from_subsystems([
            AuthEvent::descriptors(),
            FirestoreEvent::descriptors(),
            StorageEvent::descriptors(),
        ])
        .unwrap()
    }

    #[test]
    fn test_catalog_has_every_event() {
        let catalog = full_catalog();
        assert_eq!(catalog.len(), 16);
        assert!(catalog.accepts(names::AUTH_SUCCESS, PayloadKind::StructuredRecord));
        assert!(catalog.accepts(names::AUTH_FAILURE, PayloadKind::Text));
        assert!(catalog.accepts(names::USER_DELETED, PayloadKind::Boolean));
        assert!(catalog.accepts(names::FIRESTORE_WRITE_SUCCESS, PayloadKind::Text));
        assert!(catalog.accepts(
            names::STORAGE_LIST_SUCCESS,
            PayloadKind::StructuredRecord
        ));
        assert!(!catalog.accepts(names::STORAGE_FAILURE, PayloadKind::Boolean));
    }

    #[test]
    fn test_every_variant_matches_its_descriptor() {
        let catalog = full_catalog();
        let events: Vec<CoreEvent> = vec![
            AuthEvent::Success { user: Record::new() }.into(),
            AuthEvent::Failure { reason: "x".into() }.into(),
            AuthEvent::SignOut { success: true }.into(),
            AuthEvent::EmailVerificationSent { success: true }.into(),
            AuthEvent::PasswordResetSent { success: false }.into(),
            AuthEvent::UserDeleted { success: true }.into(),
            FirestoreEvent::WriteSuccess { document_id: "d".into() }.into(),
            FirestoreEvent::GetSuccess { data: Record::new() }.into(),
            FirestoreEvent::UpdateSuccess { document_id: "d".into() }.into(),
            FirestoreEvent::DeleteSuccess { document_id: "d".into() }.into(),
            FirestoreEvent::Failure { reason: "x".into() }.into(),
            StorageEvent::UploadCompleted { success: true }.into(),
            StorageEvent::DownloadCompleted { success: true }.into(),
            StorageEvent::DeleteCompleted { success: true }.into(),
            StorageEvent::ListSuccess {
                files: vec![],
                folders: vec![],
            }
            .into(),
            StorageEvent::Failure { reason: "x".into() }.into(),
        ];

        for event in events {
            assert!(
                catalog.accepts(event.name(), event.payload().kind()),
                "{} not accepted",
                event.name()
            );
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut catalog = EventCatalog::new();
        catalog.merge(AuthEvent::descriptors()).unwrap();

        let result = catalog.merge(vec![EventDescriptor::new(
            names::AUTH_FAILURE,
            PayloadKind::Text,
        )]);
        assert!(matches!(
            result,
            Err(Error::DuplicateEvent { ref name }) if name == "auth_failure"
        ));
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_duplicates_within_one_subsystem_are_rejected() {
        let result = EventCatalog::from_subsystems([vec![
            EventDescriptor::new("x", PayloadKind::None),
            EventDescriptor::new("x", PayloadKind::Text),
        ]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_catalog_json() {
        let json = full_catalog().to_json();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 16);
        assert_eq!(entries[0]["name"], "auth_success");
        assert_eq!(entries[0]["payload"], "StructuredRecord");
    }

    #[test]
    fn test_list_payload_shape() {
        let event = StorageEvent::ListSuccess {
            files: vec!["a.png".into(), "b.png".into()],
            folders: vec!["thumbs/".into()],
        };

        let EventPayload::Record(record) = event.payload() else {
            panic!("expected record payload");
        };
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["files", "folders"]);
        assert_eq!(
            record.get("folders").and_then(|v| v.as_text_list()),
            Some(&["thumbs/".to_string()][..])
        );
    }

    #[test]
    fn test_event_severity() {
        let failure = CoreEvent::Firestore(FirestoreEvent::Failure {
            reason: "Document does not exist".into(),
        });
        assert_eq!(failure.severity(), EventSeverity::Error);

        let negative = CoreEvent::Auth(AuthEvent::SignOut { success: false });
        assert_eq!(negative.severity(), EventSeverity::Warning);

        let positive = CoreEvent::Storage(StorageEvent::UploadCompleted { success: true });
        assert_eq!(positive.severity(), EventSeverity::Info);
    }

    #[test]
    fn test_event_description() {
        let event = CoreEvent::Auth(AuthEvent::Success { user: Record::new() });
        assert_eq!(event.description(), "User signed in successfully");
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::default();
        let event = CoreEvent::Auth(AuthEvent::SignOut { success: true });
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Firestore(FirestoreEvent::WriteSuccess {
            document_id: "doc-1".into(),
        });
        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Firestore(FirestoreEvent::DeleteSuccess {
                document_id: format!("doc-{}", i),
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Firestore(FirestoreEvent::WriteSuccess {
            document_id: "doc-123".into(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("doc-123"));
        assert!(json.contains("WriteSuccess"));
    }
}
