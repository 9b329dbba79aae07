//! Host Runtime Bridges
//!
//! Traits implemented by the host application runtime (game engine, mobile
//! shell, desktop harness). The gateway only ever talks to the host through
//! these three seams:
//!
//! - [`HostScheduler`] marshals work onto the single context the host
//!   consumes events on (its main/UI thread).
//! - [`HostEventSink`] delivers a named signal with its payload.
//! - [`HostContext`] resolves registered resources and launches host-native UI.

use serde::{Deserialize, Serialize};

use crate::{error::Result, identity::SignInIntent, record::Record};

/// Shape of the payload an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    None,
    Boolean,
    Text,
    StructuredRecord,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::None => "None",
            PayloadKind::Boolean => "Boolean",
            PayloadKind::Text => "Text",
            PayloadKind::StructuredRecord => "StructuredRecord",
        }
    }
}

/// Concrete payload handed to the host alongside an event name.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    None,
    Boolean(bool),
    Text(String),
    Record(Record),
}

impl EventPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            EventPayload::None => PayloadKind::None,
            EventPayload::Boolean(_) => PayloadKind::Boolean,
            EventPayload::Text(_) => PayloadKind::Text,
            EventPayload::Record(_) => PayloadKind::StructuredRecord,
        }
    }
}

/// Unit of work posted to the host context.
pub type HostJob = Box<dyn FnOnce() + Send + 'static>;

/// Single-context executor owned by the host.
///
/// Jobs must run one at a time, in the order they were posted. `post` must
/// not block on the job itself and may be called from any thread.
pub trait HostScheduler: Send + Sync {
    /// Queue a job. Returns [`BridgeError::NotAvailable`](crate::error::BridgeError::NotAvailable)
    /// once the host context is gone.
    fn post(&self, job: HostJob) -> Result<()>;
}

/// Receives host-visible events.
///
/// Only called from jobs running on the [`HostScheduler`], never directly
/// from a backend completion.
pub trait HostEventSink: Send + Sync {
    fn emit_signal(&self, name: &str, payload: EventPayload);
}

/// Host context supplied through the `init` lifecycle hook.
pub trait HostContext: Send + Sync {
    /// Look up a string resource registered with the host application.
    fn resource_string(&self, name: &str) -> Option<String>;

    /// Hand control to host-native UI. The outcome comes back later through
    /// the gateway's external-result hook, tagged with `request_code`.
    fn start_activity_for_result(&self, intent: SignInIntent, request_code: i32) -> Result<()>;
}

/// Result delivered by the host after host-native UI completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalResult {
    pub result_code: i32,
    pub data: Option<Record>,
}

impl ExternalResult {
    pub const RESULT_OK: i32 = -1;
    pub const RESULT_CANCELED: i32 = 0;

    pub fn ok(data: Record) -> Self {
        Self {
            result_code: Self::RESULT_OK,
            data: Some(data),
        }
    }

    pub fn canceled() -> Self {
        Self {
            result_code: Self::RESULT_CANCELED,
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result_code == Self::RESULT_OK
    }
}
