//! Host context and event sink shims.

use bridge_traits::{
    error::{BridgeError, Result},
    host::{EventPayload, HostContext, HostEventSink},
    identity::SignInIntent,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A delivered signal: event name and payload.
pub type HostSignal = (String, EventPayload);

/// Forwards every signal into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<HostSignal>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostSignal>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl HostEventSink for ChannelEventSink {
    fn emit_signal(&self, name: &str, payload: EventPayload) {
        if self.sender.send((name.to_string(), payload)).is_err() {
            debug!(signal = name, "Signal receiver dropped");
        }
    }
}

/// Fixed string resources plus a log of UI launches.
///
/// Launches are recorded instead of opening any UI; tests then feed the
/// matching result back through the gateway's external-result hook.
#[derive(Debug, Default)]
pub struct StaticHostContext {
    resources: HashMap<String, String>,
    launches: Mutex<Vec<(SignInIntent, i32)>>,
    launch_failure: Option<String>,
}

impl StaticHostContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.resources.insert(name.into(), value.into());
        self
    }

    /// Make every launch fail with `reason`, like a device without the
    /// provider's UI services.
    pub fn with_launch_failure(mut self, reason: impl Into<String>) -> Self {
        self.launch_failure = Some(reason.into());
        self
    }

    pub fn launches(&self) -> Vec<(SignInIntent, i32)> {
        self.launches.lock().clone()
    }
}

impl HostContext for StaticHostContext {
    fn resource_string(&self, name: &str) -> Option<String> {
        self.resources.get(name).cloned()
    }

    fn start_activity_for_result(&self, intent: SignInIntent, request_code: i32) -> Result<()> {
        if let Some(reason) = &self.launch_failure {
            return Err(BridgeError::NotAvailable(reason.clone()));
        }
        info!(provider = %intent.provider_id, request_code, "Recorded sign-in UI launch");
        self.launches.lock().push((intent, request_code));
        Ok(())
    }
}
