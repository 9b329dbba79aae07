//! # Event Dispatcher
//!
//! The single chokepoint between adapters and the host binding. Adapters call
//! [`EventDispatcher::emit`] from whatever worker their backend completed on;
//! the dispatcher validates the event against the catalog and posts one job to
//! the [`HostScheduler`]. Only that job ever touches the [`HostEventSink`].
//!
//! Delivery order is the scheduler's FIFO order, which is the order `emit` was
//! called in. Events are never batched or coalesced.

use bridge_traits::host::{HostEventSink, HostScheduler};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::events::{CoreEvent, EventBus, EventCatalog, EventSeverity, Receiver};

struct DispatcherInner {
    catalog: EventCatalog,
    sink: Arc<dyn HostEventSink>,
    scheduler: Arc<dyn HostScheduler>,
    bus: EventBus,
}

/// Cheap to clone; all clones share the same host binding.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

impl EventDispatcher {
    pub fn new(
        catalog: EventCatalog,
        sink: Arc<dyn HostEventSink>,
        scheduler: Arc<dyn HostScheduler>,
        buffer_size: usize,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                catalog,
                sink,
                scheduler,
                bus: EventBus::new(buffer_size),
            }),
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.inner.catalog
    }

    /// Hand an event to the host context. Never blocks on delivery.
    ///
    /// # Errors
    ///
    /// - [`Error::UndeclaredEvent`] if the name/payload pair is not in the catalog
    /// - [`Error::Internal`] if the host scheduler rejected the job
    ///
    /// Both cases are logged here; callers usually discard the result.
    pub fn emit(&self, event: impl Into<CoreEvent>) -> Result<()> {
        let event = event.into();
        let name = event.name();
        let payload = event.payload();

        if !self.inner.catalog.accepts(name, payload.kind()) {
            error!(
                event = name,
                payload = payload.kind().as_str(),
                "Refusing to emit event that is not declared in the catalog"
            );
            return Err(Error::UndeclaredEvent {
                name: name.to_string(),
            });
        }

        match event.severity() {
            EventSeverity::Error | EventSeverity::Warning => {
                debug!(event = name, description = event.description(), "Dispatching failure event")
            }
            _ => debug!(event = name, description = event.description(), "Dispatching event"),
        }

        let sink = Arc::clone(&self.inner.sink);
        let bus = self.inner.bus.clone();
        let job = Box::new(move || {
            sink.emit_signal(name, payload);
            // No observers is the normal case.
            let _ = bus.emit(event);
        });

        self.inner.scheduler.post(job).map_err(|e| {
            warn!(event = name, error = %e, "Host scheduler rejected event delivery");
            Error::Internal(format!("Failed to post '{}' to host context: {}", name, e))
        })
    }

    /// Observe delivered events in-process. Events arrive after the host
    /// sink has seen them.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.bus.subscribe()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("catalog_size", &self.inner.catalog.len())
            .field("bus", &self.inner.bus)
            .finish()
    }
}
