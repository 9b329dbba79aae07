//! Host schedulers for desktop harnesses and tests.

use bridge_traits::{
    error::{BridgeError, Result},
    host::{HostJob, HostScheduler},
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Name of the thread standing in for the host's main context.
pub const HOST_THREAD_NAME: &str = "host-main";

/// Dedicated thread that runs posted jobs one at a time, in posting order.
///
/// Plays the role of an engine main loop or a UI thread. The thread exits
/// once the scheduler (and every clone of its sender) is dropped.
pub struct MainThreadScheduler {
    sender: mpsc::UnboundedSender<HostJob>,
}

impl MainThreadScheduler {
    pub fn spawn() -> Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<HostJob>();

        thread::Builder::new()
            .name(HOST_THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    // A faulty listener must not take the host context down.
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("Host job panicked");
                    }
                }
                debug!("Host main context stopped");
            })?;

        debug!(thread = HOST_THREAD_NAME, "Host main context started");
        Ok(Self { sender })
    }
}

impl HostScheduler for MainThreadScheduler {
    fn post(&self, job: HostJob) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| BridgeError::NotAvailable("host main context has stopped".to_string()))
    }
}

/// Runs each job on the posting thread before `post` returns.
///
/// Only suitable when callers already run on the host context.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl HostScheduler for InlineScheduler {
    fn post(&self, job: HostJob) -> Result<()> {
        job();
        Ok(())
    }
}
