//! Timer-driven polling task.
//!
//! Two states, Idle and Polling, embodied by the presence of a task handle.
//! A failed tick is logged and swallowed; the next tick retries
//! unconditionally. There is no backoff, the interval itself is the knob.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct Poller {
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling, replacing any running task (idempotent restart:
    /// exactly one timer survives, using the latest interval).
    ///
    /// The first tick fires one full `interval` after the call; the caller
    /// is expected to have done its initial fetch already.
    pub fn start<F, Fut>(&mut self, interval: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), String>> + Send,
    {
        self.stop();
        self.handle = Some(tokio::spawn(async move {
            let mut timer = time::interval_at(Instant::now() + interval, interval);
            loop {
                timer.tick().await;
                if let Err(e) = tick().await {
                    tracing::warn!(error = %e, "poll tick failed; retrying next tick");
                }
            }
        }));
        tracing::debug!(interval_secs = interval.as_secs(), "poller started");
    }

    /// Cancel the polling task. Safe to call from any state.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("poller stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Poller {
    // Teardown must not leave a live timer behind.
    fn drop(&mut self) {
        self.stop();
    }
}
