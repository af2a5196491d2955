//! Periodic background refresh.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::DEFAULT_REFRESH_INTERVAL_MS;

struct Run {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Run {
    /// Cancel the run and wait for its task, including any in-flight action.
    async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Auto-refresh task ended abnormally");
        }
    }
}

/// Invokes an action on a fixed interval until stopped.
///
/// At most one run exists at a time. Cancelling a run never interrupts an
/// action that is already executing; it only prevents further ticks.
#[derive(Default)]
pub struct AutoRefresher {
    run: Mutex<Option<Run>>,
}

impl AutoRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start calling `action` every `interval`, replacing any current run.
    ///
    /// The first call happens one interval after start. A zero interval
    /// falls back to the default refresh interval.
    pub async fn start<F, Fut>(&self, interval: Duration, action: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let interval = if interval.is_zero() {
            Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS)
        } else {
            interval
        };

        let mut current = self.run.lock().await;
        if let Some(previous) = current.take() {
            previous.stop().await;
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let first_tick = Instant::now() + interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                action().await;
            }
            debug!("Auto-refresh loop exited");
        });

        debug!(interval_ms = interval.as_millis() as u64, "Auto-refresh started");
        *current = Some(Run { token, handle });
    }

    /// Stop the current run, if any, and wait for it to finish.
    pub async fn stop(&self) {
        if let Some(run) = self.run.lock().await.take() {
            run.stop().await;
            debug!("Auto-refresh stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.run.lock().await.is_some()
    }
}
