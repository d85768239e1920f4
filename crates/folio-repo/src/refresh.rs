//! Background cache refresh task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::repository::ManifestRepository;

/// Handle to the periodic refresh task; dropped or shut down on graceful
/// exit.
#[derive(Debug)]
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the refresh loop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }

    /// Abort without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl ManifestRepository {
    /// Refresh the cache once immediately, then on a fixed interval for the
    /// lifetime of the process. No backoff, no jitter: every tick fires
    /// regardless of the previous outcome, and failures only log (the
    /// repository keeps serving the stale cache).
    #[must_use]
    pub fn start_auto_refresh(self: &Arc<Self>) -> RefreshHandle {
        let repo = Arc::clone(self);
        let (shutdown, mut stop) = watch::channel(false);

        let task = tokio::spawn(async move {
            // The first tick completes immediately.
            let mut ticker = tokio::time::interval(repo.refresh_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // refresh_from_durable logs its own warning.
                        let _ = repo.refresh_from_durable().await;
                    }
                    _ = stop.changed() => {
                        tracing::debug!("auto-refresh task stopping");
                        break;
                    }
                }
            }
        });

        RefreshHandle { shutdown, task }
    }
}
