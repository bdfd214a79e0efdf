use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::core::connection_store::ConnectionStore;

enum PollEvent {
    Stop,
}

/// Periodically re-pulls the full connection list into a `ConnectionStore`.
///
/// The poll does not look at in-flight commands; it simply refreshes on every
/// tick and whatever it receives replaces the snapshot when it lands.
pub struct Poller;

/// Owns the background poll task.
///
/// `stop` ends the task after the refresh in progress (if any) completes.
pub struct PollerHandle {
    task_handle: tokio::task::JoinHandle<()>,
    stop_tx: mpsc::Sender<PollEvent>,
    interval: Duration,
}

impl Poller {
    /// Spawns the poll task. The first refresh runs immediately.
    ///
    /// Panics if `interval` is zero (as `tokio::time::interval` does).
    pub fn spawn(store: ConnectionStore, interval: Duration) -> PollerHandle {
        let (stop_tx, mut stop_rx) = mpsc::channel::<PollEvent>(1);

        let task_handle = tokio::spawn(async move {
            info!("Poll task started (every {:?}).", interval);
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    event = stop_rx.recv() => {
                        match event {
                            Some(PollEvent::Stop) => info!("Stop received. Exiting poll task."),
                            None => debug!("Poll handle dropped. Exiting poll task."),
                        }
                        break;
                    },
                    _ = ticker.tick() => {
                        debug!("Scheduled refresh");
                        // Failures are already in the activity log; the next
                        // tick is the retry.
                        let _ = store.refresh().await;
                    }
                }
            }
            info!("Poll task ended.");
        });

        PollerHandle {
            task_handle,
            stop_tx,
            interval,
        }
    }
}

impl PollerHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_finished(&self) -> bool {
        self.task_handle.is_finished()
    }

    /// Stops polling and waits for the task to exit.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(PollEvent::Stop).await;
        let _ = self.task_handle.await;
    }
}
