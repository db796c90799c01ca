// ABOUTME: Background idle reaper for a PoolManager with an explicit shutdown handle
// ABOUTME: Runs reap() every idle_ttl / 2 until stopped or until the pool itself is dropped
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::factory::ConnectionFactory;
use super::manager::PoolManager;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Owner's handle on a running reaper task
///
/// Dropping the handle closes the shutdown channel, which also stops the task;
/// call [`shutdown`](Self::shutdown) to wait for it to finish.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signal the reaper to stop and wait for it to exit
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            debug!(error = ?e, "Reaper already stopped before shutdown signal");
        }
        if let Err(e) = self.task.await {
            warn!(error = %e, "Reaper task ended abnormally");
        }
    }

    /// Whether the task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<F: ConnectionFactory> PoolManager<F> {
    /// Spawn the idle reaper on the current tokio runtime
    ///
    /// The task only keeps a weak reference to the pool and exits on its own
    /// once the last `Arc` is gone.
    #[must_use = "dropping the handle stops the reaper"]
    pub fn spawn_reaper(self: &Arc<Self>) -> ReaperHandle {
        let period = self.config().reap_interval();
        let pool = Arc::downgrade(self);
        let connector = self.factory().kind().to_owned();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(connector = %connector, period = ?period, "Pool reaper started");
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let Some(pool) = pool.upgrade() else {
                            debug!(connector = %connector, "Pool dropped, reaper exiting");
                            break;
                        };
                        pool.reap().await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!(connector = %connector, "Pool reaper received shutdown signal");
                        break;
                    }
                }
            }
        });

        ReaperHandle { shutdown_tx, task }
    }
}
