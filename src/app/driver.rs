//! Single task owning the scheduler.
//!
//! Ticks, child completions and reloads are all handled from one `select!`
//! loop, so the scheduler never sees two of them at once.

use super::runtime::Runtime;
use super::signal::Hangup;
use crate::process::ChildEvent;
use crate::scheduler::RotationScheduler;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct Driver {
    scheduler: RotationScheduler,
    events: mpsc::UnboundedReceiver<ChildEvent>,
    tick_interval: Duration,
    config_path: Option<PathBuf>,
}

impl Driver {
    #[must_use]
    pub fn new(
        scheduler: RotationScheduler,
        events: mpsc::UnboundedReceiver<ChildEvent>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            scheduler,
            events,
            tick_interval,
            config_path: None,
        }
    }

    /// Reload from `path` on SIGHUP.
    #[must_use]
    pub fn with_reload_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Spawn the loop. The handle yields the scheduler once `cancel_token`
    /// fires.
    #[must_use]
    pub fn spawn(self, cancel_token: CancellationToken) -> JoinHandle<RotationScheduler> {
        tokio::spawn(async move { self.run(cancel_token).await })
    }

    async fn run(mut self, cancel_token: CancellationToken) -> RotationScheduler {
        info!("Rotation driver started, tick every {:?}", self.tick_interval);
        self.scheduler.open(&Local::now()).await;

        let mut ticker = new_ticker(self.tick_interval);
        let mut hangup = Hangup::install();

        loop {
            tokio::select! {
                () = cancel_token.cancelled() => {
                    info!("Rotation driver received shutdown signal, stopping");
                    break;
                }
                Some(event) = self.events.recv() => {
                    self.scheduler.on_child_completed(&event);
                }
                _ = ticker.tick() => {
                    self.scheduler.tick(&Local::now()).await;
                }
                () = hangup.recv() => {
                    if let Some(tick_interval) = self.reload().await {
                        ticker = new_ticker(tick_interval);
                    }
                }
            }
        }

        info!("Rotation driver shutdown complete");
        self.scheduler
    }

    /// Returns the new tick interval when the reload was applied.
    async fn reload(&mut self) -> Option<Duration> {
        let path = self.config_path.clone()?;
        info!("Received SIGHUP, reloading configuration from {path:?}");

        let runtime = match Runtime::load(&path) {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Configuration reload failed, keeping the active configuration: {e}");
                return None;
            }
        };

        let Runtime {
            settings,
            rotation,
            files,
        } = runtime;
        self.scheduler
            .reload(rotation, files, settings.restart_after_catch_up, &Local::now())
            .await;
        self.tick_interval = settings.tick_interval();
        Some(self.tick_interval)
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
