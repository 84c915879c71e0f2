//! The rotation state machine: Idle, Rotating, Idle.
//!
//! [`RotationScheduler`] owns its configuration, the file set and the
//! compression queue. It has two entry points, [`RotationScheduler::tick`]
//! and [`RotationScheduler::on_child_completed`], both taking `&mut self`,
//! so the caller serialises them.

mod latch;

pub use latch::ReadinessLatch;

use crate::compress::CompressionQueue;
use crate::config::RotationConfig;
use crate::domain::{LogFileSet, RestartMethod};
use crate::port::{CompressorSpawner, ReadinessProbe, RestartRequester};
use crate::process::ChildEvent;
use crate::rotation::{Pruner, Rotator, find_missed_rotations};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// External collaborators the scheduler drives.
pub struct Collaborators {
    pub readiness: Arc<dyn ReadinessProbe>,
    pub restarter: Arc<dyn RestartRequester>,
    pub spawner: Arc<dyn CompressorSpawner>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationState {
    pub is_rotating: bool,
    pub next_rotate_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Disabled,
    AlreadyRotating,
    NotReady,
    /// Nothing was due.
    Waiting,
    /// A scheduled rotation ran and renamed this many files.
    Rotated(usize),
}

/// Clears the rotating flag on every exit path.
struct RotatingGuard<'a>(&'a mut bool);

impl<'a> RotatingGuard<'a> {
    fn engage(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for RotatingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct RotationScheduler {
    config: RotationConfig,
    files: LogFileSet,
    state: RotationState,
    rotator: Rotator,
    pruner: Pruner,
    readiness: ReadinessLatch,
    restarter: Arc<dyn RestartRequester>,
    queue: CompressionQueue,
    restart_after_catch_up: bool,
    rescan_due: bool,
}

impl RotationScheduler {
    #[must_use]
    pub fn new(config: RotationConfig, files: LogFileSet, collaborators: Collaborators) -> Self {
        let Collaborators {
            readiness,
            restarter,
            spawner,
        } = collaborators;

        Self {
            rotator: rotator_for(&config),
            pruner: pruner_for(&config),
            queue: CompressionQueue::new(&config, spawner),
            readiness: ReadinessLatch::new(readiness),
            restarter,
            config,
            files,
            state: RotationState::default(),
            restart_after_catch_up: false,
            rescan_due: false,
        }
    }

    /// Request a restart when the startup catch-up renamed anything.
    #[must_use]
    pub fn with_restart_after_catch_up(mut self, enabled: bool) -> Self {
        self.restart_after_catch_up = enabled;
        self
    }

    /// Startup pass: prune, rotate stragglers, record the first due time and
    /// queue old rotations for compression without starting any child.
    ///
    /// Returns the number of files renamed by the catch-up.
    pub async fn open<Tz>(&mut self, now: &DateTime<Tz>) -> usize
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if !self.config.enabled {
            info!("Log rotation disabled");
            self.state.next_rotate_at = None;
            return 0;
        }
        info!("Operating on {} log files", self.files.len());

        self.pruner.prune(&self.files, now).await;

        let current_start = self.config.clock().boundary(now, 0);
        let missed = find_missed_rotations(&self.files, &current_start).await;
        let mut renamed = 0;
        if !missed.is_empty() {
            renamed = self.rotator.rotate(&missed, now).await;
            if renamed > 0 && self.restart_after_catch_up {
                request_restart(self.restarter.as_ref(), self.config.restart_method);
            }
        }

        self.record_next_rotate_time(now);
        self.queue.build(&self.files, now).await;
        renamed
    }

    pub async fn tick<Tz>(&mut self, now: &DateTime<Tz>) -> TickOutcome
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if !self.config.enabled {
            return TickOutcome::Disabled;
        }
        if self.state.is_rotating {
            return TickOutcome::AlreadyRotating;
        }
        if !self.readiness.check() {
            return TickOutcome::NotReady;
        }

        let mut outcome = TickOutcome::Waiting;
        match self.state.next_rotate_at {
            None => self.record_next_rotate_time(now),
            Some(next) if now.with_timezone(&Utc) >= next => {
                let renamed = self.rotate_all(now).await;
                self.rescan_due |= renamed > 0;
                outcome = TickOutcome::Rotated(renamed);
            }
            Some(_) => {}
        }

        if self.rescan_due && self.queue.is_idle() {
            self.rescan_due = false;
            self.queue.build(&self.files, now).await;
        }
        if self.queue.has_backlog() && self.queue.in_flight().is_none() {
            self.queue.advance();
        }

        outcome
    }

    async fn rotate_all<Tz>(&mut self, now: &DateTime<Tz>) -> usize
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let renamed = {
            let _guard = RotatingGuard::engage(&mut self.state.is_rotating);
            info!("Rotating {} log files", self.files.len());

            self.pruner.prune(&self.files, now).await;
            let renamed = self.rotator.rotate(&self.files, now).await;
            if renamed > 0 {
                request_restart(self.restarter.as_ref(), self.config.restart_method);
            }
            renamed
        };

        self.record_next_rotate_time(now);
        renamed
    }

    fn record_next_rotate_time<Tz>(&mut self, now: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let next = self.config.clock().boundary(now, 1);
        info!("Next log rotation at {next}");
        self.state.next_rotate_at = Some(next.with_timezone(&Utc));
    }

    /// Completion of a compressor child.
    pub fn on_child_completed(&mut self, event: &ChildEvent) {
        self.queue.on_child_completed(event);
    }

    /// Swap in a new configuration and file set, then run [`Self::open`] again.
    ///
    /// The readiness latch and any running compression are kept.
    pub async fn reload<Tz>(
        &mut self,
        config: RotationConfig,
        files: LogFileSet,
        restart_after_catch_up: bool,
        now: &DateTime<Tz>,
    ) -> usize
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.rotator = rotator_for(&config);
        self.pruner = pruner_for(&config);
        self.queue.update_settings(&config);
        self.config = config;
        self.files = files;
        self.restart_after_catch_up = restart_after_catch_up;
        self.open(now).await
    }

    #[must_use]
    pub const fn state(&self) -> &RotationState {
        &self.state
    }

    #[must_use]
    pub const fn next_rotate_at(&self) -> Option<DateTime<Utc>> {
        self.state.next_rotate_at
    }

    #[must_use]
    pub const fn config(&self) -> &RotationConfig {
        &self.config
    }

    #[must_use]
    pub const fn files(&self) -> &LogFileSet {
        &self.files
    }

    #[must_use]
    pub const fn queue(&self) -> &CompressionQueue {
        &self.queue
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}

fn rotator_for(config: &RotationConfig) -> Rotator {
    Rotator::new(config.clock(), config.format.clone())
}

fn pruner_for(config: &RotationConfig) -> Pruner {
    Pruner::new(
        config.clock(),
        config.format.clone(),
        config.keep,
        config.compress_suffix.clone(),
    )
}

fn request_restart(restarter: &dyn RestartRequester, method: RestartMethod) {
    info!("Requesting {method} restart so the host reopens its logs");
    if let Err(e) = restarter.request(method) {
        warn!("Restart request failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Interval, SuffixFormat};
    use crate::test_support::{MockSpawner, RecordingRestarter, ScriptedProbe};
    use chrono::TimeDelta;
    use tempfile::TempDir;

    struct Harness {
        scheduler: RotationScheduler,
        restarter: Arc<RecordingRestarter>,
        spawner: Arc<MockSpawner>,
        dir: TempDir,
    }

    fn harness(enabled: bool, probe: ScriptedProbe) -> Harness {
        let dir = TempDir::new().unwrap();
        let mut files = LogFileSet::new(Some(dir.path().to_path_buf()));
        files.push("access.log");
        let config = RotationConfig {
            enabled,
            interval: Interval::Daily,
            offset: TimeDelta::zero(),
            format: SuffixFormat::new("%Y%m%d").unwrap(),
            compress_after: 0,
            ..RotationConfig::default()
        };
        let restarter = Arc::new(RecordingRestarter::new());
        let spawner = Arc::new(MockSpawner::new());
        let scheduler = RotationScheduler::new(
            config,
            files,
            Collaborators {
                readiness: Arc::new(probe),
                restarter: restarter.clone(),
                spawner: spawner.clone(),
            },
        );
        Harness {
            scheduler,
            restarter,
            spawner,
            dir,
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_nothing() {
        let mut h = harness(false, ScriptedProbe::ready());
        std::fs::write(h.dir.path().join("access.log"), b"x").unwrap();

        assert_eq!(h.scheduler.open(&at(10, 15)).await, 0);
        assert_eq!(h.scheduler.next_rotate_at(), None);
        assert_eq!(h.scheduler.tick(&at(12, 0)).await, TickOutcome::Disabled);
        assert!(h.dir.path().join("access.log").exists());
    }

    #[tokio::test]
    async fn test_tick_waits_for_readiness() {
        let mut h = harness(true, ScriptedProbe::new([false, true]));
        h.scheduler.open(&at(10, 15)).await;

        assert_eq!(h.scheduler.tick(&at(11, 1)).await, TickOutcome::NotReady);
        assert!(matches!(
            h.scheduler.tick(&at(11, 1)).await,
            TickOutcome::Rotated(_)
        ));
    }

    #[tokio::test]
    async fn test_tick_before_due_time_waits() {
        let mut h = harness(true, ScriptedProbe::ready());
        std::fs::write(h.dir.path().join("access.log"), b"x").unwrap();
        h.scheduler.open(&at(10, 15)).await;

        assert_eq!(h.scheduler.tick(&at(10, 23)).await, TickOutcome::Waiting);
        assert!(h.restarter.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rotation_releases_guard_and_advances_due_time() {
        let mut h = harness(true, ScriptedProbe::ready());
        std::fs::write(h.dir.path().join("access.log"), b"x").unwrap();
        h.scheduler.open(&at(10, 15)).await;

        assert_eq!(h.scheduler.tick(&at(11, 0)).await, TickOutcome::Rotated(1));
        assert!(!h.scheduler.state().is_rotating);
        assert_eq!(h.scheduler.next_rotate_at(), Some(at(12, 0)));
        assert_eq!(h.restarter.requests(), vec![RestartMethod::Graceful]);
        assert!(h.dir.path().join("access.log.20240310").exists());
    }

    #[tokio::test]
    async fn test_nothing_renamed_means_no_restart() {
        let mut h = harness(true, ScriptedProbe::ready());
        h.scheduler.open(&at(10, 15)).await;

        assert_eq!(h.scheduler.tick(&at(11, 0)).await, TickOutcome::Rotated(0));
        assert!(h.restarter.requests().is_empty());
        assert!(!h.scheduler.state().is_rotating);
    }

    #[tokio::test]
    async fn test_failed_restart_request_does_not_stop_schedule() {
        let mut h = harness(true, ScriptedProbe::ready());
        h.restarter.set_should_fail(true);
        std::fs::write(h.dir.path().join("access.log"), b"x").unwrap();
        h.scheduler.open(&at(10, 15)).await;

        assert_eq!(h.scheduler.tick(&at(11, 0)).await, TickOutcome::Rotated(1));
        assert_eq!(h.scheduler.next_rotate_at(), Some(at(12, 0)));
    }

    #[tokio::test]
    async fn test_rotation_queues_new_files_for_compression() {
        let mut h = harness(true, ScriptedProbe::ready());
        let mut config = h.scheduler.config().clone();
        config.compress_after = 1;
        let files = h.scheduler.files().clone();
        h.scheduler.reload(config, files, false, &at(10, 15)).await;

        let log = h.dir.path().join("access.log");
        std::fs::write(&log, b"day 10").unwrap();
        h.scheduler.tick(&at(11, 0)).await;
        assert!(h.spawner.spawned().is_empty());

        std::fs::write(&log, b"day 11").unwrap();
        h.scheduler.tick(&at(12, 0)).await;
        assert_eq!(
            h.spawner.spawned(),
            vec![h.dir.path().join("access.log.20240310")]
        );
    }
}
