use crate::clock::PeriodClock;
use crate::config::RotationConfig;
use crate::domain::SuffixFormat;
use crate::port::CompressorSpawner;
use crate::process::{ChildEvent, ChildExitReason};
use crate::rotation::{MAX_HISTORY, rotated_path};
use chrono::{DateTime, TimeZone};
use std::collections::VecDeque;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// The one compressor child currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub pid: u32,
    pub path: PathBuf,
}

/// Serial compression of rotated logs, one external process at a time.
///
/// The backlog is filled in scan order (per file, newest variant first) and
/// drained from the back, so the oldest variant is compressed first. Entries
/// leave the backlog before their process is spawned, so a path is never
/// handed to the compressor twice.
pub struct CompressionQueue {
    clock: PeriodClock,
    format: SuffixFormat,
    compress_after: u32,
    program: PathBuf,
    nice_level: i32,
    spawner: Arc<dyn CompressorSpawner>,
    backlog: Option<VecDeque<PathBuf>>,
    in_flight: Option<InFlight>,
}

impl CompressionQueue {
    #[must_use]
    pub fn new(config: &RotationConfig, spawner: Arc<dyn CompressorSpawner>) -> Self {
        Self {
            clock: config.clock(),
            format: config.format.clone(),
            compress_after: config.compress_after,
            program: config.compress_program.clone(),
            nice_level: config.nice_level,
            spawner,
            backlog: None,
            in_flight: None,
        }
    }

    /// Take new settings; a pending backlog and running job are kept.
    pub fn update_settings(&mut self, config: &RotationConfig) {
        self.clock = config.clock();
        self.format = config.format.clone();
        self.compress_after = config.compress_after;
        self.program = config.compress_program.clone();
        self.nice_level = config.nice_level;
    }

    /// Scan for uncompressed rotated variants older than the newest
    /// `compress_after` and queue them. Does nothing while work is pending.
    pub async fn build<'a, I, Tz>(&mut self, files: I, now: &DateTime<Tz>) -> usize
    where
        I: IntoIterator<Item = &'a PathBuf>,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if self.compress_after == 0 {
            info!("Log compression disabled");
            return 0;
        }
        if !self.is_idle() {
            debug!("Compression already pending, not rescanning");
            return 0;
        }

        let mut backlog = VecDeque::new();
        for file in files {
            let mut found = 0u32;
            for count in 0..=MAX_HISTORY {
                let suffix = self.clock.suffix(now, -count, &self.format);
                let candidate = rotated_path(file, &suffix);
                match fs::symlink_metadata(&candidate).await {
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => {
                        error!("Failed to stat {candidate:?}: {e}");
                        continue;
                    }
                }
                found += 1;
                if found > self.compress_after {
                    backlog.push_back(candidate);
                }
            }
        }

        let queued = backlog.len();
        if queued > 0 {
            info!("{queued} rotated logs queued for compression");
            self.backlog = Some(backlog);
        }
        queued
    }

    /// Start the next job unless one is already running.
    pub fn advance(&mut self) {
        if let Some(job) = &self.in_flight {
            debug!("Compress process {} still running for {:?}", job.pid, job.path);
            return;
        }
        let Some(backlog) = self.backlog.as_mut() else {
            return;
        };
        let Some(path) = backlog.pop_back() else {
            info!("Done compressing");
            self.backlog = None;
            return;
        };

        match self.spawner.spawn(&self.program, &path, self.nice_level) {
            Ok(pid) => {
                info!("Started compress, pid {pid}, {:?} {path:?}", self.program);
                self.in_flight = Some(InFlight { pid, path });
            }
            Err(e) => {
                error!("Dropping {path:?} from the compression queue: {e}");
                if backlog.is_empty() {
                    self.backlog = None;
                }
            }
        }
    }

    /// Completion notification for a compressor child.
    pub fn on_child_completed(&mut self, event: &ChildEvent) {
        if event.reason == ChildExitReason::Unregister {
            return;
        }
        let Some(job) = self.in_flight.take_if(|job| job.pid == event.pid) else {
            debug!("Ignoring exit of untracked child {}", event.pid);
            return;
        };

        let remaining = self.pending();
        if event.succeeded() {
            info!("Compress process {} done: OK, {remaining} left", job.pid);
        } else {
            warn!(
                "Compress process {} done: FAILED ({:?}, status {:?}) on {:?}, {remaining} left",
                job.pid, event.reason, event.exit_status, job.path
            );
        }

        self.advance();
    }

    /// Work remains to be started.
    #[must_use]
    pub fn has_backlog(&self) -> bool {
        self.backlog.is_some()
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.backlog.is_none() && self.in_flight.is_none()
    }

    /// Entries still waiting in the backlog.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.backlog.as_ref().map_or(0, VecDeque::len)
    }
}
