use super::naming::rotated_path;
use crate::clock::PeriodClock;
use crate::domain::SuffixFormat;
use chrono::{DateTime, TimeZone};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Renames live log files to the suffix of the period that just ended.
#[derive(Debug, Clone)]
pub struct Rotator {
    clock: PeriodClock,
    format: SuffixFormat,
}

impl Rotator {
    #[must_use]
    pub const fn new(clock: PeriodClock, format: SuffixFormat) -> Self {
        Self { clock, format }
    }

    /// Rotate every path and return how many were renamed.
    pub async fn rotate<'a, I, Tz>(&self, paths: I, now: &DateTime<Tz>) -> usize
    where
        I: IntoIterator<Item = &'a PathBuf>,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let suffix = self.clock.suffix(now, -1, &self.format);
        let mut rotated = 0;

        for path in paths {
            if rotate_one(path, &suffix).await {
                rotated += 1;
            }
        }

        rotated
    }
}

async fn rotate_one(path: &Path, suffix: &str) -> bool {
    match fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => {
            debug!("Log file {path:?} does not exist, nothing to rotate");
            return false;
        }
        Err(e) => {
            error!("Failed to stat {path:?}: {e}");
            return false;
        }
    }

    let destination = rotated_path(path, suffix);
    match fs::symlink_metadata(&destination).await {
        Ok(_) => {
            warn!("Rotated file {destination:?} already exists, skipping {path:?}");
            return false;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            error!("Failed to stat {destination:?}: {e}");
            return false;
        }
    }

    match fs::rename(path, &destination).await {
        Ok(()) => {
            info!("Rotated {path:?} to {destination:?}");
            true
        }
        Err(e) => {
            error!("Failed to rename {path:?} to {destination:?}: {e}");
            false
        }
    }
}
