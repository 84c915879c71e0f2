use super::naming::{compressed_path, rotated_path};
use crate::clock::PeriodClock;
use crate::domain::SuffixFormat;
use chrono::{DateTime, TimeZone};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Oldest period inspected when walking back through rotated variants.
pub const MAX_HISTORY: i32 = 99;

/// Deletes rotated variants beyond the retention count.
#[derive(Debug, Clone)]
pub struct Pruner {
    clock: PeriodClock,
    format: SuffixFormat,
    keep: u32,
    compress_suffix: String,
}

impl Pruner {
    #[must_use]
    pub fn new(
        clock: PeriodClock,
        format: SuffixFormat,
        keep: u32,
        compress_suffix: impl Into<String>,
    ) -> Self {
        Self {
            clock,
            format,
            keep,
            compress_suffix: compress_suffix.into(),
        }
    }

    /// Returns the number of files removed.
    pub async fn prune<'a, I, Tz>(&self, files: I, now: &DateTime<Tz>) -> usize
    where
        I: IntoIterator<Item = &'a PathBuf>,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if self.keep == 0 {
            return 0;
        }

        let mut removed = 0;
        for file in files {
            removed += self.prune_file(file, now).await;
        }
        removed
    }

    async fn prune_file<Tz>(&self, file: &Path, now: &DateTime<Tz>) -> usize
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut found = 0u32;
        let mut removed = 0;

        for count in 1..=MAX_HISTORY {
            let suffix = self.clock.suffix(now, -count, &self.format);
            let variants = [
                rotated_path(file, &suffix),
                compressed_path(file, &suffix, &self.compress_suffix),
            ];

            for variant in &variants {
                if !exists(variant).await {
                    continue;
                }
                found += 1;
                if found <= self.keep {
                    continue;
                }
                match fs::remove_file(variant).await {
                    Ok(()) => {
                        info!("Removed expired log {variant:?}");
                        removed += 1;
                    }
                    Err(e) => error!("Failed to remove {variant:?}: {e}"),
                }
            }
        }

        removed
    }
}

async fn exists(path: &Path) -> bool {
    match fs::symlink_metadata(path).await {
        Ok(_) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            error!("Failed to stat {path:?}: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use chrono::{TimeDelta, Utc};
    use tempfile::TempDir;

    fn daily_pruner(keep: u32) -> Pruner {
        Pruner::new(
            PeriodClock::new(Interval::Daily, TimeDelta::zero()),
            SuffixFormat::new("%Y%m%d").unwrap(),
            keep,
            ".gz",
        )
    }

    #[tokio::test]
    async fn test_keep_zero_never_deletes() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("access.log");
        for day in 1..=5 {
            std::fs::write(dir.path().join(format!("access.log.2024030{day}")), b"").unwrap();
        }
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        assert_eq!(daily_pruner(0).prune([&log], &now).await, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 5);
    }

    #[tokio::test]
    async fn test_oldest_variants_beyond_keep_are_removed() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("access.log");
        // Newest two plain, older three compressed.
        std::fs::write(dir.path().join("access.log.20240305"), b"").unwrap();
        std::fs::write(dir.path().join("access.log.20240304"), b"").unwrap();
        std::fs::write(dir.path().join("access.log.20240303.gz"), b"").unwrap();
        std::fs::write(dir.path().join("access.log.20240302.gz"), b"").unwrap();
        std::fs::write(dir.path().join("access.log.20240301.gz"), b"").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        let removed = daily_pruner(2).prune([&log], &now).await;

        assert_eq!(removed, 3);
        assert!(dir.path().join("access.log.20240305").exists());
        assert!(dir.path().join("access.log.20240304").exists());
        assert!(!dir.path().join("access.log.20240303.gz").exists());
        assert!(!dir.path().join("access.log.20240302.gz").exists());
        assert!(!dir.path().join("access.log.20240301.gz").exists());
    }

    #[tokio::test]
    async fn test_both_variants_of_one_period_share_the_counter() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("error_log");
        std::fs::write(dir.path().join("error_log.20240305"), b"").unwrap();
        std::fs::write(dir.path().join("error_log.20240305.gz"), b"").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        assert_eq!(daily_pruner(1).prune([&log], &now).await, 1);
        assert!(dir.path().join("error_log.20240305").exists());
        assert!(!dir.path().join("error_log.20240305.gz").exists());
    }

    #[tokio::test]
    async fn test_unrelated_files_are_untouched() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("access.log");
        std::fs::write(&log, b"live").unwrap();
        std::fs::write(dir.path().join("access.log.old"), b"").unwrap();
        std::fs::write(dir.path().join("access.log.20240305"), b"").unwrap();
        std::fs::write(dir.path().join("access.log.20240304"), b"").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        assert_eq!(daily_pruner(1).prune([&log], &now).await, 1);
        assert!(log.exists());
        assert!(dir.path().join("access.log.old").exists());
        assert!(dir.path().join("access.log.20240305").exists());
    }
}
