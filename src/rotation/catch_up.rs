use chrono::{DateTime, TimeZone, Utc};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info};

/// Files last written before `current_period_start`.
///
/// Such a file missed the rotation at the start of the current period,
/// typically because the daemon was down at the boundary.
pub async fn find_missed_rotations<'a, I, Tz>(
    files: I,
    current_period_start: &DateTime<Tz>,
) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a PathBuf>,
    Tz: TimeZone,
{
    let boundary = current_period_start.with_timezone(&Utc);
    let mut missed = Vec::new();

    for path in files {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                error!("Failed to stat {path:?}: {e}");
                continue;
            }
        };
        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(modified) => modified.into(),
            Err(e) => {
                error!("Failed to read modification time of {path:?}: {e}");
                continue;
            }
        };

        if modified < boundary {
            info!("{path:?} was last written at {modified}, before the current period, rotation is due");
            missed.push(path.clone());
        }
    }

    missed
}
