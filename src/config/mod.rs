mod cli;
mod env;
mod validation;

use crate::clock::PeriodClock;
use crate::domain::{DirectiveMap, Interval, RestartMethod, SuffixFormat};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use cli::{Cli, LogLevel};

pub const DEFAULT_COMPRESS_PROGRAM: &str = "/usr/bin/gzip";
pub const DEFAULT_COMPRESS_SUFFIX: &str = ".gz";
pub const DEFAULT_NICE_LEVEL: i32 = 5;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// A third-party directive that names a log file at `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveSpec {
    pub name: String,
    #[serde(default = "default_position")]
    pub position: usize,
}

const fn default_position() -> usize {
    1
}

/// Settings as read from the TOML file and `ROTATOR_*` environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub enabled: bool,
    pub interval: Interval,
    /// Signed shift of every period boundary, in seconds
    pub offset_secs: i64,
    pub format: SuffixFormat,
    /// Rotated variants to keep, 0 keeps everything
    pub keep: u32,
    /// Newest variants left uncompressed, 0 disables compression
    pub compress_after: u32,
    pub compress_program: PathBuf,
    pub compress_suffix: String,
    pub nice_level: i32,
    pub restart_method: RestartMethod,
    /// Extra log files rotated in addition to the discovered ones
    pub log_files: Vec<PathBuf>,
    pub log_directives: Vec<DirectiveSpec>,
    pub server_root: Option<PathBuf>,
    pub host_config: Option<PathBuf>,
    pub host_pid_file: Option<PathBuf>,
    pub tick_interval_secs: u64,
    pub restart_after_catch_up: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Interval::Monthly,
            offset_secs: 0,
            format: SuffixFormat::default(),
            keep: 0,
            compress_after: 1,
            compress_program: PathBuf::from(DEFAULT_COMPRESS_PROGRAM),
            compress_suffix: DEFAULT_COMPRESS_SUFFIX.to_string(),
            nice_level: DEFAULT_NICE_LEVEL,
            restart_method: RestartMethod::Graceful,
            log_files: Vec::new(),
            log_directives: Vec::new(),
            server_root: None,
            host_config: None,
            host_pid_file: None,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            restart_after_catch_up: false,
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// File settings overridden by the process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&content)?;
        settings.apply_env_overrides(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Core rotation parameters. Only valid after [`Settings::validate`].
    pub fn rotation_config(&self) -> Result<RotationConfig, ConfigError> {
        Ok(RotationConfig {
            enabled: self.enabled,
            interval: self.interval,
            offset: offset_from_secs(self.offset_secs)?,
            format: self.format.clone(),
            keep: self.keep,
            compress_after: self.compress_after,
            compress_program: self.compress_program.clone(),
            compress_suffix: self.compress_suffix.clone(),
            nice_level: self.nice_level,
            restart_method: self.restart_method,
        })
    }

    /// Built-in directives followed by the configured ones.
    #[must_use]
    pub fn directive_map(&self) -> DirectiveMap {
        let mut map = DirectiveMap::with_builtins();
        for spec in &self.log_directives {
            if !map.register(spec.name.clone(), spec.position) {
                tracing::debug!("Directive {} already registered, keeping first", spec.name);
            }
        }
        map
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

/// Largest accepted offset magnitude, one leap year.
const MAX_OFFSET_SECS: i64 = 366 * 86_400;

fn offset_from_secs(secs: i64) -> Result<TimeDelta, ConfigError> {
    if secs.unsigned_abs() > MAX_OFFSET_SECS.unsigned_abs() {
        return Err(ConfigError::InvalidConfig(format!(
            "Offset out of range: {secs} (expected at most {MAX_OFFSET_SECS}s either way)"
        )));
    }
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| ConfigError::InvalidConfig(format!("Offset out of range: {secs}")))
}

/// Immutable rotation parameters shared by every core component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    pub enabled: bool,
    pub interval: Interval,
    pub offset: TimeDelta,
    pub format: SuffixFormat,
    pub keep: u32,
    pub compress_after: u32,
    pub compress_program: PathBuf,
    pub compress_suffix: String,
    pub nice_level: i32,
    pub restart_method: RestartMethod,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Interval::Monthly,
            offset: TimeDelta::zero(),
            format: SuffixFormat::default(),
            keep: 0,
            compress_after: 1,
            compress_program: PathBuf::from(DEFAULT_COMPRESS_PROGRAM),
            compress_suffix: DEFAULT_COMPRESS_SUFFIX.to_string(),
            nice_level: DEFAULT_NICE_LEVEL,
            restart_method: RestartMethod::Graceful,
        }
    }
}

impl RotationConfig {
    #[must_use]
    pub const fn clock(&self) -> PeriodClock {
        PeriodClock::new(self.interval, self.offset)
    }
}
