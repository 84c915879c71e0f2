//! Seams between the rotation core and the host it runs next to.

use crate::adapter::host_config::ConfigNode;
use crate::domain::{DirectiveMap, RestartMethod};
use crate::error::RotatorError;
use std::path::{Path, PathBuf};

/// Whether the host has finished starting up.
pub trait ReadinessProbe: Send + Sync {
    fn is_fully_ready(&self) -> bool;
}

/// Asks the host to reopen its log files.
pub trait RestartRequester: Send + Sync {
    fn request(&self, method: RestartMethod) -> Result<(), RotatorError>;
}

/// Collects log file names from a parsed host configuration.
pub trait DirectiveScanner: Send + Sync {
    fn scan(&self, root: &ConfigNode, directives: &DirectiveMap) -> Vec<PathBuf>;
}

/// Launches one compressor child for `path` and returns its pid.
///
/// Completion is reported later as a [`crate::process::ChildEvent`].
pub trait CompressorSpawner: Send + Sync {
    fn spawn(&self, program: &Path, path: &Path, nice_level: i32) -> Result<u32, RotatorError>;
}
