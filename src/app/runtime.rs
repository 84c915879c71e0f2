use crate::adapter::{
    AlwaysReady, HostProcess, LoggingRestarter, TreeScanner, load_host_config,
};
use crate::compress::CommandSpawner;
use crate::config::{ConfigError, RotationConfig, Settings};
use crate::domain::LogFileSet;
use crate::error::RotatorError;
use crate::port::DirectiveScanner;
use crate::process::ProcessRegistry;
use crate::scheduler::Collaborators;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Everything derived from one load of the configuration file.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub settings: Settings,
    pub rotation: RotationConfig,
    pub files: LogFileSet,
}

impl Runtime {
    pub fn load(path: &Path) -> Result<Self, RotatorError> {
        Self::from_settings(Settings::load(path)?)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, RotatorError> {
        let rotation = settings.rotation_config()?;
        let files = discover_log_files(&settings, &TreeScanner)?;
        Ok(Self {
            settings,
            rotation,
            files,
        })
    }

    /// Host collaborators: the PID file when configured, inert ones otherwise.
    #[must_use]
    pub fn collaborators(&self, registry: ProcessRegistry) -> Collaborators {
        let spawner = Arc::new(CommandSpawner::new(registry));
        match &self.settings.host_pid_file {
            Some(pid_file) => {
                let host = Arc::new(HostProcess::new(pid_file));
                Collaborators {
                    readiness: host.clone(),
                    restarter: host,
                    spawner,
                }
            }
            None => Collaborators {
                readiness: Arc::new(AlwaysReady),
                restarter: Arc::new(LoggingRestarter),
                spawner,
            },
        }
    }
}

/// Log files named by the host configuration followed by the extra ones.
pub fn discover_log_files(
    settings: &Settings,
    scanner: &dyn DirectiveScanner,
) -> Result<LogFileSet, RotatorError> {
    let mut files = LogFileSet::new(settings.server_root.clone());

    if let Some(host_config) = &settings.host_config {
        let path = match &settings.server_root {
            Some(root) if host_config.is_relative() => root.join(host_config),
            _ => host_config.clone(),
        };
        let tree = load_host_config(&path).map_err(|e| match e {
            ConfigError::FileError(source) => RotatorError::io(&path, source),
            other => RotatorError::Config(other),
        })?;
        files.extend(scanner.scan(&tree, &settings.directive_map()));
    }
    files.extend(&settings.log_files);

    for file in &files {
        debug!("Added log file {file:?}");
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_host_config_and_extra_files_are_merged() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("httpd.conf"),
            "ErrorLog logs/error_log\nCustomLog /var/log/access.log combined\n",
        )
        .unwrap();
        let settings = Settings {
            server_root: Some(dir.path().to_path_buf()),
            host_config: Some(PathBuf::from("httpd.conf")),
            log_files: vec![
                PathBuf::from("/var/log/access.log"),
                PathBuf::from("/var/log/app.log"),
            ],
            ..Settings::default()
        };

        let files = discover_log_files(&settings, &TreeScanner).unwrap();

        assert_eq!(
            files.paths(),
            &[
                dir.path().join("logs/error_log"),
                PathBuf::from("/var/log/access.log"),
                PathBuf::from("/var/log/app.log"),
            ]
        );
    }

    #[test]
    fn test_missing_host_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            host_config: Some(dir.path().join("missing.conf")),
            ..Settings::default()
        };

        let err = discover_log_files(&settings, &TreeScanner).unwrap_err();

        assert!(matches!(err, RotatorError::Io { .. }));
        assert!(err.to_string().contains("missing.conf"));
    }

    #[test]
    fn test_runtime_from_settings_without_host_config() {
        let settings = Settings {
            enabled: true,
            log_files: vec![PathBuf::from("/var/log/app.log")],
            ..Settings::default()
        };

        let runtime = Runtime::from_settings(settings).unwrap();

        assert!(runtime.rotation.enabled);
        assert_eq!(runtime.files.len(), 1);
    }
}
