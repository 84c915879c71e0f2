use crate::error::RotatorError;
use crate::port::CompressorSpawner;
use crate::process::ProcessRegistry;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::error;

/// Runs `<program> <path>` from the temp directory at reduced priority.
#[derive(Clone)]
pub struct CommandSpawner {
    registry: ProcessRegistry,
}

impl CommandSpawner {
    #[must_use]
    pub const fn new(registry: ProcessRegistry) -> Self {
        Self { registry }
    }
}

impl CompressorSpawner for CommandSpawner {
    fn spawn(&self, program: &Path, path: &Path, nice_level: i32) -> Result<u32, RotatorError> {
        let child = Command::new(program)
            .arg(path)
            .stdin(Stdio::null())
            .current_dir(std::env::temp_dir())
            .spawn()
            .map_err(|source| RotatorError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        if let Some(pid) = child.id() {
            if let Err(e) = set_priority(pid, nice_level) {
                error!("Couldn't set priority of compress process {pid} to {nice_level}: {e}");
            }
        }

        self.registry
            .register(child)
            .ok_or_else(|| RotatorError::Spawn {
                program: program.to_path_buf(),
                source: std::io::Error::other("process exited before it could be tracked"),
            })
    }
}

#[cfg(unix)]
fn set_priority(pid: u32, nice_level: i32) -> std::io::Result<()> {
    // SAFETY: setpriority only reads its integer arguments.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, pid as libc::id_t, nice_level) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn set_priority(_pid: u32, _nice_level: i32) -> std::io::Result<()> {
    Ok(())
}
