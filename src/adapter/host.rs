//! The host process whose logs are rotated, addressed through its PID file.

use crate::domain::RestartMethod;
use crate::error::RotatorError;
use crate::port::{ReadinessProbe, RestartRequester};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct HostProcess {
    pid_file: PathBuf,
}

impl HostProcess {
    #[must_use]
    pub fn new(pid_file: impl Into<PathBuf>) -> Self {
        Self {
            pid_file: pid_file.into(),
        }
    }

    #[must_use]
    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    pub fn read_pid(&self) -> Result<i32, RotatorError> {
        let content = std::fs::read_to_string(&self.pid_file)
            .map_err(|e| RotatorError::io(&self.pid_file, e))?;
        match content.trim().parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(pid),
            _ => Err(RotatorError::io(
                &self.pid_file,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("not a process id: {:?}", content.trim()),
                ),
            )),
        }
    }
}

impl ReadinessProbe for HostProcess {
    fn is_fully_ready(&self) -> bool {
        match self.read_pid() {
            Ok(pid) => process_alive(pid),
            Err(e) => {
                debug!("Host not ready: {e}");
                false
            }
        }
    }
}

impl RestartRequester for HostProcess {
    fn request(&self, method: RestartMethod) -> Result<(), RotatorError> {
        let pid = self.read_pid()?;
        let signal = restart_signal(method);
        send_signal(pid, signal)?;
        info!("Sent {method} restart signal {signal} to host process {pid}");
        Ok(())
    }
}

/// Readiness for hosts without a PID file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadinessProbe for AlwaysReady {
    fn is_fully_ready(&self) -> bool {
        true
    }
}

/// Restart requester for hosts that reopen their logs on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingRestarter;

impl RestartRequester for LoggingRestarter {
    fn request(&self, method: RestartMethod) -> Result<(), RotatorError> {
        info!("No host PID file configured, skipping {method} restart");
        Ok(())
    }
}

#[cfg(unix)]
const fn restart_signal(method: RestartMethod) -> i32 {
    match method {
        RestartMethod::Graceful => libc::SIGUSR1,
        RestartMethod::Full => libc::SIGHUP,
    }
}

#[cfg(unix)]
fn send_signal(pid: i32, signal: i32) -> Result<(), RotatorError> {
    // SAFETY: kill takes plain integers; pid is checked positive by read_pid.
    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(RotatorError::Signal {
            pid,
            signal,
            source: io::Error::last_os_error(),
        })
    }
}

#[cfg(unix)]
fn process_alive(pid: i32) -> bool {
    // SAFETY: signal 0 only checks existence and permission.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
const fn restart_signal(_method: RestartMethod) -> i32 {
    0
}

#[cfg(not(unix))]
fn send_signal(pid: i32, signal: i32) -> Result<(), RotatorError> {
    Err(RotatorError::Signal {
        pid,
        signal,
        source: io::Error::from(io::ErrorKind::Unsupported),
    })
}

#[cfg(not(unix))]
fn process_alive(_pid: i32) -> bool {
    false
}
