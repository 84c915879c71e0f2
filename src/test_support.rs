//! Shared test support utilities
//!
//! In-memory collaborators for the scheduler and compression queue, used by
//! unit and integration tests.

use crate::domain::RestartMethod;
use crate::error::RotatorError;
use crate::port::{CompressorSpawner, ReadinessProbe, RestartRequester};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

/// Spawner that records requests and hands out fake pids.
pub struct MockSpawner {
    spawned: Mutex<Vec<PathBuf>>,
    next_pid: AtomicU32,
    should_fail: AtomicBool,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self {
            spawned: Mutex::new(Vec::new()),
            next_pid: AtomicU32::new(1000),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Paths handed to the compressor, in order.
    pub fn spawned(&self) -> Vec<PathBuf> {
        self.spawned.lock().clone()
    }
}

impl Default for MockSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressorSpawner for MockSpawner {
    fn spawn(&self, program: &Path, path: &Path, _nice_level: i32) -> Result<u32, RotatorError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RotatorError::Spawn {
                program: program.to_path_buf(),
                source: std::io::Error::other("mock spawn failure"),
            });
        }
        self.spawned.lock().push(path.to_path_buf());
        Ok(self.next_pid.fetch_add(1, Ordering::SeqCst))
    }
}

/// Restart requester that records every request.
#[derive(Default)]
pub struct RecordingRestarter {
    requests: Mutex<Vec<RestartMethod>>,
    should_fail: AtomicBool,
}

impl RecordingRestarter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RestartMethod> {
        self.requests.lock().clone()
    }
}

impl RestartRequester for RecordingRestarter {
    fn request(&self, method: RestartMethod) -> Result<(), RotatorError> {
        self.requests.lock().push(method);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RotatorError::Signal {
                pid: 0,
                signal: 0,
                source: std::io::Error::other("mock signal failure"),
            });
        }
        Ok(())
    }
}

/// Readiness probe answering from a script, then repeating its last answer.
pub struct ScriptedProbe {
    answers: Mutex<VecDeque<bool>>,
    last: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            last: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ready() -> Self {
        Self::new([true])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadinessProbe for ScriptedProbe {
    fn is_fully_ready(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.lock().pop_front() {
            Some(answer) => {
                self.last.store(answer, Ordering::SeqCst);
                answer
            }
            None => self.last.load(Ordering::SeqCst),
        }
    }
}
