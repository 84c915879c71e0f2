//! Tracks spawned children and reports their termination.
//!
//! Each registered child gets a waiter task that sends exactly one
//! [`ChildEvent`] on the registry's channel.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExitReason {
    /// The child exited and was reaped.
    Death,
    /// Waiting on the child failed, or it was killed at shutdown.
    Lost,
    /// Tracking was dropped explicitly; the child may still run.
    Unregister,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEvent {
    pub pid: u32,
    pub reason: ChildExitReason,
    pub exit_status: Option<i32>,
}

impl ChildEvent {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.reason == ChildExitReason::Death && self.exit_status == Some(0)
    }
}

#[derive(Clone)]
pub struct ProcessRegistry {
    children: Arc<Mutex<HashMap<u32, CancellationToken>>>,
    events: mpsc::UnboundedSender<ChildEvent>,
    shutdown: CancellationToken,
}

impl ProcessRegistry {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChildEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let registry = Self {
            children: Arc::new(Mutex::new(HashMap::new())),
            events,
            shutdown: CancellationToken::new(),
        };
        (registry, rx)
    }

    /// Start watching `child`. Returns `None` if it has already been reaped.
    pub fn register(&self, mut child: Child) -> Option<u32> {
        let pid = child.id()?;
        let token = self.shutdown.child_token();
        self.children.lock().insert(pid, token.clone());

        let children = Arc::clone(&self.children);
        let events = self.events.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let event = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => ChildEvent {
                        pid,
                        reason: ChildExitReason::Death,
                        exit_status: status.code(),
                    },
                    Err(e) => {
                        warn!("Lost track of child process {pid}: {e}");
                        ChildEvent { pid, reason: ChildExitReason::Lost, exit_status: None }
                    }
                },
                () = token.cancelled() => {
                    if shutdown.is_cancelled() {
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill child process {pid}: {e}");
                        }
                        ChildEvent { pid, reason: ChildExitReason::Lost, exit_status: None }
                    } else {
                        ChildEvent { pid, reason: ChildExitReason::Unregister, exit_status: None }
                    }
                }
            };

            children.lock().remove(&pid);
            if events.send(event).is_err() {
                debug!("Child event for {pid} dropped, receiver closed");
            }
        });

        Some(pid)
    }

    /// Stop tracking `pid`. Returns `false` if it was not tracked.
    pub fn unregister(&self, pid: u32) -> bool {
        match self.children.lock().get(&pid) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn tracked(&self) -> usize {
        self.children.lock().len()
    }

    /// Kill every tracked child.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::process::Command;
    use tokio::time::timeout;

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<ChildEvent>) -> ChildEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for child event")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_exit_is_reported_as_death() {
        let (registry, mut rx) = ProcessRegistry::new();
        let pid = registry
            .register(Command::new("true").spawn().unwrap())
            .unwrap();

        let event = next_event(&mut rx).await;
        assert_eq!(event.pid, pid);
        assert_eq!(event.reason, ChildExitReason::Death);
        assert!(event.succeeded());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_success() {
        let (registry, mut rx) = ProcessRegistry::new();
        registry.register(Command::new("false").spawn().unwrap());

        let event = next_event(&mut rx).await;
        assert_eq!(event.reason, ChildExitReason::Death);
        assert_eq!(event.exit_status, Some(1));
        assert!(!event.succeeded());
    }

    #[tokio::test]
    async fn test_unregister_reports_unregister() {
        let (registry, mut rx) = ProcessRegistry::new();
        let pid = registry
            .register(Command::new("sleep").arg("5").kill_on_drop(true).spawn().unwrap())
            .unwrap();

        assert!(registry.unregister(pid));
        let event = next_event(&mut rx).await;
        assert_eq!(event.reason, ChildExitReason::Unregister);
        assert!(!registry.unregister(pid));
        assert_eq!(registry.tracked(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_kills_children() {
        let (registry, mut rx) = ProcessRegistry::new();
        registry.register(Command::new("sleep").arg("5").spawn().unwrap());

        registry.shutdown();
        let event = next_event(&mut rx).await;
        assert_eq!(event.reason, ChildExitReason::Lost);
    }
}
