use crate::port::ReadinessProbe;
use std::sync::Arc;
use tracing::info;

/// Readiness that stays true once the probe has reported it.
pub struct ReadinessLatch {
    probe: Arc<dyn ReadinessProbe>,
    ready: bool,
}

impl ReadinessLatch {
    #[must_use]
    pub fn new(probe: Arc<dyn ReadinessProbe>) -> Self {
        Self {
            probe,
            ready: false,
        }
    }

    /// Consult the probe until it first reports ready.
    pub fn check(&mut self) -> bool {
        if !self.ready && self.probe.is_fully_ready() {
            info!("Host is fully ready, scheduled work enabled");
            self.ready = true;
        }
        self.ready
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }
}
