use tokio::signal;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT (Ctrl+C) for graceful shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// SIGHUP listener used to trigger configuration reloads.
pub struct Hangup {
    #[cfg(unix)]
    inner: Option<signal::unix::Signal>,
}

impl Hangup {
    #[must_use]
    pub fn install() -> Self {
        #[cfg(unix)]
        {
            let inner = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
                Ok(signal) => Some(signal),
                Err(e) => {
                    warn!("Failed to install SIGHUP handler, reload disabled: {}", e);
                    None
                }
            };
            Self { inner }
        }
        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Resolves on each SIGHUP; never resolves once the stream is gone.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        {
            if let Some(signal) = self.inner.as_mut() {
                if signal.recv().await.is_some() {
                    return;
                }
            }
            self.inner = None;
        }
        std::future::pending::<()>().await;
    }
}
