pub mod driver;
pub mod runtime;
pub mod signal;
pub mod tracing;

use crate::config::Cli;
use crate::error::RotatorError;
use crate::process::ProcessRegistry;
use crate::scheduler::RotationScheduler;
use clap::Parser;
use driver::Driver;
use runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Application entry point. Initializes tracing, loads configuration and
/// runs the rotation driver until SIGINT or SIGTERM.
pub async fn run() -> Result<(), RotatorError> {
    let cli = Cli::parse();
    tracing::init_tracing(cli.log_level.into());

    let runtime = Runtime::load(&cli.config)?;
    ::tracing::info!(
        "Loaded settings from {:?}, {} log files",
        cli.config,
        runtime.files.len()
    );
    if cli.check {
        ::tracing::info!("Configuration is valid");
        return Ok(());
    }

    let (registry, events) = ProcessRegistry::new();
    let scheduler = RotationScheduler::new(
        runtime.rotation.clone(),
        runtime.files.clone(),
        runtime.collaborators(registry.clone()),
    )
    .with_restart_after_catch_up(runtime.settings.restart_after_catch_up);

    // Shared shutdown token: stops the driver before children are reaped
    let shutdown_token = CancellationToken::new();
    let handle = Driver::new(scheduler, events, runtime.settings.tick_interval())
        .with_reload_from(&cli.config)
        .spawn(shutdown_token.clone());

    signal::shutdown_signal().await;
    shutdown_token.cancel();
    if let Err(e) = handle.await {
        ::tracing::error!("Rotation driver task failed: {e}");
    }
    registry.shutdown();

    ::tracing::info!("Shutdown complete");
    Ok(())
}
