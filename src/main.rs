use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rask_log_rotator::app::run()
        .await
        .context("rask-log-rotator terminated with an error")
}
