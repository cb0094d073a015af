use payout_service::config::PayoutConfig;
use payout_service::services::metrics::init_metrics;
use payout_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("payout-service", "info,payout_service=debug");

    init_metrics();

    let config = PayoutConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("configuration error: {}", e)
    })?;

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
