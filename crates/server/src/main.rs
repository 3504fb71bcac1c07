mod bootstrap;
mod health;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use blossom_core::config::{AppConfig, LoadOptions, LogFormat};

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Config first: logging format and level come from it.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.db_pool.clone(),
    )
    .await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        payment_configured = app.config.payment.provider_token.is_some(),
        admin_count = app.config.chat.admin_ids.len(),
        "blossom-server started"
    );

    // The bundled transport reports a closed stream immediately; a live
    // chat binding drives the dispatcher through the same runner surface.
    app.runner.start().await?;

    wait_for_shutdown().await
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "blossom-server stopping"
    );
    Ok(())
}
