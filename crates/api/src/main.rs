use std::sync::Arc;

use anyhow::Context;

use orgdesk_api::app::{build_app, services::AppServices};
use orgdesk_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    orgdesk_observability::init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!(?config, "configuration loaded");

    let services = AppServices::from_config(&config)
        .await
        .context("failed to initialise services")?;
    let app = build_app(Arc::new(services), &config.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
