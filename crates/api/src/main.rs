use std::sync::Arc;

use anyhow::Context;

use fixtrack_api::app::{build_app, services::AppServices};
use fixtrack_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fixtrack_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(AppServices::from_config(&config)?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
