use anyhow::Context;

use revdesk_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    revdesk_observability::init();

    let config = ApiConfig::from_env().context("failed to load configuration")?;
    let app = revdesk_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
