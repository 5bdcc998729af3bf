use anyhow::Context;

use skyyard_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skyyard_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = skyyard_api::app::build_app(&config)
        .await
        .context("failed to wire application services")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
