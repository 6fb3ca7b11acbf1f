use anyhow::Context;

use chapel_api::config::Config;
use chapel_observability::TracingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chapel_observability::init_with(&TracingConfig::from_env());

    let config = Config::from_env().context("invalid configuration")?;
    let app = chapel_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, env = ?config.env, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
