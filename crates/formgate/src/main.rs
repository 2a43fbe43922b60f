use anyhow::Context;
use formgate::{GatewayConfig, serve};
use formgate_std::env::SystemEnv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env(&SystemEnv).context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    serve(config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("server failed")
}
