use anyhow::Context;
use dotenv::dotenv;
use todo_app::config::GatewayConfig;
use todo_app::external_connections::build_http_client;
use todo_app::gateway::MetadataBootstrapper;
use todo_app::logging;
use tracing::info;

/// Tracks the todos table in the GraphQL gateway and opens it up to the public role
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::init_from_env("init-gateway")?;

    let config = GatewayConfig::from_env()?;
    info!(endpoint = config.endpoint, "Configuring the GraphQL gateway");

    let http_client = build_http_client()?;
    MetadataBootstrapper::new(&http_client, config)
        .run()
        .await
        .context("configuring gateway metadata")?;

    Ok(())
}
