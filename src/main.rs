use anyhow::Context;
use dotenv::dotenv;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use todo_app::config::{self, DatabaseConfig};
use todo_app::retry::FixedRetry;
use todo_app::routing_utils::shutdown_signal;
use todo_app::{SharedData, api, db, logging, persistence};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::init_from_env("todo-server")?;

    let db_config = DatabaseConfig::from_env()?;
    let connect_options = db_config.connect_options()?;
    let pool = db::connect_with_retry(&connect_options, FixedRetry::default())
        .await
        .context("connecting to the database")?;

    if db::ensure_schema(&pool)
        .await
        .context("ensuring the todos table exists")?
    {
        info!("Created the todos table on startup, it holds no data yet");
    }

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
    });
    let router = api::build_router(shared_data);

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config::server_port()?));
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding to {address}"))?;

    info!("Backend listening on {address}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving the todo API")?;

    info!("Backend shut down");
    Ok(())
}
