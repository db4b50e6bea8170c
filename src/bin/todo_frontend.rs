use anyhow::Context;
use dotenv::dotenv;
use std::net::{Ipv4Addr, SocketAddr};
use todo_app::client::proxy::{ProxyState, proxy_routes};
use todo_app::config::FrontendConfig;
use todo_app::external_connections::build_http_client;
use todo_app::logging;
use todo_app::routing_utils::shutdown_signal;
use tokio::net::TcpListener;
use tracing::info;

/// Serves the frontend's todo API proxy, which relays every call to the backend
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::init_from_env("todo-frontend")?;

    let config = FrontendConfig::from_env()?;
    let router = logging::attach_tracing_http(proxy_routes(ProxyState {
        http_client: build_http_client()?,
        backend_url: config.backend_url.clone(),
    }));

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding to {address}"))?;

    info!(backend = config.backend_url, "Frontend proxy listening on {address}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving the frontend proxy")?;

    Ok(())
}
