use axum::Router;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tokio::net::TcpListener;

/// Serves [router] on an ephemeral localhost port for the rest of the test and returns its base URL
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind a local port for the fake server");
    let address = listener
        .local_addr()
        .expect("Fake server listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake server stopped unexpectedly");
    });

    format!("http://{address}")
}

/// Returns a base URL nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind a local port");
    let address = listener.local_addr().expect("Listener has no address");
    drop(listener);

    format!("http://{address}")
}

/// HTTP client for talking to fake servers. Ignores proxy settings from the environment so
/// requests always reach localhost.
pub fn test_http_client() -> ClientWithMiddleware {
    let base_client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Test HTTP client failed to build");

    ClientBuilder::new(base_client).build()
}
