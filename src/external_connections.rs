use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use sqlx::PgConnection;

/// Something which can hand out a live database connection for the duration of a borrow
pub trait ConnectionHandle: Send {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Gives driven adapters access to external systems without the domain knowing which systems
/// those are
pub trait ExternalConnectivity: Send {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    /// Retrieves a handle to the database, either fresh from a pool or from an open transaction
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// An [ExternalConnectivity] which can open a database transaction
pub trait Transactable: ExternalConnectivity {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// An [ExternalConnectivity] bound to an open transaction which must be committed to persist
/// anything done through it
pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

/// Builds the HTTP client used for outgoing calls. Requests carry the current trace context so
/// spans line up across services.
pub fn build_http_client() -> Result<ClientWithMiddleware, anyhow::Error> {
    let base_client = reqwest::Client::builder()
        .use_rustls_tls()
        .build()
        .context("building the base HTTP client")?;

    Ok(ClientBuilder::new(base_client)
        .with(TracingMiddleware::default())
        .build())
}
