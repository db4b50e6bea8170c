use crate::config::GatewayConfig;
use crate::gateway::metadata::{GRAPHQL_NAME, MetadataRequest, READABLE_COLUMNS, permission_requests};
use crate::retry::{FixedRetry, RetriesExhausted, with_fixed_retry};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Error codes the gateway answers with when the metadata being created is already in place
const ALREADY_APPLIED_CODES: [&str; 2] = ["already-tracked", "already-exists"];

#[derive(Debug, Error)]
pub enum HealthCheckError {
    #[error("health check request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("gateway reported itself unhealthy with status {0}")]
    Unhealthy(StatusCode),
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    GatewayUnreachable(#[from] RetriesExhausted<HealthCheckError>),
    #[error("gateway rejected {operation} with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("request to the gateway failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("could not read the gateway's response: {0}")]
    Decode(#[from] reqwest::Error),
    #[error("gateway schema for the todo type is missing fields: {missing:?}")]
    SchemaMismatch { missing: Vec<String> },
}

/// How the gateway responded to a metadata request that didn't fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOutcome {
    Applied,
    AlreadyApplied,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    code: Option<String>,
}

#[derive(Deserialize)]
struct IntrospectionResponse {
    data: Option<IntrospectionData>,
}

#[derive(Deserialize)]
struct IntrospectionData {
    #[serde(rename = "__type")]
    graphql_type: Option<IntrospectedType>,
}

#[derive(Deserialize)]
struct IntrospectedType {
    fields: Vec<IntrospectedField>,
}

#[derive(Deserialize)]
struct IntrospectedField {
    name: String,
}

/// Brings the gateway's metadata for the todos table into the state the frontend expects.
/// Safe to run repeatedly against the same gateway.
pub struct MetadataBootstrapper<'client> {
    http_client: &'client ClientWithMiddleware,
    config: GatewayConfig,
}

impl<'client> MetadataBootstrapper<'client> {
    pub fn new(http_client: &'client ClientWithMiddleware, config: GatewayConfig) -> Self {
        MetadataBootstrapper {
            http_client,
            config,
        }
    }

    /// Waits for the gateway, re-tracks the todos table, grants the public role full access to
    /// it, then checks the resulting GraphQL schema
    pub async fn run(&self) -> Result<(), BootstrapError> {
        self.wait_for_gateway().await?;

        self.send(&MetadataRequest::DropInconsistentMetadata {})
            .await?;

        // Untracking fails when the table was never tracked, which is fine
        if let Err(err) = self.send(&MetadataRequest::untrack_todos()).await {
            info!("Todos table was not untracked: {err}");
        }

        self.send(&MetadataRequest::track_todos()).await?;

        for permission in permission_requests(&self.config.public_role) {
            self.send(&permission).await?;
        }

        self.send(&MetadataRequest::ReloadMetadata {}).await?;
        self.verify_schema().await?;

        info!(
            role = self.config.public_role,
            "Gateway metadata configured for the todos table"
        );
        Ok(())
    }

    /// Polls the gateway's health endpoint at the configured fixed interval until it answers OK
    pub async fn wait_for_gateway(&self) -> Result<(), BootstrapError> {
        let policy = FixedRetry::new(self.config.wait_attempts, self.config.wait_delay);
        info!(
            endpoint = self.config.endpoint,
            attempts = policy.attempts,
            "Waiting for the gateway to become healthy"
        );

        with_fixed_retry("gateway health check", policy, move || self.check_health()).await?;

        Ok(())
    }

    async fn check_health(&self) -> Result<(), HealthCheckError> {
        let response = self
            .http_client
            .get(format!("{}/healthz", self.config.endpoint))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(HealthCheckError::Unhealthy(status)),
        }
    }

    /// Sends a single metadata request. Requests for metadata that already exists count as
    /// successes.
    pub async fn send(&self, request: &MetadataRequest) -> Result<MetadataOutcome, BootstrapError> {
        let operation = request.operation();
        let response = self
            .http_client
            .post(format!("{}/v1/metadata", self.config.endpoint))
            .header(ADMIN_SECRET_HEADER, &self.config.admin_secret)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(operation, "Applied gateway metadata");
            return Ok(MetadataOutcome::Applied);
        }

        let body = response.text().await?;
        let error_code = serde_json::from_str::<GatewayErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.code);

        match error_code {
            Some(code) if ALREADY_APPLIED_CODES.contains(&code.as_str()) => {
                info!(operation, code, "Gateway metadata was already in place");
                Ok(MetadataOutcome::AlreadyApplied)
            }
            _ => {
                warn!(operation, %status, "Gateway rejected metadata request");
                Err(BootstrapError::Rejected {
                    operation,
                    status,
                    body,
                })
            }
        }
    }

    /// Asks the gateway's GraphQL endpoint which fields the todo type has and fails if any
    /// column is missing
    pub async fn verify_schema(&self) -> Result<(), BootstrapError> {
        let query = format!("query {{ __type(name: \"{GRAPHQL_NAME}\") {{ fields {{ name }} }} }}");
        let response = self
            .http_client
            .post(self.config.graphql_url())
            .header(ADMIN_SECRET_HEADER, &self.config.admin_secret)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!(%status, "Gateway rejected schema introspection");
            return Err(BootstrapError::Rejected {
                operation: "graphql_introspection",
                status,
                body,
            });
        }

        let introspection: IntrospectionResponse = response.json().await?;
        let fields: Vec<String> = introspection
            .data
            .and_then(|data| data.graphql_type)
            .map(|graphql_type| graphql_type.fields.into_iter().map(|field| field.name).collect())
            .unwrap_or_default();

        let missing: Vec<String> = READABLE_COLUMNS
            .iter()
            .copied()
            .filter(|column| !fields.iter().any(|field| field.as_str() == *column))
            .map(|column| column.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(BootstrapError::SchemaMismatch { missing });
        }

        Ok(())
    }
}
