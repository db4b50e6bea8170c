//! Frontend side of the app: a GraphQL client for the gateway, the task list the UI works on,
//! and the REST proxy in front of the backend.

pub mod graphql;
pub mod proxy;
pub mod tasks;

use crate::dto::Todo;
use thiserror::Error;
use uuid::Uuid;

pub use graphql::{GatewayTodoClient, TodoSetInput};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to the gateway failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("could not read the gateway's response: {0}")]
    Decode(#[from] reqwest::Error),
    #[error("gateway returned errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("gateway returned no data for {0}")]
    NoData(&'static str),
    #[error("task {0} is not in the task list")]
    UnknownTask(Uuid),
}

/// Todo operations the frontend performs through the GraphQL gateway
pub trait TodoGateway {
    async fn todos(&self) -> Result<Vec<Todo>, ClientError>;
    async fn create_todo(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Todo, ClientError>;
    async fn update_todo(&self, id: Uuid, set: &TodoSetInput) -> Result<Todo, ClientError>;
    /// Returns the ID of the deleted todo
    async fn delete_todo(&self, id: Uuid) -> Result<Uuid, ClientError>;
}
