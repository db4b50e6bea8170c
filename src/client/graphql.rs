use crate::client::{ClientError, TodoGateway};
use crate::dto::Todo;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

const GET_TODOS: &str = r#"
query GetTodos {
  todo {
    id
    title
    description
    completed
    createdAt
  }
}
"#;

const CREATE_TODO: &str = r#"
mutation CreateTodo($title: String!, $description: String) {
  insert_todo_one(object: { title: $title, description: $description }) {
    id
    title
    description
    completed
    createdAt
  }
}
"#;

const UPDATE_TODO: &str = r#"
mutation UpdateTodo($id: uuid!, $set: todo_set_input!) {
  update_todo_by_pk(pk_columns: { id: $id }, _set: $set) {
    id
    title
    description
    completed
    createdAt
  }
}
"#;

const DELETE_TODO: &str = r#"
mutation DeleteTodo($id: uuid!) {
  delete_todo_by_pk(id: $id) {
    id
  }
}
"#;

/// Columns to change in an update. Unset fields are left out of the request entirely;
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoSetInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoSetInput {
    pub fn completed(completed: bool) -> Self {
        TodoSetInput {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'query, V> {
    query: &'query str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQlResponse<D> {
    data: Option<D>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct TodosData {
    todo: Option<Vec<Todo>>,
}

#[derive(Deserialize)]
struct InsertData {
    insert_todo_one: Option<Todo>,
}

#[derive(Deserialize)]
struct UpdateData {
    update_todo_by_pk: Option<Todo>,
}

#[derive(Deserialize)]
struct DeleteData {
    delete_todo_by_pk: Option<DeletedTodo>,
}

#[derive(Deserialize)]
struct DeletedTodo {
    id: Uuid,
}

/// Talks to the gateway's GraphQL endpoint as the unauthenticated role
pub struct GatewayTodoClient {
    http_client: ClientWithMiddleware,
    graphql_url: String,
}

impl GatewayTodoClient {
    pub fn new(http_client: ClientWithMiddleware, graphql_url: impl Into<String>) -> Self {
        GatewayTodoClient {
            http_client,
            graphql_url: graphql_url.into(),
        }
    }

    async fn execute<V: Serialize, D: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: V,
    ) -> Result<D, ClientError> {
        debug!(operation, "Sending GraphQL request");
        let response: GraphQlResponse<D> = self
            .http_client
            .post(&self.graphql_url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .json()
            .await?;

        if !response.errors.is_empty() {
            let messages: Vec<String> = response
                .errors
                .into_iter()
                .map(|err| err.message)
                .collect();
            error!(operation, ?messages, "GraphQL request returned errors");
            return Err(ClientError::GraphQl(messages));
        }

        response.data.ok_or(ClientError::NoData(operation))
    }
}

impl TodoGateway for GatewayTodoClient {
    async fn todos(&self) -> Result<Vec<Todo>, ClientError> {
        let data: TodosData = self.execute("GetTodos", GET_TODOS, json!({})).await?;

        data.todo.ok_or(ClientError::NoData("GetTodos"))
    }

    async fn create_todo(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Todo, ClientError> {
        let data: InsertData = self
            .execute(
                "CreateTodo",
                CREATE_TODO,
                json!({ "title": title, "description": description }),
            )
            .await?;

        data.insert_todo_one.ok_or(ClientError::NoData("CreateTodo"))
    }

    async fn update_todo(&self, id: Uuid, set: &TodoSetInput) -> Result<Todo, ClientError> {
        let data: UpdateData = self
            .execute("UpdateTodo", UPDATE_TODO, json!({ "id": id, "set": set }))
            .await?;

        data.update_todo_by_pk
            .ok_or(ClientError::NoData("UpdateTodo"))
    }

    async fn delete_todo(&self, id: Uuid) -> Result<Uuid, ClientError> {
        let data: DeleteData = self
            .execute("DeleteTodo", DELETE_TODO, json!({ "id": id }))
            .await?;

        data.delete_todo_by_pk
            .map(|deleted| deleted.id)
            .ok_or(ClientError::NoData("DeleteTodo"))
    }
}
