use crate::domain::todo::driving_ports::TodoPort;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    BasicErrorResponse, Json, Path, TodoErrorResponse, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(list_todos, get_todo, create_todo, update_todo, delete_todo))]
/// Defines the OpenAPI documentation for the todos API
pub struct TodoApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Builds a router for all the todo routes. Expected to be nested under "/api/v1/todos".
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();

                list_todos(&mut ext_cxn, &domain::todo::TodoService).await
            })
            .post(
                |State(app_state): AppState, Json(new_todo): Json<dto::NewTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    create_todo(new_todo, &mut ext_cxn, &domain::todo::TodoService).await
                },
            ),
        )
        .route(
            "/:id",
            get(
                |State(app_state): AppState, Path(id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    get_todo(id, &mut ext_cxn, &domain::todo::TodoService).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(id): Path<Uuid>,
                 Json(update): Json<dto::UpdateTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    update_todo(id, update, &mut ext_cxn, &domain::todo::TodoService).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(id): Path<Uuid>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    delete_todo(id, &mut ext_cxn, &domain::todo::TodoService).await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "Every todo in the system", body = Vec<dto::Todo>),
        (status = 500, description = "The todos could not be read", body = BasicErrorResponse),
    ),
)]
/// Retrieves every todo. There is no pagination or filtering.
async fn list_todos(
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<Vec<dto::Todo>>, ErrorResponse> {
    info!("Listing todos");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader;

    let todos = todo_service
        .list_todos(&mut *ext_cxn, &todo_read)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(todos.into_iter().map(dto::Todo::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = Uuid, Path, description = "ID of the todo")),
    responses(
        (status = 200, description = "The requested todo", body = dto::Todo),
        (status = 400, description = "The ID wasn't a valid UUID", body = BasicErrorResponse),
        (status = 404, description = "No todo has the given ID", body = BasicErrorResponse),
        (status = 500, description = "The todo could not be read", body = BasicErrorResponse),
    ),
)]
/// Retrieves a single todo
async fn get_todo(
    id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Get todo {id}");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader;

    let todo = todo_service
        .todo_by_id(id, &mut *ext_cxn, &todo_read)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(todo.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/todos",
    tag = TODO_API_GROUP,
    request_body = dto::NewTodo,
    responses(
        (status = 201, description = "The todo was created", body = dto::Todo),
        (status = 400, description = "The title was missing or the body wasn't valid JSON", body = BasicErrorResponse),
        (status = 500, description = "The todo could not be saved", body = BasicErrorResponse),
    ),
)]
/// Creates a todo. The server assigns its ID and creation time.
async fn create_todo(
    new_todo: dto::NewTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<(StatusCode, Json<dto::Todo>), ErrorResponse> {
    info!("Creating todo \"{}\"", new_todo.title);
    new_todo.validate().map_err(ValidationErrorResponse::from)?;

    let domain_todo = domain::todo::NewTodo::from(new_todo);
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter;

    let created = todo_service
        .create_todo(&domain_todo, &mut *ext_cxn, &todo_write)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = Uuid, Path, description = "ID of the todo")),
    request_body = dto::UpdateTodo,
    responses(
        (status = 200, description = "The updated todo", body = dto::Todo),
        (status = 400, description = "The update was invalid", body = BasicErrorResponse),
        (status = 404, description = "No todo has the given ID", body = BasicErrorResponse),
        (status = 500, description = "The todo could not be saved", body = BasicErrorResponse),
    ),
)]
/// Applies a partial update to a todo
async fn update_todo(
    id: Uuid,
    update: dto::UpdateTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Updating todo {id}");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let patch = domain::todo::TodoPatch::from(update);
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter;

    let updated = todo_service
        .update_todo(id, &patch, &mut *ext_cxn, &todo_write)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = Uuid, Path, description = "ID of the todo")),
    responses(
        (status = 200, description = "The todo that was removed", body = dto::Todo),
        (status = 400, description = "The ID wasn't a valid UUID", body = BasicErrorResponse),
        (status = 404, description = "No todo has the given ID", body = BasicErrorResponse),
        (status = 500, description = "The todo could not be removed", body = BasicErrorResponse),
    ),
)]
/// Permanently removes a todo
async fn delete_todo(
    id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Deleting todo {id}");
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter;

    let removed = todo_service
        .delete_todo(id, &mut *ext_cxn, &todo_write)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(removed.into()))
}
