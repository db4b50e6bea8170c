use crate::{SharedData, logging};
use axum::Router;
use std::sync::Arc;

pub mod swagger_main;
pub mod todo;

#[cfg(test)]
mod test_util;

/// Assembles the backend: the todo routes under "/api/v1/todos", the swagger UI, and HTTP
/// tracing around all of it
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .nest("/api/v1/todos", todo::todo_routes())
        .merge(swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
