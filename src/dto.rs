pub mod todo;

use crate::routing_utils::{BasicErrorResponse, ExtraInfo, ValidationErrorSchema};
pub use todo::*;
use utoipa::OpenApi;

/// Shared schemas for the OpenAPI document which aren't pulled in automatically by path definitions
#[derive(OpenApi)]
#[openapi(components(schemas(
    Todo,
    NewTodo,
    UpdateTodo,
    BasicErrorResponse,
    ExtraInfo,
    ValidationErrorSchema,
)))]
pub struct OpenApiSchemas;
