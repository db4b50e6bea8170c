use crate::domain::todo::driving_ports::TodoError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToSchema, openapi};
use validator::ValidationErrors;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema)]
#[schema(example = json!({
    "error_code": "not_found",
    "error_description": "The requested entity could not be found.",
    "extra_info": null
}))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

fn error_body(
    status: StatusCode,
    error_code: &str,
    error_description: &str,
    extra_info: Option<ExtraInfo>,
) -> Response {
    (
        status,
        axum::Json(BasicErrorResponse {
            error_code: error_code.into(),
            error_description: error_description.into(),
            extra_info,
        }),
    )
        .into_response()
}

/// Response type that wraps unexpected failures and turns them into a 500 [BasicErrorResponse]
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Responding with an internal error: {:#}", self.0);
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Could not access data to complete your request",
            None,
        )
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        error_body(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Submitted data was invalid.",
            Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
        )
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Response type that turns a failed todo operation into the matching [BasicErrorResponse]
pub struct TodoErrorResponse(TodoError);

impl IntoResponse for TodoErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            TodoError::Invalid(errs) => ValidationErrorResponse(errs).into_response(),
            TodoError::NotFound(_) => error_body(
                StatusCode::NOT_FOUND,
                "not_found",
                "The requested entity could not be found.",
                None,
            ),
            TodoError::PortError(err) => GenericErrorResponse(err).into_response(),
        }
    }
}

impl From<TodoError> for TodoErrorResponse {
    fn from(value: TodoError) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        error_body(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "The passed request body contained malformed or unreadable JSON.",
            Some(ExtraInfo::Message(self.parse_problem)),
        )
    }
}

/// Wrapper for [axum::extract::Path] which reports unparseable path parameters, such as a
/// malformed todo ID, with our data structure for API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PathErrorResponse))]
pub struct Path<T>(pub T);

/// Response type representing path parameters that couldn't be parsed
pub struct PathErrorResponse {
    parse_problem: String,
}

impl From<PathRejection> for PathErrorResponse {
    fn from(value: PathRejection) -> Self {
        PathErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for PathErrorResponse {
    fn into_response(self) -> Response {
        error_body(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "The request path contained an invalid parameter.",
            Some(ExtraInfo::Message(self.parse_problem)),
        )
    }
}

/// Resolves once the process is asked to stop, so servers can finish in-flight requests
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            error!("Could not listen for shutdown signals");
            return std::future::pending().await;
        };

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("Could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
