use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde_json::json;
use tracing::error;

/// Everything the proxy needs to reach the backend
#[derive(Clone)]
pub struct ProxyState {
    pub http_client: ClientWithMiddleware,
    /// Base URL of the backend, without a trailing slash
    pub backend_url: String,
}

/// Routes which forward todo API calls to the backend unchanged
pub fn proxy_routes(state: ProxyState) -> Router {
    Router::new()
        .route("/api/v1/todos", any(forward))
        .route("/api/v1/todos/:id", any(forward))
        .with_state(state)
}

async fn forward(
    State(proxy): State<ProxyState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let mut url = format!("{}{}", proxy.backend_url, uri.path());
    if let Some(query) = uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let sends_body = method != Method::GET && method != Method::DELETE && !body.is_empty();
    let mut request = proxy.http_client.request(method.clone(), &url);
    if sends_body {
        request = request
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);
    }

    match relay(request).await {
        Ok(response) => response,
        Err(err) => {
            error!(%method, url, "Could not reach the backend: {err}");
            proxy_failure()
        }
    }
}

/// Sends the request on and copies the backend's status, content type and body into our response
async fn relay(request: RequestBuilder) -> Result<Response, reqwest_middleware::Error> {
    let upstream = request.send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await?;

    let mut response = (status, body).into_response();
    match content_type {
        Some(content_type) => {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        None => {
            response.headers_mut().remove(CONTENT_TYPE);
        }
    }

    Ok(response)
}

fn proxy_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({
            "code": "error",
            "message": "Internal Server Error",
            "data": null
        })),
    )
        .into_response()
}
