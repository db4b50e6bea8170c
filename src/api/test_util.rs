use axum::body::{self, Bytes};
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

async fn body_bytes(response: Response) -> Bytes {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read data from response body!")
}

/// Checks the response status, then parses the body into the requested type. Panics with the
/// raw body if either the status or the parse is off.
pub async fn read_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> T {
    let status = response.status();
    let bytes = body_bytes(response).await;
    assert_eq!(
        expected_status,
        status,
        "Unexpected status, received body: {}",
        String::from_utf8_lossy(&bytes)
    );

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}

/// Extracts `error_code` from an error envelope. Fails the test if the response isn't JSON.
pub async fn error_code_of(response: Response) -> String {
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(Some("application/json"), content_type.as_deref());

    let status = response.status();
    let body: Value = read_json(response, status).await;
    body["error_code"]
        .as_str()
        .expect("error responses should carry an error code")
        .to_owned()
}
