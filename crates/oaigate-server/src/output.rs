//! HTTP responses.

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::error;

use oaigate::OaiResponse;

/// The document as `application/xml` with its protocol status.
pub fn xml(response: OaiResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match response.to_xml() {
        Ok(body) => (status, [(CONTENT_TYPE, "application/xml")], body).into_response(),
        Err(err) => {
            error!(error = %err, "failed to serialise response");
            internal_error()
        }
    }
}

/// Generic 500. Details stay in the logs.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "text/plain")],
        "Internal Server Error",
    )
        .into_response()
}

pub fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, [(CONTENT_TYPE, "text/plain")], message).into_response()
}
