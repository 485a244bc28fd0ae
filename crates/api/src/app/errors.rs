use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// HTTP status for a domain failure: 400 for validation, 404 for a missing
/// warehouse or item, 500 for backend failures.
pub fn status_for(err: &DomainError) -> StatusCode {
    if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Message safe to show a client. Storage details stay in the logs.
pub fn public_message(err: &DomainError) -> String {
    match err {
        DomainError::Storage(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::info!(error = %err, status = status.as_u16(), "request rejected");
    }
    json_error(status, public_message(&err))
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}
