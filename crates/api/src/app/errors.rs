use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::ServiceError;
use crate::app::validation::FieldError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::EmailTaken(email) => field_errors(
            StatusCode::CONFLICT,
            vec![FieldError {
                field: "email",
                message: format!("User with email: {email} already exists"),
            }],
        ),
        ServiceError::AuthenticationFailed => {
            json_error(StatusCode::UNAUTHORIZED, "Authentication failed")
        }
        ServiceError::Forbidden(reason) => {
            tracing::debug!(reason, "request forbidden");
            json_error(StatusCode::FORBIDDEN, "Unauthorized to access resource")
        }
        ServiceError::NotFound(what) => json_error(StatusCode::NOT_FOUND, not_found_message(what)),
        ServiceError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "store unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn not_found_message(what: &str) -> &'static str {
    match what {
        "user" => "User not found",
        "organisation" => "Organisation not found",
        _ => "Resource not found",
    }
}

/// `{"status":..,"message":..,"statusCode":..}`
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    let label = if status.is_server_error() {
        "Internal server error"
    } else {
        "Bad request"
    };
    (
        status,
        axum::Json(json!({
            "status": label,
            "message": message.into(),
            "statusCode": status.as_u16(),
        })),
    )
        .into_response()
}

/// `{"status":"Bad request","errors":[{"field","message"}]}`
pub fn field_errors(status: StatusCode, errors: Vec<FieldError>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "status": "Bad request",
            "errors": errors,
        })),
    )
        .into_response()
}

pub fn validation_error(errors: Vec<FieldError>) -> axum::response::Response {
    field_errors(StatusCode::UNPROCESSABLE_ENTITY, errors)
}

/// Unparseable request body.
pub fn bad_body(message: &'static str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, message)
}
