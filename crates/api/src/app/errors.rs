use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use wolfshield_auth::AuthzError;
use wolfshield_infra::EngineError;

/// Conflict and storage bodies carry `"retryable": true`; the caller may
/// resubmit the same request.
pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    let retryable = err.is_retryable();
    let (status, code, message) = match err {
        EngineError::Validation { field, reason } => return validation_error(field, reason),
        EngineError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
        EngineError::Storage(msg) => {
            tracing::error!(error = %msg, "ledger storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "ledger storage unavailable".to_string(),
            )
        }
    };
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message,
            "retryable": retryable,
        })),
    )
        .into_response()
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn validation_error(field: &str, reason: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "field": wire_field(field),
            "message": reason.into(),
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `accounting_period` → `accountingPeriod`, matching the JSON bodies.
pub fn wire_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
