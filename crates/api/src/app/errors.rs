use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fixtrack_core::DomainError;
use fixtrack_infra::{LedgerError, LoadError, StorageError};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        e @ DomainError::InsufficientAvailability { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_availability", e.to_string())
        }
    }
}

pub fn storage_error_to_response(err: StorageError) -> axum::response::Response {
    tracing::error!(error = %err, "ledger storage failure");
    json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_error", err.to_string())
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Domain(e) => domain_error_to_response(e),
        LedgerError::Storage(e) => storage_error_to_response(e),
    }
}

pub fn load_error_to_response(err: LoadError) -> axum::response::Response {
    match err {
        LoadError::Parse(msg) => {
            tracing::error!(error = %msg, "inventory table rejected");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "parse_error", msg)
        }
        LoadError::Storage(e) => storage_error_to_response(e),
    }
}

/// The blocking task running a ledger operation panicked or was cancelled.
pub fn join_error_to_response(err: tokio::task::JoinError) -> axum::response::Response {
    tracing::error!(error = %err, "blocking ledger task failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "ledger operation did not complete",
    )
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

/// Trimmed, non-empty query parameter.
pub fn required_param<'a>(
    value: Option<&'a str>,
    code: &'static str,
    name: &str,
) -> Result<&'a str, axum::response::Response> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            code,
            format!("{name} is required"),
        )),
    }
}
