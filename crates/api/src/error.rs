use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use procura_core::allocation::AllocationBreach;
use procura_core::error::CoreError;

use crate::response::{codes, ApiResponse};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the standard response envelope
/// for every failure path.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `procura_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A share-link denial. Every reason (unknown code, disabled, expired,
    /// wrong extract code, exhausted limit) produces this same variant; the
    /// reason is logged server-side at the denial site only.
    #[error("Access denied")]
    AccessDenied,

    /// A submission that would exceed the ordered quantity, with one entry
    /// per offending product. The only failure category with rich detail.
    #[error("Quantity exceeds the ordered quantity")]
    QuantityExceeded(Vec<AllocationBreach>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, data) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    codes::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                    None,
                ),
                CoreError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    codes::VALIDATION,
                    msg.clone(),
                    None,
                ),
                CoreError::Conflict(msg) => {
                    (StatusCode::CONFLICT, codes::CONFLICT, msg.clone(), None)
                }
                CoreError::AccessDenied => access_denied(),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    server_error()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Share-link denial ---
            AppError::AccessDenied => access_denied(),

            // --- Allocation overflow, with per-product detail ---
            AppError::QuantityExceeded(breaches) => (
                StatusCode::BAD_REQUEST,
                codes::VALIDATION,
                "Quantity exceeds the ordered quantity".to_string(),
                Some(json!({ "errors": breaches })),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                codes::VALIDATION,
                msg.clone(),
                None,
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                server_error()
            }
        };

        let body = ApiResponse::<serde_json::Value> {
            code,
            msg: message,
            data,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// The one generic denial every share-link failure collapses into.
fn access_denied() -> (StatusCode, i32, String, Option<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        codes::ACCESS_DENIED,
        "Access denied".to_string(),
        None,
    )
}

/// Generic 500 envelope; detail stays in server-side logs.
fn server_error() -> (StatusCode, i32, String, Option<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        codes::SERVER_ERROR,
        "An internal error occurred".to_string(),
        None,
    )
}

/// Classify a sqlx error into an HTTP status, envelope code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, i32, String, Option<serde_json::Value>) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        codes::CONFLICT,
                        format!("Duplicate value violates unique constraint: {constraint}"),
                        None,
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            server_error()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            server_error()
        }
    }
}
