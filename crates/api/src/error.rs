use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptdock_core::error::CoreError;
use promptdock_notion::api::NotionApiError;
use serde_json::json;

use crate::engine::export::ExportError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `promptdock_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failure in the template export sequence.
    #[error(transparent)]
    Export(#[from] ExportError),

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
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Export errors ---
            AppError::Export(err) => classify_export_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map each export failure to a distinct status so callers can tell "link
/// Notion first" apart from "the template is gone" and "Notion rejected
/// the write".
fn classify_export_error(err: &ExportError) -> (StatusCode, &'static str, String) {
    match err {
        ExportError::TemplateNotFound => (
            StatusCode::NOT_FOUND,
            "TEMPLATE_NOT_FOUND",
            "Template not found".to_string(),
        ),
        ExportError::AccessDenied => (
            StatusCode::FORBIDDEN,
            "ACCESS_DENIED",
            "You do not have access to this template".to_string(),
        ),
        ExportError::CredentialMissing => (
            StatusCode::CONFLICT,
            "NOTION_NOT_CONNECTED",
            "No Notion workspace is linked to this account".to_string(),
        ),
        ExportError::CredentialCorrupted => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CREDENTIAL_CORRUPTED",
            "Stored Notion credential could not be decrypted; re-link the workspace".to_string(),
        ),
        ExportError::ExternalApi(api_err) => {
            let detail = match api_err {
                NotionApiError::Api { status, body } => {
                    tracing::error!(upstream_status = status, body = %body, "Notion API rejected export");
                    format!("Notion API error ({status})")
                }
                NotionApiError::Request(e) => {
                    tracing::error!(error = %e, "Notion API request failed");
                    "Notion API request failed".to_string()
                }
            };
            (StatusCode::BAD_GATEWAY, "NOTION_API_ERROR", detail)
        }
        ExportError::Storage(e) => classify_sqlx_error(e),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
