use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sketchmap_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sketchmap_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed HTTP input, such as an unreadable multipart body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
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

/// Map a domain error to status, error code and client-facing message.
///
/// Infrastructure faults are logged in full and reported with a fixed
/// message so driver and network details never reach clients.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        CoreError::InvalidKind(_) => (StatusCode::BAD_REQUEST, "INVALID_KIND", message),
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
        CoreError::UploadLimitsExceeded { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "UPLOAD_LIMITS_EXCEEDED",
            message,
        ),
        CoreError::UnreadableImage { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "UNREADABLE_IMAGE", message)
        }
        CoreError::UnknownRequestId(_) => (StatusCode::NOT_FOUND, "UNKNOWN_REQUEST_ID", message),
        CoreError::UnknownKindForRequest { .. } => {
            (StatusCode::NOT_FOUND, "UNKNOWN_KIND_FOR_REQUEST", message)
        }
        CoreError::UnknownJobHandle(_) => (StatusCode::NOT_FOUND, "UNKNOWN_JOB_HANDLE", message),
        CoreError::UnknownBlob(_) => (StatusCode::NOT_FOUND, "UNKNOWN_BLOB", message),
        CoreError::DuplicateRequestId(_) => (StatusCode::CONFLICT, "DUPLICATE_REQUEST_ID", message),
        CoreError::StorageUnavailable(detail) => {
            tracing::error!(error = %detail, "Storage unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
                "Storage is temporarily unavailable".to_string(),
            )
        }
        CoreError::RuntimeUnavailable(detail) => {
            tracing::error!(error = %detail, "Job runtime unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "RUNTIME_UNAVAILABLE",
                "The job runtime is temporarily unavailable".to_string(),
            )
        }
        CoreError::Internal(detail) => {
            tracing::error!(error = %detail, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
