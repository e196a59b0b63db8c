//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use sketchmap_api::error::AppError;
use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::types::RequestId;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Rejected input
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_kind_returns_400() {
    let (status, json) = error_to_response(CoreError::InvalidKind("pdf".into()).into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_KIND");
    assert_eq!(json["error"], "Invalid job kind: pdf");
}

#[tokio::test]
async fn upload_limits_exceeded_returns_413_with_both_numbers() {
    let err = CoreError::UploadLimitsExceeded {
        limit: 51,
        observed: 52,
    };
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "UPLOAD_LIMITS_EXCEEDED");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("51") && message.contains("52"));
}

#[tokio::test]
async fn unreadable_image_returns_422() {
    let err = CoreError::UnreadableImage {
        file_name: "test.jpg".into(),
        reason: "format could not be determined".into(),
    };
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "UNREADABLE_IMAGE");
}

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("missing boundary".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "missing boundary");
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_request_and_unknown_kind_are_distinct_404s() {
    let (status, json) =
        error_to_response(CoreError::UnknownRequestId("non-existent-id".into()).into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "UNKNOWN_REQUEST_ID");

    let err = CoreError::UnknownKindForRequest {
        request_id: RequestId::new(),
        kind: JobKind::RasterResults,
    };
    let (status, json) = error_to_response(err.into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "UNKNOWN_KIND_FOR_REQUEST");
}

#[tokio::test]
async fn duplicate_request_id_returns_409() {
    let (status, json) =
        error_to_response(CoreError::DuplicateRequestId(RequestId::new()).into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "DUPLICATE_REQUEST_ID");
}

// ---------------------------------------------------------------------------
// Infrastructure faults are sanitized
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storage_unavailable_returns_503_without_details() {
    let err = CoreError::StorageUnavailable("password authentication failed for user sm".into());
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "STORAGE_UNAVAILABLE");
    assert!(!json["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn runtime_unavailable_returns_503_without_details() {
    let err = CoreError::RuntimeUnavailable("error sending request for url http://10.0.0.7".into());
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "RUNTIME_UNAVAILABLE");
    assert!(!json["error"].as_str().unwrap().contains("10.0.0.7"));
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret leaked".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
