//! Handlers for request submission, result polling and record deletion.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::types::RequestId;
use sketchmap_core::upload::UploadedFile;
use sketchmap_pipeline::{JobState, NewRequest};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying one job kind token. May repeat.
const KIND_FIELD: &str = "kind";
/// Multipart field carrying one uploaded image. May repeat.
const FILE_FIELD: &str = "file";
/// Multipart field carrying task parameters as JSON.
const PARAMS_FIELD: &str = "params";

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub request_id: RequestId,
}

/// Body returned while polling a job that has not produced a payload.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PollResponse {
    Pending,
    Failed { error: String },
}

// ── Submit ───────────────────────────────────────────────────────────

/// POST /api/v1/requests
///
/// Multipart body with any number of `kind` and `file` fields and an
/// optional `params` field. Without `kind` fields the kinds follow from the
/// uploads: files mean digitizing, no files mean map creation.
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let request = read_new_request(multipart).await?;
    let request_id = state.admission.admit(request).await?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { request_id })))
}

async fn read_new_request(mut multipart: Multipart) -> AppResult<NewRequest> {
    let mut kinds = Vec::new();
    let mut files = Vec::new();
    let mut params = serde_json::Value::Null;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            KIND_FIELD => {
                let token = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                kinds.push(JobKind::parse(token.trim())?);
            }
            FILE_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                files.push(UploadedFile::new(file_name, content.to_vec()));
            }
            PARAMS_FIELD => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                params = serde_json::from_str(&raw)
                    .map_err(|e| AppError::BadRequest(format!("params is not valid JSON: {e}")))?;
            }
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unexpected multipart field '{other}'"
                )));
            }
        }
    }

    if kinds.is_empty() {
        kinds = if files.is_empty() {
            JobKind::MAP_CREATION.to_vec()
        } else {
            JobKind::DIGITIZE.to_vec()
        };
    }

    Ok(NewRequest {
        kinds,
        files,
        params,
    })
}

// ── Poll ─────────────────────────────────────────────────────────────

/// GET /api/v1/requests/{id}/{kind}
///
/// 200 with the raw result when done, 202 while pending, 200 with a
/// `failed` status body when the job failed.
pub async fn poll(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
) -> AppResult<Response> {
    let response = match state.resolver.resolve(&id, &kind).await? {
        JobState::Done(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            Bytes::from(bytes),
        )
            .into_response(),
        JobState::Pending => (StatusCode::ACCEPTED, Json(PollResponse::Pending)).into_response(),
        JobState::Failed(error) => {
            (StatusCode::OK, Json(PollResponse::Failed { error })).into_response()
        }
    };
    Ok(response)
}

// ── Delete ───────────────────────────────────────────────────────────

/// DELETE /api/v1/requests/{id}
///
/// Always 204 unless the store fails; running jobs are not cancelled.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.resolver.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
