//! REST client for a remote task runtime.
//!
//! Speaks the Flower-style task API: work is submitted with
//! `POST {broker}/api/task/async-apply/{task}` and polled with
//! `GET {result_backend}/api/task/result/{task_id}`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::types::JobHandle;

use super::{JobPayload, JobRuntime, JobState};
use crate::config::RuntimeConfig;

/// States the runtime reports while a task has not finished.
const PENDING_STATES: [&str; 4] = ["PENDING", "RECEIVED", "STARTED", "RETRY"];

/// States the runtime reports for a task that will never produce a result.
const FAILED_STATES: [&str; 2] = ["FAILURE", "REVOKED"];

const SUCCESS_STATE: &str = "SUCCESS";

/// Response of the submission endpoint.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "task-id")]
    task_id: String,
}

/// Response of the result endpoint.
#[derive(Debug, Deserialize)]
struct ResultResponse {
    state: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Errors from the REST layer, folded into [`CoreError`] at the trait boundary.
#[derive(Debug, thiserror::Error)]
enum TaskApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Task API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected task state '{0}'")]
    UnknownState(String),
}

impl From<TaskApiError> for CoreError {
    fn from(err: TaskApiError) -> Self {
        CoreError::RuntimeUnavailable(err.to_string())
    }
}

/// [`JobRuntime`] backed by a remote task runtime over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRuntime {
    client: reqwest::Client,
    broker_url: String,
    result_backend_url: String,
}

impl HttpRuntime {
    pub fn new(config: &RuntimeConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &RuntimeConfig) -> Self {
        Self {
            client,
            broker_url: config.broker_url.clone(),
            result_backend_url: config.result_backend_url.clone(),
        }
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TaskApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
        Err(TaskApiError::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl JobRuntime for HttpRuntime {
    async fn submit(&self, kind: JobKind, payload: &JobPayload) -> Result<JobHandle, CoreError> {
        let body = serde_json::json!({ "args": [payload] });
        let response = self
            .client
            .post(format!(
                "{}/api/task/async-apply/{}",
                self.broker_url,
                kind.task_name()
            ))
            .json(&body)
            .send()
            .await
            .map_err(TaskApiError::from)?;

        let submitted: SubmitResponse = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(TaskApiError::from)?;
        Ok(JobHandle::new(submitted.task_id))
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobState, CoreError> {
        let response = self
            .client
            .get(format!(
                "{}/api/task/result/{}",
                self.result_backend_url,
                handle.as_str()
            ))
            .send()
            .await
            .map_err(TaskApiError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::UnknownJobHandle(handle.to_string()));
        }

        let result: ResultResponse = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(TaskApiError::from)?;
        Ok(interpret(result)?)
    }
}

fn interpret(response: ResultResponse) -> Result<JobState, TaskApiError> {
    let state = response.state.as_str();
    if PENDING_STATES.contains(&state) {
        Ok(JobState::Pending)
    } else if state == SUCCESS_STATE {
        Ok(JobState::Done(result_bytes(response.result)))
    } else if FAILED_STATES.contains(&state) {
        let cause = match response.result {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => state.to_lowercase(),
            other => other.to_string(),
        };
        Ok(JobState::Failed(cause))
    } else {
        Err(TaskApiError::UnknownState(response.state))
    }
}

/// A string result is taken as the payload itself; anything else is passed on
/// as its JSON encoding.
fn result_bytes(result: serde_json::Value) -> Vec<u8> {
    match result {
        serde_json::Value::String(s) => s.into_bytes(),
        other => other.to_string().into_bytes(),
    }
}
