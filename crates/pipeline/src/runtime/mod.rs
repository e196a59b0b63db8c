//! The seam between this service and whatever executes jobs.
//!
//! [`JobRuntime`] is all the rest of the workspace knows about execution:
//! hand over a kind and a payload, get a handle back, ask for its state
//! later. Submission never waits for the work itself.

pub mod http;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::types::{BlobId, JobHandle};

pub use http::HttpRuntime;
pub use local::{LocalRuntime, Task, WorkerContext};

/// Input of one unit of work.
///
/// `params` is passed through untouched; its shape is defined by the task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Uploaded files the job reads, in upload order.
    #[serde(default)]
    pub blob_ids: Vec<BlobId>,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Observed state of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Done(Vec<u8>),
    Failed(String),
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[async_trait]
pub trait JobRuntime: Send + Sync {
    /// Queue work and return its handle without waiting for it to run.
    async fn submit(&self, kind: JobKind, payload: &JobPayload) -> Result<JobHandle, CoreError>;

    /// Current state of a job. Calling this has no side effects.
    async fn status(&self, handle: &JobHandle) -> Result<JobState, CoreError>;
}
