//! Job dispatcher.
//!
//! Thin layer over a [`JobRuntime`] that submits the jobs of one request and
//! queries job state, logging every hand-off.

use std::sync::Arc;

use futures::future::try_join_all;
use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::registry::JobMap;
use sketchmap_core::types::JobHandle;

use crate::runtime::{JobPayload, JobRuntime, JobState};

#[derive(Clone)]
pub struct Dispatcher {
    runtime: Arc<dyn JobRuntime>,
}

impl Dispatcher {
    pub fn new(runtime: Arc<dyn JobRuntime>) -> Self {
        Self { runtime }
    }

    /// Submit one unit of work. Returns as soon as the runtime accepted it.
    pub async fn submit(&self, kind: JobKind, payload: &JobPayload) -> Result<JobHandle, CoreError> {
        match self.runtime.submit(kind, payload).await {
            Ok(handle) => {
                tracing::info!(
                    kind = %kind,
                    job_handle = %handle,
                    blob_count = payload.blob_ids.len(),
                    "Job submitted",
                );
                Ok(handle)
            }
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Job submission failed");
                Err(e)
            }
        }
    }

    /// Submit every job of one request concurrently.
    ///
    /// Succeeds only if every submission succeeded. On failure, jobs that
    /// were already accepted keep running in the runtime but no handle map
    /// is returned, so they never become reachable through the registry.
    pub async fn submit_all(&self, jobs: &[(JobKind, JobPayload)]) -> Result<JobMap, CoreError> {
        let mut seen = Vec::with_capacity(jobs.len());
        for (kind, _) in jobs {
            if seen.contains(kind) {
                return Err(CoreError::Validation(format!(
                    "Job kind {kind} requested more than once"
                )));
            }
            seen.push(*kind);
        }

        let submissions = jobs.iter().map(|(kind, payload)| async move {
            self.submit(*kind, payload).await.map(|handle| (*kind, handle))
        });
        let handles = try_join_all(submissions).await?;
        Ok(handles.into_iter().collect())
    }

    /// Current state of a job. Safe to call any number of times.
    pub async fn status(&self, handle: &JobHandle) -> Result<JobState, CoreError> {
        self.runtime.status(handle).await
    }
}
