//! In-process job runtime.
//!
//! Runs registered tasks on the Tokio runtime of the current process. The
//! [`WorkerContext`] is built once when the runtime is created and shared by
//! every job; tasks themselves are plain functions of (context, payload).

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use sketchmap_core::blob::{BlobRecord, BlobStore};
use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::types::{BlobId, JobHandle};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{JobPayload, JobRuntime, JobState};

// ---------------------------------------------------------------------------
// Worker context
// ---------------------------------------------------------------------------

/// Read-only process context available to every task.
pub struct WorkerContext {
    blobs: Arc<dyn BlobStore>,
    settings: BTreeMap<String, String>,
}

impl WorkerContext {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Fetch the uploads a job refers to, in the order given.
    pub async fn load_blobs(&self, ids: &[BlobId]) -> Result<Vec<BlobRecord>, CoreError> {
        let mut loaded = Vec::with_capacity(ids.len());
        for id in ids {
            loaded.push(self.blobs.fetch(*id).await?);
        }
        Ok(loaded)
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// One kind of work. The error string becomes the job's failure cause.
#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self, ctx: Arc<WorkerContext>, payload: JobPayload) -> Result<Vec<u8>, String>;
}

#[async_trait]
impl<F, Fut> Task for F
where
    F: Fn(Arc<WorkerContext>, JobPayload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>, String>> + Send + 'static,
{
    async fn run(&self, ctx: Arc<WorkerContext>, payload: JobPayload) -> Result<Vec<u8>, String> {
        (self)(ctx, payload).await
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// [`JobRuntime`] executing tasks inside this process.
///
/// Job states live only as long as the runtime; this is meant for embedding
/// and tests, not as a durable queue.
pub struct LocalRuntime {
    context: Arc<WorkerContext>,
    tasks: HashMap<JobKind, Arc<dyn Task>>,
    /// Never evicted: every submitted job keeps its entry, finished or not,
    /// until the runtime is dropped. Not for long-running processes.
    jobs: Arc<RwLock<HashMap<JobHandle, JobState>>>,
}

impl LocalRuntime {
    /// Bind the worker context. This is the only place it is built.
    pub fn new(context: WorkerContext) -> Self {
        Self {
            context: Arc::new(context),
            tasks: HashMap::new(),
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register the task executed for `kind`, replacing any earlier one.
    pub fn with_task(mut self, kind: JobKind, task: impl Task + 'static) -> Self {
        self.tasks.insert(kind, Arc::new(task));
        self
    }

    pub fn context(&self) -> &Arc<WorkerContext> {
        &self.context
    }
}

#[async_trait]
impl JobRuntime for LocalRuntime {
    async fn submit(&self, kind: JobKind, payload: &JobPayload) -> Result<JobHandle, CoreError> {
        let task = self.tasks.get(&kind).cloned().ok_or_else(|| {
            CoreError::RuntimeUnavailable(format!("No task registered for kind {kind}"))
        })?;

        let handle = JobHandle::new(Uuid::new_v4().to_string());
        self.jobs.write().await.insert(handle.clone(), JobState::Pending);

        let ctx = Arc::clone(&self.context);
        let jobs = Arc::clone(&self.jobs);
        let payload = payload.clone();
        let job_handle = handle.clone();
        tokio::spawn(async move {
            // Run in its own task so a panic is observed instead of leaving
            // the job pending forever.
            let outcome = tokio::spawn(async move { task.run(ctx, payload).await }).await;
            let state = match outcome {
                Ok(Ok(bytes)) => JobState::Done(bytes),
                Ok(Err(cause)) => JobState::Failed(cause),
                Err(join_err) => JobState::Failed(format!("Task aborted: {join_err}")),
            };
            tracing::debug!(job_handle = %job_handle, kind = %kind, ?state, "Local job finished");
            jobs.write().await.insert(job_handle, state);
        });

        Ok(handle)
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobState, CoreError> {
        self.jobs
            .read()
            .await
            .get(handle)
            .cloned()
            .ok_or_else(|| CoreError::UnknownJobHandle(handle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use sketchmap_core::memory::MemoryBlobStore;
    use sketchmap_core::upload::UploadedFile;

    use super::*;

    fn context() -> WorkerContext {
        WorkerContext::new(Arc::new(MemoryBlobStore::new())).with_setting("dpi", "300")
    }

    async fn wait_finished(runtime: &LocalRuntime, handle: &JobHandle) -> JobState {
        for _ in 0..200 {
            let state = runtime.status(handle).await.unwrap();
            if state.is_finished() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {handle} did not finish");
    }

    #[tokio::test]
    async fn task_result_becomes_done() {
        let runtime = LocalRuntime::new(context()).with_task(
            JobKind::SketchMap,
            |ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                Ok::<_, String>(ctx.setting("dpi").unwrap_or_default().as_bytes().to_vec())
            },
        );

        let handle = runtime.submit(JobKind::SketchMap, &JobPayload::default()).await.unwrap();
        assert_eq!(wait_finished(&runtime, &handle).await, JobState::Done(b"300".to_vec()));
    }

    #[tokio::test]
    async fn task_error_becomes_failed() {
        let runtime = LocalRuntime::new(context()).with_task(
            JobKind::QualityReport,
            |_ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                Err::<Vec<u8>, _>("no data for area".to_string())
            },
        );

        let handle = runtime
            .submit(JobKind::QualityReport, &JobPayload::default())
            .await
            .unwrap();
        assert_eq!(
            wait_finished(&runtime, &handle).await,
            JobState::Failed("no data for area".into())
        );
    }

    #[tokio::test]
    async fn panicking_task_fails_instead_of_hanging() {
        let runtime = LocalRuntime::new(context()).with_task(
            JobKind::VectorResults,
            |_ctx: Arc<WorkerContext>, payload: JobPayload| async move {
                if payload.blob_ids.is_empty() {
                    panic!("no uploads");
                }
                Ok::<_, String>(Vec::new())
            },
        );

        let handle = runtime
            .submit(JobKind::VectorResults, &JobPayload::default())
            .await
            .unwrap();
        assert_matches!(wait_finished(&runtime, &handle).await, JobState::Failed(_));
    }

    #[tokio::test]
    async fn tasks_share_one_context() {
        let runtime = LocalRuntime::new(context()).with_task(
            JobKind::SketchMap,
            |ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                Ok::<_, String>((Arc::as_ptr(&ctx) as usize).to_le_bytes().to_vec())
            },
        );
        let expected = (Arc::as_ptr(runtime.context()) as usize).to_le_bytes().to_vec();

        for _ in 0..3 {
            let handle = runtime.submit(JobKind::SketchMap, &JobPayload::default()).await.unwrap();
            assert_eq!(wait_finished(&runtime, &handle).await, JobState::Done(expected.clone()));
        }
    }

    #[tokio::test]
    async fn tasks_read_uploads_through_context() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let ids = blobs
            .store(&[UploadedFile::new("scan.png", b"pixels".to_vec())])
            .await
            .unwrap();
        let runtime = LocalRuntime::new(WorkerContext::new(blobs)).with_task(
            JobKind::RasterResults,
            |ctx: Arc<WorkerContext>, payload: JobPayload| async move {
                let uploads = ctx.load_blobs(&payload.blob_ids).await.map_err(|e| e.to_string())?;
                Ok::<Vec<u8>, String>(uploads.into_iter().flat_map(|b| b.content).collect())
            },
        );

        let payload = JobPayload {
            blob_ids: ids,
            params: serde_json::Value::Null,
        };
        let handle = runtime.submit(JobKind::RasterResults, &payload).await.unwrap();
        assert_eq!(wait_finished(&runtime, &handle).await, JobState::Done(b"pixels".to_vec()));
    }

    #[tokio::test]
    async fn finished_jobs_stay_readable() {
        let runtime = LocalRuntime::new(context()).with_task(
            JobKind::SketchMap,
            |_ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                Ok::<_, String>(b"pdf".to_vec())
            },
        );

        let first = runtime.submit(JobKind::SketchMap, &JobPayload::default()).await.unwrap();
        wait_finished(&runtime, &first).await;
        let second = runtime.submit(JobKind::SketchMap, &JobPayload::default()).await.unwrap();
        wait_finished(&runtime, &second).await;

        assert_eq!(runtime.status(&first).await.unwrap(), JobState::Done(b"pdf".to_vec()));
        assert_eq!(runtime.jobs.read().await.len(), 2);
    }

    #[tokio::test]
    async fn unregistered_kind_cannot_be_submitted() {
        let runtime = LocalRuntime::new(context());
        assert_matches!(
            runtime.submit(JobKind::SketchMap, &JobPayload::default()).await,
            Err(CoreError::RuntimeUnavailable(_))
        );
    }

    #[tokio::test]
    async fn unknown_handle_is_reported() {
        let runtime = LocalRuntime::new(context());
        assert_matches!(
            runtime.status(&JobHandle::new("missing")).await,
            Err(CoreError::UnknownJobHandle(_))
        );
    }
}
