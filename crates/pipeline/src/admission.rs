//! Admission of new client requests.
//!
//! Order is fixed: validate the whole upload batch, store it, submit every
//! job, and only then register the request id. A request id therefore never
//! points at a partial job set.

use std::sync::Arc;

use sketchmap_core::blob::BlobStore;
use sketchmap_core::error::CoreError;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::registry::RequestRegistry;
use sketchmap_core::types::{BlobId, RequestId};
use sketchmap_core::upload::{validate_uploads, UploadLimits, UploadedFile};

use crate::dispatcher::Dispatcher;
use crate::runtime::JobPayload;

/// A request as handed over by the route layer.
#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub kinds: Vec<JobKind>,
    pub files: Vec<UploadedFile>,
    /// Task parameters passed through to every job of the request.
    pub params: serde_json::Value,
}

impl NewRequest {
    /// A new printable map and its quality report.
    pub fn map_creation(params: serde_json::Value) -> Self {
        Self {
            kinds: JobKind::MAP_CREATION.to_vec(),
            files: Vec::new(),
            params,
        }
    }

    /// Raster and vector extraction of uploaded marked maps.
    pub fn digitize(files: Vec<UploadedFile>) -> Self {
        Self {
            kinds: JobKind::DIGITIZE.to_vec(),
            files,
            params: serde_json::Value::Null,
        }
    }
}

pub struct Admission {
    registry: Arc<dyn RequestRegistry>,
    blobs: Arc<dyn BlobStore>,
    dispatcher: Dispatcher,
    limits: UploadLimits,
}

impl Admission {
    pub fn new(
        registry: Arc<dyn RequestRegistry>,
        blobs: Arc<dyn BlobStore>,
        dispatcher: Dispatcher,
        limits: UploadLimits,
    ) -> Self {
        Self {
            registry,
            blobs,
            dispatcher,
            limits,
        }
    }

    /// Admit a request and return the id the client polls with.
    pub async fn admit(&self, request: NewRequest) -> Result<RequestId, CoreError> {
        let NewRequest {
            kinds,
            files,
            params,
        } = request;

        check_shape(&kinds, &files)?;

        let blob_ids: Vec<BlobId> = if files.is_empty() {
            Vec::new()
        } else {
            let pixels = validate_uploads(&files, &self.limits)?;
            tracing::debug!(files = files.len(), pixels, "Upload batch validated");
            self.blobs.store(&files).await?
        };

        let jobs: Vec<(JobKind, JobPayload)> = kinds
            .iter()
            .map(|kind| {
                let payload = JobPayload {
                    blob_ids: if kind.consumes_uploads() {
                        blob_ids.clone()
                    } else {
                        Vec::new()
                    },
                    params: params.clone(),
                };
                (*kind, payload)
            })
            .collect();
        let handles = self.dispatcher.submit_all(&jobs).await?;

        let request_id = RequestId::new();
        self.registry.put(request_id, &handles).await?;

        tracing::info!(
            request_id = %request_id,
            kinds = ?kinds,
            blob_ids = ?blob_ids,
            "Request admitted",
        );
        Ok(request_id)
    }
}

/// Reject requests whose kinds and uploads do not fit together.
fn check_shape(kinds: &[JobKind], files: &[UploadedFile]) -> Result<(), CoreError> {
    if kinds.is_empty() {
        return Err(CoreError::Validation(
            "At least one job kind is required".into(),
        ));
    }

    let consumes_uploads = kinds.iter().any(|kind| kind.consumes_uploads());
    if consumes_uploads && files.is_empty() {
        return Err(CoreError::Validation(
            "Digitizing requires at least one uploaded file".into(),
        ));
    }
    if !consumes_uploads && !files.is_empty() {
        return Err(CoreError::Validation(
            "Uploaded files are only accepted for digitizing jobs".into(),
        ));
    }
    Ok(())
}
