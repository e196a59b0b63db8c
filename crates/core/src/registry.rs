//! Request registry contract: request id → {job kind → job handle}.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job_kind::JobKind;
use crate::types::{JobHandle, RequestId, Timestamp};

/// Job handles of one request, keyed by kind.
///
/// Serializes as a JSON object with kind tokens as keys, e.g.
/// `{"sketch-map": "h1", "quality-report": "h2"}`.
pub type JobMap = BTreeMap<JobKind, JobHandle>;

/// The persisted unit of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub request_id: RequestId,
    pub jobs: JobMap,
    pub created_at: Timestamp,
}

impl RequestRecord {
    /// Look up the handle for `kind`.
    pub fn handle(&self, kind: JobKind) -> Result<&JobHandle, CoreError> {
        self.jobs
            .get(&kind)
            .ok_or(CoreError::UnknownKindForRequest {
                request_id: self.request_id,
                kind,
            })
    }
}

/// Single source of truth for request/job correlation.
///
/// Implementations must make `put` atomic (the whole map or nothing) and
/// write-once per request id. They must not cache records in process.
#[async_trait]
pub trait RequestRegistry: Send + Sync {
    /// Persist the job map of a new request.
    ///
    /// Fails with [`CoreError::DuplicateRequestId`] if the id is already
    /// registered; the existing record is left untouched.
    async fn put(&self, request_id: RequestId, jobs: &JobMap) -> Result<(), CoreError>;

    /// Fetch the full record, or [`CoreError::UnknownRequestId`].
    async fn get(&self, request_id: RequestId) -> Result<RequestRecord, CoreError>;

    /// Remove a record. Removing an absent id succeeds.
    async fn delete(&self, request_id: RequestId) -> Result<(), CoreError>;

    /// Fetch the handle of one job.
    ///
    /// Distinguishes an unknown request ([`CoreError::UnknownRequestId`])
    /// from a known request without that kind
    /// ([`CoreError::UnknownKindForRequest`]).
    async fn get_handle(&self, request_id: RequestId, kind: JobKind) -> Result<JobHandle, CoreError> {
        let record = self.get(request_id).await?;
        record.handle(kind).cloned()
    }

    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
