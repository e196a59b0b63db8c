//! In-memory registry and blob store for tests.
//!
//! Both honour the same contracts as the PostgreSQL implementations:
//! write-once request ids, ordered fresh blob ids, no dedup.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::blob::{BlobRecord, BlobStore, PartialStore};
use crate::error::CoreError;
use crate::registry::{JobMap, RequestRecord, RequestRegistry};
use crate::types::{BlobId, RequestId};
use crate::upload::{sanitize_file_name, UploadedFile};

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<HashMap<RequestId, RequestRecord>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RequestRegistry for MemoryRegistry {
    async fn put(&self, request_id: RequestId, jobs: &JobMap) -> Result<(), CoreError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&request_id) {
            return Err(CoreError::DuplicateRequestId(request_id));
        }
        records.insert(
            request_id,
            RequestRecord {
                request_id,
                jobs: jobs.clone(),
                created_at: chrono::Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, request_id: RequestId) -> Result<RequestRecord, CoreError> {
        self.records
            .lock()
            .await
            .get(&request_id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownRequestId(request_id.to_string()))
    }

    async fn delete(&self, request_id: RequestId) -> Result<(), CoreError> {
        self.records.lock().await.remove(&request_id);
        Ok(())
    }
}

/// Blob store backed by a map. `fail_after` makes every write past the given
/// count fail, for exercising partial batches.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    inner: Mutex<BlobState>,
    fail_after: Option<usize>,
}

#[derive(Debug, Default)]
struct BlobState {
    next_id: BlobId,
    blobs: HashMap<BlobId, BlobRecord>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.blobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, files: &[UploadedFile]) -> Result<Vec<BlobId>, PartialStore> {
        let mut state = self.inner.lock().await;
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            if self.fail_after.is_some_and(|limit| state.blobs.len() >= limit) {
                return Err(PartialStore {
                    stored,
                    cause: CoreError::StorageUnavailable("blob store is full".into()),
                });
            }
            state.next_id += 1;
            let id = state.next_id;
            state.blobs.insert(
                id,
                BlobRecord {
                    id,
                    file_name: sanitize_file_name(&file.file_name),
                    content: file.content.clone(),
                    created_at: chrono::Utc::now(),
                },
            );
            stored.push(id);
        }
        Ok(stored)
    }

    async fn fetch(&self, id: BlobId) -> Result<BlobRecord, CoreError> {
        self.inner
            .lock()
            .await
            .blobs
            .get(&id)
            .cloned()
            .ok_or(CoreError::UnknownBlob(id))
    }
}
