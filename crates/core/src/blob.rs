//! Blob store contract: raw upload bytes under generated ids.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{BlobId, Timestamp};
use crate::upload::UploadedFile;

/// A stored upload. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobRecord {
    pub id: BlobId,
    pub file_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub created_at: Timestamp,
}

/// A batch write that stopped partway.
///
/// `stored` holds the ids already written, in input order. They stay valid
/// and addressable.
#[derive(Debug, thiserror::Error)]
#[error("stored {} file(s) before failing: {cause}", stored.len())]
pub struct PartialStore {
    pub stored: Vec<BlobId>,
    pub cause: CoreError,
}

impl From<PartialStore> for CoreError {
    fn from(err: PartialStore) -> Self {
        match err.cause {
            CoreError::StorageUnavailable(msg) => CoreError::StorageUnavailable(format!(
                "{msg} (after storing blobs {:?})",
                err.stored
            )),
            other => other,
        }
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `files` in order, returning one fresh id per file.
    ///
    /// File names are sanitized before they are written. Identical content
    /// stored twice yields two blobs.
    async fn store(&self, files: &[UploadedFile]) -> Result<Vec<BlobId>, PartialStore>;

    /// Read a blob back for job execution.
    async fn fetch(&self, id: BlobId) -> Result<BlobRecord, CoreError>;
}
