use sketchmap_core::blob::BlobRecord;
use sketchmap_core::types::{BlobId, Timestamp};
use sqlx::FromRow;

/// A row from the `blobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct BlobRow {
    pub id: BlobId,
    pub file_name: String,
    pub content: Vec<u8>,
    pub created_at: Timestamp,
}

impl From<BlobRow> for BlobRecord {
    fn from(row: BlobRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            content: row.content,
            created_at: row.created_at,
        }
    }
}
