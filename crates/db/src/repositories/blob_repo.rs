//! Repository for the `blobs` table.

use async_trait::async_trait;
use sketchmap_core::blob::{BlobRecord, BlobStore, PartialStore};
use sketchmap_core::error::CoreError;
use sketchmap_core::types::BlobId;
use sketchmap_core::upload::{sanitize_file_name, UploadedFile};
use sqlx::postgres::PgConnection;

use crate::models::blob::BlobRow;
use crate::{release, schema, storage_error, Database};

/// Column list for `blobs` queries.
const COLUMNS: &str = "id, file_name, content, created_at";

/// PostgreSQL-backed [`BlobStore`].
#[derive(Debug, Clone)]
pub struct BlobRepo {
    db: Database,
}

impl BlobRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append each file as its own statement so earlier ids survive a later
    /// failure. Pushes every written id into `stored`.
    async fn insert_all(
        conn: &mut PgConnection,
        files: &[UploadedFile],
        stored: &mut Vec<BlobId>,
    ) -> Result<(), sqlx::Error> {
        schema::ensure_blobs(conn).await?;
        for file in files {
            let id: BlobId = sqlx::query_scalar(
                "INSERT INTO blobs (file_name, content) VALUES ($1, $2) RETURNING id",
            )
            .bind(sanitize_file_name(&file.file_name))
            .bind(&file.content)
            .fetch_one(&mut *conn)
            .await?;
            stored.push(id);
        }
        Ok(())
    }

    async fn select(conn: &mut PgConnection, id: BlobId) -> Result<Option<BlobRow>, sqlx::Error> {
        schema::ensure_blobs(conn).await?;
        let query = format!("SELECT {COLUMNS} FROM blobs WHERE id = $1");
        sqlx::query_as::<_, BlobRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}

#[async_trait]
impl BlobStore for BlobRepo {
    async fn store(&self, files: &[UploadedFile]) -> Result<Vec<BlobId>, PartialStore> {
        let mut stored = Vec::with_capacity(files.len());
        let mut conn = match self.db.connect().await {
            Ok(conn) => conn,
            Err(cause) => return Err(PartialStore { stored, cause }),
        };
        let outcome = Self::insert_all(&mut conn, files, &mut stored).await;
        release(conn).await;

        match outcome {
            Ok(()) => {
                tracing::info!(count = stored.len(), blob_ids = ?stored, "Stored uploaded files");
                Ok(stored)
            }
            Err(e) => {
                tracing::error!(
                    written = stored.len(),
                    requested = files.len(),
                    "Blob batch stopped partway",
                );
                Err(PartialStore {
                    stored,
                    cause: storage_error(e),
                })
            }
        }
    }

    async fn fetch(&self, id: BlobId) -> Result<BlobRecord, CoreError> {
        let mut conn = self.db.connect().await?;
        let outcome = Self::select(&mut conn, id).await;
        release(conn).await;

        outcome
            .map_err(storage_error)?
            .map(BlobRecord::from)
            .ok_or(CoreError::UnknownBlob(id))
    }
}
