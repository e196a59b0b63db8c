//! Repository for the `request_jobs` table.

use async_trait::async_trait;
use sketchmap_core::error::CoreError;
use sketchmap_core::registry::{JobMap, RequestRecord, RequestRegistry};
use sketchmap_core::types::RequestId;
use sqlx::postgres::PgConnection;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::request::RequestRow;
use crate::{release, schema, storage_error, Database};

/// Column list for `request_jobs` queries.
const COLUMNS: &str = "request_id, jobs, created_at";

/// PostgreSQL-backed [`RequestRegistry`].
#[derive(Debug, Clone)]
pub struct RequestRepo {
    db: Database,
}

impl RequestRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a row unless the id exists. Returns whether a row was written.
    async fn insert(
        conn: &mut PgConnection,
        request_id: Uuid,
        jobs: &JobMap,
    ) -> Result<bool, sqlx::Error> {
        schema::ensure_request_jobs(conn).await?;
        let result = sqlx::query(
            "INSERT INTO request_jobs (request_id, jobs) VALUES ($1, $2) \
             ON CONFLICT (request_id) DO NOTHING",
        )
        .bind(request_id)
        .bind(Json(jobs))
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn select(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<Option<RequestRow>, sqlx::Error> {
        schema::ensure_request_jobs(conn).await?;
        let query = format!("SELECT {COLUMNS} FROM request_jobs WHERE request_id = $1");
        sqlx::query_as::<_, RequestRow>(&query)
            .bind(request_id)
            .fetch_optional(&mut *conn)
            .await
    }

    async fn remove(conn: &mut PgConnection, request_id: Uuid) -> Result<u64, sqlx::Error> {
        schema::ensure_request_jobs(conn).await?;
        let result = sqlx::query("DELETE FROM request_jobs WHERE request_id = $1")
            .bind(request_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RequestRegistry for RequestRepo {
    async fn put(&self, request_id: RequestId, jobs: &JobMap) -> Result<(), CoreError> {
        let mut conn = self.db.connect().await?;
        let outcome = Self::insert(&mut conn, request_id.as_uuid(), jobs).await;
        release(conn).await;

        if !outcome.map_err(storage_error)? {
            tracing::warn!(request_id = %request_id, "Rejected duplicate request id");
            return Err(CoreError::DuplicateRequestId(request_id));
        }
        tracing::info!(
            request_id = %request_id,
            kinds = jobs.len(),
            "Registered request jobs",
        );
        Ok(())
    }

    async fn get(&self, request_id: RequestId) -> Result<RequestRecord, CoreError> {
        let mut conn = self.db.connect().await?;
        let outcome = Self::select(&mut conn, request_id.as_uuid()).await;
        release(conn).await;

        outcome
            .map_err(storage_error)?
            .map(RequestRecord::from)
            .ok_or_else(|| CoreError::UnknownRequestId(request_id.to_string()))
    }

    async fn delete(&self, request_id: RequestId) -> Result<(), CoreError> {
        let mut conn = self.db.connect().await?;
        let outcome = Self::remove(&mut conn, request_id.as_uuid()).await;
        release(conn).await;

        let removed = outcome.map_err(storage_error)?;
        tracing::debug!(request_id = %request_id, removed, "Deleted request jobs");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        self.db.health_check().await
    }
}
