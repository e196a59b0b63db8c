use sketchmap_core::registry::{JobMap, RequestRecord};
use sketchmap_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `request_jobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    pub request_id: Uuid,
    pub jobs: Json<JobMap>,
    pub created_at: Timestamp,
}

impl From<RequestRow> for RequestRecord {
    fn from(row: RequestRow) -> Self {
        Self {
            request_id: row.request_id.into(),
            jobs: row.jobs.0,
            created_at: row.created_at,
        }
    }
}
