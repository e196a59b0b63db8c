//! Table definitions, created on first use.
//!
//! Every statement is `CREATE ... IF NOT EXISTS`, so running them before each
//! operation is safe.

use sqlx::postgres::PgConnection;

/// `request_jobs`: one row per request id holding its kind → handle map.
const CREATE_REQUEST_JOBS: &str = "\
    CREATE TABLE IF NOT EXISTS request_jobs ( \
        request_id UUID PRIMARY KEY, \
        jobs JSONB NOT NULL, \
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW() \
    )";

/// `blobs`: raw uploaded files under generated ids.
const CREATE_BLOBS: &str = "\
    CREATE TABLE IF NOT EXISTS blobs ( \
        id BIGSERIAL PRIMARY KEY, \
        file_name TEXT NOT NULL, \
        content BYTEA NOT NULL, \
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW() \
    )";

/// PostgreSQL error codes raised when two sessions race on
/// `CREATE TABLE IF NOT EXISTS`: `unique_violation` on the catalog and
/// `duplicate_table`.
const CREATE_RACE_CODES: [&str; 2] = ["23505", "42P07"];

pub async fn ensure_request_jobs(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    create_if_absent(conn, CREATE_REQUEST_JOBS).await
}

pub async fn ensure_blobs(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    create_if_absent(conn, CREATE_BLOBS).await
}

async fn create_if_absent(conn: &mut PgConnection, ddl: &str) -> Result<(), sqlx::Error> {
    match sqlx::query(ddl).execute(&mut *conn).await {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err))
            if db_err
                .code()
                .is_some_and(|code| CREATE_RACE_CODES.contains(&&*code)) =>
        {
            // Another session created the table between our check and insert.
            Ok(())
        }
        Err(e) => Err(e),
    }
}
