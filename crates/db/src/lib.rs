//! PostgreSQL backing for the request registry and the blob store.
//!
//! There is no pool. Every logical operation opens its own connection through
//! [`Database::connect`], does its work and hands the connection back to
//! [`release`] on every exit path. Tables are created on first use.

use std::str::FromStr;

use sketchmap_core::error::CoreError;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

pub mod models;
pub mod repositories;
pub mod schema;

pub use repositories::{BlobRepo, RequestRepo};

/// Connection settings for the relational store.
///
/// Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct Database {
    options: PgConnectOptions,
}

impl Database {
    /// Build from a connection string such as `postgres://user:pw@host/db`.
    ///
    /// A `db+` prefix (as written by some task-runtime result backends) is
    /// stripped before parsing.
    pub fn from_url(database_url: &str) -> Result<Self, CoreError> {
        let url = database_url.strip_prefix("db+").unwrap_or(database_url);
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| CoreError::Internal(format!("Invalid database URL: {e}")))?;
        Ok(Self { options })
    }

    pub fn from_options(options: PgConnectOptions) -> Self {
        Self { options }
    }

    /// Open a fresh connection for one logical operation.
    pub async fn connect(&self) -> Result<PgConnection, CoreError> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(storage_error)
    }

    /// Verify the database is reachable with a trivial query.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        let mut conn = self.connect().await?;
        let outcome = sqlx::query("SELECT 1").execute(&mut conn).await;
        release(conn).await;
        outcome.map(|_| ()).map_err(storage_error)
    }
}

/// Close a connection acquired with [`Database::connect`].
///
/// A failing close is logged, never propagated: the operation's own outcome
/// is what the caller needs to see.
pub async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection cleanly");
    }
}

/// Map a driver error to the infrastructure fault the core exposes.
pub(crate) fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::StorageUnavailable(err.to_string())
}
