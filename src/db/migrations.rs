//! Database initialization and schema versioning.
//!
//! The schema version is kept in SQLite's `user_version` header field. A fresh
//! file is at version 0; `schema.sql` takes it to [`SCHEMA_VERSION`].

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info};

/// Schema version written by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Open (creating if needed) the scorebook database and bring its schema up to date.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_connection(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    migrate(&pool).await?;

    info!(path = %db_path, schema_version = SCHEMA_VERSION, "Scorebook database ready");
    Ok(pool)
}

async fn schema_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("PRAGMA user_version").fetch_one(pool).await?;
    row.try_get(0)
}

/// Apply `schema.sql` in one transaction unless the file is already current.
///
/// A database written by a newer build is refused rather than downgraded.
async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let found = schema_version(pool).await?;
    if found == SCHEMA_VERSION {
        debug!(schema_version = found, "Schema up to date");
        return Ok(());
    }
    if found > SCHEMA_VERSION {
        return Err(sqlx::Error::Configuration(
            format!(
                "database schema v{} is newer than supported v{}",
                found, SCHEMA_VERSION
            )
            .into(),
        ));
    }

    info!(from = found, to = SCHEMA_VERSION, "Migrating schema");
    let mut tx = pool.begin().await?;
    for statement in include_str!("schema.sql").split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
    }
    // PRAGMA does not take bound parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Per-connection settings. Foreign keys must be on for over and ball cascades.
async fn configure_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // Setting journal_mode returns the mode actually in effect.
    let journal_mode: String = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?
        .try_get(0)?;
    debug!(journal_mode = %journal_mode, "SQLite connection configured");

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn temp_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested")
            .join("scorebook.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_creates_tables_and_stamps_version() {
        let (pool, _temp) = temp_pool().await;

        for table in ["matches", "innings", "overs", "balls"] {
            let result: (String,) =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
                    .bind(table)
                    .fetch_one(&pool)
                    .await
                    .expect("query failed");
            assert_eq!(result.0, table);
        }
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let (pool, _temp) = temp_pool().await;
        migrate(&pool).await.expect("second migration failed");

        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
                .fetch_one(&pool)
                .await
                .expect("query failed");
        assert_eq!(result.0, 4);
    }

    #[tokio::test]
    async fn test_newer_schema_is_refused() {
        let (pool, _temp) = temp_pool().await;
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION + 1))
            .execute(&pool)
            .await
            .unwrap();

        let err = migrate(&pool).await.unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (pool, _temp) = temp_pool().await;

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }
}
