pub mod login_attempts;
pub mod pool;
pub mod translations;
pub mod users;

pub use pool::create_pool;
pub use users::CredentialError;

use sqlx::SqlitePool;
use std::path::Path;

use crate::error::{AppError, Result};

/// Open or create the SQLite database at the given path
///
/// Creates the parent directory and applies pending migrations.
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool> {
    let path = path.as_ref();
    tracing::info!("Opening database at: {:?}", path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                AppError::Database(sqlx::Error::Io(e))
            })?;
        }
    }

    let pool = create_pool(path).await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database initialized successfully");

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    /// Fresh migrated database in a temporary directory.
    /// Keep the `TempDir` alive for as long as the pool is used.
    pub async fn test_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let pool = super::connect(dir.path().join("test.db")).await.unwrap();
        (dir, pool)
    }

    /// Insert a user row directly, skipping password hashing
    pub async fn insert_user(pool: &SqlitePool, username: &str) {
        super::users::create_user(pool, username, "$argon2id$placeholder")
            .await
            .unwrap();
    }
}
