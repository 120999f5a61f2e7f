//! Credential store: username / password-hash pairs.
//!
//! Accounts are insert-only. There is deliberately no update or delete.

use sqlx::{Executor, Sqlite, SqlitePool};
use thiserror::Error;

/// Outcome of a failed account insert
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

/// Insert a new account. Fails with `DuplicateUsername` if the name is taken.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<i64, CredentialError> {
    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::info!("Signup rejected, username already exists: {}", username);
            Err(CredentialError::DuplicateUsername)
        }
        Err(e) => Err(CredentialError::StoreUnavailable(e)),
    }
}

/// Stored password hash for `username`, if the account exists
pub async fn find_password_hash(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Whether an account named `username` exists. Takes any executor so the
/// check can run inside a caller's transaction.
pub async fn user_exists<'e, E>(executor: E, username: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
        .bind(username)
        .fetch_one(executor)
        .await
}

#[cfg(test)]
pub(crate) async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_create_user_and_check_existence() {
        let (_dir, pool) = test_pool().await;

        let id = create_user(&pool, "alice", "hash-a").await.unwrap();
        assert!(id > 0);

        assert_eq!(
            find_password_hash(&pool, "alice").await.unwrap().as_deref(),
            Some("hash-a")
        );
        assert!(user_exists(&pool, "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_hash() {
        let (_dir, pool) = test_pool().await;

        assert!(find_password_hash(&pool, "nobody").await.unwrap().is_none());
        assert!(!user_exists(&pool, "nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_leaves_store_unchanged() {
        let (_dir, pool) = test_pool().await;

        create_user(&pool, "alice", "first").await.unwrap();
        let err = create_user(&pool, "alice", "second").await.unwrap_err();

        assert!(matches!(err, CredentialError::DuplicateUsername));
        assert_eq!(count_users(&pool).await.unwrap(), 1);
        assert_eq!(
            find_password_hash(&pool, "alice").await.unwrap().as_deref(),
            Some("first")
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_not_duplicate() {
        let (_dir, pool) = test_pool().await;
        pool.close().await;

        let err = create_user(&pool, "alice", "hash").await.unwrap_err();
        assert!(matches!(err, CredentialError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let (_dir, pool) = test_pool().await;

        create_user(&pool, "alice", "a").await.unwrap();
        create_user(&pool, "Alice", "b").await.unwrap();

        assert!(user_exists(&pool, "Alice").await.unwrap());
        assert_eq!(count_users(&pool).await.unwrap(), 2);
    }
}
