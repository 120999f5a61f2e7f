//! Account signup and password login.
//!
//! Argon2 work is CPU-bound, so hashing and verification run on the
//! blocking thread pool.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::OnceLock;

use crate::constants::ERR_USERNAME_FORMAT;
use crate::db::{login_attempts, users};
use crate::error::{AppError, Result};
use crate::models::{LockoutPolicy, User};
use crate::policy;
use crate::security::{hash_password, verify_password};

/// Hash checked against when the username is unknown, so that a missing
/// account costs the same as a wrong password
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("fingerspell-dummy-password").unwrap_or_default())
}

/// Create an account
///
/// The username is trimmed before validation and storage. Returns the
/// stored username.
pub async fn register(pool: &SqlitePool, username: &str, password: &str) -> Result<String> {
    let username = username.trim();
    if !User::validate_username(username) {
        tracing::warn!("Signup rejected, invalid username format");
        return Err(AppError::InvalidUsername(ERR_USERNAME_FORMAT.to_string()));
    }

    policy::check(password)?;

    let plaintext = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&plaintext)).await??;

    let id = users::create_user(pool, username, &password_hash).await?;
    tracing::info!("New user registered: {} (id {})", username, id);

    Ok(username.to_string())
}

/// Check a username/password pair, subject to the login throttle
///
/// Returns the authenticated username. Unknown users and wrong passwords
/// both fail with `InvalidCredentials`.
pub async fn login(
    pool: &SqlitePool,
    lockout: &LockoutPolicy,
    username: &str,
    password: &str,
) -> Result<String> {
    login_at(pool, lockout, username, password, Utc::now().timestamp()).await
}

async fn login_at(
    pool: &SqlitePool,
    lockout: &LockoutPolicy,
    username: &str,
    password: &str,
    now: i64,
) -> Result<String> {
    let username = username.trim();
    if !User::validate_username(username) {
        tracing::warn!("Login rejected, invalid username format");
        return Err(AppError::InvalidCredentials);
    }

    // The attempt is counted before the password is checked, so parallel
    // guesses cannot outrun the limit
    if lockout.is_enabled() {
        match login_attempts::reserve_attempt(pool, username, now, lockout).await {
            Ok(true) => tracing::warn!(
                "Locking {} for {} seconds after repeated attempts",
                username,
                lockout.lockout_secs
            ),
            Ok(false) => {}
            Err(e) => {
                if matches!(e, AppError::LoginLocked { .. }) {
                    tracing::warn!("Login refused, {} is locked out", username);
                }
                return Err(e);
            }
        }
    }

    let stored_hash = users::find_password_hash(pool, username).await?;
    let candidate = password.to_string();
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&candidate, &hash),
        None => {
            verify_password(&candidate, dummy_hash());
            false
        }
    })
    .await?;

    if verified {
        if lockout.is_enabled() {
            login_attempts::clear(pool, username).await?;
        }
        tracing::info!("User logged in: {}", username);
        return Ok(username.to_string());
    }

    tracing::warn!("Failed login for {}", username);
    Err(AppError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    const GOOD_PASSWORD: &str = "abcd123!";

    fn policy(max_failures: u32) -> LockoutPolicy {
        LockoutPolicy {
            max_failures,
            window_secs: 900,
            lockout_secs: 600,
        }
    }

    #[tokio::test]
    async fn test_register_trims_and_stores_hash() {
        let (_dir, pool) = test_pool().await;

        let name = register(&pool, "  alice ", GOOD_PASSWORD).await.unwrap();
        assert_eq!(name, "alice");

        let hash = users::find_password_hash(&pool, "alice")
            .await
            .unwrap()
            .unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, GOOD_PASSWORD);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let (_dir, pool) = test_pool().await;
        register(&pool, "alice", GOOD_PASSWORD).await.unwrap();

        let err = register(&pool, "alice", "wxyz987?").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_before_store() {
        let (_dir, pool) = test_pool().await;

        let err = register(&pool, "alice", "abcd12!").await.unwrap_err();
        assert!(matches!(err, AppError::WeakPassword(_)));
        assert_eq!(users::count_users(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_username() {
        let (_dir, pool) = test_pool().await;

        for name in ["", "   ", "bad\u{7}name"] {
            let err = register(&pool, name, GOOD_PASSWORD).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidUsername(_)));
        }
        assert_eq!(users::count_users(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_ok_and_wrong_password() {
        let (_dir, pool) = test_pool().await;
        register(&pool, "alice", GOOD_PASSWORD).await.unwrap();

        let name = login(&pool, &policy(5), "alice", GOOD_PASSWORD).await.unwrap();
        assert_eq!(name, "alice");

        let err = login(&pool, &policy(5), "alice", "abcd124!").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_user_looks_like_wrong_password() {
        let (_dir, pool) = test_pool().await;

        let err = login(&pool, &policy(5), "nobody", GOOD_PASSWORD).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_lockout_refuses_correct_password_until_it_passes() {
        let (_dir, pool) = test_pool().await;
        register(&pool, "alice", GOOD_PASSWORD).await.unwrap();
        let lockout = policy(3);
        let now = 1_700_000_000;

        for _ in 0..3 {
            let err = login_at(&pool, &lockout, "alice", "wrong", now).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials));
        }

        let err = login_at(&pool, &lockout, "alice", GOOD_PASSWORD, now + 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::LoginLocked {
                retry_after_secs: 599
            }
        ));

        let name = login_at(&pool, &lockout, "alice", GOOD_PASSWORD, now + 600)
            .await
            .unwrap();
        assert_eq!(name, "alice");
        assert!(login_attempts::load(&pool, "alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let (_dir, pool) = test_pool().await;
        register(&pool, "alice", GOOD_PASSWORD).await.unwrap();
        let lockout = policy(3);
        let now = 1_700_000_000;

        for _ in 0..2 {
            login_at(&pool, &lockout, "alice", "wrong", now).await.unwrap_err();
        }
        login_at(&pool, &lockout, "alice", GOOD_PASSWORD, now).await.unwrap();

        // Two more failures would have locked without the reset
        for _ in 0..2 {
            login_at(&pool, &lockout, "alice", "wrong", now).await.unwrap_err();
        }
        login_at(&pool, &lockout, "alice", GOOD_PASSWORD, now).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_failures_still_lock() {
        let (_dir, pool) = test_pool().await;
        register(&pool, "alice", GOOD_PASSWORD).await.unwrap();
        let lockout = policy(3);
        let now = 1_700_000_000;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { login_at(&pool, &lockout, "alice", "wrong", now).await })
            })
            .collect();

        let mut checked = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Err(AppError::InvalidCredentials) => checked += 1,
                Err(AppError::LoginLocked { .. }) => refused += 1,
                other => panic!("unexpected login result: {other:?}"),
            }
        }
        assert_eq!(checked, 3);
        assert_eq!(refused, 5);

        let err = login_at(&pool, &lockout, "alice", GOOD_PASSWORD, now + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LoginLocked { .. }));
    }

    #[tokio::test]
    async fn test_malformed_username_is_not_tracked() {
        let (_dir, pool) = test_pool().await;
        let long_name = "x".repeat(100_000);

        for name in [long_name.as_str(), "bad\u{0}name", "   "] {
            let err = login(&pool, &policy(5), name, GOOD_PASSWORD).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials));
        }

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM login_attempts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_disabled_throttle_never_locks() {
        let (_dir, pool) = test_pool().await;
        register(&pool, "alice", GOOD_PASSWORD).await.unwrap();
        let lockout = policy(0);

        for _ in 0..6 {
            login(&pool, &lockout, "alice", "wrong").await.unwrap_err();
        }
        login(&pool, &lockout, "alice", GOOD_PASSWORD).await.unwrap();
        assert!(login_attempts::load(&pool, "alice").await.unwrap().is_none());
    }
}
