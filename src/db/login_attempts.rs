use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::Result;
use crate::models::{LockoutPolicy, LoginAttemptRecord};

pub async fn load<'e, E>(
    executor: E,
    username: &str,
) -> std::result::Result<Option<LoginAttemptRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, LoginAttemptRecord>(
        "SELECT failures, window_reset_at, locked_until FROM login_attempts WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

/// Upsert the record for `username`
pub async fn save<'e, E>(
    executor: E,
    username: &str,
    record: &LoginAttemptRecord,
) -> std::result::Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO login_attempts (username, failures, window_reset_at, locked_until) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT(username) DO UPDATE SET \
            failures = excluded.failures, \
            window_reset_at = excluded.window_reset_at, \
            locked_until = excluded.locked_until",
    )
    .bind(username)
    .bind(record.failures)
    .bind(record.window_reset_at)
    .bind(record.locked_until)
    .execute(executor)
    .await?;
    Ok(())
}

/// Count one login attempt for `username` before its password is checked
///
/// Fails with `LoginLocked` while a lockout is active. Returns true if this
/// attempt reached the limit and started a lockout. The read and the write
/// happen under SQLite's write lock, so concurrent attempts for the same
/// username are counted one after another.
pub async fn reserve_attempt(
    pool: &SqlitePool,
    username: &str,
    now: i64,
    policy: &LockoutPolicy,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    // A write as the first statement takes the write lock before the read
    sqlx::query(
        "INSERT INTO login_attempts (username, failures, window_reset_at, locked_until) \
         VALUES (?, 0, ?, NULL) ON CONFLICT(username) DO NOTHING",
    )
    .bind(username)
    .bind(now + policy.window_secs)
    .execute(&mut *tx)
    .await?;

    let mut record = load(&mut *tx, username)
        .await?
        .unwrap_or_else(|| LoginAttemptRecord::new(now, policy));
    record.check(now)?;

    let locked = record.register_failure(now, policy);
    save(&mut *tx, username, &record).await?;
    tx.commit().await?;

    Ok(locked)
}

pub async fn clear(pool: &SqlitePool, username: &str) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM login_attempts WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete records whose counting window and lockout have both run out
pub async fn purge_expired(pool: &SqlitePool, now: i64) -> std::result::Result<u64, sqlx::Error> {
    let done = sqlx::query(
        "DELETE FROM login_attempts \
         WHERE window_reset_at <= ? AND (locked_until IS NULL OR locked_until <= ?)",
    )
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(done.rows_affected())
}
