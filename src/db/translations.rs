//! Usage records and the aggregate queries over them.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

use crate::db::users;
use crate::error::{AppError, Result};
use crate::models::UsageRecord;

/// Append a usage record for an existing user
///
/// The existence check and insert share one transaction so a record can
/// never name a username that was absent at write time.
pub async fn insert_translation(
    pool: &SqlitePool,
    username: &str,
    input_text: &str,
    timestamp: NaiveDateTime,
) -> Result<UsageRecord> {
    let mut tx = pool.begin().await?;

    if !users::user_exists(&mut *tx, username).await? {
        tracing::warn!("Refusing to record usage for unknown user {}", username);
        return Err(AppError::UnknownUser);
    }

    let record = sqlx::query_as::<_, UsageRecord>(
        "INSERT INTO translations (username, input_text, timestamp) VALUES (?, ?, ?) \
         RETURNING id, username, input_text, timestamp",
    )
    .bind(username)
    .bind(input_text)
    .bind(timestamp)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(record)
}

pub async fn total_count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM translations")
        .fetch_one(pool)
        .await?)
}

pub async fn unique_user_count(pool: &SqlitePool) -> Result<i64> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(DISTINCT username) FROM translations")
            .fetch_one(pool)
            .await?,
    )
}

/// `(username, count)` by descending count, ties by username
pub async fn top_users(pool: &SqlitePool, limit: u32) -> Result<Vec<(String, i64)>> {
    Ok(sqlx::query_as(
        "SELECT username, COUNT(*) AS count FROM translations \
         GROUP BY username ORDER BY count DESC, username ASC LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?)
}

/// `(day, count)` grouped by calendar day, ascending
pub async fn daily_counts(pool: &SqlitePool) -> Result<Vec<(NaiveDate, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT DATE(timestamp) AS day, COUNT(*) AS count FROM translations \
         GROUP BY day ORDER BY day ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(day, count)| {
            NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map(|day| (day, count))
                .map_err(|e| AppError::Database(sqlx::Error::Decode(Box::new(e))))
        })
        .collect()
}

/// Every recorded input text, oldest first
pub async fn all_input_texts(pool: &SqlitePool) -> Result<Vec<String>> {
    Ok(
        sqlx::query_scalar("SELECT input_text FROM translations ORDER BY id")
            .fetch_all(pool)
            .await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, test_pool};

    async fn records_for_user(pool: &SqlitePool, username: &str) -> Vec<UsageRecord> {
        sqlx::query_as::<_, UsageRecord>(
            "SELECT id, username, input_text, timestamp FROM translations \
             WHERE username = ? ORDER BY id",
        )
        .bind(username)
        .fetch_all(pool)
        .await
        .unwrap()
    }

    fn at(day: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{day} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn test_insert_translation_returns_record() {
        let (_dir, pool) = test_pool().await;
        insert_user(&pool, "alice").await;

        let ts = at("2025-03-01", "10:15:00");
        let record = insert_translation(&pool, "alice", "HELLO", ts).await.unwrap();

        assert_eq!(record.username, "alice");
        assert_eq!(record.input_text, "HELLO");
        assert_eq!(record.timestamp, ts);
        assert_eq!(records_for_user(&pool, "alice").await, vec![record]);
    }

    #[tokio::test]
    async fn test_insert_translation_unknown_user() {
        let (_dir, pool) = test_pool().await;

        let err = insert_translation(&pool, "ghost", "HI", at("2025-03-01", "10:00:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownUser));
        assert_eq!(total_count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_foreign_key_blocks_orphan_rows() {
        let (_dir, pool) = test_pool().await;

        let result = sqlx::query("INSERT INTO translations (username, input_text) VALUES (?, ?)")
            .bind("ghost")
            .bind("HI")
            .execute(&pool)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_daily_counts_group_by_day_ascending() {
        let (_dir, pool) = test_pool().await;
        insert_user(&pool, "alice").await;

        // Inserted out of order on purpose
        for (day, time) in [
            ("2025-03-02", "23:59:59"),
            ("2025-03-01", "00:00:00"),
            ("2025-03-02", "00:00:01"),
            ("2025-02-28", "12:00:00"),
            ("2025-03-01", "18:30:00"),
            ("2025-03-02", "08:00:00"),
        ] {
            insert_translation(&pool, "alice", "A", at(day, time)).await.unwrap();
        }

        let days = daily_counts(&pool).await.unwrap();
        let expected = vec![
            (NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(), 1),
            (NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 2),
            (NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(), 3),
        ];
        assert_eq!(days, expected);
    }

    #[tokio::test]
    async fn test_top_users_breaks_ties_by_name() {
        let (_dir, pool) = test_pool().await;
        for name in ["carol", "bob", "alice"] {
            insert_user(&pool, name).await;
        }
        let ts = at("2025-03-01", "09:00:00");
        for name in ["carol", "bob", "bob", "alice", "carol"] {
            insert_translation(&pool, name, "X", ts).await.unwrap();
        }

        let top = top_users(&pool, 2).await.unwrap();
        assert_eq!(top, vec![("bob".to_string(), 2), ("carol".to_string(), 2)]);
    }
}
