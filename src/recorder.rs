use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::translations;
use crate::error::Result;
use crate::models::UsageRecord;
use crate::session::SessionStore;

/// Record one text submission for `username` and bump the session counter
///
/// Blank input (empty after trimming) is ignored: nothing is stored and
/// the counter is left alone. Non-blank text is stored exactly as typed.
pub async fn record(
    pool: &SqlitePool,
    sessions: &SessionStore,
    token: &str,
    username: &str,
    text: &str,
) -> Result<Option<UsageRecord>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let record =
        translations::insert_translation(pool, username, text, Utc::now().naive_utc()).await?;
    sessions.increment_count(token);

    tracing::info!("Recorded translation {} for {}", record.id, username);
    Ok(Some(record))
}
