use chrono::NaiveDateTime;
use serde::Serialize;

/// One recorded text submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UsageRecord {
    pub id: i64,
    pub username: String,
    pub input_text: String,
    /// UTC time of the submission
    pub timestamp: NaiveDateTime,
}
