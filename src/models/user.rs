use serde::Serialize;

use crate::constants::MAX_USERNAME_LENGTH;

/// Registered account as stored in the `users` table
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Validate an already-trimmed username: 1-64 characters, no control characters
    pub fn validate_username(username: &str) -> bool {
        let len = username.chars().count();
        len > 0 && len <= MAX_USERNAME_LENGTH && !username.chars().any(char::is_control)
    }
}
