use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::{MSG_INVALID_CREDENTIALS, MSG_LOGIN_LOCKED, MSG_USERNAME_TAKEN};
use crate::db::CredentialError;
use crate::policy::PasswordPolicyViolation;
use crate::views;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error(transparent)]
    WeakPassword(#[from] PasswordPolicyViolation),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Login locked for {retry_after_secs} more seconds")]
    LoginLocked { retry_after_secs: i64 },

    #[error("User not found")]
    UnknownUser,
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateUsername => AppError::DuplicateUsername,
            CredentialError::StoreUnavailable(e) => AppError::Database(e),
        }
    }
}

impl AppError {
    /// Status code and the message safe to show to the user
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                internal()
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {:?}", e);
                internal()
            }
            AppError::PasswordHash(e) => {
                tracing::error!("Password hashing error: {:?}", e);
                internal()
            }
            AppError::TaskJoin(e) => {
                tracing::error!("Task join error: {:?}", e);
                internal()
            }
            AppError::UnknownUser => {
                tracing::error!("Usage recorded for a username with no account");
                internal()
            }
            AppError::DuplicateUsername => (StatusCode::CONFLICT, MSG_USERNAME_TAKEN.to_string()),
            AppError::InvalidUsername(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::WeakPassword(v) => (StatusCode::UNPROCESSABLE_ENTITY, v.to_string()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, MSG_INVALID_CREDENTIALS.to_string())
            }
            AppError::LoginLocked { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!(
                    "{} - try again in {} minute(s)",
                    MSG_LOGIN_LOCKED,
                    (retry_after_secs + 59) / 60
                ),
            ),
        }
    }

    /// Whether the error comes from infrastructure rather than user input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Migration(_)
                | AppError::PasswordHash(_)
                | AppError::TaskJoin(_)
                | AppError::UnknownUser
        )
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Implement IntoResponse to convert AppError into HTML error pages
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Html(views::render_error_page(status, &message))).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_username_maps_to_conflict() {
        let (status, message) = AppError::DuplicateUsername.status_and_message();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(message, MSG_USERNAME_TAKEN);
    }

    #[test]
    fn test_store_failure_is_masked() {
        let err = AppError::from(CredentialError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        assert!(err.is_internal());

        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_login_locked_rounds_minutes_up() {
        let (status, message) = AppError::LoginLocked {
            retry_after_secs: 61,
        }
        .status_and_message();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(message.contains("2 minute(s)"));
    }

    #[test]
    fn test_weak_password_message_passes_through() {
        let err = AppError::from(PasswordPolicyViolation::TooShort);
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(message, PasswordPolicyViolation::TooShort.to_string());
    }
}
