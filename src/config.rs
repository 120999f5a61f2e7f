use std::env;
use std::str::FromStr;

use crate::models::LockoutPolicy;
use crate::stats::{CaseFolding, FrequencyOptions};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub glyph_map_path: String,
    pub glyph_asset_dir: String,
    pub environment: String,
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub login_max_failures: u32,
    pub login_failure_window_secs: i64,
    pub login_lockout_secs: i64,
    pub top_users_limit: u32,
    pub char_frequency_top_k: usize,
    pub char_frequency_case: CaseFolding,
    pub char_frequency_strip_whitespace: bool,
}

/// Read `key`, falling back to `default`, and parse it.
fn var_or<T: FromStr>(key: &str, default: &str) -> Result<T, String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| format!("Invalid {}", key))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = var_or("SERVER_PORT", "8080")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/fingerspell.db".to_string());
        let glyph_map_path =
            env::var("GLYPH_MAP_PATH").unwrap_or_else(|_| "./assets/mapping.json".to_string());
        let glyph_asset_dir =
            env::var("GLYPH_ASSET_DIR").unwrap_or_else(|_| "./assets/signs".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET must be set for session cookie signing")?;
        if session_secret.trim().is_empty() {
            return Err("SESSION_SECRET must not be empty".to_string());
        }

        let session_ttl_secs = var_or("SESSION_TTL_SECS", "86400")?;
        let login_max_failures = var_or("LOGIN_MAX_FAILURES", "5")?;
        let login_failure_window_secs = var_or("LOGIN_FAILURE_WINDOW_SECS", "900")?;
        let login_lockout_secs = var_or("LOGIN_LOCKOUT_SECS", "900")?;

        let top_users_limit = var_or("TOP_USERS_LIMIT", "5")?;
        let char_frequency_top_k = var_or("CHAR_FREQUENCY_TOP_K", "15")?;
        let char_frequency_case = var_or("CHAR_FREQUENCY_CASE", "preserve")?;
        let char_frequency_strip_whitespace = var_or("CHAR_FREQUENCY_STRIP_WHITESPACE", "true")?;

        Ok(Config {
            server_host,
            server_port,
            database_path,
            glyph_map_path,
            glyph_asset_dir,
            environment,
            session_secret,
            session_ttl_secs,
            login_max_failures,
            login_failure_window_secs,
            login_lockout_secs,
            top_users_limit,
            char_frequency_top_k,
            char_frequency_case,
            char_frequency_strip_whitespace,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_failures: self.login_max_failures,
            window_secs: self.login_failure_window_secs,
            lockout_secs: self.login_lockout_secs,
        }
    }

    pub fn frequency_options(&self) -> FrequencyOptions {
        FrequencyOptions {
            top_k: self.char_frequency_top_k,
            case_folding: self.char_frequency_case,
            strip_whitespace: self.char_frequency_strip_whitespace,
        }
    }
}
