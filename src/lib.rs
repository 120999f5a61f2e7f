//! Fingerspell Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod glyphs;
pub mod models;
pub mod policy;
pub mod recorder;
pub mod routes;
pub mod security;
pub mod session;
pub mod stats;
pub mod views;

pub use config::Config;
pub use error::{AppError, Result};
pub use glyphs::GlyphTable;
pub use session::SessionStore;

use axum_extra::extract::cookie::Key;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub glyphs: Arc<GlyphTable>,
    pub sessions: SessionStore,
    /// Signs the session cookie
    pub cookie_key: Key,
}

impl AppState {
    /// Create a new AppState with the given pool, configuration and glyph table
    pub fn new(pool: SqlitePool, config: Config, glyphs: GlyphTable) -> Self {
        let sessions = SessionStore::new(config.session_ttl_secs);
        let cookie_key = session::cookie_key(&config.session_secret);
        Self {
            pool,
            config,
            glyphs: Arc::new(glyphs),
            sessions,
            cookie_key,
        }
    }
}
