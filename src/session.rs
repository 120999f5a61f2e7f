//! Session gate: server-side sessions keyed by token digest, carried in a
//! signed cookie.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use chrono::Utc;
use parking_lot::RwLock;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::SESSION_COOKIE_NAME;
use crate::security::{generate_token, hash_token};
use crate::AppState;

/// One logged-in browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    /// Translations recorded through this session
    pub translation_count: u64,
    /// Unix timestamp after which the session is dead
    pub expires_at: i64,
}

/// In-memory session map shared by all handlers
///
/// Keys are SHA-256 digests of the tokens; the plaintext token is only
/// ever held by the client.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl_secs: i64,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Start a session for `username` and return its plaintext token
    pub fn create(&self, username: &str) -> String {
        self.create_at(username, Utc::now().timestamp())
    }

    fn create_at(&self, username: &str, now: i64) -> String {
        let token = generate_token();
        let session = Session {
            username: username.to_string(),
            translation_count: 0,
            expires_at: now + self.ttl_secs,
        };
        self.sessions.write().insert(hash_token(&token), session);
        token
    }

    /// Look up a live session. Expired entries are dropped on sight.
    pub fn get(&self, token: &str) -> Option<Session> {
        self.get_at(token, Utc::now().timestamp())
    }

    fn get_at(&self, token: &str, now: i64) -> Option<Session> {
        let key = hash_token(token);
        {
            let sessions = self.sessions.read();
            match sessions.get(&key) {
                None => return None,
                Some(session) if now < session.expires_at => return Some(session.clone()),
                Some(_) => {}
            }
        }

        tracing::info!("Session expired");
        self.sessions.write().remove(&key);
        None
    }

    /// Bump the per-session translation counter, returning the new value
    pub fn increment_count(&self, token: &str) -> Option<u64> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&hash_token(token))?;
        session.translation_count += 1;
        Some(session.translation_count)
    }

    pub fn remove(&self, token: &str) -> Option<Session> {
        self.sessions.write().remove(&hash_token(token))
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now().timestamp())
    }

    fn purge_expired_at(&self, now: i64) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| now < session.expires_at);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

// =============================================================================
// Cookies
// =============================================================================

/// Cookie signing key derived from the configured secret
///
/// SHA-512 stretches any non-empty secret to the 64 bytes `Key` expects.
pub fn cookie_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Session cookie carrying `token`; the jar signs it on the way out
pub fn session_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Cookie to hand to `SignedCookieJar::remove` on logout
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

/// Session token from the jar. Cookies with a bad signature never come out
/// of a signed jar.
pub fn read_session_token(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

// =============================================================================
// Gate
// =============================================================================

/// Authenticated caller, as seen by a protected handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub username: String,
    pub translation_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Anonymous,
    Authenticated(AuthSession),
}

/// Work out who is calling from the request cookies
pub fn resolve(jar: &SignedCookieJar, sessions: &SessionStore) -> GateState {
    let Some(token) = read_session_token(jar) else {
        return GateState::Anonymous;
    };

    match sessions.get(&token) {
        Some(session) => GateState::Authenticated(AuthSession {
            token,
            username: session.username,
            translation_count: session.translation_count,
        }),
        None => GateState::Anonymous,
    }
}

/// Protected handlers take an `AuthSession`; anonymous callers are sent to the login page
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        match resolve(&jar, &state.sessions) {
            GateState::Authenticated(session) => Ok(session),
            GateState::Anonymous => Err(Redirect::to("/login")),
        }
    }
}
