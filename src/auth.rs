//! User accounts and login sessions.
//!
//! Credentials live in the auth store as plaintext username/password pairs.
//! A successful login issues an opaque bearer token; the server keeps only
//! its SHA-256 hash, mapped to the per-login [`SessionContext`].

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::Connection;
use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::chat::ChatTurn;
use crate::db::{self, DatabaseError};
use crate::prediction::PredictionReport;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    EmptyCredentials,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Session store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterOutcome {
    Created,
    AlreadyExists,
}

pub fn validate_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::EmptyCredentials);
    }
    Ok(())
}

/// Create an account unless the username is taken.
///
/// The existence check avoids a failed insert in the common case; two
/// concurrent registrations of the same name still race past it, and the
/// loser's UNIQUE violation is reported as `AlreadyExists`.
pub fn register(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<RegisterOutcome, AuthError> {
    validate_credentials(username, password)?;

    if db::user_exists(conn, username)? {
        return Ok(RegisterOutcome::AlreadyExists);
    }

    match db::insert_user(conn, username, password) {
        Ok(_) => {
            tracing::info!(username, "User registered");
            Ok(RegisterOutcome::Created)
        }
        Err(e) if e.is_unique_violation() => Ok(RegisterOutcome::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// Check a username/password pair. Storage failures count as a failed login.
pub fn login(conn: &Connection, username: &str, password: &str) -> bool {
    if validate_credentials(username, password).is_err() {
        return false;
    }

    match db::get_user_password(conn, username) {
        Ok(Some(stored)) => {
            let stored = stored.as_bytes();
            let given = password.as_bytes();
            stored.len() == given.len() && bool::from(stored.ct_eq(given))
        }
        Ok(None) => false,
        Err(e) => {
            tracing::error!(error = %e, "Login lookup failed");
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Sessions
// ═══════════════════════════════════════════════════════════

/// Server-side state for one login.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub username: String,
    pub last_report: Option<PredictionReport>,
    pub general_chat: Vec<ChatTurn>,
    pub patient_chat: Vec<ChatTurn>,
}

impl SessionContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// In-memory sessions keyed by token hash. No expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<[u8; 32], SessionContext>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `username`; returns the bearer token.
    pub fn create(&self, username: &str) -> Result<String, AuthError> {
        let token = generate_token();
        self.sessions
            .lock()
            .map_err(|_| AuthError::LockPoisoned)?
            .insert(hash_token(&token), SessionContext::new(username));
        Ok(token)
    }

    /// Snapshot of the session behind `token`.
    pub fn get(&self, token: &str) -> Result<Option<SessionContext>, AuthError> {
        let sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        Ok(sessions.get(&hash_token(token)).cloned())
    }

    /// Run `f` against the live session; `None` if the token is unknown.
    pub fn update<F, R>(&self, token: &str, f: F) -> Result<Option<R>, AuthError>
    where
        F: FnOnce(&mut SessionContext) -> R,
    {
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        Ok(sessions.get_mut(&hash_token(token)).map(f))
    }

    /// End a session. Returns whether it existed.
    pub fn remove(&self, token: &str) -> Result<bool, AuthError> {
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        Ok(sessions.remove(&hash_token(token)).is_some())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
