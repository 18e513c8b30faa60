// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-session credential storage.
//!
//! Each browser gets a random session ID (carried in a signed cookie, see
//! `middleware::auth`). The store maps that ID to the session's OAuth state,
//! so concurrent users never see each other's token.

use crate::models::Credential;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hkdf::Hkdf;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::sync::Arc;

/// Session identifier (hex-encoded random bytes).
pub type SessionId = String;

/// Authenticated sessions idle longer than this are dropped.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Sessions that never finish OAuth are dropped after this long.
pub const HANDSHAKE_TTL_MINUTES: i64 = 10;

/// Number of random bytes in a session ID.
const SESSION_ID_BYTES: usize = 32;

/// Where a session is in the OAuth handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// Redirected to Strava, waiting for the callback.
    PendingCallback { since: DateTime<Utc> },
    Authenticated(Credential),
}

/// Server-side session record.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            last_seen: now,
        }
    }
}

/// Thread-safe session store keyed by session ID.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<SessionId, Session>>,
    ttl: Duration,
    handshake_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

impl SessionStore {
    /// `ttl` applies to authenticated sessions. Sessions still in the
    /// handshake get the shorter of `ttl` and `HANDSHAKE_TTL_MINUTES`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
            handshake_ttl: ttl.min(Duration::minutes(HANDSHAKE_TTL_MINUTES)),
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        let ttl = match session.state {
            SessionState::Authenticated(_) => self.ttl,
            _ => self.handshake_ttl,
        };
        now - session.last_seen > ttl
    }

    /// Create a new unauthenticated session and return its ID.
    pub fn create(&self) -> Result<SessionId, ring::error::Unspecified> {
        let id = random_hex(SESSION_ID_BYTES)?;
        self.sessions.insert(id.clone(), Session::new(Utc::now()));
        tracing::debug!("Session created");
        Ok(id)
    }

    /// Whether `id` names a live session. Refreshes its idle timer.
    pub fn touch(&self, id: &str) -> bool {
        let now = Utc::now();
        let expired = match self.sessions.get_mut(id) {
            Some(mut session) => {
                if self.is_expired(&session, now) {
                    true
                } else {
                    session.last_seen = now;
                    return true;
                }
            }
            None => return false,
        };

        if expired {
            self.sessions.remove(id);
            tracing::debug!("Expired session removed");
        }
        false
    }

    /// Current state of a live session.
    pub fn state(&self, id: &str) -> Option<SessionState> {
        if !self.touch(id) {
            return None;
        }
        self.sessions.get(id).map(|s| s.state.clone())
    }

    /// Credential for the session, if it has completed OAuth.
    pub fn credential(&self, id: &str) -> Option<Credential> {
        match self.state(id)? {
            SessionState::Authenticated(cred) => Some(cred),
            _ => None,
        }
    }

    pub fn is_authenticated(&self, id: &str) -> bool {
        self.credential(id).is_some()
    }

    /// Mark the session as waiting for the OAuth callback.
    pub fn mark_pending(&self, id: &str) {
        self.set_state(
            id,
            SessionState::PendingCallback { since: Utc::now() },
        );
    }

    /// Store a credential after a successful exchange.
    pub fn store_credential(&self, id: &str, credential: Credential) {
        self.set_state(id, SessionState::Authenticated(credential));
    }

    /// Drop any credential or pending handshake.
    pub fn reset(&self, id: &str) {
        self.set_state(id, SessionState::Unauthenticated);
    }

    /// Abandon a pending handshake. Sessions in any other state are left
    /// alone. Returns whether the session was pending.
    pub fn cancel_pending(&self, id: &str) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) if matches!(session.state, SessionState::PendingCallback { .. }) => {
                session.state = SessionState::Unauthenticated;
                true
            }
            _ => false,
        }
    }

    /// Remove a session entirely.
    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Remove expired sessions. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.sessions.retain(|_, s| {
            let keep = !self.is_expired(s, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn set_state(&self, id: &str, state: SessionState) {
        let now = Utc::now();
        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::new(now));
        entry.state = state;
        entry.last_seen = now;
    }

    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        if let Some(mut s) = self.sessions.get_mut(id) {
            s.last_seen -= by;
        }
    }
}

/// Keys derived from the configured session secret.
#[derive(Clone)]
pub struct SessionKeys {
    /// HS256 key for the session cookie.
    pub cookie: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter.
    pub state: Vec<u8>,
}

impl SessionKeys {
    /// Derive independent cookie and state keys with HKDF-SHA256.
    pub fn derive(secret: &[u8]) -> Self {
        let hk = Hkdf::<Sha256>::new(None, secret);
        let mut cookie = [0u8; 32];
        let mut state = [0u8; 32];
        // 32 bytes is always a valid HKDF-SHA256 output length.
        hk.expand(b"segment-pr session cookie", &mut cookie)
            .expect("valid HKDF output length");
        hk.expand(b"segment-pr oauth state", &mut state)
            .expect("valid HKDF output length");
        Self {
            cookie: cookie.to_vec(),
            state: state.to_vec(),
        }
    }
}

/// Hex-encoded random bytes from the system CSPRNG.
pub fn random_hex(len: usize) -> Result<String, ring::error::Unspecified> {
    let mut buf = vec![0u8; len];
    SystemRandom::new().fill(&mut buf)?;
    Ok(hex::encode(buf))
}
