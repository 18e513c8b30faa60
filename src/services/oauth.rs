// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authorization-code flow.
//!
//! Per session: `Unauthenticated -> PendingCallback -> Authenticated`, or
//! back to `Unauthenticated` if the callback fails. The `state` parameter
//! binds each callback to the session that started it.

use crate::config::Config;
use crate::error::AuthError;
use crate::models::Credential;
use crate::services::session::{SessionKeys, SessionState, SessionStore, HANDSHAKE_TTL_MINUTES};
use crate::services::strava::ActivityProvider;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Strava authorization screen.
pub const STRAVA_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";

/// How long a signed state stays valid.
pub const STATE_TTL_MILLIS: i64 = HANDSHAKE_TTL_MINUTES * 60 * 1000;

/// Strava OAuth scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "read_all")]
    ReadAll,
    #[serde(rename = "profile:read_all")]
    ProfileReadAll,
    #[serde(rename = "activity:read")]
    ActivityRead,
    #[serde(rename = "activity:read_all")]
    ActivityReadAll,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Read => "read",
            Scope::ReadAll => "read_all",
            Scope::ProfileReadAll => "profile:read_all",
            Scope::ActivityRead => "activity:read",
            Scope::ActivityReadAll => "activity:read_all",
        }
    }
}

/// Query parameters Strava sends to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Scopes the athlete actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Drives the OAuth handshake and records the outcome in the session store.
#[derive(Clone)]
pub struct Authenticator {
    client_id: u64,
    redirect_uri: String,
    scopes: Vec<Scope>,
    force_approval_prompt: bool,
    state_key: Vec<u8>,
    provider: Arc<dyn ActivityProvider>,
    sessions: SessionStore,
}

impl Authenticator {
    pub fn new(
        config: &Config,
        keys: &SessionKeys,
        provider: Arc<dyn ActivityProvider>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            client_id: config.client_id,
            redirect_uri: config.callback_url(),
            scopes: config.scopes.clone(),
            force_approval_prompt: config.force_approval_prompt,
            state_key: keys.state.clone(),
            provider,
            sessions,
        }
    }

    /// URL of the Strava authorization screen.
    pub fn build_authorization_url(
        &self,
        state: &str,
        scopes: &[Scope],
        force_approval_prompt: bool,
    ) -> String {
        let scope = scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let approval_prompt = if force_approval_prompt { "force" } else { "auto" };

        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             approval_prompt={}&\
             scope={}&\
             state={}",
            STRAVA_AUTHORIZE_URL,
            self.client_id,
            urlencoding::encode(&self.redirect_uri),
            approval_prompt,
            urlencoding::encode(&scope),
            urlencoding::encode(state)
        )
    }

    /// Start the handshake for a session and return where to send the browser.
    pub fn begin(&self, session_id: &str) -> anyhow::Result<String> {
        let state = sign_state(session_id, chrono::Utc::now().timestamp_millis(), &self.state_key)?;
        self.sessions.mark_pending(session_id);

        tracing::info!(
            client_id = self.client_id,
            "Starting OAuth flow, redirecting to Strava"
        );

        Ok(self.build_authorization_url(&state, &self.scopes, self.force_approval_prompt))
    }

    /// Handle the OAuth callback for a session.
    ///
    /// On success the credential is stored in the session. On failure a
    /// pending handshake goes back to unauthenticated; a session that was
    /// already signed in keeps its credential.
    pub async fn handle_callback(
        &self,
        session_id: &str,
        params: CallbackParams,
    ) -> Result<Credential, AuthError> {
        let result = self.complete(session_id, params).await;
        match &result {
            Ok(credential) => {
                self.sessions
                    .store_credential(session_id, credential.clone());
                tracing::info!(athlete_id = credential.athlete_id, "OAuth successful");
            }
            Err(e) => {
                let cancelled = self.sessions.cancel_pending(session_id);
                tracing::warn!(error = %e, cancelled, "OAuth callback failed");
            }
        }
        result
    }

    async fn complete(
        &self,
        session_id: &str,
        params: CallbackParams,
    ) -> Result<Credential, AuthError> {
        if let Some(error) = params.error {
            return Err(AuthError::Denied(error));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let state_session = params
            .state
            .as_deref()
            .and_then(|s| verify_state(s, &self.state_key, now))
            .ok_or(AuthError::InvalidState)?;

        if state_session != session_id {
            tracing::error!("OAuth state bound to a different session");
            return Err(AuthError::InvalidState);
        }

        if !matches!(
            self.sessions.state(session_id),
            Some(SessionState::PendingCallback { .. })
        ) {
            return Err(AuthError::InvalidState);
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCode)?;

        if let Some(granted) = params.scope.as_deref() {
            tracing::debug!(scope = %granted, "Scopes granted");
        }

        tracing::info!("Exchanging authorization code for token");
        let exchange = self
            .provider
            .exchange_code(&code)
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        Ok(exchange.into_credential())
    }

    pub fn is_authenticated(&self, session_id: &str) -> bool {
        self.sessions.is_authenticated(session_id)
    }

    /// Forget the session's credential.
    pub fn logout(&self, session_id: &str) {
        self.sessions.reset(session_id);
        tracing::info!("Session logged out");
    }
}

/// Sign `session_id|timestamp_hex` and base64 encode the result.
pub fn sign_state(session_id: &str, timestamp_millis: i64, key: &[u8]) -> anyhow::Result<String> {
    let payload = format!("{}|{:x}", session_id, timestamp_millis);

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let signed = format!("{}|{}", payload, signature);
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify a signed state and return the session ID it was issued to.
///
/// Rejects bad encodings, bad signatures and states older than
/// `STATE_TTL_MILLIS` (or from the future).
pub fn verify_state(state: &str, key: &[u8], now_millis: i64) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "session_id|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    let [session_id, timestamp_hex, signature_hex] = parts.as_slice() else {
        return None;
    };

    let payload = format!("{}|{}", session_id, timestamp_hex);
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if !bool::from(signature_hex.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued = i64::from_str_radix(timestamp_hex, 16).ok()?;
    let age = now_millis - issued;
    if !(0..=STATE_TTL_MILLIS).contains(&age) {
        tracing::warn!(age_ms = age, "OAuth state expired");
        return None;
    }

    Some(session_id.to_string())
}
