// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie and authentication middleware.
//!
//! The cookie holds an HS256 JWT whose subject is the session ID. The
//! credential itself never leaves the server.

use crate::error::AppError;
use crate::models::Credential;
use crate::services::session::SessionId;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "segment_pr_session";

/// Session cookie lifetime.
const SESSION_COOKIE_HOURS: i64 = 24;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (session ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated session extracted by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub credential: Credential,
}

/// Middleware that requires an authenticated session.
///
/// Unauthenticated requests are redirected to the Strava authorization
/// screen; a fresh session cookie is set if the browser had none.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (jar, session_id) = ensure_session(jar, &state)?;

    if let Some(credential) = state.sessions.credential(&session_id) {
        request.extensions_mut().insert(AuthSession {
            session_id,
            credential,
        });
        return Ok(next.run(request).await);
    }

    tracing::debug!(path = %request.uri().path(), "Unauthenticated request, starting OAuth");
    let auth_url = state.authenticator.begin(&session_id)?;
    Ok((jar, Redirect::temporary(&auth_url)).into_response())
}

/// Session ID from a valid cookie that names a live session.
pub fn session_from_jar(jar: &CookieJar, state: &AppState) -> Option<SessionId> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    let session_id = decode_session_token(&token, &state.keys.cookie)?;
    state.sessions.touch(&session_id).then_some(session_id)
}

/// Existing session from the cookie, or a new one with its cookie added to the jar.
pub fn ensure_session(jar: CookieJar, state: &AppState) -> Result<(CookieJar, SessionId), AppError> {
    if let Some(id) = session_from_jar(&jar, state) {
        return Ok((jar, id));
    }

    let id = state
        .sessions
        .create()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate session ID")))?;
    let token = create_session_token(&id, &state.keys.cookie)?;
    let jar = jar.add(session_cookie(token, state.config.is_https()));
    Ok((jar, id))
}

/// Build the session cookie.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::hours(SESSION_COOKIE_HOURS))
        .build()
}

/// Cookie that clears the session cookie (attributes must match creation).
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Create a signed token naming a session.
pub fn create_session_token(session_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session_id.to_string(),
        iat: now,
        exp: now + SESSION_COOKIE_HOURS as usize * 60 * 60,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token and return the session ID.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Option<SessionId> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims.sub)
        .filter(|sub| !sub.is_empty())
}
