// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth callback and logout routes.
//!
//! The redirect *to* Strava is issued by `middleware::auth::require_auth`
//! whenever a protected page is requested without a credential.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::error::{AuthError, Result};
use crate::middleware::auth::{removal_cookie, session_from_jar};
use crate::services::oauth::CallbackParams;
use crate::AppState;

pub fn routes(callback_path: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(callback_path, get(auth_callback))
        .route("/auth/logout", get(logout))
}

/// OAuth callback - exchange code for a token and store it in the session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let Some(session_id) = session_from_jar(&jar, &state) else {
        tracing::warn!("OAuth callback without a valid session cookie");
        return Err(AuthError::InvalidState.into());
    };

    state
        .authenticator
        .handle_callback(&session_id, params)
        .await?;

    Ok(Redirect::temporary("/"))
}

/// Logout - forget the credential and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(session_id) = session_from_jar(&jar, &state) {
        state.authenticator.logout(&session_id);
        state.sessions.remove(&session_id);
    }

    let jar = jar.add(removal_cookie(state.config.is_https()));
    (jar, Redirect::temporary("/"))
}
