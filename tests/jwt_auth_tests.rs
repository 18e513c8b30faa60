// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token tests.
//!
//! These tests verify that the session cookie issued by the middleware is an
//! HS256 JWT naming the session, signed with the key derived from the
//! configured secret, catching compatibility issues early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use segment_pr::middleware::auth::{create_session_token, decode_session_token, Claims};
use segment_pr::services::SessionKeys;
use std::sync::Arc;

mod common;
use common::{create_test_app, get, session_cookie, FakeProvider};

#[test]
fn test_session_token_roundtrip() {
    let keys = SessionKeys::derive(b"configured secret");
    let token = create_session_token("abcdef", &keys.cookie).unwrap();

    let key = DecodingKey::from_secret(&keys.cookie);
    let data = decode::<Claims>(&token, &key, &Validation::new(Algorithm::HS256))
        .expect("Failed to decode session token");

    assert_eq!(data.claims.sub, "abcdef");
    assert_eq!(data.claims.exp - data.claims.iat, 24 * 60 * 60);
}

#[test]
fn test_state_key_cannot_sign_cookies() {
    let keys = SessionKeys::derive(b"configured secret");
    let token = create_session_token("abcdef", &keys.state).unwrap();
    assert_eq!(decode_session_token(&token, &keys.cookie), None);
}

#[tokio::test]
async fn test_middleware_cookie_names_live_session() {
    let (app, state) = create_test_app(Arc::new(FakeProvider::default()));

    let response = get(&app, "/", None).await;
    let cookie = session_cookie(&response).unwrap();
    let token = cookie.strip_prefix("segment_pr_session=").unwrap();

    let session_id = decode_session_token(token, &state.keys.cookie).expect("valid token");
    assert_eq!(session_id.len(), 64);
    assert!(state.sessions.touch(&session_id));
}
