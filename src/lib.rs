// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Segment-PR: compare a Strava activity's segment efforts against your PRs
//!
//! This crate provides a small web app that authenticates an athlete with
//! Strava, fetches one activity and shows each segment effort as a
//! percentage of the athlete's personal record on that segment.

pub mod browser;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use config::Config;
use services::{ActivityProvider, Authenticator, EffortComparator, SessionKeys, SessionStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub keys: SessionKeys,
    pub sessions: SessionStore,
    pub authenticator: Authenticator,
    pub comparator: EffortComparator,
}

impl AppState {
    /// Wire up services around an activity provider.
    pub fn new(config: Config, provider: Arc<dyn ActivityProvider>) -> Self {
        let keys = SessionKeys::derive(config.session_secret_bytes());
        let sessions = SessionStore::default();
        let authenticator =
            Authenticator::new(&config, &keys, provider.clone(), sessions.clone());
        let comparator = EffortComparator::new(provider);

        Self {
            config,
            keys,
            sessions,
            authenticator,
            comparator,
        }
    }
}
