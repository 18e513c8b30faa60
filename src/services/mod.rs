// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod comparator;
pub mod oauth;
pub mod session;
pub mod strava;

pub use comparator::EffortComparator;
pub use oauth::{Authenticator, CallbackParams, Scope};
pub use session::{SessionKeys, SessionState, SessionStore};
pub use strava::{ActivityProvider, StravaClient, TokenExchange};
