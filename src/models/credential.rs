// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Credential obtained from the OAuth token exchange.

use serde::{Deserialize, Serialize};

/// Access token plus the athlete it belongs to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub athlete_id: u64,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, athlete_id: u64) -> Self {
        Self {
            access_token: access_token.into(),
            athlete_id,
            firstname: None,
            lastname: None,
        }
    }

    /// Display name for the athlete, if Strava provided one.
    pub fn display_name(&self) -> Option<String> {
        match (self.firstname.as_deref(), self.lastname.as_deref()) {
            (Some(f), Some(l)) if !l.is_empty() => Some(format!("{} {}", f, l)),
            (Some(f), _) if !f.is_empty() => Some(f.to_string()),
            _ => None,
        }
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("athlete_id", &self.athlete_id)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .finish()
    }
}
