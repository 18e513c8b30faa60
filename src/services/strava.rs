// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - OAuth authorization-code exchange
//! - Listing the athlete's activities (most recent first)
//! - Activity fetching with all segment efforts
//! - Segment fetching for the athlete's PR time
//! - Rate limit and token error detection

use crate::error::FetchError;
use crate::models::{ActivityDetail, ActivityId, ActivitySummary, Credential, Segment};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Default Strava API base URL.
pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
/// Strava OAuth token endpoint.
pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Remote source of activities and segments.
///
/// `StravaClient` talks to Strava; tests substitute a fake.
#[async_trait]
pub trait ActivityProvider: Send + Sync {
    /// Exchange an OAuth authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<TokenExchange, FetchError>;

    /// List the athlete's activities, most recent first.
    async fn list_athlete_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivitySummary>, FetchError>;

    /// Get a detailed activity.
    async fn get_activity(
        &self,
        access_token: &str,
        activity_id: ActivityId,
        include_all_efforts: bool,
    ) -> Result<ActivityDetail, FetchError>;

    /// Get a segment, including the athlete's PR on it.
    async fn get_segment(&self, access_token: &str, segment_id: u64)
        -> Result<Segment, FetchError>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials and a request deadline.
    pub fn new(
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("segment-pr/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: STRAVA_API_BASE.to_string(),
            token_url: STRAVA_TOKEN_URL.to_string(),
            client_id,
            client_secret,
        })
    }

    /// Point the client at a different API host (e.g. a local stub server).
    pub fn with_base_urls(mut self, api_base: &str, token_url: &str) -> Self {
        self.base_url = api_base.trim_end_matches('/').to_string();
        self.token_url = token_url.to_string();
        self
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        self.check_response_json(response, url).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body, what));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Map a non-success status to a `FetchError`.
fn status_error(status: u16, body: String, what: &str) -> FetchError {
    match status {
        429 => {
            tracing::warn!("Strava rate limit hit (429)");
            FetchError::RateLimited
        }
        401 => FetchError::Unauthorized,
        404 => FetchError::NotFound(what.to_string()),
        _ => FetchError::Status { status, body },
    }
}

#[async_trait]
impl ActivityProvider for StravaClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenExchange, FetchError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token exchange failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(format!("token response: {}", e)))
    }

    async fn list_athlete_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivitySummary>, FetchError> {
        let url = format!("{}/athlete/activities", self.base_url);
        self.get_json(
            &url,
            access_token,
            &[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    async fn get_activity(
        &self,
        access_token: &str,
        activity_id: ActivityId,
        include_all_efforts: bool,
    ) -> Result<ActivityDetail, FetchError> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        self.get_json(
            &url,
            access_token,
            &[("include_all_efforts", include_all_efforts.to_string())],
        )
        .await
    }

    async fn get_segment(
        &self,
        access_token: &str,
        segment_id: u64,
    ) -> Result<Segment, FetchError> {
        let url = format!("{}/segments/{}", self.base_url, segment_id);
        self.get_json(&url, access_token, &[]).await
    }
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchange {
    pub access_token: String,
    pub athlete: StravaAthlete,
}

impl TokenExchange {
    /// Build the credential kept in the session.
    pub fn into_credential(self) -> Credential {
        Credential {
            access_token: self.access_token,
            athlete_id: self.athlete.id,
            firstname: self.athlete.firstname,
            lastname: self.athlete.lastname,
        }
    }
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}
