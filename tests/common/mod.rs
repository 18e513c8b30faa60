// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use segment_pr::config::Config;
use segment_pr::error::FetchError;
use segment_pr::models::{
    ActivityDetail, ActivityId, ActivitySummary, Segment, SegmentEffort,
};
use segment_pr::routes::create_router;
use segment_pr::services::strava::{ActivityProvider, StravaAthlete, TokenExchange};
use segment_pr::AppState;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// A call made against the fake provider.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exchange(String),
    List { page: u32, per_page: u32 },
    Activity { id: ActivityId, include_all_efforts: bool },
    Segment(u64),
}

/// In-memory activity provider.
///
/// Codes of the form `code-<athlete_id>` exchange successfully; anything
/// else is rejected with HTTP 400.
#[derive(Default)]
pub struct FakeProvider {
    pub activities: Vec<ActivitySummary>,
    pub details: HashMap<ActivityId, ActivityDetail>,
    pub segments: HashMap<u64, Segment>,
    pub failing_segments: HashSet<u64>,
    pub reject_tokens: bool,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl FakeProvider {
    /// One activity (1001) with two efforts: Hill (120s on segment 1, PR 100)
    /// and Flat (300s on segment 2, PR 300). An older activity (999) exists too.
    pub fn hill_and_flat() -> Self {
        let mut provider = Self::default();
        provider.add_activity(
            1001,
            "Morning Ride",
            vec![
                SegmentEffort::new("Hill", 120, 1),
                SegmentEffort::new("Flat", 300, 2),
            ],
        );
        provider.add_activity(999, "Older Ride", vec![SegmentEffort::new("Hill", 110, 1)]);
        provider.segments.insert(1, Segment::with_pr(1, 100));
        provider.segments.insert(2, Segment::with_pr(2, 300));
        provider
    }

    /// Activities are listed in insertion order (most recent first).
    pub fn add_activity(&mut self, id: ActivityId, name: &str, efforts: Vec<SegmentEffort>) {
        self.activities.push(ActivitySummary {
            id,
            name: name.to_string(),
            start_date: None,
        });
        self.details.insert(
            id,
            ActivityDetail {
                id,
                name: name.to_string(),
                start_date: None,
                segment_efforts: efforts,
            },
        );
    }

    /// Reject every access token, as Strava does after deauthorization.
    pub fn rejecting_tokens(mut self) -> Self {
        self.reject_tokens = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn segment_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Segment(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_token(&self, token: &str) -> Result<(), FetchError> {
        if self.reject_tokens || !token.starts_with("token-") {
            return Err(FetchError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityProvider for FakeProvider {
    async fn exchange_code(&self, code: &str) -> Result<TokenExchange, FetchError> {
        self.record(Call::Exchange(code.to_string()));

        let athlete_id: u64 = code
            .strip_prefix("code-")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| FetchError::Status {
                status: 400,
                body: r#"{"message":"Bad Request","errors":[{"code":"invalid"}]}"#.to_string(),
            })?;

        Ok(TokenExchange {
            access_token: format!("token-{}", athlete_id),
            athlete: StravaAthlete {
                id: athlete_id,
                firstname: Some(format!("Athlete{}", athlete_id)),
                lastname: None,
            },
        })
    }

    async fn list_athlete_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivitySummary>, FetchError> {
        self.record(Call::List { page, per_page });
        self.check_token(access_token)?;

        let start = (page.saturating_sub(1) * per_page) as usize;
        Ok(self
            .activities
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_activity(
        &self,
        access_token: &str,
        activity_id: ActivityId,
        include_all_efforts: bool,
    ) -> Result<ActivityDetail, FetchError> {
        self.record(Call::Activity {
            id: activity_id,
            include_all_efforts,
        });
        self.check_token(access_token)?;

        self.details
            .get(&activity_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("/activities/{}", activity_id)))
    }

    async fn get_segment(
        &self,
        access_token: &str,
        segment_id: u64,
    ) -> Result<Segment, FetchError> {
        self.record(Call::Segment(segment_id));
        self.check_token(access_token)?;

        if self.failing_segments.contains(&segment_id) {
            return Err(FetchError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        self.segments
            .get(&segment_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("/segments/{}", segment_id)))
    }
}

/// Create a test app around a fake provider.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(provider: Arc<FakeProvider>) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default(), provider)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
    provider: Arc<FakeProvider>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, provider));
    (create_router(state.clone()), state)
}

/// Send a GET request, optionally with a Cookie header.
#[allow(dead_code)]
pub async fn get(app: &axum::Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` of the session cookie set by a response, if any.
#[allow(dead_code)]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("segment_pr_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Decoded query parameter from a URL.
#[allow(dead_code)]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| urlencoding::decode(v).ok().map(|s| s.into_owned()))?
    })
}

/// Run the full OAuth dance through the router and return the session cookie.
#[allow(dead_code)]
pub async fn login(app: &axum::Router, athlete_id: u64) -> String {
    let response = get(app, "/", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let cookie = session_cookie(&response).expect("session cookie on first visit");
    let state = query_param(&location(&response), "state").expect("state in authorize URL");

    let callback = format!(
        "/auth/?state={}&code=code-{}&scope=read,activity:read",
        urlencoding::encode(&state),
        athlete_id
    );
    let response = get(app, &callback, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    cookie
}
