// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity models as returned by the activity endpoints.

use serde::{Deserialize, Serialize};

/// Strava activity identifier.
pub type ActivityId = u64;

/// Summary activity from `GET /athlete/activities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: ActivityId,
    #[serde(default)]
    pub name: String,
    /// Start date/time (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Detailed activity from `GET /activities/{id}?include_all_efforts=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetail {
    pub id: ActivityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    /// Efforts in the order Strava returned them.
    #[serde(default)]
    pub segment_efforts: Vec<SegmentEffort>,
}

/// One timed attempt at a segment within an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentEffort {
    pub name: String,
    /// Elapsed time in seconds
    pub elapsed_time: u32,
    pub segment: SegmentRef,
}

impl SegmentEffort {
    pub fn new(name: impl Into<String>, elapsed_time: u32, segment_id: u64) -> Self {
        Self {
            name: name.into(),
            elapsed_time,
            segment: SegmentRef { id: segment_id },
        }
    }
}

/// The segment an effort was timed on. Strava embeds a summary segment
/// here; only the ID is needed to look up the PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRef {
    pub id: u64,
}
