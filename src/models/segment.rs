// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava segment model.

use serde::{Deserialize, Serialize};

/// Detailed segment from `GET /segments/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Per-athlete stats for the authenticated athlete.
    #[serde(default)]
    pub athlete_segment_stats: Option<AthleteSegmentStats>,
    /// Older API responses report the PR at the top level.
    #[serde(default)]
    pub pr_time: Option<u32>,
}

/// Authenticated athlete's stats on a segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteSegmentStats {
    #[serde(default)]
    pub pr_elapsed_time: Option<u32>,
    #[serde(default)]
    pub pr_date: Option<String>,
    #[serde(default)]
    pub effort_count: Option<u32>,
}

impl Segment {
    /// Build a segment with a known PR time.
    pub fn with_pr(id: u64, pr_time: u32) -> Self {
        Self {
            id,
            athlete_segment_stats: Some(AthleteSegmentStats {
                pr_elapsed_time: Some(pr_time),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// The athlete's PR time in seconds, if Strava reported one.
    pub fn pr_time(&self) -> Option<u32> {
        self.athlete_segment_stats
            .as_ref()
            .and_then(|s| s.pr_elapsed_time)
            .or(self.pr_time)
    }
}
