// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Effort comparison service.
//!
//! Handles the core workflow:
//! 1. Resolve the activity (explicit ID or the athlete's most recent)
//! 2. Fetch the activity with all segment efforts
//! 3. Fetch each effort's segment for the athlete's PR time
//! 4. Compute the percentage-of-PR for each effort

use crate::error::FetchError;
use crate::models::{
    ActivityComparison, ActivityDetail, ActivityId, Credential, SegmentEffort, SegmentInfo,
};
use crate::services::strava::ActivityProvider;
use std::sync::Arc;

/// Compares an activity's segment efforts against the athlete's PRs.
#[derive(Clone)]
pub struct EffortComparator {
    provider: Arc<dyn ActivityProvider>,
}

impl EffortComparator {
    pub fn new(provider: Arc<dyn ActivityProvider>) -> Self {
        Self { provider }
    }

    /// Pick the activity to compare.
    ///
    /// A numeric `requested` ID is used as-is; it is not checked against the
    /// authenticated athlete. Only plain decimal digits count as numeric, so
    /// `0x3E9` or `1_001` are not IDs. Anything else falls back to the
    /// athlete's most recent activity (page 1, one per page).
    pub async fn resolve_activity_id(
        &self,
        requested: Option<&str>,
        credential: &Credential,
    ) -> Result<ActivityId, FetchError> {
        if let Some(id) = requested.and_then(|s| s.trim().parse::<ActivityId>().ok()) {
            return Ok(id);
        }

        let activities = self
            .provider
            .list_athlete_activities(&credential.access_token, 1, 1)
            .await?;

        let latest = activities.first().ok_or(FetchError::NoActivities)?;
        tracing::debug!(
            athlete_id = credential.athlete_id,
            activity_id = latest.id,
            "Resolved most recent activity"
        );
        Ok(latest.id)
    }

    /// Fetch an activity including all of its segment efforts.
    pub async fn fetch_activity_detail(
        &self,
        activity_id: ActivityId,
        credential: &Credential,
    ) -> Result<ActivityDetail, FetchError> {
        self.provider
            .get_activity(&credential.access_token, activity_id, true)
            .await
    }

    /// Compare each effort with its segment's PR, in effort order.
    ///
    /// Segments are fetched one at a time. The first failed lookup aborts
    /// the whole comparison.
    pub async fn compute_comparisons(
        &self,
        efforts: &[SegmentEffort],
        credential: &Credential,
    ) -> Result<Vec<SegmentInfo>, FetchError> {
        let mut rows = Vec::with_capacity(efforts.len());

        for effort in efforts {
            let segment = self
                .provider
                .get_segment(&credential.access_token, effort.segment.id)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        segment_id = effort.segment.id,
                        error = %e,
                        "Can't get segment detail"
                    );
                    e
                })?;

            rows.push(SegmentInfo::from_effort(effort, segment.pr_time()));
        }

        Ok(rows)
    }

    /// Resolve, fetch and compare in one go.
    pub async fn compare_activity(
        &self,
        requested: Option<&str>,
        credential: &Credential,
    ) -> Result<ActivityComparison, FetchError> {
        let activity_id = self.resolve_activity_id(requested, credential).await?;
        let detail = self.fetch_activity_detail(activity_id, credential).await?;

        tracing::info!(
            athlete_id = credential.athlete_id,
            activity_id,
            efforts = detail.segment_efforts.len(),
            "Comparing segment efforts"
        );

        let segments = self
            .compute_comparisons(&detail.segment_efforts, credential)
            .await?;

        Ok(ActivityComparison {
            activity_id,
            activity_name: detail.name,
            segments,
        })
    }
}
