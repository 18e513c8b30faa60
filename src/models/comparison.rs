// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-effort comparison against the athlete's PR.

use crate::error::DivisionError;
use crate::models::{ActivityId, SegmentEffort};
use serde::Serialize;

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentInfo {
    pub name: String,
    /// PR time in seconds, `None` if the athlete has no PR on the segment.
    pub pr_time: Option<u32>,
    /// Elapsed time of this effort in seconds.
    pub elapsed_time: u32,
    /// `floor(elapsed / pr * 100)`, `None` when no comparison is available.
    pub percentage: Option<u32>,
}

impl SegmentInfo {
    /// Compare an effort against a PR time.
    ///
    /// A missing or zero PR produces a row without a percentage.
    pub fn from_effort(effort: &SegmentEffort, pr_time: Option<u32>) -> Self {
        let percentage = pr_time.and_then(|pr| match percent_of_pr(effort.elapsed_time, pr) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::debug!(segment = %effort.name, error = %e, "No PR comparison");
                None
            }
        });

        Self {
            name: effort.name.clone(),
            pr_time,
            elapsed_time: effort.elapsed_time,
            percentage,
        }
    }
}

/// Percentage of PR, truncated toward zero.
///
/// Uses integer arithmetic so the result is the exact floor of
/// `elapsed / pr * 100`. Saturates at `u32::MAX`.
pub fn percent_of_pr(elapsed_time: u32, pr_time: u32) -> Result<u32, DivisionError> {
    if pr_time == 0 {
        return Err(DivisionError::ZeroPrTime);
    }
    let pct = u64::from(elapsed_time) * 100 / u64::from(pr_time);
    Ok(u32::try_from(pct).unwrap_or(u32::MAX))
}

/// Comparison results for one activity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityComparison {
    pub activity_id: ActivityId,
    pub activity_name: String,
    pub segments: Vec<SegmentInfo>,
}
