// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod comparison;
pub mod credential;
pub mod segment;

pub use activity::{ActivityDetail, ActivityId, ActivitySummary, SegmentEffort, SegmentRef};
pub use comparison::{percent_of_pr, ActivityComparison, SegmentInfo};
pub use credential::Credential;
pub use segment::{AthleteSegmentStats, Segment};
