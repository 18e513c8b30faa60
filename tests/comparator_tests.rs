// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Effort comparator tests against a fake provider.

use segment_pr::error::FetchError;
use segment_pr::models::{Credential, Segment, SegmentEffort, SegmentInfo};
use segment_pr::services::EffortComparator;
use std::sync::Arc;

mod common;
use common::{Call, FakeProvider};

fn credential() -> Credential {
    Credential::new("token-42", 42)
}

fn row(name: &str, pr: Option<u32>, elapsed: u32, pct: Option<u32>) -> SegmentInfo {
    SegmentInfo {
        name: name.to_string(),
        pr_time: pr,
        elapsed_time: elapsed,
        percentage: pct,
    }
}

#[tokio::test]
async fn test_hill_and_flat_end_to_end() {
    let provider = Arc::new(FakeProvider::hill_and_flat());
    let comparator = EffortComparator::new(provider.clone());

    let comparison = comparator
        .compare_activity(Some("1001"), &credential())
        .await
        .unwrap();

    assert_eq!(comparison.activity_id, 1001);
    assert_eq!(comparison.activity_name, "Morning Ride");
    assert_eq!(
        comparison.segments,
        vec![
            row("Hill", Some(100), 120, Some(120)),
            row("Flat", Some(300), 300, Some(100)),
        ]
    );

    // One segment lookup per effort, in effort order
    assert_eq!(
        provider.calls(),
        vec![
            Call::Activity {
                id: 1001,
                include_all_efforts: true
            },
            Call::Segment(1),
            Call::Segment(2),
        ]
    );
}

#[tokio::test]
async fn test_resolve_numeric_id_used_verbatim() {
    let provider = Arc::new(FakeProvider::hill_and_flat());
    let comparator = EffortComparator::new(provider.clone());

    // Not one of the athlete's activities; still used as-is.
    let id = comparator
        .resolve_activity_id(Some("123456789"), &credential())
        .await
        .unwrap();
    assert_eq!(id, 123456789);

    let id = comparator
        .resolve_activity_id(Some(" 999 "), &credential())
        .await
        .unwrap();
    assert_eq!(id, 999);

    assert!(provider.calls().is_empty(), "no list call for explicit IDs");
}

#[tokio::test]
async fn test_resolve_missing_or_non_numeric_uses_latest() {
    let inputs = [
        None,
        Some(""),
        Some("abc"),
        Some("12x"),
        Some("-5"),
        Some("0x3E9"),
        Some("1_001"),
    ];
    for requested in inputs {
        let provider = Arc::new(FakeProvider::hill_and_flat());
        let comparator = EffortComparator::new(provider.clone());

        let id = comparator
            .resolve_activity_id(requested, &credential())
            .await
            .unwrap();

        assert_eq!(id, 1001, "requested = {:?}", requested);
        assert_eq!(
            provider.calls(),
            vec![Call::List {
                page: 1,
                per_page: 1
            }]
        );
    }
}

#[tokio::test]
async fn test_resolve_no_activities() {
    let provider = Arc::new(FakeProvider::default());
    let comparator = EffortComparator::new(provider);

    let err = comparator
        .resolve_activity_id(None, &credential())
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::NoActivities);
}

#[tokio::test]
async fn test_zero_and_missing_pr_are_unavailable() {
    let mut provider = FakeProvider::default();
    provider.add_activity(
        5,
        "Ride",
        vec![
            SegmentEffort::new("Zero", 60, 10),
            SegmentEffort::new("NoPr", 90, 11),
            SegmentEffort::new("Normal", 45, 12),
        ],
    );
    provider.segments.insert(10, Segment::with_pr(10, 0));
    provider.segments.insert(
        11,
        Segment {
            id: 11,
            ..Default::default()
        },
    );
    provider.segments.insert(12, Segment::with_pr(12, 50));
    let comparator = EffortComparator::new(Arc::new(provider));

    let comparison = comparator
        .compare_activity(Some("5"), &credential())
        .await
        .unwrap();

    assert_eq!(
        comparison.segments,
        vec![
            row("Zero", Some(0), 60, None),
            row("NoPr", None, 90, None),
            row("Normal", Some(50), 45, Some(90)),
        ]
    );
}

#[tokio::test]
async fn test_failed_segment_lookup_aborts() {
    let mut provider = FakeProvider::hill_and_flat();
    provider.failing_segments.insert(1);
    let provider = Arc::new(provider);
    let comparator = EffortComparator::new(provider.clone());

    let err = comparator
        .compare_activity(Some("1001"), &credential())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
    // Stopped at the first failure: segment 2 never requested
    assert_eq!(provider.segment_calls(), 1);
}

#[tokio::test]
async fn test_unknown_activity_is_not_found() {
    let provider = Arc::new(FakeProvider::hill_and_flat());
    let comparator = EffortComparator::new(provider);

    let err = comparator
        .compare_activity(Some("4242"), &credential())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn test_activity_without_efforts() {
    let mut provider = FakeProvider::default();
    provider.add_activity(7, "Treadmill", vec![]);
    let provider = Arc::new(provider);
    let comparator = EffortComparator::new(provider.clone());

    let comparison = comparator
        .compare_activity(None, &credential())
        .await
        .unwrap();

    assert_eq!(comparison.activity_id, 7);
    assert!(comparison.segments.is_empty());
    assert_eq!(provider.segment_calls(), 0);
}

#[tokio::test]
async fn test_percentage_is_floor_for_many_efforts() {
    let mut provider = FakeProvider::default();
    let mut efforts = Vec::new();
    for (i, (elapsed, pr)) in [(101u32, 99u32), (29, 100), (2, 3), (1000, 7), (0, 5)]
        .into_iter()
        .enumerate()
    {
        let seg = i as u64 + 1;
        efforts.push(SegmentEffort::new(format!("S{}", seg), elapsed, seg));
        provider.segments.insert(seg, Segment::with_pr(seg, pr));
    }
    provider.add_activity(1, "Mixed", efforts);
    let comparator = EffortComparator::new(Arc::new(provider));

    let comparison = comparator
        .compare_activity(None, &credential())
        .await
        .unwrap();

    let pcts: Vec<Option<u32>> = comparison.segments.iter().map(|s| s.percentage).collect();
    assert_eq!(
        pcts,
        vec![Some(102), Some(29), Some(66), Some(14285), Some(0)]
    );
}
