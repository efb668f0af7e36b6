//! Property tests for pose normalization

mod test_helpers;

use handtyped::{
    normalizer::{normalize, normalize_with, NormalizeOptions},
    pose::{Landmark, Pose},
};
use proptest::prelude::*;
use test_helpers::{fist, open_palm};

fn hand_strategy() -> impl Strategy<Value = Pose> {
    prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 21)
        .prop_map(|points| points.into_iter().map(|(x, y)| Landmark::new(x, y)).collect())
}

fn max_norm(pose: &[Landmark]) -> f64 {
    pose.iter().map(Landmark::norm).fold(0.0, f64::max)
}

fn assert_poses_close(a: &[Landmark], b: &[Landmark], tolerance: f64) {
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert!((p.x - q.x).abs() < tolerance, "x: {} vs {}", p.x, q.x);
        assert!((p.y - q.y).abs() < tolerance, "y: {} vs {}", p.y, q.y);
    }
}

proptest! {
    #[test]
    fn test_translation_and_scale_invariance(
        hand in hand_strategy(),
        dx in -2.0f64..2.0,
        dy in -2.0f64..2.0,
        scale in 0.1f64..10.0,
    ) {
        let wrist = hand[0];
        prop_assume!(hand.iter().map(|lm| ((lm.x - wrist.x).powi(2) + (lm.y - wrist.y).powi(2)).sqrt()).fold(0.0, f64::max) > 1e-3);

        let moved: Pose = hand.iter().map(|lm| Landmark::new(lm.x * scale + dx, lm.y * scale + dy)).collect();
        let a = normalize(&hand);
        let b = normalize(&moved);
        assert_poses_close(a.landmarks(), b.landmarks(), 1e-6);
    }

    #[test]
    fn test_wrist_at_origin_and_unit_extent(hand in hand_strategy()) {
        let wrist = hand[0];
        prop_assume!(hand.iter().any(|lm| lm.x != wrist.x || lm.y != wrist.y));

        let normalized = normalize(&hand);
        prop_assert_eq!(normalized.len(), hand.len());
        prop_assert_eq!(normalized.landmarks()[0], Landmark::new(0.0, 0.0));
        prop_assert!((max_norm(normalized.landmarks()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_is_idempotent(hand in hand_strategy()) {
        let wrist = hand[0];
        prop_assume!(hand.iter().any(|lm| lm.x != wrist.x || lm.y != wrist.y));

        let once = normalize(&hand);
        let twice = normalize(once.landmarks());
        assert_poses_close(once.landmarks(), twice.landmarks(), 1e-9);
    }
}

#[test]
fn test_two_point_pose() {
    let pose = vec![Landmark::new(0.5, 0.5), Landmark::new(0.6, 0.5)];
    let normalized = normalize(&pose);
    assert_poses_close(
        normalized.landmarks(),
        &[Landmark::new(0.0, 0.0), Landmark::new(1.0, 0.0)],
        1e-9,
    );
}

#[test]
fn test_empty_and_single_point() {
    assert!(normalize(&[]).is_empty());

    let single = normalize(&[Landmark::new(0.3, 0.7)]);
    assert_eq!(single.landmarks(), &[Landmark::new(0.0, 0.0)]);
}

#[test]
fn test_degenerate_pose_is_not_scaled() {
    let pose = vec![Landmark::new(0.4, 0.4); 21];
    let normalized = normalize(&pose);
    assert_eq!(normalized.len(), 21);
    assert!(normalized.landmarks().iter().all(|lm| lm.x == 0.0 && lm.y == 0.0));
}

#[test]
fn test_depth_ignored_by_default() {
    let pose: Pose = open_palm()
        .into_iter()
        .enumerate()
        .map(|(i, lm)| Landmark::with_depth(lm.x, lm.y, i as f64 * 0.5))
        .collect();

    let flat = normalize_with(&pose, NormalizeOptions::default());
    assert!(flat.landmarks().iter().all(|lm| lm.z.is_none()));
    assert_eq!(flat, normalize(&open_palm()));

    let deep = normalize_with(&pose, NormalizeOptions { use_depth: true });
    assert!(deep.landmarks().iter().all(|lm| lm.z.is_some()));
    assert!((max_norm(deep.landmarks()) - 1.0).abs() < 1e-9);
}

#[test]
fn test_distinct_gestures_stay_distinct() {
    assert_ne!(normalize(&fist()), normalize(&open_palm()));
}
