//! Nearest-neighbour matching of a live pose against stored bindings.
//!
//! The distance between two normalized poses is the mean, over all
//! landmark positions, of the L1 distance between corresponding landmarks.
//! Depth only contributes where both landmarks carry it. A binding is a
//! candidate when its distance is strictly below the threshold; the closest
//! candidate wins and ties go to the binding stored first.

use crate::binding::GestureBinding;
use crate::constants::DEFAULT_MATCH_THRESHOLD;
use crate::pose::{Landmark, NormalizedPose};

/// L1 distance between two landmarks
#[must_use]
pub fn pointwise_diff(p: &Landmark, q: &Landmark) -> f64 {
    let planar = (p.x - q.x).abs() + (p.y - q.y).abs();
    match (p.z, q.z) {
        (Some(pz), Some(qz)) => planar + (pz - qz).abs(),
        _ => planar,
    }
}

/// Mean pointwise distance between two poses.
///
/// Returns `None` when the poses differ in length or are both empty; such
/// pairs are never comparable.
#[must_use]
pub fn pose_diff(a: &NormalizedPose, b: &NormalizedPose) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let total: f64 = a
        .landmarks()
        .iter()
        .zip(b.landmarks())
        .map(|(p, q)| pointwise_diff(p, q))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    Some(total / a.len() as f64)
}

/// Best binding for `live` under `threshold`, together with its distance
#[must_use]
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn best_match_with_distance<'a>(
    live: &NormalizedPose,
    bindings: &'a [GestureBinding],
    threshold: f64,
) -> Option<(&'a GestureBinding, f64)> {
    let mut best: Option<(&GestureBinding, f64)> = None;
    for binding in bindings {
        let Some(distance) = pose_diff(live, &binding.pose) else {
            continue;
        };
        // also rejects NaN distances and a NaN threshold
        if !(distance < threshold) {
            continue;
        }
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((binding, distance));
        }
    }
    best
}

/// Best binding for `live` under `threshold`
#[must_use]
pub fn find_best_match<'a>(
    live: &NormalizedPose,
    bindings: &'a [GestureBinding],
    threshold: f64,
) -> Option<&'a GestureBinding> {
    best_match_with_distance(live, bindings, threshold).map(|(binding, _)| binding)
}

/// Pose matcher with a configured threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMatcher {
    threshold: f64,
}

impl PoseMatcher {
    /// Create a matcher with the given threshold
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Configured threshold
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best binding for `live`
    #[must_use]
    pub fn find_best_match<'a>(&self, live: &NormalizedPose, bindings: &'a [GestureBinding]) -> Option<&'a GestureBinding> {
        find_best_match(live, bindings, self.threshold)
    }

    /// Best binding for `live`, with its distance
    #[must_use]
    pub fn best_match_with_distance<'a>(
        &self,
        live: &NormalizedPose,
        bindings: &'a [GestureBinding],
    ) -> Option<(&'a GestureBinding, f64)> {
        best_match_with_distance(live, bindings, self.threshold)
    }
}

impl Default for PoseMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}
