//! Pose normalization.
//!
//! Raw detector output depends on where the hand is in the frame and how
//! close it is to the camera. Normalizing moves the wrist to the origin and
//! scales the hand so that its farthest landmark sits at distance 1, which
//! leaves only the shape of the hand.

use crate::constants::WRIST_INDEX;
use crate::pose::{Landmark, NormalizedPose};

/// Options controlling how poses are normalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Keep the depth coordinate; when false poses are flattened to 2-D first
    pub use_depth: bool,
}

/// Normalize a pose, keeping depth wherever the detector reported it.
///
/// An empty pose normalizes to an empty pose. A pose whose landmarks all
/// coincide with the wrist is returned centred but unscaled.
#[must_use]
pub fn normalize(pose: &[Landmark]) -> NormalizedPose {
    let Some(origin) = pose.get(WRIST_INDEX).copied() else {
        return NormalizedPose::default();
    };

    let centred: Vec<Landmark> = pose
        .iter()
        .map(|lm| Landmark {
            x: lm.x - origin.x,
            y: lm.y - origin.y,
            z: match (lm.z, origin.z) {
                (Some(z), Some(oz)) => Some(z - oz),
                _ => None,
            },
        })
        .collect();

    let scale = centred.iter().map(Landmark::norm).fold(0.0, f64::max);
    if scale == 0.0 {
        return NormalizedPose::from_landmarks(centred);
    }

    NormalizedPose::from_landmarks(
        centred
            .into_iter()
            .map(|lm| Landmark {
                x: lm.x / scale,
                y: lm.y / scale,
                z: lm.z.map(|z| z / scale),
            })
            .collect(),
    )
}

/// Normalize a pose according to `options`
#[must_use]
pub fn normalize_with(pose: &[Landmark], options: NormalizeOptions) -> NormalizedPose {
    if options.use_depth {
        normalize(pose)
    } else {
        let flat: Vec<Landmark> = pose.iter().map(|lm| lm.flatten()).collect();
        normalize(&flat)
    }
}
