//! Landmark and pose types shared by the normalizer, matcher and store.
//!
//! A landmark is one tracked point of a hand in normalized image space.
//! Depth is optional: detectors that only report image coordinates leave
//! `z` empty, and every computation in this crate treats a missing `z` as
//! "2-D only" rather than as zero.

use crate::{constants::NUM_HAND_LANDMARKS, Error, Result};
use serde::{Deserialize, Serialize};

/// A single tracked point on a hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LandmarkRepr")]
pub struct Landmark {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
    /// Optional depth coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Landmark {
    /// Create a 2-D landmark
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Create a 3-D landmark
    #[must_use]
    pub const fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Euclidean norm, including depth when present
    #[must_use]
    pub fn norm(&self) -> f64 {
        let z = self.z.unwrap_or(0.0);
        (self.x * self.x + self.y * self.y + z * z).sqrt()
    }

    /// Whether every present coordinate is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }

    /// Drop the depth coordinate
    #[must_use]
    pub const fn flatten(self) -> Self {
        Self::new(self.x, self.y)
    }
}

/// Accepted on-disk shapes of a landmark.
///
/// The desktop shell persisted `{x, y, z}` objects while the older tooling
/// wrote `[x, y, z]` tuples; both load into the same [`Landmark`].
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: Option<f64>,
    },
    Array(Vec<f64>),
}

impl TryFrom<LandmarkRepr> for Landmark {
    type Error = String;

    fn try_from(repr: LandmarkRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            LandmarkRepr::Object { x, y, z } => Ok(Self { x, y, z }),
            LandmarkRepr::Array(values) => match values.as_slice() {
                [x, y] => Ok(Self::new(*x, *y)),
                [x, y, z] => Ok(Self::with_depth(*x, *y, *z)),
                other => Err(format!("landmark array must have 2 or 3 values, got {}", other.len())),
            },
        }
    }
}

/// Raw landmarks of one detected hand, in detector order
pub type Pose = Vec<Landmark>;

/// A pose made invariant to hand position and size.
///
/// Only [`crate::normalizer`] produces these from raw detector output;
/// [`NormalizedPose::from_landmarks`] exists for poses that were normalized
/// before being persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPose(Vec<Landmark>);

impl NormalizedPose {
    /// Wrap landmarks that are already normalized
    #[must_use]
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> Self {
        Self(landmarks)
    }

    /// Number of landmarks
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the pose has no landmarks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Landmarks in detector order
    #[must_use]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.0
    }

    /// Consume into the landmark list
    #[must_use]
    pub fn into_landmarks(self) -> Vec<Landmark> {
        self.0
    }
}

/// Check that a detected hand can be fed to the matcher.
///
/// # Errors
///
/// Returns `InvalidInput` when the hand does not have exactly
/// [`NUM_HAND_LANDMARKS`] points or any coordinate is NaN or infinite.
pub fn validate_hand(pose: &[Landmark]) -> Result<()> {
    if pose.len() != NUM_HAND_LANDMARKS {
        return Err(Error::InvalidInput(format!(
            "expected {NUM_HAND_LANDMARKS} landmarks, got {}",
            pose.len()
        )));
    }
    if let Some(index) = pose.iter().position(|lm| !lm.is_finite()) {
        return Err(Error::InvalidInput(format!("non-finite coordinate at landmark {index}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_norm() {
        assert!((Landmark::new(3.0, 4.0).norm() - 5.0).abs() < 1e-12);
        assert!((Landmark::with_depth(1.0, 2.0, 2.0).norm() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_landmark_object_and_array_forms() {
        let obj: Landmark = serde_json::from_str(r#"{"x":0.5,"y":0.25}"#).unwrap();
        assert_eq!(obj, Landmark::new(0.5, 0.25));

        let obj3: Landmark = serde_json::from_str(r#"{"x":0.5,"y":0.25,"z":-0.1}"#).unwrap();
        assert_eq!(obj3, Landmark::with_depth(0.5, 0.25, -0.1));

        let arr: Landmark = serde_json::from_str("[0.1, 0.2, 0.3]").unwrap();
        assert_eq!(arr, Landmark::with_depth(0.1, 0.2, 0.3));

        assert!(serde_json::from_str::<Landmark>("[0.1]").is_err());
        assert!(serde_json::from_str::<Landmark>(r#"{"x":0.1}"#).is_err());
    }

    #[test]
    fn test_landmark_serializes_without_missing_depth() {
        let json = serde_json::to_string(&Landmark::new(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);
    }

    #[test]
    fn test_validate_hand() {
        let hand = vec![Landmark::new(0.5, 0.5); NUM_HAND_LANDMARKS];
        assert!(validate_hand(&hand).is_ok());

        assert!(validate_hand(&hand[..20]).is_err());

        let mut bad = hand;
        bad[7].y = f64::NAN;
        match validate_hand(&bad) {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("landmark 7")),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
