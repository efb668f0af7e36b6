//! Gesture bindings: a named, key-bound pose used as a match target.

use crate::pose::NormalizedPose;
use serde::{Deserialize, Serialize};

/// A stored gesture bound to a key identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureBinding {
    /// Unique name of the gesture within a store
    pub name: String,

    /// Key identifier pressed when the gesture matches
    #[serde(rename = "boundKey", alias = "key", alias = "bound_key")]
    pub bound_key: String,

    /// Normalized reference pose
    #[serde(alias = "landmarks")]
    pub pose: NormalizedPose,
}

impl GestureBinding {
    /// Create a new binding
    pub fn new(name: impl Into<String>, bound_key: impl Into<String>, pose: NormalizedPose) -> Self {
        Self {
            name: name.into(),
            bound_key: bound_key.into(),
            pose,
        }
    }
}
