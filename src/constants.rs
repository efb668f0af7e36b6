//! Constants used throughout the application

/// Number of landmarks the hand detector reports per hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Index of the wrist landmark, used as the pose origin
pub const WRIST_INDEX: usize = 0;

/// Default match threshold for the averaged L1 metric on 2-D normalized poses
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.15;

/// Default debounce window between repeated key presses for the same gesture
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default replay pacing
pub const DEFAULT_REPLAY_FPS: u32 = 30;

/// Default location of the gesture store
pub const DEFAULT_STORE_PATH: &str = "gestures.json";

/// Named keys dispatched as discrete taps
pub const SPECIAL_KEYS: [&str; 9] = [
    "enter",
    "space",
    "tab",
    "backspace",
    "up",
    "down",
    "left",
    "right",
    "escape",
];

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
