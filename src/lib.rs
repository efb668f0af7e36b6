//! Hand-gesture-to-keystroke mapping.
//!
//! A hand-landmark detector reports 21 points per detected hand. This crate
//! turns those points into a pose that does not depend on where the hand is
//! or how large it appears, compares it with a small set of user-recorded
//! gestures and presses the key bound to the closest one.
//!
//! The pipeline consists of:
//! 1. Pose normalization: wrist to the origin, farthest landmark at distance 1
//! 2. Nearest-neighbour matching under a distance threshold
//! 3. Debounced key dispatch from the detection loop
//!
//! # Examples
//!
//! ## Matching a pose
//!
//! ```no_run
//! use handtyped::{
//!     binding::GestureBinding,
//!     matcher::PoseMatcher,
//!     normalizer::normalize,
//!     pose::Landmark,
//! };
//!
//! let recorded: Vec<Landmark> = (0..21).map(|i| Landmark::new(0.5, 0.5 + i as f64 * 0.01)).collect();
//! let bindings = vec![GestureBinding::new("point", "enter", normalize(&recorded))];
//!
//! // The same hand, further from the camera and moved to the left
//! let live: Vec<Landmark> = recorded.iter().map(|lm| Landmark::new(lm.x * 0.5 - 0.1, lm.y * 0.5)).collect();
//!
//! let matcher = PoseMatcher::default();
//! if let Some(binding) = matcher.find_best_match(&normalize(&live), &bindings) {
//!     println!("{} → {}", binding.name, binding.bound_key);
//! }
//! ```
//!
//! ## Replaying a recording
//!
//! ```no_run
//! use handtyped::{
//!     config::Config,
//!     detection_loop::DetectionLoop,
//!     key_dispatch::LogEmitter,
//!     replay::{ReplayCamera, ReplayDetector},
//!     store::JsonFileStore,
//! };
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut detection = DetectionLoop::new(
//!     ReplayCamera::from_file("recording.jsonl"),
//!     ReplayDetector::new(),
//!     Box::new(JsonFileStore::new("gestures.json")),
//!     Box::new(LogEmitter),
//!     &config,
//! );
//!
//! let summary = detection.run(&AtomicBool::new(false))?;
//! println!("{} frames, {} key presses", summary.frames, summary.key_presses);
//! # Ok(())
//! # }
//! ```

/// Landmark and pose types
pub mod pose;

/// Translation- and scale-invariant pose normalization
pub mod normalizer;

/// Named, key-bound gestures
pub mod binding;

/// Nearest-neighbour pose matching
pub mod matcher;

/// Gesture persistence
pub mod store;

/// Key-sequence parsing and key emission
pub mod key_dispatch;

/// Detection loop state machine
pub mod detection_loop;

/// Replay of recorded hand-detector output
pub mod replay;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
