//! Helper functions and utilities for tests
#![allow(dead_code)]

use handtyped::{
    detection_loop::{Camera, HandDetector},
    key_dispatch::KeyEmitter,
    pose::{Landmark, Pose},
    Error, Result,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const OPEN_PALM: [(f64, f64); 21] = [
    (0.50, 0.80),
    (0.42, 0.75),
    (0.36, 0.68),
    (0.32, 0.62),
    (0.28, 0.57),
    (0.45, 0.58),
    (0.44, 0.48),
    (0.435, 0.42),
    (0.43, 0.37),
    (0.50, 0.57),
    (0.50, 0.46),
    (0.50, 0.39),
    (0.50, 0.34),
    (0.55, 0.58),
    (0.56, 0.48),
    (0.565, 0.42),
    (0.57, 0.38),
    (0.60, 0.61),
    (0.62, 0.53),
    (0.63, 0.48),
    (0.64, 0.44),
];

const FIST: [(f64, f64); 21] = [
    (0.50, 0.80),
    (0.42, 0.75),
    (0.38, 0.70),
    (0.40, 0.65),
    (0.44, 0.63),
    (0.45, 0.58),
    (0.44, 0.52),
    (0.46, 0.58),
    (0.47, 0.62),
    (0.50, 0.57),
    (0.50, 0.51),
    (0.51, 0.58),
    (0.51, 0.62),
    (0.55, 0.58),
    (0.55, 0.53),
    (0.55, 0.59),
    (0.55, 0.63),
    (0.60, 0.61),
    (0.60, 0.56),
    (0.59, 0.61),
    (0.58, 0.64),
];

fn to_pose(points: &[(f64, f64)]) -> Pose {
    points.iter().map(|&(x, y)| Landmark::new(x, y)).collect()
}

/// Raw detector output for an open palm
pub fn open_palm() -> Pose {
    to_pose(&OPEN_PALM)
}

/// Raw detector output for a closed fist
pub fn fist() -> Pose {
    to_pose(&FIST)
}

/// Add a deterministic ±0.01 jitter to every coordinate
pub fn jitter(pose: &Pose) -> Pose {
    pose.iter()
        .enumerate()
        .map(|(i, lm)| {
            let dx = if i % 2 == 0 { -0.01 } else { 0.01 };
            let dy = if i % 3 == 0 { 0.01 } else { -0.01 };
            Landmark::new(lm.x + dx, lm.y + dy)
        })
        .collect()
}

/// One JSONL line holding a single hand
pub fn recording_line(pose: &Pose) -> String {
    serde_json::to_string(&vec![pose.clone()]).expect("serialize pose")
}

/// Emitter recording every key identifier it was asked to press
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    pub presses: Arc<Mutex<Vec<String>>>,
    pub fail: Arc<AtomicBool>,
}

impl RecordingEmitter {
    pub fn presses(&self) -> Vec<String> {
        self.presses.lock().expect("lock presses").clone()
    }
}

impl KeyEmitter for RecordingEmitter {
    fn press(&mut self, key: &str) -> Result<()> {
        self.presses.lock().expect("lock presses").push(key.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::KeyDispatch("simulated failure".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RecordingEmitter"
    }
}

/// Shared counters describing collaborator lifecycle calls
#[derive(Clone, Default)]
pub struct Lifecycle {
    pub camera_starts: Arc<AtomicUsize>,
    pub camera_stops: Arc<AtomicUsize>,
    pub detector_inits: Arc<AtomicUsize>,
    pub detector_releases: Arc<AtomicUsize>,
}

impl Lifecycle {
    pub fn get(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Camera delivering queued frames; each frame is already a detection result
pub struct FakeCamera {
    pub frames: VecDeque<Vec<Pose>>,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub lifecycle: Lifecycle,
}

impl FakeCamera {
    pub fn new(frames: Vec<Vec<Pose>>, lifecycle: Lifecycle) -> Self {
        Self {
            frames: frames.into(),
            fail_start: false,
            fail_stop: false,
            lifecycle,
        }
    }
}

impl Camera for FakeCamera {
    type Frame = Vec<Pose>;

    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(Error::IoError("camera permission denied".to_string()));
        }
        self.lifecycle.camera_starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Vec<Pose>>> {
        Ok(self.frames.pop_front())
    }

    fn stop(&mut self) -> Result<()> {
        self.lifecycle.camera_stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(Error::IoError("camera busy".to_string()));
        }
        Ok(())
    }
}

/// Detector passing frames through unchanged
#[derive(Default)]
pub struct FakeDetector {
    pub fail_init: bool,
    pub fail_release: bool,
    pub lifecycle: Lifecycle,
}

impl HandDetector<Vec<Pose>> for FakeDetector {
    fn initialize(&mut self) -> Result<()> {
        if self.fail_init {
            return Err(Error::IoError("model not found".to_string()));
        }
        self.lifecycle.detector_inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn detect(&mut self, frame: &Vec<Pose>) -> Result<Vec<Pose>> {
        Ok(frame.clone())
    }

    fn release(&mut self) -> Result<()> {
        self.lifecycle.detector_releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(Error::IoError("detector crashed".to_string()));
        }
        Ok(())
    }
}
