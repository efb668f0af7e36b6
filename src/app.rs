//! Application wiring for the command-line shell.
//!
//! Builds the store, emitter and detection loop from [`Config`] and exposes
//! the operations the CLI offers: replaying a recording, capturing a
//! gesture from a recording, listing and deleting gestures.

use crate::{
    binding::GestureBinding,
    config::Config,
    detection_loop::{DetectionLoop, FrameOutcome, RunSummary},
    error::{Error, Result},
    key_dispatch::{create_emitter, KeyEmitter, LogEmitter, ThreadedEmitter},
    replay::{ReplayCamera, ReplayDetector},
    store::{GestureStore, JsonFileStore},
};
use log::{info, warn};
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Detection loop fed by a landmark recording
pub type ReplayLoop = DetectionLoop<ReplayCamera, ReplayDetector>;

/// Main application struct
pub struct HandtypedApp {
    config: Config,
    dry_run: bool,
}

impl HandtypedApp {
    /// Create the application from a validated configuration
    pub fn new(config: Config, dry_run: bool) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, dry_run })
    }

    /// Active configuration
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Gesture store configured for this application
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.config.store.path)
    }

    /// Build the key emitter.
    ///
    /// If the configured backend cannot be initialized the application keeps
    /// running with key presses only logged.
    pub fn emitter(&self) -> Result<Box<dyn KeyEmitter>> {
        let backend = if self.dry_run { "log" } else { self.config.dispatch.backend.as_str() };
        let emitter = match create_emitter(backend) {
            Ok(emitter) => {
                info!("Key dispatch via {}", emitter.name());
                emitter
            }
            Err(e) => {
                warn!("Failed to initialize key dispatch: {}. Key presses will only be logged.", e);
                Box::new(LogEmitter)
            }
        };
        if self.config.dispatch.threaded {
            Ok(Box::new(ThreadedEmitter::spawn(emitter)?))
        } else {
            Ok(emitter)
        }
    }

    fn replay_loop<P: AsRef<Path>>(&self, frames: P, emitter: Box<dyn KeyEmitter>) -> ReplayLoop {
        let camera = ReplayCamera::from_file(frames).with_target_fps(self.config.replay.target_fps);
        DetectionLoop::new(camera, ReplayDetector::new(), Box::new(self.store()), emitter, &self.config)
    }

    /// Replay a recording through the detection loop, pressing matched keys
    pub fn run<P: AsRef<Path>>(&self, frames: P, cancel: &AtomicBool) -> Result<RunSummary> {
        let emitter = self.emitter()?;
        let mut detection = self.replay_loop(frames, emitter);
        detection.run(cancel)
    }

    /// Capture the hand at `frame_index` of a recording and save it as a gesture
    pub fn capture<P: AsRef<Path>>(&self, frames: P, frame_index: usize, name: &str, key: &str) -> Result<GestureBinding> {
        // matches seen while seeking to the frame must not press keys
        let mut detection = self.replay_loop(frames, Box::new(LogEmitter));
        detection.start()?;

        for skipped in 0..frame_index {
            if detection.step()?.is_none() {
                return Err(Error::InvalidInput(format!(
                    "recording ended after {skipped} frames, frame {frame_index} not found"
                )));
            }
        }

        detection.request_capture()?;
        let outcome = detection.step()?.ok_or_else(|| {
            Error::InvalidInput(format!("recording ended before frame {frame_index}"))
        })?;

        let binding = match outcome {
            FrameOutcome::Captured => detection.save_pending(name, key)?,
            _ => {
                return Err(Error::InvalidInput(format!("no hand detected in frame {frame_index}")));
            }
        };
        detection.stop();
        Ok(binding)
    }

    /// All stored gestures
    pub fn list(&self) -> Result<Vec<GestureBinding>> {
        self.store().load_all()
    }

    /// Delete a stored gesture
    pub fn delete(&self, name: &str) -> Result<bool> {
        self.store().delete_by_name(name)
    }
}
