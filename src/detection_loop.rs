//! Detection loop: drives the camera and hand detector, matches each
//! detected hand against the gesture store and dispatches key presses.
//!
//! The loop is a small state machine:
//!
//! ```text
//!   Idle --start--> Tracking --stop--> Idle
//!                   Tracking --request_capture--> Capturing
//!                   Capturing --next detection--> Tracking
//! ```
//!
//! Frames are delivered by the camera and detector collaborators; the
//! per-frame work done here is synchronous (normalize, match, debounce).
//! Detection results that arrive while the loop is idle are ignored.

use crate::{
    binding::GestureBinding,
    config::Config,
    error::{Error, Result},
    key_dispatch::KeyEmitter,
    matcher::PoseMatcher,
    normalizer::{normalize_with, NormalizeOptions},
    pose::{validate_hand, NormalizedPose, Pose},
    store::GestureStore,
};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Frame delivery collaborator
pub trait Camera {
    /// Frame type handed to the detector
    type Frame;

    /// Acquire the device and begin delivering frames
    fn start(&mut self) -> Result<()>;

    /// Next frame, or `None` once the stream has ended
    fn read_frame(&mut self) -> Result<Option<Self::Frame>>;

    /// Release the device
    fn stop(&mut self) -> Result<()>;
}

/// Hand-landmark detector collaborator
pub trait HandDetector<F> {
    /// Load the model and prepare for detection
    fn initialize(&mut self) -> Result<()>;

    /// Detect hands in a frame; each hand is a pose in detector order
    fn detect(&mut self, frame: &F) -> Result<Vec<Pose>>;

    /// Release detector resources
    fn release(&mut self) -> Result<()>;
}

/// Detection loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Camera and detector inactive
    Idle,
    /// Per-frame detection and matching running
    Tracking,
    /// The next detection result will be captured as the pending pose
    Capturing,
}

/// What the loop did with one detection result
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The loop was idle; the result was dropped
    Ignored,
    /// No usable hand in the result
    NoHand,
    /// A hand was present but no gesture is close enough
    NoMatch,
    /// A gesture matched
    Matched {
        /// Matched gesture name
        name: String,
        /// Bound key identifier
        key: String,
        /// Distance to the stored pose
        distance: f64,
        /// Whether a key press was requested for this frame
        emitted: bool,
    },
    /// The pose was captured as the pending pose
    Captured,
    /// A capture was requested but the frame contained no hand
    NoHandDetected,
    /// The configured quit gesture matched; no key was pressed
    QuitRequested {
        /// Matched gesture name
        name: String,
    },
}

/// Suppresses repeated presses of the same gesture within a time window
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Debouncer {
    /// Create a debouncer with the given window
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Record a match for `name` at `now`; true when a press should be emitted
    pub fn should_fire(&mut self, name: &str, now: Instant) -> bool {
        if let Some((last_name, at)) = &self.last {
            if last_name == name && now.saturating_duration_since(*at) < self.window {
                return false;
            }
        }
        self.last = Some((name.to_string(), now));
        true
    }

    /// Forget the last emission
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Counters collected by [`DetectionLoop::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames processed
    pub frames: usize,
    /// Frames with a matching gesture
    pub matches: usize,
    /// Key presses requested
    pub key_presses: usize,
    /// Poses captured
    pub captures: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Matched { emitted, .. } => {
                self.matches += 1;
                if *emitted {
                    self.key_presses += 1;
                }
            }
            FrameOutcome::Captured => self.captures += 1,
            _ => {}
        }
    }
}

/// A single camera/detector pairing with its gesture snapshot
pub struct DetectionLoop<C, D>
where
    C: Camera,
    D: HandDetector<C::Frame>,
{
    camera: C,
    detector: D,
    store: Box<dyn GestureStore>,
    emitter: Box<dyn KeyEmitter>,
    matcher: PoseMatcher,
    normalize_options: NormalizeOptions,
    debouncer: Debouncer,
    state: LoopState,
    bindings: Vec<GestureBinding>,
    current_match: Option<String>,
    pending_pose: Option<NormalizedPose>,
    quit_gesture: Option<String>,
}

impl<C, D> DetectionLoop<C, D>
where
    C: Camera,
    D: HandDetector<C::Frame>,
{
    /// Create an idle loop; bindings are loaded on [`start`](Self::start)
    pub fn new(camera: C, detector: D, store: Box<dyn GestureStore>, emitter: Box<dyn KeyEmitter>, config: &Config) -> Self {
        Self {
            camera,
            detector,
            store,
            emitter,
            matcher: PoseMatcher::new(config.matching.threshold),
            normalize_options: config.normalize_options(),
            debouncer: Debouncer::new(config.debounce_window()),
            state: LoopState::Idle,
            bindings: Vec::new(),
            current_match: None,
            pending_pose: None,
            quit_gesture: config.session.quit_gesture.clone(),
        }
    }

    /// Current state
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Gesture that ends [`run`](Self::run)
    pub fn quit_gesture(&self) -> Option<&str> {
        self.quit_gesture.as_deref()
    }

    /// Name of the gesture matched by the latest frame
    pub fn current_match(&self) -> Option<&str> {
        self.current_match.as_deref()
    }

    /// Pose captured by the latest capture request
    pub const fn pending_pose(&self) -> Option<&NormalizedPose> {
        self.pending_pose.as_ref()
    }

    /// Gesture snapshot used for matching
    pub fn bindings(&self) -> &[GestureBinding] {
        &self.bindings
    }

    /// Acquire detector and camera and begin tracking.
    ///
    /// Starting an active loop is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorUnavailable` if the detector or camera cannot be
    /// acquired; anything acquired so far is released and the loop stays idle.
    pub fn start(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            debug!("Detection loop already running");
            return Ok(());
        }
        info!("Starting detection loop");

        self.detector
            .initialize()
            .map_err(|e| Error::CollaboratorUnavailable(format!("hand detector: {e}")))?;

        if let Err(e) = self.camera.start() {
            if let Err(release_err) = self.detector.release() {
                warn!("Failed to release hand detector: {}", release_err);
            }
            return Err(Error::CollaboratorUnavailable(format!("camera: {e}")));
        }

        self.reload_bindings();
        self.debouncer.reset();
        self.current_match = None;
        self.state = LoopState::Tracking;
        info!("Tracking with {} gestures", self.bindings.len());
        Ok(())
    }

    /// Release camera and detector and return to idle.
    ///
    /// Both collaborators are always released, even if one of them fails.
    pub fn stop(&mut self) {
        if self.state == LoopState::Idle {
            return;
        }
        info!("Stopping detection loop");

        if let Err(e) = self.camera.stop() {
            warn!("Failed to stop camera: {}", e);
        }
        if let Err(e) = self.detector.release() {
            warn!("Failed to release hand detector: {}", e);
        }

        self.state = LoopState::Idle;
        self.current_match = None;
        self.debouncer.reset();
    }

    /// Capture the next detected hand as the pending pose
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the loop is not tracking.
    pub fn request_capture(&mut self) -> Result<()> {
        match self.state {
            LoopState::Idle => Err(Error::InvalidState(
                "capture requires an active tracking session".to_string(),
            )),
            LoopState::Tracking | LoopState::Capturing => {
                debug!("Capture requested");
                self.state = LoopState::Capturing;
                Ok(())
            }
        }
    }

    /// Reload the gesture snapshot from the store.
    ///
    /// A store failure keeps the previous snapshot.
    pub fn reload_bindings(&mut self) -> usize {
        match self.store.load_all() {
            Ok(bindings) => self.bindings = bindings,
            Err(e) => warn!("Failed to load gestures, keeping previous set: {}", e),
        }
        self.bindings.len()
    }

    /// Persist the pending pose as a gesture bound to `key`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name or key, `InvalidState` when no
    /// pose has been captured, or the store error if persisting fails (the
    /// pending pose is kept in that case).
    pub fn save_pending(&mut self, name: &str, key: &str) -> Result<GestureBinding> {
        let name = name.trim();
        let key = key.trim();
        if name.is_empty() || key.is_empty() {
            return Err(Error::InvalidInput("gesture name and key must not be empty".to_string()));
        }
        let pose = self
            .pending_pose
            .take()
            .ok_or_else(|| Error::InvalidState("no captured pose to save".to_string()))?;

        let binding = GestureBinding::new(name, key, pose);
        if let Err(e) = self.store.append(binding.clone()) {
            self.pending_pose = Some(binding.pose);
            return Err(e);
        }
        info!("Gesture saved: {} → {}", binding.name, binding.bound_key);
        self.reload_bindings();
        Ok(binding)
    }

    /// Delete a gesture; it stops matching from the next frame on
    ///
    /// # Errors
    ///
    /// Propagates the store error.
    pub fn delete_binding(&mut self, name: &str) -> Result<bool> {
        let removed = self.store.delete_by_name(name)?;
        self.bindings.retain(|b| b.name != name);
        if self.current_match.as_deref() == Some(name) {
            self.current_match = None;
        }
        Ok(removed)
    }

    /// Per-frame hook: process one detector result observed at `now`
    pub fn handle_detection(&mut self, hands: &[Pose], now: Instant) -> FrameOutcome {
        match self.state {
            LoopState::Idle => {
                debug!("Ignoring detection result while idle");
                return FrameOutcome::Ignored;
            }
            LoopState::Capturing => {
                self.state = LoopState::Tracking;
                self.clear_match();
                return self.capture(hands);
            }
            LoopState::Tracking => {}
        }

        let Some(live) = self.live_pose(hands) else {
            self.clear_match();
            return FrameOutcome::NoHand;
        };

        let Some((binding, distance)) = self.matcher.best_match_with_distance(&live, &self.bindings) else {
            self.clear_match();
            return FrameOutcome::NoMatch;
        };
        let name = binding.name.clone();
        let key = binding.bound_key.clone();

        if self.current_match.as_deref() != Some(name.as_str()) {
            info!("Detected: {} → {} (distance {:.4})", name, key, distance);
            self.current_match = Some(name.clone());
        }

        if self.quit_gesture.as_deref() == Some(name.as_str()) {
            info!("Quit gesture '{}' recognized", name);
            return FrameOutcome::QuitRequested { name };
        }

        let emitted = self.debouncer.should_fire(&name, now);
        if emitted {
            if let Err(e) = self.emitter.press(&key) {
                warn!("Key dispatch for '{}' failed: {}", key, e);
            }
        }

        FrameOutcome::Matched {
            name,
            key,
            distance,
            emitted,
        }
    }

    /// Pull one frame through camera and detector
    ///
    /// Returns `Ok(None)` once the camera stream has ended. A detector
    /// failure on a single frame is logged and treated as "no hand".
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when idle, or the camera error.
    pub fn step(&mut self) -> Result<Option<FrameOutcome>> {
        if self.state == LoopState::Idle {
            return Err(Error::InvalidState("detection loop is not running".to_string()));
        }
        let Some(frame) = self.camera.read_frame()? else {
            return Ok(None);
        };
        let hands = match self.detector.detect(&frame) {
            Ok(hands) => hands,
            Err(e) => {
                warn!("Hand detection failed: {}", e);
                Vec::new()
            }
        };
        Ok(Some(self.handle_detection(&hands, Instant::now())))
    }

    /// Start, process frames until the stream ends, the quit gesture is
    /// recognized or `cancel` is set, then stop
    ///
    /// # Errors
    ///
    /// Returns the start error, or a camera error raised mid-stream (the loop
    /// is stopped before returning).
    pub fn run(&mut self, cancel: &AtomicBool) -> Result<RunSummary> {
        self.start()?;
        let mut summary = RunSummary::default();

        while !cancel.load(Ordering::Relaxed) {
            match self.step() {
                Ok(Some(outcome)) => {
                    summary.record(&outcome);
                    if matches!(outcome, FrameOutcome::QuitRequested { .. }) {
                        break;
                    }
                }
                Ok(None) => {
                    info!("End of frame stream");
                    break;
                }
                Err(e) => {
                    self.stop();
                    return Err(e);
                }
            }
        }

        self.stop();
        info!(
            "Processed {} frames, {} matches, {} key presses",
            summary.frames, summary.matches, summary.key_presses
        );
        Ok(summary)
    }

    fn live_pose(&self, hands: &[Pose]) -> Option<NormalizedPose> {
        let hand = hands.first()?;
        if let Err(e) = validate_hand(hand) {
            debug!("Discarding malformed hand: {}", e);
            return None;
        }
        Some(normalize_with(hand, self.normalize_options))
    }

    fn capture(&mut self, hands: &[Pose]) -> FrameOutcome {
        match self.live_pose(hands) {
            Some(pose) => {
                info!("Captured pose with {} landmarks", pose.len());
                self.pending_pose = Some(pose);
                FrameOutcome::Captured
            }
            None => {
                warn!("No hand detected");
                FrameOutcome::NoHandDetected
            }
        }
    }

    fn clear_match(&mut self) {
        if self.current_match.take().is_some() {
            debug!("Match cleared");
        }
    }
}

impl<C, D> Drop for DetectionLoop<C, D>
where
    C: Camera,
    D: HandDetector<C::Frame>,
{
    fn drop(&mut self) {
        self.stop();
    }
}
