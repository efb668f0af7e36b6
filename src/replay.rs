//! Replay of recorded hand-detector output.
//!
//! A recording is a JSON Lines file with one detection result per line.
//! Each line is an array of hands and each hand an array of landmarks, in
//! either `{"x":..,"y":..,"z":..}` or `[x, y, z]` form. Blank lines are
//! skipped. [`ReplayCamera`] delivers the raw lines as frames and
//! [`ReplayDetector`] decodes them, so a malformed line shows up as a
//! detector failure for that frame only.

use crate::{
    detection_loop::{Camera, HandDetector},
    error::{Error, Result},
    pose::{Landmark, Pose},
};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One recorded detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFrame {
    /// Zero-based frame index (blank lines are not counted)
    pub index: usize,
    /// Raw JSON line
    pub line: String,
}

enum Source {
    File(PathBuf),
    Memory(Vec<String>),
}

enum Stream {
    File(Lines<BufReader<File>>),
    Memory(std::vec::IntoIter<String>),
}

impl Stream {
    fn next_line(&mut self) -> Option<std::io::Result<String>> {
        match self {
            Self::File(lines) => lines.next(),
            Self::Memory(lines) => lines.next().map(Ok),
        }
    }
}

/// Camera that replays a landmark recording
pub struct ReplayCamera {
    source: Source,
    stream: Option<Stream>,
    frame_interval: Option<Duration>,
    last_frame: Option<Instant>,
    next_index: usize,
}

impl ReplayCamera {
    /// Replay the recording at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        Self::with_source(Source::File(path.as_ref().to_path_buf()))
    }

    /// Replay in-memory lines
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self::with_source(Source::Memory(lines))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            stream: None,
            frame_interval: None,
            last_frame: None,
            next_index: 0,
        }
    }

    /// Pace frames at `fps`; zero disables pacing
    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.frame_interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(fps)));
        self
    }

    fn pace(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_frame) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }
}

impl Camera for ReplayCamera {
    type Frame = RecordedFrame;

    fn start(&mut self) -> Result<()> {
        let stream = match &self.source {
            Source::File(path) => {
                info!("Opening landmark recording: {}", path.display());
                let file = File::open(path)
                    .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", path.display())))?;
                Stream::File(BufReader::new(file).lines())
            }
            Source::Memory(lines) => Stream::Memory(lines.clone().into_iter()),
        };
        self.stream = Some(stream);
        self.last_frame = None;
        self.next_index = 0;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<RecordedFrame>> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::InvalidState("replay camera is not started".to_string()));
        };
        loop {
            let Some(line) = stream.next_line() else {
                return Ok(None);
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let index = self.next_index;
            self.next_index += 1;
            self.pace();
            return Ok(Some(RecordedFrame { index, line }));
        }
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Closing landmark recording after {} frames", self.next_index);
        self.stream = None;
        Ok(())
    }
}

/// Decode one recorded line into hands
///
/// # Errors
///
/// Returns `Json` when the line is not an array of landmark arrays.
pub fn decode_hands(line: &str) -> Result<Vec<Pose>> {
    let hands: Vec<Vec<Landmark>> = serde_json::from_str(line)?;
    Ok(hands)
}

/// Detector that decodes recorded detector output
#[derive(Debug, Default)]
pub struct ReplayDetector {
    initialized: bool,
}

impl ReplayDetector {
    /// Create an uninitialized detector
    #[must_use]
    pub const fn new() -> Self {
        Self { initialized: false }
    }
}

impl HandDetector<RecordedFrame> for ReplayDetector {
    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn detect(&mut self, frame: &RecordedFrame) -> Result<Vec<Pose>> {
        if !self.initialized {
            return Err(Error::InvalidState("replay detector is not initialized".to_string()));
        }
        decode_hands(&frame.line)
            .map_err(|e| Error::InvalidInput(format!("frame {}: {e}", frame.index)))
    }

    fn release(&mut self) -> Result<()> {
        self.initialized = false;
        Ok(())
    }
}
