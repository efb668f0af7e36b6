//! Configuration management for the gesture-to-keystroke mapper

use crate::{
    constants::{DEFAULT_DEBOUNCE_MS, DEFAULT_MATCH_THRESHOLD, DEFAULT_REPLAY_FPS, DEFAULT_STORE_PATH},
    normalizer::NormalizeOptions,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose matching configuration
    pub matching: MatchingConfig,

    /// Key press debouncing
    pub debounce: DebounceConfig,

    /// Gesture store location
    pub store: StoreConfig,

    /// Key dispatch configuration
    pub dispatch: DispatchConfig,

    /// Landmark replay configuration
    pub replay: ReplayConfig,

    /// Tracking session behaviour
    pub session: SessionConfig,
}

/// Pose matching parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum averaged L1 distance for a gesture to match
    pub threshold: f64,

    /// Include landmark depth when normalizing and comparing
    pub use_depth: bool,
}

/// Debounce parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Minimum time between two presses for the same gesture
    pub window_ms: u64,
}

/// Gesture store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the JSON gesture file
    pub path: PathBuf,
}

/// Key dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Emitter backend (`x11` or `log`)
    pub backend: String,

    /// Press keys on a background thread
    pub threaded: bool,
}

/// Landmark replay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Frames per second to pace the replay at (0 plays as fast as possible)
    pub target_fps: u32,
}

/// Tracking session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Gesture that ends a run instead of pressing its key
    pub quit_gesture: Option<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            use_depth: false,
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            backend: "x11".to_string(),
            threaded: true,
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_REPLAY_FPS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Debounce window as a duration
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce.window_ms)
    }

    /// Normalization options derived from the matching section
    #[must_use]
    pub const fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            use_depth: self.matching.use_depth,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.matching.threshold.is_finite() || self.matching.threshold <= 0.0 {
            return Err(Error::ConfigError(
                "Match threshold must be a positive number".to_string(),
            ));
        }

        if !matches!(self.dispatch.backend.to_lowercase().as_str(), "x11" | "log" | "dry-run" | "dry_run") {
            return Err(Error::ConfigError(format!(
                "Unknown dispatch backend: {}",
                self.dispatch.backend
            )));
        }

        if self.session.quit_gesture.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(Error::ConfigError("Quit gesture name must not be empty".to_string()));
        }

        if self.store.path.as_os_str().is_empty() {
            return Err(Error::ConfigError("Gesture store path must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# handtyped configuration

# Pose matching
matching:
  threshold: 0.15
  use_depth: false

# Minimum time between repeated presses of the same gesture
debounce:
  window_ms: 500

# Gesture store
store:
  path: "gestures.json"

# Key dispatch (x11 or log)
dispatch:
  backend: "x11"
  threaded: true

# Landmark replay pacing
replay:
  target_fps: 30

# Stop the run when this gesture is recognized (its key is not pressed)
session:
  quit_gesture: null
"#;
