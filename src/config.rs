//! Configuration management for a tracking session

use crate::constants::{
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_MAX_JITTER_THRESHOLD, DEFAULT_MAX_POSE_COUNT,
    DEFAULT_MAX_RECOVERY_ATTEMPTS, DEFAULT_MIN_CONFIDENCE, DEFAULT_RECOVERY_COOLDOWN_MS, DEFAULT_SMOOTHING_FACTOR,
    DEFAULT_TEMPORAL_WINDOW_SIZE, TEMPORAL_WINDOW_UNIT_MS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tracking pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Poses below this confidence are not rendered and trigger recovery
    pub min_confidence: f64,

    /// Maximum number of people tracked per frame
    pub max_pose_count: u32,

    /// Base of the per-entry history blend weight
    pub smoothing_factor: f64,

    /// History window, in units of 200 ms
    pub temporal_window_size: u32,

    /// Movement below this distance is treated as noise
    pub max_jitter_threshold: f64,

    /// Consecutive failed recoveries before tracking is reported lost
    pub max_recovery_attempts: u32,

    /// Minimum interval between recovery attempts
    pub recovery_cooldown_ms: u32,

    /// Frame width used when a frame is processed with a zero dimension
    pub frame_width: u32,

    /// Frame height used when a frame is processed with a zero dimension
    pub frame_height: u32,

    /// Run the validator on every stabilized pose
    pub validate_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_pose_count: DEFAULT_MAX_POSE_COUNT,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            temporal_window_size: DEFAULT_TEMPORAL_WINDOW_SIZE,
            max_jitter_threshold: DEFAULT_MAX_JITTER_THRESHOLD,
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
            recovery_cooldown_ms: DEFAULT_RECOVERY_COOLDOWN_MS,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            validate_output: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Age limit of history entries in milliseconds
    #[must_use]
    pub fn temporal_window_ms(&self) -> u64 {
        u64::from(self.temporal_window_size) * TEMPORAL_WINDOW_UNIT_MS
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(Error::ConfigError(
                "Smoothing factor must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.temporal_window_size == 0 {
            return Err(Error::ConfigError(
                "Temporal window size must be greater than 0".to_string(),
            ));
        }
        if !self.max_jitter_threshold.is_finite() || self.max_jitter_threshold < 0.0 {
            return Err(Error::ConfigError(
                "Jitter threshold must be a non-negative number".to_string(),
            ));
        }
        if self.max_pose_count == 0 {
            return Err(Error::ConfigError("Max pose count must be greater than 0".to_string()));
        }
        if self.max_recovery_attempts == 0 {
            return Err(Error::ConfigError(
                "Max recovery attempts must be greater than 0".to_string(),
            ));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(Error::ConfigError("Frame dimensions must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Pose Stabilization Configuration

# Poses below this confidence are not rendered and trigger recovery
min_confidence: 0.5

# Number of people tracked per frame
max_pose_count: 1

# Temporal smoothing
smoothing_factor: 0.7
temporal_window_size: 5      # x 200 ms of history
max_jitter_threshold: 10.0   # frame units

# Tracking-loss recovery
max_recovery_attempts: 5
recovery_cooldown_ms: 500

# Frame size used when the caller passes a zero width or height
frame_width: 400
frame_height: 600
validate_output: true
"#;
