//! Recorded detector output and its replay through a tracking session.

use crate::constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use crate::detector::PoseDetector;
use crate::pose::RawPose;
use crate::session::{FrameOutcome, TrackingSession};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_width() -> u32 {
    DEFAULT_FRAME_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_FRAME_HEIGHT
}

/// One recorded frame; `pose` is `None` when the detector found nobody
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub pose: Option<RawPose>,
}

/// A recorded sequence of detector outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    pub frames: Vec<ReplayFrame>,
}

impl Recording {
    /// Load a recording from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse a recording from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ReplayError` if the text is malformed or the frames
    /// are not in timestamp order
    pub fn from_yaml(content: &str) -> Result<Self> {
        let recording: Self =
            serde_yaml::from_str(content).map_err(|e| Error::ReplayError(format!("Failed to parse recording: {e}")))?;
        recording.validate()?;
        Ok(recording)
    }

    /// Check frame dimensions and timestamp order
    ///
    /// # Errors
    ///
    /// Returns `Error::ReplayError` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::ReplayError("Recording frame dimensions must be non-zero".to_string()));
        }
        if let Some(pair) = self.frames.windows(2).find(|w| w[1].timestamp_ms < w[0].timestamp_ms) {
            return Err(Error::ReplayError(format!(
                "Frame at {} ms follows frame at {} ms",
                pair[1].timestamp_ms, pair[0].timestamp_ms
            )));
        }
        Ok(())
    }

    /// Feed every frame through `session` in order
    pub fn replay(&self, session: &mut TrackingSession) -> Vec<FrameOutcome> {
        let mut detector = ReplayDetector;
        self.frames
            .iter()
            .map(|frame| session.track(&mut detector, frame, self.width, self.height, frame.timestamp_ms))
            .collect()
    }
}

/// Detector that returns the pose stored in each recorded frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayDetector;

impl PoseDetector<ReplayFrame> for ReplayDetector {
    fn detect(&mut self, frame: &ReplayFrame, _width: u32, _height: u32) -> Option<RawPose> {
        frame.pose.clone()
    }
}
