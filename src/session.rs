//! Per-session tracking context.
//!
//! A [`TrackingSession`] owns every piece of mutable state the pipeline
//! needs (pose history, recovery state, segmentation cache), so sessions
//! tracking different people never interfere. Frames must be fed one at a
//! time; the session performs no synchronization of its own.

use crate::config::Config;
use crate::correction::{Correction, CorrectionEngine};
use crate::detector::PoseDetector;
use crate::filters::TemporalSmoother;
use crate::geometry::Bounds;
use crate::history::PoseHistory;
use crate::pose::{Pose, RawPose};
use crate::quality::QualityScorer;
use crate::recovery::{RecoveryManager, TrackingState};
use crate::segmentation::{
    self, ConflictReport, GarmentCategory, OverlayConstraints, SegmentationEngine, SegmentationMask,
};
use crate::validation::{PoseValidator, ValidationResult};
use crate::Result;
use std::fmt;

/// Where a frame's pose came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseSource {
    Detected,
    Recovered,
}

impl fmt::Display for PoseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detected => f.write_str("detected"),
            Self::Recovered => f.write_str("recovered"),
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// Stabilized pose, `None` when neither detection nor recovery produced one
    pub pose: Option<Pose>,
    /// Composite quality of `pose`, 0 without a pose. For a detected pose
    /// it never exceeds the detector's own confidence.
    pub confidence: f64,
    /// True when `confidence` reaches the configured minimum
    pub renderable: bool,
    pub tracking_state: TrackingState,
    pub source: Option<PoseSource>,
    pub corrections: Vec<Correction>,
    /// Present when output validation is enabled and a pose was produced
    pub validation: Option<ValidationResult>,
}

impl FrameOutcome {
    fn missing(tracking_state: TrackingState) -> Self {
        Self {
            pose: None,
            confidence: 0.0,
            renderable: false,
            tracking_state,
            source: None,
            corrections: Vec::new(),
            validation: None,
        }
    }
}

/// Stabilization pipeline state for one tracked person
#[derive(Debug, Clone)]
pub struct TrackingSession {
    config: Config,
    smoother: TemporalSmoother,
    scorer: QualityScorer,
    recovery: RecoveryManager,
    segmentation: SegmentationEngine,
    last_pose: Option<Pose>,
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl TrackingSession {
    /// Create a session from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: Config) -> Self {
        Self {
            smoother: TemporalSmoother::from_config(&config),
            scorer: QualityScorer::new(),
            recovery: RecoveryManager::from_config(&config),
            segmentation: SegmentationEngine::default(),
            last_pose: None,
            config,
        }
    }

    /// Run the detector on `frame` and process its output
    pub fn track<F, D>(&mut self, detector: &mut D, frame: &F, width: u32, height: u32, now_ms: u64) -> FrameOutcome
    where
        F: ?Sized,
        D: PoseDetector<F> + ?Sized,
    {
        let detection = detector.detect(frame, width, height);
        self.process_frame(detection, width, height, now_ms)
    }

    /// Process one frame's detector output.
    ///
    /// A missing or low-confidence detection triggers recovery while
    /// recovery attempts remain. A low-confidence detection is still
    /// carried through the pipeline when recovery yields nothing, but it
    /// never counts as tracking: the session reports `Lost` and the
    /// recovery attempt count is left alone.
    ///
    /// A zero `width` or `height` selects the configured frame size.
    pub fn process_frame(&mut self, detection: Option<RawPose>, width: u32, height: u32, now_ms: u64) -> FrameOutcome {
        let (width, height) = self.frame_size(width, height);
        let mut candidate = detection.map(|raw| raw.into_pose(now_ms));
        let mut source = PoseSource::Detected;

        let detection_confidence = candidate.as_ref().map(|pose| pose.confidence);
        let needs_recovery = detection_confidence.map_or(true, |c| c < self.config.min_confidence);
        if needs_recovery {
            if self.recovery.should_attempt_recovery() {
                if let Some(recovered) = self.recovery.recover_pose(self.smoother.history(), width, height, now_ms) {
                    candidate = Some(recovered);
                    source = PoseSource::Recovered;
                }
            } else {
                log::debug!("Recovery attempts exhausted, skipping recovery at {} ms", now_ms);
            }
        }

        let Some(pose) = candidate else {
            self.recovery.mark_lost();
            return FrameOutcome::missing(self.recovery.tracking_state());
        };

        let validator = PoseValidator::new(width, height);
        let corrected = CorrectionEngine::new(validator).correct_and_interpolate(&pose, self.smoother.history());
        let prior_history = self.config.validate_output.then(|| self.smoother.history().clone());

        let mut stabilized = self.smoother.apply(corrected.pose);
        let mut confidence = self.scorer.score(&stabilized, self.smoother.history());
        if source == PoseSource::Detected {
            if let Some(detected) = detection_confidence {
                confidence = confidence.min(detected);
            }
        }
        stabilized.confidence = confidence;

        let validation = prior_history.map(|history| validator.validate(&stabilized, &history));

        if source == PoseSource::Detected {
            if needs_recovery {
                log::debug!("Carrying low-confidence detection at {} ms", now_ms);
                self.recovery.mark_lost();
            } else if !self.recovery.record_detection(&stabilized, confidence) {
                self.recovery.mark_lost();
            }
        }

        let renderable = confidence >= self.config.min_confidence;
        log::debug!(
            "Frame {} ms: {} pose, confidence {:.2}, {} corrections",
            now_ms,
            source,
            confidence,
            corrected.corrections.len()
        );

        self.last_pose = Some(stabilized.clone());
        FrameOutcome {
            pose: Some(stabilized),
            confidence,
            renderable,
            tracking_state: self.recovery.tracking_state(),
            source: Some(source),
            corrections: corrected.corrections,
            validation,
        }
    }

    fn frame_size(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            (self.config.frame_width, self.config.frame_height)
        } else {
            (width, height)
        }
    }

    /// Segmentation mask of the latest stabilized pose. A zero `width` or
    /// `height` selects the configured frame size.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the frame is too large to rasterize
    pub fn segment(&mut self, width: u32, height: u32) -> Result<Option<&SegmentationMask>> {
        let (width, height) = self.frame_size(width, height);
        let Some(pose) = self.last_pose.as_ref() else {
            return Ok(None);
        };
        self.segmentation.segment(pose, width, height).map(Some)
    }

    /// Overlay constraints for the latest stabilized pose
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the frame is too large to rasterize
    pub fn overlay_constraints(
        &mut self,
        width: u32,
        height: u32,
        category: GarmentCategory,
    ) -> Result<Option<OverlayConstraints>> {
        Ok(self
            .segment(width, height)?
            .map(|mask| segmentation::get_overlay_constraints(mask, category)))
    }

    /// Check `overlay` against the avoid zones of the latest stabilized pose
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the frame is too large to rasterize
    pub fn check_overlay_conflicts(
        &mut self,
        overlay: &Bounds,
        width: u32,
        height: u32,
        category: GarmentCategory,
    ) -> Result<Option<ConflictReport>> {
        Ok(self
            .segment(width, height)?
            .map(|mask| segmentation::check_overlay_conflicts(overlay, mask, category)))
    }

    /// Drop history, recovery state and cached masks
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.recovery.reset();
        self.segmentation.clear_cache();
        self.last_pose = None;
        log::info!("Tracking session reset");
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &PoseHistory {
        self.smoother.history()
    }

    #[must_use]
    pub fn recovery(&self) -> &RecoveryManager {
        &self.recovery
    }

    #[must_use]
    pub fn last_pose(&self) -> Option<&Pose> {
        self.last_pose.as_ref()
    }

    #[must_use]
    pub fn segmentation_cache_len(&self) -> usize {
        self.segmentation.cache_len()
    }
}
