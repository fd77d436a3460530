//! Composite pose confidence from anatomical, temporal and spatial cues.
//!
//! `0.4 * avg confidence + 0.3 * anatomy + 0.2 * stability + 0.1 * coherence`

use crate::constants::{
    DEFAULT_ANATOMICAL_SCORE, MIN_VALID_LANDMARKS, NEUTRAL_TEMPORAL_SCORE, STABILITY_MOVEMENT_SCALE,
    VALID_LANDMARK_CONFIDENCE, VELOCITY_SAMPLE_COUNT,
};
use crate::history::PoseHistory;
use crate::motion::average_displacement;
use crate::pose::{LandmarkId, Pose};
use crate::utils::safe_cast::safe_ratio;
use crate::utils::unit_score;

const CONFIDENCE_WEIGHT: f64 = 0.4;
const ANATOMY_WEIGHT: f64 = 0.3;
const STABILITY_WEIGHT: f64 = 0.2;
const COHERENCE_WEIGHT: f64 = 0.1;

/// Breakdown of a quality score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    /// Composite confidence in [0, 1]
    pub confidence: f64,
    /// Mean confidence of the visible landmarks
    pub average_confidence: f64,
    pub anatomical_consistency: f64,
    pub temporal_stability: f64,
    pub spatial_coherence: f64,
}

impl QualityReport {
    fn insufficient() -> Self {
        Self {
            confidence: 0.0,
            average_confidence: 0.0,
            anatomical_consistency: 0.0,
            temporal_stability: 0.0,
            spatial_coherence: 0.0,
        }
    }
}

/// Scores a pose against body proportions and its recent history
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Composite confidence of `pose`; 0 when fewer than 8 landmarks are visible
    #[must_use]
    pub fn score(&self, pose: &Pose, history: &PoseHistory) -> f64 {
        self.evaluate(pose, history).confidence
    }

    /// Full breakdown of the composite confidence
    #[must_use]
    pub fn evaluate(&self, pose: &Pose, history: &PoseHistory) -> QualityReport {
        if pose.confident_count(VALID_LANDMARK_CONFIDENCE) < MIN_VALID_LANDMARKS {
            return QualityReport::insufficient();
        }

        let average_confidence = visible_mean_confidence(pose);
        let anatomical_consistency = anatomical_consistency(pose);
        let temporal_stability = temporal_stability(history);
        let spatial_coherence = spatial_coherence(pose);

        let composite = CONFIDENCE_WEIGHT * average_confidence
            + ANATOMY_WEIGHT * anatomical_consistency
            + STABILITY_WEIGHT * temporal_stability
            + COHERENCE_WEIGHT * spatial_coherence;

        QualityReport {
            confidence: unit_score(composite, 0.0),
            average_confidence,
            anatomical_consistency,
            temporal_stability,
            spatial_coherence,
        }
    }
}

fn visible_mean_confidence(pose: &Pose) -> f64 {
    let visible: Vec<f64> = pose
        .landmarks
        .iter()
        .filter(|l| l.is_visible(VALID_LANDMARK_CONFIDENCE))
        .map(|l| l.confidence)
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let mean = safe_ratio(visible.iter().sum(), visible.len() as f64).unwrap_or(0.0);
    unit_score(mean, 0.0)
}

/// Body-proportion plausibility, 0.3 when the geometry is degenerate
#[must_use]
pub fn anatomical_consistency(pose: &Pose) -> f64 {
    unit_score(
        try_anatomical_consistency(pose).unwrap_or(DEFAULT_ANATOMICAL_SCORE),
        DEFAULT_ANATOMICAL_SCORE,
    )
}

fn try_anatomical_consistency(pose: &Pose) -> Option<f64> {
    let width_ratio = safe_ratio(pose.shoulder_width(), pose.hip_width())?;
    let torso_height = pose.torso_height();
    let left_leg = pose.left_leg_length();
    let right_leg = pose.right_leg_length();
    let asymmetry = safe_ratio((left_leg - right_leg).abs(), left_leg.max(right_leg))?;

    let mut score = 0.0;

    score += if (0.7..=1.6).contains(&width_ratio) {
        0.4
    } else if (0.5..=2.0).contains(&width_ratio) {
        0.2
    } else {
        0.0
    };

    score += if (80.0..=600.0).contains(&torso_height) {
        0.4
    } else if (50.0..=800.0).contains(&torso_height) {
        0.2
    } else {
        0.0
    };

    score += 0.2 * (1.0 - asymmetry);

    score.is_finite().then_some(score)
}

/// Stability of the last three history entries; 0.5 with fewer than two
#[must_use]
pub fn temporal_stability(history: &PoseHistory) -> f64 {
    match average_displacement(history, VELOCITY_SAMPLE_COUNT) {
        Some(movement) => unit_score(1.0 - movement / STABILITY_MOVEMENT_SCALE, NEUTRAL_TEMPORAL_SCORE),
        None => NEUTRAL_TEMPORAL_SCORE,
    }
}

fn alignment_score(dy: f64) -> f64 {
    if dy < 20.0 {
        1.0
    } else {
        (1.0 - dy / 50.0).max(0.0)
    }
}

/// Left/right alignment and vertical ordering of the torso and legs
#[must_use]
pub fn spatial_coherence(pose: &Pose) -> f64 {
    let shoulder_dy =
        (pose.landmark(LandmarkId::LeftShoulder).y - pose.landmark(LandmarkId::RightShoulder).y).abs();
    let hip_dy = (pose.landmark(LandmarkId::LeftHip).y - pose.landmark(LandmarkId::RightHip).y).abs();

    let hip_y = pose.hip_center_y();
    let shoulders_above_hips = pose.shoulder_center_y() < hip_y;
    let knees_below_hips = pose.midpoint(LandmarkId::LeftKnee, LandmarkId::RightKnee).y > hip_y;

    let score = 0.3 * alignment_score(shoulder_dy)
        + 0.3 * alignment_score(hip_dy)
        + 0.2 * if shoulders_above_hips { 1.0 } else { 0.3 }
        + 0.2 * if knees_below_hips { 1.0 } else { 0.5 };

    unit_score(score, 0.0)
}
