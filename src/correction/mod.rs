//! Anatomical, symmetry and temporal correction of detected poses.
//!
//! Corrections run in a fixed order: body ratios, left/right symmetry,
//! sudden-movement damping, then confidence recalculation. Reconstruction
//! of weak landmarks is a separate pass ([`interpolation`]).

/// Reconstruction of weak landmarks from related ones
pub mod interpolation;

use crate::constants::{EPSILON, VALID_LANDMARK_CONFIDENCE};
use crate::history::PoseHistory;
use crate::pose::{clamp_confidence, LandmarkId, Pose};
use crate::utils::safe_cast::safe_ratio;
use crate::validation::{PoseValidator, ValidationResult};
use std::fmt;

pub use interpolation::interpolate_missing;

/// Acceptable shoulder:hip width ratios
pub const SHOULDER_HIP_RANGE: std::ops::RangeInclusive<f64> = 0.8..=1.6;
pub const IDEAL_SHOULDER_HIP_RATIO: f64 = 1.2;

/// Acceptable torso:leg height ratios
pub const TORSO_LEG_RANGE: std::ops::RangeInclusive<f64> = 0.6..=1.2;
pub const IDEAL_TORSO_LEG_RATIO: f64 = 0.9;

/// Left/right pairs further apart vertically than this are averaged
pub const MAX_SYMMETRY_OFFSET: f64 = 30.0;

/// Largest per-frame landmark movement left undamped
pub const MAX_FRAME_MOVEMENT: f64 = 100.0;

const HIP_CORRECTION_DISCOUNT: f64 = 0.9;
const LEG_CORRECTION_DISCOUNT: f64 = 0.8;
const SYMMETRY_DISCOUNT: f64 = 0.9;
const DAMPING_DISCOUNT: f64 = 0.8;
const PENALTY_PER_CORRECTION: f64 = 0.05;
const MIN_PENALTY_MULTIPLIER: f64 = 0.3;
const VALID_POSE_BONUS: f64 = 1.1;

/// One adjustment made to a pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Hips re-spaced to the ideal shoulder:hip ratio
    ShoulderHipRatio { ratio: f64 },
    /// Knees and ankles moved to the ideal torso:leg ratio
    TorsoLegRatio { ratio: f64 },
    /// A left/right pair was levelled
    Symmetry { left: LandmarkId, right: LandmarkId, offset: f64 },
    /// A landmark's jump from the previous frame was capped
    SuddenMovement { landmark: LandmarkId, distance: f64 },
    /// A weak landmark was rebuilt from related ones
    Interpolated { landmark: LandmarkId },
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShoulderHipRatio { ratio } => {
                write!(f, "Unrealistic shoulder-to-hip ratio ({ratio:.2}) corrected")
            }
            Self::TorsoLegRatio { ratio } => write!(f, "Unrealistic torso-to-leg ratio ({ratio:.2}) corrected"),
            Self::Symmetry { left, right, offset } => {
                write!(f, "Asymmetric {left}/{right} (offset {offset:.1}) levelled")
            }
            Self::SuddenMovement { landmark, distance } => {
                write!(f, "Sudden movement of {landmark} ({distance:.1}) damped")
            }
            Self::Interpolated { landmark } => write!(f, "Interpolated missing {landmark}"),
        }
    }
}

/// Corrected pose and the log of what was changed
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    pub pose: Pose,
    pub corrections: Vec<Correction>,
    /// Validation of the corrected pose used for the confidence bonus
    pub validation: ValidationResult,
}

/// Applies anatomical corrections and recomputes confidence
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectionEngine {
    validator: PoseValidator,
}

impl CorrectionEngine {
    #[must_use]
    pub fn new(validator: PoseValidator) -> Self {
        Self { validator }
    }

    /// Correct `pose` against the most recent entry of `history`.
    ///
    /// The returned confidence is the input confidence reduced by 5% per
    /// correction (never below 30% of it); only a corrected pose that
    /// validates cleanly earns a 10% bonus, capped at 1.0.
    #[must_use]
    pub fn correct(&self, pose: &Pose, history: &PoseHistory) -> CorrectionOutcome {
        let mut corrected = pose.clone();
        let mut corrections = correct_anatomical_ratios(&mut corrected);
        corrections.extend(correct_symmetry(&mut corrected));
        if let Some(previous) = history.last() {
            corrections.extend(damp_sudden_movement(&mut corrected, previous));
        }

        #[allow(clippy::cast_precision_loss)]
        let multiplier = (1.0 - PENALTY_PER_CORRECTION * corrections.len() as f64).max(MIN_PENALTY_MULTIPLIER);
        corrected.confidence = clamp_confidence(pose.confidence * multiplier);

        let validation = self.validator.validate(&corrected, history);
        if validation.is_valid {
            corrected.confidence = (corrected.confidence * VALID_POSE_BONUS).min(1.0);
        }

        for correction in &corrections {
            log::debug!("{}", correction);
        }

        CorrectionOutcome {
            pose: corrected,
            corrections,
            validation,
        }
    }

    /// [`correct`](Self::correct) followed by missing-landmark interpolation
    #[must_use]
    pub fn correct_and_interpolate(&self, pose: &Pose, history: &PoseHistory) -> CorrectionOutcome {
        let mut outcome = self.correct(pose, history);
        let interpolated = interpolate_missing(&mut outcome.pose);
        outcome.corrections.extend(interpolated);
        outcome
    }
}

fn all_visible(pose: &Pose, ids: &[LandmarkId]) -> bool {
    ids.iter().all(|id| pose.landmark(*id).is_visible(VALID_LANDMARK_CONFIDENCE))
}

/// Bring shoulder:hip width and torso:leg height back into plausible
/// ranges. Needs visible shoulders and hips; the leg step also needs
/// visible ankles.
pub fn correct_anatomical_ratios(pose: &mut Pose) -> Vec<Correction> {
    use LandmarkId::{LeftAnkle, LeftHip, LeftKnee, LeftShoulder, RightAnkle, RightHip, RightKnee, RightShoulder};

    let mut corrections = Vec::new();
    if !all_visible(pose, &[LeftShoulder, RightShoulder, LeftHip, RightHip]) {
        return corrections;
    }

    let shoulder_width = pose.shoulder_width();
    let ratio = safe_ratio(shoulder_width, pose.hip_width());
    if shoulder_width > EPSILON && !ratio.is_some_and(|r| SHOULDER_HIP_RANGE.contains(&r)) {
        let half_width = shoulder_width / IDEAL_SHOULDER_HIP_RATIO / 2.0;
        let center_x = pose.midpoint(LeftHip, RightHip).x;
        let sign = interpolation::left_side_sign(pose);

        pose.landmark_mut(LeftHip).x = center_x + sign * half_width;
        pose.landmark_mut(RightHip).x = center_x - sign * half_width;
        pose.landmark_mut(LeftHip).discount(HIP_CORRECTION_DISCOUNT);
        pose.landmark_mut(RightHip).discount(HIP_CORRECTION_DISCOUNT);
        corrections.push(Correction::ShoulderHipRatio {
            ratio: ratio.unwrap_or(f64::INFINITY),
        });
    }

    if !all_visible(pose, &[LeftAnkle, RightAnkle]) {
        return corrections;
    }

    let torso_height = pose.torso_height();
    let hip_y = pose.hip_center_y();
    let leg_height = (pose.midpoint(LeftAnkle, RightAnkle).y - hip_y).abs();
    let ratio = safe_ratio(torso_height, leg_height);
    if torso_height > EPSILON && !ratio.is_some_and(|r| TORSO_LEG_RANGE.contains(&r)) {
        let target_leg = torso_height / IDEAL_TORSO_LEG_RATIO;
        // legs extend away from the shoulders
        let down = if hip_y >= pose.shoulder_center_y() { 1.0 } else { -1.0 };

        for (hip, knee, ankle) in [(LeftHip, LeftKnee, LeftAnkle), (RightHip, RightKnee, RightAnkle)] {
            let hip_y = pose.landmark(hip).y;
            pose.landmark_mut(knee).y = hip_y + down * target_leg / 2.0;
            pose.landmark_mut(ankle).y = hip_y + down * target_leg;
            pose.landmark_mut(knee).discount(LEG_CORRECTION_DISCOUNT);
            pose.landmark_mut(ankle).discount(LEG_CORRECTION_DISCOUNT);
        }
        corrections.push(Correction::TorsoLegRatio {
            ratio: ratio.unwrap_or(f64::INFINITY),
        });
    }

    corrections
}

/// Level every left/right pair whose vertical offset exceeds 30 units by
/// assigning both the mean y; both confidences are discounted.
pub fn correct_symmetry(pose: &mut Pose) -> Vec<Correction> {
    let mut corrections = Vec::new();
    for (left, right) in LandmarkId::SYMMETRIC_PAIRS {
        let left_y = pose.landmark(left).y;
        let right_y = pose.landmark(right).y;
        let offset = (left_y - right_y).abs();
        if offset > MAX_SYMMETRY_OFFSET {
            let mean_y = (left_y + right_y) / 2.0;
            for id in [left, right] {
                let landmark = pose.landmark_mut(id);
                landmark.y = mean_y;
                landmark.discount(SYMMETRY_DISCOUNT);
            }
            corrections.push(Correction::Symmetry { left, right, offset });
        }
    }
    corrections
}

/// Cap each landmark's movement since `previous` at 100 units, keeping its
/// direction; damped landmarks lose 20% confidence.
pub fn damp_sudden_movement(pose: &mut Pose, previous: &Pose) -> Vec<Correction> {
    let mut corrections = Vec::new();
    for id in LandmarkId::ALL {
        let prev = previous.landmark(id);
        let current = pose.landmark_mut(id);
        let distance = current.distance(prev);
        if distance > MAX_FRAME_MOVEMENT {
            let scale = MAX_FRAME_MOVEMENT / distance;
            current.x = prev.x + (current.x - prev.x) * scale;
            current.y = prev.y + (current.y - prev.y) * scale;
            if let (Some(z), Some(prev_z)) = (current.z, prev.z) {
                current.z = Some(prev_z + (z - prev_z) * scale);
            }
            current.discount(DAMPING_DISCOUNT);
            corrections.push(Correction::SuddenMovement { landmark: id, distance });
        }
    }
    corrections
}
