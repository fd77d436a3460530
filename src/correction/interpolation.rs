//! Reconstruction of weak landmarks from anatomically related ones.

use super::Correction;
use crate::pose::{Landmark, LandmarkId, Pose};
use nalgebra::Point2;

/// Landmarks below this confidence are candidates for reconstruction
pub const INTERPOLATION_TRIGGER_CONFIDENCE: f64 = 0.5;

/// Every source must be above this confidence
pub const INTERPOLATION_SOURCE_CONFIDENCE: f64 = 0.7;

/// Interpolated confidence is the weakest source times this factor
pub const INTERPOLATION_CONFIDENCE_FACTOR: f64 = 0.8;

/// Nose sits this far above the eye line
pub const NOSE_ABOVE_EYES: f64 = 20.0;

/// Shoulders sit this far outside the hips
pub const SHOULDER_OUTSIDE_HIP: f64 = 10.0;

/// Shoulders sit this far below the nose
pub const SHOULDER_BELOW_NOSE: f64 = 80.0;

/// Landmarks that can be rebuilt, in the order they are attempted
pub const RECONSTRUCTABLE: [LandmarkId; 3] = [LandmarkId::Nose, LandmarkId::LeftShoulder, LandmarkId::RightShoulder];

/// Estimated position of `id` and the landmarks it was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub position: Point2<f64>,
    pub sources: [LandmarkId; 2],
}

impl Estimate {
    /// Lowest confidence among the sources in `pose`
    #[must_use]
    pub fn source_confidence(&self, pose: &Pose) -> f64 {
        self.sources
            .iter()
            .map(|id| pose.landmark(*id).confidence)
            .fold(f64::INFINITY, f64::min)
    }
}

/// +1 when the subject's left side has the larger x, -1 otherwise.
/// Falls back to +1 when the hips coincide.
#[must_use]
pub fn left_side_sign(pose: &Pose) -> f64 {
    let dx = pose.landmark(LandmarkId::LeftHip).x - pose.landmark(LandmarkId::RightHip).x;
    if dx < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Anatomical estimate for `id` from its related landmarks, if `id` is
/// one of [`RECONSTRUCTABLE`]
#[must_use]
pub fn estimate(pose: &Pose, id: LandmarkId) -> Option<Estimate> {
    match id {
        LandmarkId::Nose => {
            let eyes = pose.midpoint(LandmarkId::LeftEye, LandmarkId::RightEye);
            Some(Estimate {
                position: Point2::new(eyes.x, eyes.y - NOSE_ABOVE_EYES),
                sources: [LandmarkId::LeftEye, LandmarkId::RightEye],
            })
        }
        LandmarkId::LeftShoulder | LandmarkId::RightShoulder => {
            let (hip, outward) = if id == LandmarkId::LeftShoulder {
                (LandmarkId::LeftHip, left_side_sign(pose))
            } else {
                (LandmarkId::RightHip, -left_side_sign(pose))
            };
            let nose = pose.landmark(LandmarkId::Nose);
            Some(Estimate {
                position: Point2::new(
                    pose.landmark(hip).x + outward * SHOULDER_OUTSIDE_HIP,
                    nose.y + SHOULDER_BELOW_NOSE,
                ),
                sources: [hip, LandmarkId::Nose],
            })
        }
        _ => None,
    }
}

/// Rebuild weak landmarks whose sources are confident. A landmark whose
/// sources are not confident enough is left unchanged.
pub fn interpolate_missing(pose: &mut Pose) -> Vec<Correction> {
    let mut corrections = Vec::new();

    for id in RECONSTRUCTABLE {
        if pose.landmark(id).confidence >= INTERPOLATION_TRIGGER_CONFIDENCE {
            continue;
        }
        let Some(estimate) = estimate(pose, id) else {
            continue;
        };
        let source_confidence = estimate.source_confidence(pose);
        if source_confidence <= INTERPOLATION_SOURCE_CONFIDENCE {
            continue;
        }

        let z = pose.landmark(id).z;
        let mut landmark = Landmark::new(
            estimate.position.x,
            estimate.position.y,
            source_confidence * INTERPOLATION_CONFIDENCE_FACTOR,
        );
        landmark.z = z;
        pose.set_landmark(id, landmark);
        corrections.push(Correction::Interpolated { landmark: id });
    }

    corrections
}
