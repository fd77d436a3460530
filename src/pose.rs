//! Landmark and pose data model.
//!
//! A [`Pose`] always holds all 17 landmarks. A landmark the detector did
//! not see is kept with a low confidence instead of being dropped, so every
//! stage can iterate [`LandmarkId::ALL`] without special cases.

use crate::constants::NUM_LANDMARKS;
use crate::geometry::Bounds;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Identifier of one of the 17 body landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum LandmarkId {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl LandmarkId {
    /// Every landmark, in index order
    pub const ALL: [LandmarkId; NUM_LANDMARKS] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Left/right pairs checked by symmetry correction
    pub const SYMMETRIC_PAIRS: [(LandmarkId, LandmarkId); 8] = [
        (Self::LeftShoulder, Self::RightShoulder),
        (Self::LeftHip, Self::RightHip),
        (Self::LeftKnee, Self::RightKnee),
        (Self::LeftAnkle, Self::RightAnkle),
        (Self::LeftElbow, Self::RightElbow),
        (Self::LeftWrist, Self::RightWrist),
        (Self::LeftEar, Self::RightEar),
        (Self::LeftEye, Self::RightEye),
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl std::fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single anatomical keypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
}

impl Landmark {
    /// Create a 2D landmark; confidence is clamped to [0, 1]
    #[must_use]
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            confidence: clamp_confidence(confidence),
        }
    }

    #[must_use]
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Placeholder for a landmark the detector did not report
    #[must_use]
    pub fn missing() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[must_use]
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }

    #[must_use]
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Planar distance to another landmark
    #[must_use]
    pub fn distance(&self, other: &Landmark) -> f64 {
        nalgebra::distance(&self.point(), &other.point())
    }

    /// Multiply confidence by `factor`, keeping it in [0, 1]
    pub fn discount(&mut self, factor: f64) {
        self.confidence = clamp_confidence(self.confidence * factor);
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::missing()
    }
}

/// Clamp a confidence into [0, 1], mapping NaN to 0
#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Full-body pose: 17 landmarks, overall confidence and a timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub landmarks: [Landmark; NUM_LANDMARKS],
    /// Overall confidence in [0, 1]
    pub confidence: f64,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl Pose {
    #[must_use]
    pub fn new(landmarks: [Landmark; NUM_LANDMARKS], confidence: f64, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            confidence: clamp_confidence(confidence),
            timestamp_ms,
        }
    }

    #[must_use]
    pub fn landmark(&self, id: LandmarkId) -> &Landmark {
        &self.landmarks[id.index()]
    }

    pub fn landmark_mut(&mut self, id: LandmarkId) -> &mut Landmark {
        &mut self.landmarks[id.index()]
    }

    pub fn set_landmark(&mut self, id: LandmarkId, landmark: Landmark) {
        self.landmarks[id.index()] = landmark;
    }

    /// Iterate `(id, landmark)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkId, &Landmark)> {
        LandmarkId::ALL.iter().map(move |&id| (id, self.landmark(id)))
    }

    /// Number of landmarks with confidence above `threshold`
    #[must_use]
    pub fn confident_count(&self, threshold: f64) -> usize {
        self.landmarks.iter().filter(|l| l.is_visible(threshold)).count()
    }

    /// Mean confidence over all 17 landmarks
    #[must_use]
    pub fn mean_confidence(&self) -> f64 {
        self.landmarks.iter().map(|l| l.confidence).sum::<f64>() / NUM_LANDMARKS as f64
    }

    /// Midpoint of a left/right landmark pair
    #[must_use]
    pub fn midpoint(&self, a: LandmarkId, b: LandmarkId) -> Point2<f64> {
        nalgebra::center(&self.landmark(a).point(), &self.landmark(b).point())
    }

    /// Horizontal distance between two landmarks
    #[must_use]
    pub fn horizontal_span(&self, a: LandmarkId, b: LandmarkId) -> f64 {
        (self.landmark(a).x - self.landmark(b).x).abs()
    }

    #[must_use]
    pub fn shoulder_width(&self) -> f64 {
        self.horizontal_span(LandmarkId::LeftShoulder, LandmarkId::RightShoulder)
    }

    #[must_use]
    pub fn hip_width(&self) -> f64 {
        self.horizontal_span(LandmarkId::LeftHip, LandmarkId::RightHip)
    }

    #[must_use]
    pub fn shoulder_center_y(&self) -> f64 {
        self.midpoint(LandmarkId::LeftShoulder, LandmarkId::RightShoulder).y
    }

    #[must_use]
    pub fn hip_center_y(&self) -> f64 {
        self.midpoint(LandmarkId::LeftHip, LandmarkId::RightHip).y
    }

    /// Vertical distance between the shoulder line and the hip line
    #[must_use]
    pub fn torso_height(&self) -> f64 {
        (self.hip_center_y() - self.shoulder_center_y()).abs()
    }

    /// hip→knee + knee→ankle for one side
    #[must_use]
    pub fn leg_length(&self, hip: LandmarkId, knee: LandmarkId, ankle: LandmarkId) -> f64 {
        self.landmark(hip).distance(self.landmark(knee)) + self.landmark(knee).distance(self.landmark(ankle))
    }

    #[must_use]
    pub fn left_leg_length(&self) -> f64 {
        self.leg_length(LandmarkId::LeftHip, LandmarkId::LeftKnee, LandmarkId::LeftAnkle)
    }

    #[must_use]
    pub fn right_leg_length(&self) -> f64 {
        self.leg_length(LandmarkId::RightHip, LandmarkId::RightKnee, LandmarkId::RightAnkle)
    }

    /// Bounding box of landmarks with confidence above `threshold`
    #[must_use]
    pub fn bounding_box(&self, threshold: f64) -> Option<Bounds> {
        Bounds::enclosing(
            self.landmarks
                .iter()
                .filter(|l| l.is_visible(threshold))
                .map(Landmark::point),
        )
    }

    /// Average planar displacement of every landmark relative to `other`
    #[must_use]
    pub fn mean_displacement(&self, other: &Pose) -> f64 {
        self.landmarks
            .iter()
            .zip(other.landmarks.iter())
            .map(|(a, b)| a.distance(b))
            .sum::<f64>()
            / NUM_LANDMARKS as f64
    }
}

/// One keypoint as reported by a detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub id: LandmarkId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(alias = "score")]
    pub confidence: f64,
}

/// Unvalidated detector output, possibly partial or noisy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPose {
    pub keypoints: Vec<RawKeypoint>,
    /// Detector-level score, if the model provides one
    #[serde(default)]
    pub score: Option<f64>,
}

impl RawPose {
    /// Normalize into a full [`Pose`].
    ///
    /// Absent ids become zero-confidence landmarks at the origin, duplicate
    /// ids keep the most confident report, and non-finite coordinates are
    /// treated as absent.
    #[must_use]
    pub fn into_pose(self, timestamp_ms: u64) -> Pose {
        let mut landmarks = [Landmark::missing(); NUM_LANDMARKS];
        let mut seen = [false; NUM_LANDMARKS];
        let mut discarded = 0usize;

        for kp in &self.keypoints {
            let landmark = Landmark {
                x: kp.x,
                y: kp.y,
                z: kp.z.filter(|z| z.is_finite()),
                confidence: clamp_confidence(kp.confidence),
            };
            if !landmark.is_finite() {
                discarded += 1;
                continue;
            }
            let slot = kp.id.index();
            if !seen[slot] || landmark.confidence > landmarks[slot].confidence {
                landmarks[slot] = landmark;
                seen[slot] = true;
            }
        }

        if discarded > 0 {
            log::warn!("Discarded {} non-finite keypoints from detector output", discarded);
        }

        let mean = landmarks.iter().map(|l| l.confidence).sum::<f64>() / NUM_LANDMARKS as f64;
        let confidence = match self.score {
            Some(score) if score.is_finite() => score,
            _ => mean,
        };

        Pose::new(landmarks, confidence, timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_id_indices() {
        for (i, id) in LandmarkId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(LandmarkId::from_index(i), Some(*id));
        }
        assert_eq!(LandmarkId::from_index(17), None);
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(Landmark::new(0.0, 0.0, 1.7).confidence, 1.0);
        assert_eq!(Landmark::new(0.0, 0.0, -0.2).confidence, 0.0);
        assert_eq!(Landmark::new(0.0, 0.0, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_raw_pose_fills_missing_landmarks() {
        let raw = RawPose {
            keypoints: vec![RawKeypoint {
                id: LandmarkId::Nose,
                x: 10.0,
                y: 20.0,
                z: None,
                confidence: 0.9,
            }],
            score: None,
        };
        let pose = raw.into_pose(42);
        assert_eq!(pose.timestamp_ms, 42);
        assert_eq!(pose.landmark(LandmarkId::Nose).x, 10.0);
        assert_eq!(pose.landmark(LandmarkId::LeftAnkle).confidence, 0.0);
        assert!((pose.confidence - 0.9 / 17.0).abs() < 1e-12);
    }

    #[test]
    fn test_raw_pose_drops_non_finite_and_keeps_best_duplicate() {
        let kp = |x: f64, confidence: f64| RawKeypoint {
            id: LandmarkId::LeftHip,
            x,
            y: 5.0,
            z: None,
            confidence,
        };
        let raw = RawPose {
            keypoints: vec![kp(1.0, 0.4), kp(f64::NAN, 0.99), kp(2.0, 0.8), kp(3.0, 0.5)],
            score: Some(1.4),
        };
        let pose = raw.into_pose(0);
        let hip = pose.landmark(LandmarkId::LeftHip);
        assert_eq!(hip.x, 2.0);
        assert_eq!(hip.confidence, 0.8);
        assert_eq!(pose.confidence, 1.0);
    }

    #[test]
    fn test_widths_are_horizontal() {
        let mut pose = Pose::new([Landmark::new(0.0, 0.0, 1.0); NUM_LANDMARKS], 1.0, 0);
        pose.set_landmark(LandmarkId::LeftShoulder, Landmark::new(150.0, 100.0, 1.0));
        pose.set_landmark(LandmarkId::RightShoulder, Landmark::new(50.0, 130.0, 1.0));
        assert_eq!(pose.shoulder_width(), 100.0);
    }
}
