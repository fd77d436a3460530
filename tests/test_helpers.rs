//! Helper functions and utilities for tests

#![allow(dead_code)]

use pose_stabilization::constants::NUM_LANDMARKS;
use pose_stabilization::pose::{Landmark, LandmarkId, Pose, RawKeypoint, RawPose};

/// Landmark layout of a centered upright figure in a 400x600 frame:
/// shoulders 100 wide at y=150, hips 80 wide at y=300, ankles at y=475
pub const UPRIGHT: [(LandmarkId, f64, f64); NUM_LANDMARKS] = [
    (LandmarkId::Nose, 200.0, 100.0),
    (LandmarkId::LeftEye, 210.0, 90.0),
    (LandmarkId::RightEye, 190.0, 90.0),
    (LandmarkId::LeftEar, 220.0, 95.0),
    (LandmarkId::RightEar, 180.0, 95.0),
    (LandmarkId::LeftShoulder, 250.0, 150.0),
    (LandmarkId::RightShoulder, 150.0, 150.0),
    (LandmarkId::LeftElbow, 260.0, 220.0),
    (LandmarkId::RightElbow, 140.0, 220.0),
    (LandmarkId::LeftWrist, 265.0, 290.0),
    (LandmarkId::RightWrist, 135.0, 290.0),
    (LandmarkId::LeftHip, 240.0, 300.0),
    (LandmarkId::RightHip, 160.0, 300.0),
    (LandmarkId::LeftKnee, 240.0, 400.0),
    (LandmarkId::RightKnee, 160.0, 400.0),
    (LandmarkId::LeftAnkle, 240.0, 475.0),
    (LandmarkId::RightAnkle, 160.0, 475.0),
];

/// Upright figure with every landmark at `confidence`
pub fn upright_pose(confidence: f64, timestamp_ms: u64) -> Pose {
    let mut landmarks = [Landmark::missing(); NUM_LANDMARKS];
    for (id, x, y) in UPRIGHT {
        landmarks[id.index()] = Landmark::new(x, y, confidence);
    }
    Pose::new(landmarks, confidence, timestamp_ms)
}

/// Upright figure shifted horizontally by `dx`
pub fn shifted_pose(dx: f64, confidence: f64, timestamp_ms: u64) -> Pose {
    let mut pose = upright_pose(confidence, timestamp_ms);
    for landmark in &mut pose.landmarks {
        landmark.x += dx;
    }
    pose
}

/// Detector output for the upright figure shifted by `dx`
pub fn raw_upright(dx: f64, confidence: f64) -> RawPose {
    RawPose {
        keypoints: UPRIGHT
            .iter()
            .map(|&(id, x, y)| RawKeypoint {
                id,
                x: x + dx,
                y,
                z: None,
                confidence,
            })
            .collect(),
        score: Some(confidence),
    }
}

/// Assert every coordinate and confidence of `pose` is finite and every
/// confidence lies in [0, 1]
pub fn assert_pose_sane(pose: &Pose) {
    assert!((0.0..=1.0).contains(&pose.confidence), "pose confidence {}", pose.confidence);
    for (id, landmark) in pose.iter() {
        assert!(landmark.is_finite(), "{id} is not finite: {landmark:?}");
        assert!(
            (0.0..=1.0).contains(&landmark.confidence),
            "{id} confidence {}",
            landmark.confidence
        );
    }
}
