//! End-to-end scenarios through `TrackingSession`

mod test_helpers;

use pose_stabilization::config::Config;
use pose_stabilization::correction::Correction;
use pose_stabilization::geometry::Bounds;
use pose_stabilization::pose::{LandmarkId, RawPose};
use pose_stabilization::recovery::TrackingState;
use pose_stabilization::replay::{Recording, ReplayFrame};
use pose_stabilization::segmentation::{GarmentCategory, SegmentId};
use pose_stabilization::session::{PoseSource, TrackingSession};
use pose_stabilization::validation::ValidationIssue;
use test_helpers::{assert_pose_sane, raw_upright};

#[test]
fn test_six_landmarks_score_zero() {
    let mut raw = raw_upright(0.0, 0.9);
    raw.keypoints.truncate(6);

    let mut session = TrackingSession::default();
    let outcome = session.process_frame(Some(raw), 400, 600, 0);

    assert_eq!(outcome.source, Some(PoseSource::Detected));
    assert_eq!(outcome.confidence, 0.0);
    assert!(!outcome.renderable);
    let validation = outcome.validation.unwrap();
    assert!(!validation.is_valid);
    assert!(validation.has_issue(ValidationIssue::InsufficientLandmarks));
    assert_eq!(outcome.tracking_state, TrackingState::Lost);
    assert!(session.recovery().last_valid_pose().is_none());
}

#[test]
fn test_narrow_hips_are_corrected_in_session() {
    let mut raw = raw_upright(0.0, 0.9);
    for kp in &mut raw.keypoints {
        match kp.id {
            LandmarkId::LeftHip => kp.x = 220.0,
            LandmarkId::RightHip => kp.x = 180.0,
            _ => {}
        }
    }

    let mut session = TrackingSession::default();
    let outcome = session.process_frame(Some(raw), 400, 600, 0);

    assert!(outcome
        .corrections
        .iter()
        .any(|c| matches!(c, Correction::ShoulderHipRatio { .. })));
    let pose = outcome.pose.unwrap();
    assert!((pose.hip_width() - 100.0 / 1.2).abs() < 1e-6);
    assert!(outcome.renderable);
}

#[test]
fn test_sessions_are_independent() {
    let mut a = TrackingSession::default();
    let mut b = TrackingSession::default();

    for t in [0, 33, 66] {
        a.process_frame(Some(raw_upright(0.0, 0.9)), 400, 600, t);
    }
    let before = a.last_pose().cloned();

    // b loses its person entirely
    for t in [0, 600, 1200] {
        b.process_frame(None, 400, 600, t);
    }

    assert_eq!(a.last_pose().cloned(), before);
    assert_eq!(a.history().len(), 3);
    assert_eq!(a.recovery().tracking_state(), TrackingState::Tracking);
    assert_eq!(a.recovery().attempts(), 0);
    assert!(b.recovery().last_valid_pose().is_none());
    assert_eq!(b.recovery().tracking_state(), TrackingState::Lost);
}

#[test]
fn test_every_output_is_sane() {
    let mut session = TrackingSession::default();
    for i in 0..30u64 {
        let detection = (i % 4 != 3).then(|| raw_upright((i as f64 * 0.7).sin() * 15.0, 0.85));
        let outcome = session.process_frame(detection, 400, 600, i * 33);
        if let Some(pose) = &outcome.pose {
            assert_pose_sane(pose);
            assert_eq!(pose.confidence, outcome.confidence);
        }
        assert_eq!(outcome.renderable, outcome.confidence >= 0.5);
    }
}

#[test]
fn test_overlay_constraints_through_session() {
    let mut session = TrackingSession::default();
    assert!(session
        .overlay_constraints(400, 600, GarmentCategory::Tops)
        .unwrap()
        .is_none());

    session.process_frame(Some(raw_upright(0.0, 0.9)), 400, 600, 0);
    let constraints = session
        .overlay_constraints(400, 600, GarmentCategory::Tops)
        .unwrap()
        .unwrap();
    assert_eq!(constraints.category, GarmentCategory::Tops);
    assert_eq!(constraints.safe_zones.len(), 3);
    assert!(!constraints.anchor_points.is_empty());

    // a top resting on the torso stays clear of head and legs
    let report = session
        .check_overlay_conflicts(&Bounds::new(150.0, 140.0, 250.0, 280.0), 400, 600, GarmentCategory::Tops)
        .unwrap()
        .unwrap();
    assert!(!report.has_conflicts);
    assert!(report.recommended_adjustment.is_none());
    assert_eq!(session.segmentation_cache_len(), 1);

    let mask = session.segment(400, 600).unwrap().unwrap();
    assert!(mask.segment(SegmentId::Head).is_some());
}

#[test]
fn test_strict_config_rejects_low_confidence() {
    let config = Config {
        min_confidence: 0.95,
        ..Config::default()
    };
    let mut session = TrackingSession::new(config).unwrap();
    let outcome = session.process_frame(Some(raw_upright(0.0, 0.9)), 400, 600, 0);
    assert!(outcome.pose.is_some());
    assert!(!outcome.renderable);
}

#[test]
fn test_replay_matches_direct_processing() {
    let frames: Vec<ReplayFrame> = (0..8u64)
        .map(|i| ReplayFrame {
            timestamp_ms: i * 40,
            pose: (i != 5).then(|| raw_upright(i as f64 * 3.0, 0.9)),
        })
        .collect();
    let recording = Recording {
        width: 400,
        height: 600,
        frames: frames.clone(),
    };

    let mut replayed = TrackingSession::default();
    let from_replay = recording.replay(&mut replayed);

    let mut direct = TrackingSession::default();
    let from_direct: Vec<_> = frames
        .into_iter()
        .map(|f| direct.process_frame(f.pose, 400, 600, f.timestamp_ms))
        .collect();

    assert_eq!(from_replay, from_direct);
}

#[test]
fn test_closure_detector() {
    let mut session = TrackingSession::default();
    let mut calls = 0;
    let mut detector = |frame: &[u8], _w: u32, _h: u32| -> Option<RawPose> {
        calls += 1;
        (!frame.is_empty()).then(|| raw_upright(0.0, 0.9))
    };

    let frame: &[u8] = &[1, 2, 3];
    let outcome = session.track(&mut detector, frame, 400, 600, 0);
    assert_eq!(outcome.source, Some(PoseSource::Detected));
    assert_eq!(calls, 1);
}

#[test]
fn test_zero_frame_falls_back_to_configured_size() {
    let wide = Config {
        frame_width: 1920,
        frame_height: 1080,
        ..Config::default()
    };
    let mut session = TrackingSession::new(wide).unwrap();
    let outcome = session.process_frame(Some(raw_upright(0.0, 0.9)), 0, 0, 0);
    // a figure centered at x=200 is far off-center in a 1920-wide frame
    assert!(outcome.validation.unwrap().has_issue(ValidationIssue::OffCenter));
    let mask = session.segment(0, 0).unwrap().unwrap();
    assert_eq!((mask.width, mask.height), (1920, 1080));

    let mut session = TrackingSession::default();
    let outcome = session.process_frame(Some(raw_upright(0.0, 0.9)), 0, 0, 0);
    assert!(!outcome.validation.unwrap().has_issue(ValidationIssue::OffCenter));
}

#[test]
fn test_detector_score_caps_confidence() {
    let mut raw = raw_upright(0.0, 0.9);
    raw.score = Some(0.55);
    let mut session = TrackingSession::default();
    let outcome = session.process_frame(Some(raw), 400, 600, 0);
    assert_eq!(outcome.source, Some(PoseSource::Detected));
    assert!(outcome.confidence <= 0.55);
    assert_eq!(outcome.pose.unwrap().confidence, outcome.confidence);
}
