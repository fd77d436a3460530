//! Tracking-loss recovery.
//!
//! A two-state machine (`Tracking` / `Lost`) that, when live detection
//! fails, tries predictive extrapolation, then reconstruction from the last
//! valid pose, then a synthetic neutral pose. Attempts are rate limited and
//! counted; after `max_recovery_attempts` consecutive failures the caller
//! should report tracking as lost instead of guessing further.

use crate::config::Config;
use crate::constants::{EPSILON, NUM_LANDMARKS, RECOVERY_ACCEPT_QUALITY};
use crate::correction::interpolation;
use crate::history::PoseHistory;
use crate::motion::landmark_velocities;
use crate::pose::{Landmark, LandmarkId, Pose};
use crate::quality::QualityScorer;
use std::fmt;

const PREDICTIVE_CONFIDENCE_FACTOR: f64 = 0.7;
const EXTRAPOLATED_CONFIDENCE_FACTOR: f64 = 0.8;
const NEIGHBOR_CONFIDENCE_FACTOR: f64 = 0.5;
const NEIGHBOR_SOURCE_CONFIDENCE: f64 = 0.5;
const REGENERATED_NOSE_CONFIDENCE: f64 = 0.4;
const REGENERATED_SHOULDER_CONFIDENCE: f64 = 0.3;

const FALLBACK_TORSO_CONFIDENCE: f64 = 0.2;
const FALLBACK_LIMB_CONFIDENCE: f64 = 0.1;
const FALLBACK_POSE_CONFIDENCE: f64 = 0.15;

/// Whether the last frame produced a usable pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Tracking,
    Lost,
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracking => f.write_str("tracking"),
            Self::Lost => f.write_str("lost"),
        }
    }
}

/// Recovery strategies, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Extrapolate the last valid pose along recent landmark velocities
    Predictive,
    /// Reuse the last valid pose and rebuild weak landmarks
    NeighborReconstruction,
    /// Synthetic neutral pose centered in the frame
    Fallback,
}

impl RecoveryStrategy {
    pub const ORDER: [RecoveryStrategy; 3] = [Self::Predictive, Self::NeighborReconstruction, Self::Fallback];
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predictive => f.write_str("predictive"),
            Self::NeighborReconstruction => f.write_str("neighbor reconstruction"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// State owned by the recovery manager
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryState {
    pub last_valid_pose: Option<Pose>,
    /// Consecutive failed recoveries
    pub recovery_attempts: u32,
    pub max_recovery_attempts: u32,
    pub recovery_cooldown_ms: u32,
    /// Time of the last recovery attempt that was not rate limited
    pub last_recovery_ms: Option<u64>,
}

impl RecoveryState {
    fn new(max_recovery_attempts: u32, recovery_cooldown_ms: u32) -> Self {
        Self {
            last_valid_pose: None,
            recovery_attempts: 0,
            max_recovery_attempts,
            recovery_cooldown_ms,
            last_recovery_ms: None,
        }
    }
}

/// Recovery state machine
#[derive(Debug, Clone)]
pub struct RecoveryManager {
    state: RecoveryState,
    tracking: TrackingState,
    last_strategy: Option<RecoveryStrategy>,
    scorer: QualityScorer,
}

impl RecoveryManager {
    #[must_use]
    pub fn new(max_recovery_attempts: u32, recovery_cooldown_ms: u32) -> Self {
        Self {
            state: RecoveryState::new(max_recovery_attempts, recovery_cooldown_ms),
            tracking: TrackingState::Lost,
            last_strategy: None,
            scorer: QualityScorer::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_recovery_attempts, config.recovery_cooldown_ms)
    }

    /// Try to produce a pose for a frame without a usable detection.
    ///
    /// Returns `None` when called within the cooldown of the previous
    /// attempt (the call is not counted) or when every strategy fails
    /// (the call is counted). Without any previous valid pose the
    /// synthetic fallback is returned as is.
    pub fn recover_pose(&mut self, history: &PoseHistory, width: u32, height: u32, now_ms: u64) -> Option<Pose> {
        if let Some(last) = self.state.last_recovery_ms {
            if now_ms.saturating_sub(last) < u64::from(self.state.recovery_cooldown_ms) {
                log::debug!("Recovery rate limited ({} ms since last attempt)", now_ms.saturating_sub(last));
                return None;
            }
        }
        self.state.last_recovery_ms = Some(now_ms);

        let Some(last_valid) = self.state.last_valid_pose.clone() else {
            log::debug!("No previous pose, using fallback layout");
            self.last_strategy = Some(RecoveryStrategy::Fallback);
            return Some(fallback_pose(width, height, now_ms));
        };

        for strategy in RecoveryStrategy::ORDER {
            let candidate = match strategy {
                RecoveryStrategy::Predictive => predict_pose(&last_valid, history, now_ms),
                RecoveryStrategy::NeighborReconstruction => Some(reconstruct_from_neighbors(&last_valid, now_ms)),
                RecoveryStrategy::Fallback => Some(fallback_pose(width, height, now_ms)),
            };
            let Some(candidate) = candidate else {
                log::trace!("{} recovery not applicable", strategy);
                continue;
            };

            let quality = self.scorer.score(&candidate, history);
            if quality > RECOVERY_ACCEPT_QUALITY {
                log::debug!("Recovered pose via {} (quality {:.2})", strategy, quality);
                self.accept(candidate.clone());
                self.last_strategy = Some(strategy);
                return Some(candidate);
            }
            log::debug!("{} recovery rejected (quality {:.2})", strategy, quality);
        }

        self.state.recovery_attempts += 1;
        if self.state.recovery_attempts == self.state.max_recovery_attempts {
            log::info!("Recovery exhausted after {} attempts", self.state.recovery_attempts);
        }
        None
    }

    /// Record a live detection. Poses scoring above the acceptance
    /// threshold become the last valid pose and resume tracking.
    pub fn record_detection(&mut self, pose: &Pose, quality: f64) -> bool {
        if quality > RECOVERY_ACCEPT_QUALITY {
            self.accept(pose.clone());
            true
        } else {
            false
        }
    }

    /// Record a frame without a usable pose
    pub fn mark_lost(&mut self) {
        if self.tracking == TrackingState::Tracking {
            log::info!("Tracking lost");
        }
        self.tracking = TrackingState::Lost;
    }

    /// False once `max_recovery_attempts` consecutive recoveries failed
    #[must_use]
    pub fn should_attempt_recovery(&self) -> bool {
        self.state.recovery_attempts < self.state.max_recovery_attempts
    }

    #[must_use]
    pub fn tracking_state(&self) -> TrackingState {
        self.tracking
    }

    /// Strategy of the most recent recovered pose
    #[must_use]
    pub fn last_strategy(&self) -> Option<RecoveryStrategy> {
        self.last_strategy
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.state.recovery_attempts
    }

    #[must_use]
    pub fn last_valid_pose(&self) -> Option<&Pose> {
        self.state.last_valid_pose.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = RecoveryState::new(self.state.max_recovery_attempts, self.state.recovery_cooldown_ms);
        self.tracking = TrackingState::Lost;
        self.last_strategy = None;
    }

    fn accept(&mut self, pose: Pose) {
        if self.tracking == TrackingState::Lost {
            log::info!("Tracking acquired");
        }
        self.state.recovery_attempts = 0;
        self.state.last_valid_pose = Some(pose);
        self.tracking = TrackingState::Tracking;
    }
}

/// Move every landmark of `last_valid` along its recent velocity for the
/// time elapsed since it was seen. Needs two history entries.
#[must_use]
pub fn predict_pose(last_valid: &Pose, history: &PoseHistory, now_ms: u64) -> Option<Pose> {
    if history.len() < 2 {
        return None;
    }
    let velocities = landmark_velocities(history);
    #[allow(clippy::cast_precision_loss)]
    let elapsed = now_ms.saturating_sub(last_valid.timestamp_ms) as f64 / 1000.0;

    let mut pose = last_valid.clone();
    pose.timestamp_ms = now_ms;
    pose.confidence = last_valid.confidence * PREDICTIVE_CONFIDENCE_FACTOR;

    for (landmark, velocity) in pose.landmarks.iter_mut().zip(velocities.iter()) {
        landmark.discount(PREDICTIVE_CONFIDENCE_FACTOR);
        let shift = *velocity * elapsed;
        if shift.norm() > EPSILON {
            landmark.x += shift.x;
            landmark.y += shift.y;
            landmark.discount(EXTRAPOLATED_CONFIDENCE_FACTOR);
        }
    }
    Some(pose)
}

/// Reuse `last_valid` at half confidence, rebuilding the nose and shoulders
/// from confident neighbours where the copy is weaker than the rebuild
#[must_use]
pub fn reconstruct_from_neighbors(last_valid: &Pose, now_ms: u64) -> Pose {
    let mut pose = last_valid.clone();
    pose.timestamp_ms = now_ms;
    pose.confidence = last_valid.confidence * NEIGHBOR_CONFIDENCE_FACTOR;
    for landmark in &mut pose.landmarks {
        landmark.discount(NEIGHBOR_CONFIDENCE_FACTOR);
    }

    for id in interpolation::RECONSTRUCTABLE {
        let rebuilt_confidence = if id == LandmarkId::Nose {
            REGENERATED_NOSE_CONFIDENCE
        } else {
            REGENERATED_SHOULDER_CONFIDENCE
        };
        if pose.landmark(id).confidence >= rebuilt_confidence {
            continue;
        }
        let Some(estimate) = interpolation::estimate(last_valid, id) else {
            continue;
        };
        if estimate.source_confidence(last_valid) <= NEIGHBOR_SOURCE_CONFIDENCE {
            continue;
        }
        let z = pose.landmark(id).z;
        let landmark = pose.landmark_mut(id);
        *landmark = Landmark::new(estimate.position.x, estimate.position.y, rebuilt_confidence);
        landmark.z = z;
    }
    pose
}

/// Neutral standing figure centered in a `width` x `height` frame
#[must_use]
pub fn fallback_pose(width: u32, height: u32, now_ms: u64) -> Pose {
    let (w, h) = (f64::from(width), f64::from(height));
    let center = w / 2.0;

    // (id, x offset from center as a fraction of width, y as a fraction of height)
    let layout: [(LandmarkId, f64, f64); NUM_LANDMARKS] = [
        (LandmarkId::Nose, 0.0, 0.18),
        (LandmarkId::LeftEye, 0.03, 0.16),
        (LandmarkId::RightEye, -0.03, 0.16),
        (LandmarkId::LeftEar, 0.06, 0.17),
        (LandmarkId::RightEar, -0.06, 0.17),
        (LandmarkId::LeftShoulder, 0.12, 0.28),
        (LandmarkId::RightShoulder, -0.12, 0.28),
        (LandmarkId::LeftElbow, 0.16, 0.42),
        (LandmarkId::RightElbow, -0.16, 0.42),
        (LandmarkId::LeftWrist, 0.18, 0.55),
        (LandmarkId::RightWrist, -0.18, 0.55),
        (LandmarkId::LeftHip, 0.08, 0.55),
        (LandmarkId::RightHip, -0.08, 0.55),
        (LandmarkId::LeftKnee, 0.08, 0.72),
        (LandmarkId::RightKnee, -0.08, 0.72),
        (LandmarkId::LeftAnkle, 0.08, 0.88),
        (LandmarkId::RightAnkle, -0.08, 0.88),
    ];

    let mut landmarks = [Landmark::missing(); NUM_LANDMARKS];
    for (id, dx, fy) in layout {
        let confidence = match id {
            LandmarkId::LeftShoulder | LandmarkId::RightShoulder | LandmarkId::LeftHip | LandmarkId::RightHip => {
                FALLBACK_TORSO_CONFIDENCE
            }
            _ => FALLBACK_LIMB_CONFIDENCE,
        };
        landmarks[id.index()] = Landmark::new(center + dx * w, fy * h, confidence);
    }
    Pose::new(landmarks, FALLBACK_POSE_CONFIDENCE, now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(confidence: f64, x_shift: f64, ts: u64) -> Pose {
        let mut pose = fallback_pose(400, 600, ts);
        for landmark in &mut pose.landmarks {
            landmark.x += x_shift;
            landmark.confidence = confidence;
        }
        pose.confidence = confidence;
        pose
    }

    #[test]
    fn test_fallback_without_prior_pose() {
        let mut manager = RecoveryManager::new(5, 500);
        let pose = manager.recover_pose(&PoseHistory::new(1000), 400, 600, 0).unwrap();
        assert_eq!(manager.last_strategy(), Some(RecoveryStrategy::Fallback));
        assert_eq!(pose.confidence, FALLBACK_POSE_CONFIDENCE);
        assert!(pose.landmarks.iter().all(|l| (0.1..=0.2).contains(&l.confidence)));
        assert_eq!(pose.landmark(LandmarkId::Nose).x, 200.0);
        assert!(manager.last_valid_pose().is_none());
        assert_eq!(manager.attempts(), 0);
    }

    #[test]
    fn test_cooldown_blocks_second_call() {
        let mut manager = RecoveryManager::new(5, 500);
        let history = PoseHistory::new(1000);
        assert!(manager.recover_pose(&history, 400, 600, 1000).is_some());
        assert!(manager.recover_pose(&history, 400, 600, 1499).is_none());
        assert_eq!(manager.attempts(), 0);
        assert!(manager.recover_pose(&history, 400, 600, 1500).is_some());
    }

    #[test]
    fn test_predictive_extrapolates_along_velocity() {
        let mut history = PoseHistory::new(10_000);
        history.push(standing(0.9, 0.0, 0));
        history.push(standing(0.9, 10.0, 100));
        let last = history.last().cloned().unwrap();

        let predicted = predict_pose(&last, &history, 300).unwrap();
        // 100 units/s for 200 ms
        let nose = predicted.landmark(LandmarkId::Nose);
        assert!((nose.x - (last.landmark(LandmarkId::Nose).x + 20.0)).abs() < 1e-9);
        assert!((nose.confidence - 0.9 * 0.7 * 0.8).abs() < 1e-12);
        assert_eq!(predicted.timestamp_ms, 300);
    }

    #[test]
    fn test_predictive_needs_two_entries() {
        let mut history = PoseHistory::new(1000);
        history.push(standing(0.9, 0.0, 0));
        assert!(predict_pose(&standing(0.9, 0.0, 0), &history, 100).is_none());
    }

    #[test]
    fn test_neighbor_reconstruction_halves_confidence() {
        let last = standing(0.9, 0.0, 0);
        let pose = reconstruct_from_neighbors(&last, 700);
        assert!(pose.landmarks.iter().all(|l| (l.confidence - 0.45).abs() < 1e-12));
        assert_eq!(pose.timestamp_ms, 700);
    }

    #[test]
    fn test_neighbor_reconstruction_rebuilds_weak_nose() {
        let mut last = standing(0.9, 0.0, 0);
        last.landmark_mut(LandmarkId::Nose).confidence = 0.2;
        let pose = reconstruct_from_neighbors(&last, 700);
        let nose = pose.landmark(LandmarkId::Nose);
        assert_eq!(nose.confidence, REGENERATED_NOSE_CONFIDENCE);
        let eyes = last.midpoint(LandmarkId::LeftEye, LandmarkId::RightEye);
        assert!((nose.y - (eyes.y - 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_failures_exhaust_attempts() {
        let mut manager = RecoveryManager::new(5, 500);
        // confidence 0.4 is accepted live but every recovery of it is too weak
        assert!(manager.record_detection(&standing(0.4, 0.0, 0), 0.5));
        let history = PoseHistory::new(1000);
        for i in 1..=5 {
            assert!(manager.should_attempt_recovery());
            assert!(manager.recover_pose(&history, 400, 600, i * 500).is_none());
        }
        assert_eq!(manager.attempts(), 5);
        assert!(!manager.should_attempt_recovery());
    }

    #[test]
    fn test_acceptance_resets_attempts() {
        let mut manager = RecoveryManager::new(5, 0);
        assert!(manager.record_detection(&standing(0.4, 0.0, 0), 0.5));
        let history = PoseHistory::new(1000);
        assert!(manager.recover_pose(&history, 400, 600, 10).is_none());
        assert_eq!(manager.attempts(), 1);

        assert!(manager.record_detection(&standing(0.9, 0.0, 20), 0.8));
        assert_eq!(manager.attempts(), 0);
        let recovered = manager.recover_pose(&history, 400, 600, 30).unwrap();
        assert_eq!(manager.last_strategy(), Some(RecoveryStrategy::NeighborReconstruction));
        assert_eq!(manager.last_valid_pose(), Some(&recovered));
    }

    #[test]
    fn test_state_transitions() {
        let mut manager = RecoveryManager::new(5, 500);
        assert_eq!(manager.tracking_state(), TrackingState::Lost);
        assert!(!manager.record_detection(&standing(0.9, 0.0, 0), 0.1));
        assert_eq!(manager.tracking_state(), TrackingState::Lost);
        assert!(manager.record_detection(&standing(0.9, 0.0, 0), 0.9));
        assert_eq!(manager.tracking_state(), TrackingState::Tracking);
        manager.mark_lost();
        assert_eq!(manager.tracking_state(), TrackingState::Lost);
        manager.reset();
        assert!(manager.last_valid_pose().is_none());
    }
}
