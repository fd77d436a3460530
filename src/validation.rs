//! Pose validation: coverage, anatomy, framing, confidence spread and
//! temporal consistency checks folded into one multiplicative score.

use crate::constants::{
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, EPSILON, MIN_VALID_LANDMARKS, VALID_LANDMARK_CONFIDENCE,
};
use crate::history::PoseHistory;
use crate::motion::Statistics;
use crate::pose::Pose;
use crate::utils::safe_cast::safe_ratio;
use crate::utils::unit_score;
use std::fmt;

/// A problem found while validating a pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationIssue {
    InsufficientLandmarks,
    PartialLandmarks,
    BodyTooSmall,
    UnrealisticShoulderHipRatio,
    InvertedBody,
    LegsTooShort,
    AsymmetricLegs,
    TooWideForFrame,
    TooTallForFrame,
    OffCenter,
    LowMinimumConfidence,
    InconsistentConfidence,
    ExtremeMovement,
    LargeMovement,
}

impl ValidationIssue {
    /// Factor applied to the quality score when this issue is raised
    #[must_use]
    pub fn penalty(self) -> f64 {
        match self {
            Self::InsufficientLandmarks | Self::InvertedBody => 0.3,
            Self::PartialLandmarks | Self::TooWideForFrame | Self::TooTallForFrame => 0.7,
            Self::BodyTooSmall => 0.4,
            Self::UnrealisticShoulderHipRatio => 0.5,
            Self::LegsTooShort | Self::ExtremeMovement => 0.6,
            Self::AsymmetricLegs | Self::OffCenter | Self::LowMinimumConfidence | Self::LargeMovement => 0.8,
            Self::InconsistentConfidence => 0.9,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::InsufficientLandmarks => "Insufficient landmarks detected",
            Self::PartialLandmarks => "Partial body detected",
            Self::BodyTooSmall => "Body too small or landmarks collapsed",
            Self::UnrealisticShoulderHipRatio => "Unrealistic shoulder-to-hip ratio",
            Self::InvertedBody => "Shoulders at or below hip level",
            Self::LegsTooShort => "Leg length too short",
            Self::AsymmetricLegs => "Asymmetric leg lengths",
            Self::TooWideForFrame => "Body too wide for frame",
            Self::TooTallForFrame => "Body too tall for frame",
            Self::OffCenter => "Body off-center in frame",
            Self::LowMinimumConfidence => "Some landmarks have very low confidence",
            Self::InconsistentConfidence => "Inconsistent landmark confidence",
            Self::ExtremeMovement => "Extreme movement since last frame",
            Self::LargeMovement => "Large movement since last frame",
        };
        f.write_str(message)
    }
}

/// Outcome of [`PoseValidator::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// True when no issue was raised
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Product of the issue penalties, in [0, 1]
    pub quality_score: f64,
}

impl ValidationResult {
    #[must_use]
    pub fn has_issue(&self, issue: ValidationIssue) -> bool {
        self.issues.contains(&issue)
    }
}

struct Checks {
    issues: Vec<ValidationIssue>,
    score: f64,
}

impl Checks {
    fn raise(&mut self, issue: ValidationIssue) {
        self.score *= issue.penalty();
        self.issues.push(issue);
    }
}

/// Validates poses against a frame of fixed size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseValidator {
    frame_width: f64,
    frame_height: f64,
}

impl Default for PoseValidator {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
    }
}

impl PoseValidator {
    #[must_use]
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width: f64::from(frame_width),
            frame_height: f64::from(frame_height),
        }
    }

    /// Run every check. `history` only contributes once it holds at least
    /// three entries; its most recent entry is the reference frame.
    #[must_use]
    pub fn validate(&self, pose: &Pose, history: &PoseHistory) -> ValidationResult {
        let mut checks = Checks {
            issues: Vec::new(),
            score: 1.0,
        };

        self.check_coverage(pose, &mut checks);
        self.check_anatomy(pose, &mut checks);
        self.check_framing(pose, &mut checks);
        self.check_confidence_distribution(pose, &mut checks);
        self.check_temporal_consistency(pose, history, &mut checks);

        ValidationResult {
            is_valid: checks.issues.is_empty(),
            quality_score: unit_score(checks.score, 0.0),
            issues: checks.issues,
        }
    }

    fn check_coverage(&self, pose: &Pose, checks: &mut Checks) {
        let visible = pose.confident_count(VALID_LANDMARK_CONFIDENCE);
        if visible < MIN_VALID_LANDMARKS {
            checks.raise(ValidationIssue::InsufficientLandmarks);
        } else if visible < 12 {
            checks.raise(ValidationIssue::PartialLandmarks);
        }
    }

    fn check_anatomy(&self, pose: &Pose, checks: &mut Checks) {
        let shoulder_width = pose.shoulder_width();
        let hip_width = pose.hip_width();

        if shoulder_width < 30.0 || hip_width < 25.0 {
            checks.raise(ValidationIssue::BodyTooSmall);
        }
        if safe_ratio(shoulder_width, hip_width).is_some_and(|ratio| ratio > 2.5) {
            checks.raise(ValidationIssue::UnrealisticShoulderHipRatio);
        }
        if pose.shoulder_center_y() >= pose.hip_center_y() {
            checks.raise(ValidationIssue::InvertedBody);
        }

        let left_leg = pose.left_leg_length();
        let right_leg = pose.right_leg_length();
        if left_leg < 50.0 || right_leg < 50.0 {
            checks.raise(ValidationIssue::LegsTooShort);
        }
        if safe_ratio(left_leg.min(right_leg), left_leg.max(right_leg)).is_some_and(|ratio| ratio < 0.7) {
            checks.raise(ValidationIssue::AsymmetricLegs);
        }
    }

    fn check_framing(&self, pose: &Pose, checks: &mut Checks) {
        let Some(bounds) = pose.bounding_box(VALID_LANDMARK_CONFIDENCE) else {
            return;
        };
        if self.frame_width > EPSILON && bounds.width() / self.frame_width > 0.9 {
            checks.raise(ValidationIssue::TooWideForFrame);
        }
        if self.frame_height > EPSILON && bounds.height() / self.frame_height > 0.9 {
            checks.raise(ValidationIssue::TooTallForFrame);
        }
        if (bounds.center().x - self.frame_width / 2.0).abs() > 0.3 * self.frame_width {
            checks.raise(ValidationIssue::OffCenter);
        }
    }

    fn check_confidence_distribution(&self, pose: &Pose, checks: &mut Checks) {
        let stats = Statistics::of_confidences(pose);
        if stats.min < 0.2 {
            checks.raise(ValidationIssue::LowMinimumConfidence);
        }
        if stats.std_dev > 0.3 {
            checks.raise(ValidationIssue::InconsistentConfidence);
        }
    }

    fn check_temporal_consistency(&self, pose: &Pose, history: &PoseHistory, checks: &mut Checks) {
        if history.len() < 3 {
            return;
        }
        let Some(previous) = history.last() else {
            return;
        };
        let movement = pose.mean_displacement(previous);
        if movement > 100.0 {
            checks.raise(ValidationIssue::ExtremeMovement);
        } else if movement > 50.0 {
            checks.raise(ValidationIssue::LargeMovement);
        }
    }
}
