//! Temporal filtering of stabilized poses.
//!
//! The smoother blends each incoming pose towards the recent history with
//! weights that decay with history depth and age and shrink for fast
//! moving landmarks, then snaps sub-threshold motion back to the previous
//! position.

/// History-weighted smoothing with jitter suppression
pub mod temporal;

/// Sub-threshold movement suppression
pub mod jitter;

use crate::pose::Pose;

pub use temporal::{smooth, SmoothingParams, TemporalSmoother};

/// Trait for stateful pose filters
pub trait PoseFilter: Send + Sync {
    /// Filter one pose and update internal state
    fn apply(&mut self, pose: Pose) -> Pose;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// Filter that passes poses through unchanged
pub struct NoFilter;

impl PoseFilter for NoFilter {
    fn apply(&mut self, pose: Pose) -> Pose {
        pose
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

impl PoseFilter for TemporalSmoother {
    fn apply(&mut self, pose: Pose) -> Pose {
        TemporalSmoother::apply(self, pose)
    }

    fn reset(&mut self) {
        TemporalSmoother::reset(self);
    }

    fn name(&self) -> &str {
        "TemporalSmoother"
    }
}
