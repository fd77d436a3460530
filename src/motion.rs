//! Motion statistics over the pose history.
//!
//! Velocity and displacement estimates feed the smoother's damping, the
//! scorer's temporal stability and the recovery extrapolation.

use crate::constants::{NUM_LANDMARKS, VELOCITY_SAMPLE_COUNT};
use crate::history::PoseHistory;
use crate::pose::Pose;
use nalgebra::Vector2;

/// Per-landmark planar velocity in units per second
pub type LandmarkVelocities = [Vector2<f64>; NUM_LANDMARKS];

/// Average frame-to-frame velocity of each landmark over the last three
/// history entries. Pairs with non-positive elapsed time are skipped; a
/// landmark with no usable pair has zero velocity.
#[must_use]
pub fn landmark_velocities(history: &PoseHistory) -> LandmarkVelocities {
    let recent: Vec<&Pose> = history.recent(VELOCITY_SAMPLE_COUNT).collect();
    let mut sums = [Vector2::zeros(); NUM_LANDMARKS];
    let mut pairs = 0usize;

    for window in recent.windows(2) {
        let (prev, next) = (window[0], window[1]);
        if next.timestamp_ms <= prev.timestamp_ms {
            continue;
        }
        #[allow(clippy::cast_precision_loss)] // Frame intervals are small
        let dt = (next.timestamp_ms - prev.timestamp_ms) as f64 / 1000.0;
        for (sum, (a, b)) in sums.iter_mut().zip(prev.landmarks.iter().zip(next.landmarks.iter())) {
            *sum += (b.point() - a.point()) / dt;
        }
        pairs += 1;
    }

    if pairs > 0 {
        #[allow(clippy::cast_precision_loss)]
        let n = pairs as f64;
        for v in &mut sums {
            *v /= n;
        }
    }
    sums
}

/// Speed (velocity magnitude) of each landmark in units per second
#[must_use]
pub fn landmark_speeds(history: &PoseHistory) -> [f64; NUM_LANDMARKS] {
    landmark_velocities(history).map(|v| v.norm())
}

/// Mean per-landmark displacement between consecutive entries among the
/// last `count` history entries, `None` with fewer than two entries
#[must_use]
pub fn average_displacement(history: &PoseHistory, count: usize) -> Option<f64> {
    let recent: Vec<&Pose> = history.recent(count).collect();
    if recent.len() < 2 {
        return None;
    }
    let total: f64 = recent.windows(2).map(|w| w[1].mean_displacement(w[0])).sum();
    #[allow(clippy::cast_precision_loss)]
    Some(total / (recent.len() - 1) as f64)
}

/// Statistical summary of a set of values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl Statistics {
    /// Summarize `data`, `None` when it is empty
    #[must_use]
    pub fn from_values(data: &[f64]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: data.iter().copied().fold(f64::INFINITY, f64::min),
            max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// Summary of a pose's 17 landmark confidences
    #[must_use]
    pub fn of_confidences(pose: &Pose) -> Self {
        let values = pose.landmarks.map(|l| l.confidence);
        Self::from_values(&values).unwrap_or(Self {
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
        })
    }
}
