use super::jitter::suppress_jitter;
use crate::config::Config;
use crate::constants::{
    DAMPING_SPEED_SCALE, MIN_DAMPING_FACTOR, MIN_RECENCY_WEIGHT, RECENCY_HORIZON_MS, VALID_LANDMARK_CONFIDENCE,
};
use crate::history::PoseHistory;
use crate::motion::landmark_speeds;
use crate::pose::{LandmarkId, Pose};
use crate::utils::lerp;

/// Parameters of the temporal smoother
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Base of the per-entry blend weight, raised to the entry's depth
    pub smoothing_factor: f64,
    /// Movement below this distance is treated as noise
    pub max_jitter_threshold: f64,
}

impl SmoothingParams {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            smoothing_factor: config.smoothing_factor,
            max_jitter_threshold: config.max_jitter_threshold,
        }
    }
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Damping applied to a landmark's history weight: fast motion is
/// smoothed less so the output does not lag behind genuine movement
#[must_use]
pub fn damping_factor(speed: f64) -> f64 {
    if !speed.is_finite() {
        return MIN_DAMPING_FACTOR;
    }
    (1.0 - speed / DAMPING_SPEED_SCALE).clamp(MIN_DAMPING_FACTOR, 1.0)
}

/// Weight of a history entry by age, floored at 0.1
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn recency_weight(age_ms: u64) -> f64 {
    (1.0 - age_ms as f64 / RECENCY_HORIZON_MS).clamp(MIN_RECENCY_WEIGHT, 1.0)
}

/// Stabilize `current` against `history` and append the result to it.
///
/// History entries are visited oldest to newest; each pulls every landmark
/// towards its own position with weight
/// `smoothing_factor^depth * recency * damping`. Confidence takes the
/// maximum of the current and historical value, so a landmark that was
/// once seen confidently keeps that confidence while it stays in the
/// window. Landmarks that end up closer than the jitter threshold to the
/// previous pose are snapped back onto it.
pub fn smooth(current: Pose, history: &mut PoseHistory, params: &SmoothingParams) -> Pose {
    if history.is_empty() {
        history.push(current.clone());
        return current;
    }

    history.prune(current.timestamp_ms);
    let Some(previous) = history.last().cloned() else {
        history.push(current.clone());
        return current;
    };

    let speeds = landmark_speeds(history);
    let depth_max = history.len() - 1;
    let mut result = current;

    for (i, entry) in history.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let depth = (depth_max - i) as i32;
        let age_ms = result.timestamp_ms.saturating_sub(entry.timestamp_ms);
        let base_weight = params.smoothing_factor.powi(depth) * recency_weight(age_ms);

        for id in LandmarkId::ALL {
            let past = entry.landmark(id);
            if !past.is_visible(VALID_LANDMARK_CONFIDENCE) {
                continue;
            }
            let weight = (base_weight * damping_factor(speeds[id.index()])).clamp(0.0, 1.0);
            let out = result.landmark_mut(id);
            out.x = lerp(out.x, past.x, weight);
            out.y = lerp(out.y, past.y, weight);
            if let (Some(z), Some(past_z)) = (out.z, past.z) {
                out.z = Some(lerp(z, past_z, weight));
            }
            out.confidence = out.confidence.max(past.confidence);
        }
    }

    let snapped = suppress_jitter(&mut result, &previous, params.max_jitter_threshold);
    log::trace!("Smoothed pose at {} ms, {} landmarks held", result.timestamp_ms, snapped);

    history.push(result.clone());
    result
}

/// Temporal smoother owning its pose history
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    params: SmoothingParams,
    history: PoseHistory,
}

impl TemporalSmoother {
    /// Create a smoother keeping `window_ms` of history
    #[must_use]
    pub fn new(params: SmoothingParams, window_ms: u64) -> Self {
        Self {
            params,
            history: PoseHistory::new(window_ms),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(SmoothingParams::from_config(config), config.temporal_window_ms())
    }

    /// Smooth one pose and record it
    pub fn apply(&mut self, pose: Pose) -> Pose {
        smooth(pose, &mut self.history, &self.params)
    }

    #[must_use]
    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    #[must_use]
    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
