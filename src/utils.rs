//! Numeric helpers shared by the scoring and geometry stages.

pub mod safe_cast;

use safe_cast::finite_or;

/// Clamp a score into [0, 1], substituting `fallback` for NaN/Infinity
#[must_use]
pub fn unit_score(value: f64, fallback: f64) -> f64 {
    finite_or(value, fallback).clamp(0.0, 1.0)
}

/// Linear interpolation from `from` towards `to` by `weight`
#[must_use]
pub fn lerp(from: f64, to: f64, weight: f64) -> f64 {
    from + (to - from) * weight
}
