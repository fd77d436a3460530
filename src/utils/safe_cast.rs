//! Safe numeric conversions for pixel coordinates and guarded ratios

use crate::constants::EPSILON;
use crate::{Error, Result};

/// Safely convert u32 to usize
///
/// # Errors
///
/// Returns an error if the value does not fit in usize on this platform
pub fn u32_to_usize(value: u32) -> Result<usize> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in usize")))
}

/// Round and clamp an f64 coordinate into the pixel range `[0, max]`
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_sign_loss)] // Clamped to non-negative first
#[allow(clippy::cast_precision_loss)] // Frame sizes are far below 2^52
pub fn f64_to_pixel_clamp(value: f64, max: usize) -> usize {
    if !value.is_finite() {
        return 0;
    }
    let clamped = value.round().clamp(0.0, max as f64);
    (clamped as usize).min(max)
}

/// Return `value` if it is finite, otherwise `fallback`
#[must_use]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// `numerator / denominator`, or `None` when the denominator is near zero
#[must_use]
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if !denominator.is_finite() || denominator.abs() <= EPSILON {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}
