#![forbid(unsafe_code)]

//! Rubber-band softening for offsets past the anchor range.
//!
//! `band_clamp(x, c, d) = (1 - 1 / (x·c/d + 1)) · d`
//!
//! # Invariants
//!
//! 1. `band_clamp(0, c, d) == 0`.
//! 2. For `c, d > 0` the function is strictly increasing in `x` and
//!    `band_clamp(x) < x` whenever `x > 0` and `c <= 1`.
//! 3. The result never reaches `d`.
//!
//! # Failure Modes
//!
//! - A non-positive or non-finite dimension yields `0.0` (a hard clamp at
//!   the bound) instead of a NaN or a sign flip.

/// Default coefficient used by platform scroll views.
pub const DEFAULT_COEFFICIENT: f64 = 0.55;

/// Soften an overshoot distance `x` against a dimension `dim`.
#[inline]
#[must_use]
pub fn band_clamp(x: f64, coeff: f64, dim: f64) -> f64 {
    if !(dim > 0.0) || !dim.is_finite() {
        return 0.0;
    }
    (1.0 - 1.0 / ((x * coeff / dim) + 1.0)) * dim
}

/// Clamp `x` into `[lower, upper]`, letting the excess leak out softly.
///
/// The dimension is the width of the range.
#[must_use]
pub fn band_clamp_in(x: f64, coeff: f64, lower: f64, upper: f64) -> f64 {
    let clamped = x.clamp(lower, upper);
    let diff = (x - clamped).abs();
    let sign = if clamped > x { -1.0 } else { 1.0 };
    clamped + sign * band_clamp(diff, coeff, upper - lower)
}

/// Sheet-specific overshoot clamp.
///
/// Above the range the dimension is the distance from the container top to
/// the lowest anchor; below it, the distance from the highest anchor to the
/// container bottom. With `bounces` off this is a plain clamp.
#[must_use]
pub fn clamp_offset(
    y: f64,
    (lower, upper): (f64, f64),
    container_height: f64,
    bounces: bool,
    coeff: f64,
) -> f64 {
    if !bounces {
        return y.clamp(lower, upper);
    }
    if y < lower {
        lower - band_clamp(lower - y, coeff, lower.abs())
    } else if y > upper {
        upper + band_clamp(y - upper, coeff, (container_height - upper).abs())
    } else {
        y
    }
}
