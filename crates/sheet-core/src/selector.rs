#![forbid(unsafe_code)]

//! Velocity-projected anchor selection.
//!
//! On release the sheet asks: where would a free-decelerating body stop,
//! and which anchor is closest to that point? A deliberate flick always
//! leaves the current anchor even when the projection falls short.
//!
//! Velocities here are in units per millisecond and the deceleration rate
//! is the per-millisecond velocity retention (`0.99` matches a fast
//! scroll-view deceleration).
//!
//! # Failure Modes
//!
//! - A deceleration rate outside `[0, 1)` projects to the current offset.
//! - Empty anchor lists select nothing.

/// Velocity retention per millisecond of a "fast" deceleration.
pub const DECELERATION_RATE_FAST: f64 = 0.99;

/// Velocity retention per millisecond of a "normal" deceleration.
pub const DECELERATION_RATE_NORMAL: f64 = 0.998;

/// Distance travelled by a body decelerating from `velocity`.
#[inline]
#[must_use]
pub fn projection_distance(velocity: f64, deceleration_rate: f64) -> f64 {
    if !(0.0..1.0).contains(&deceleration_rate) {
        return 0.0;
    }
    velocity * deceleration_rate / (1.0 - deceleration_rate)
}

/// Stopping offset of a body at `offset` moving with `velocity`.
#[inline]
#[must_use]
pub fn project(offset: f64, velocity: f64, deceleration_rate: f64) -> f64 {
    offset + projection_distance(velocity, deceleration_rate)
}

/// Anchor closest to `value`; the first one wins ties.
#[must_use]
pub fn nearest(anchors: &[f64], value: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for &anchor in anchors {
        match best {
            Some(b) if (b - value).abs() <= (anchor - value).abs() => {}
            _ => best = Some(anchor),
        }
    }
    best
}

/// Neighbour of `anchor` in sorted order, in the direction of `velocity`.
///
/// Stays on `anchor` at the ends of the list, for zero velocity, or when
/// `anchor` is not in the list.
#[must_use]
pub fn next_anchor(anchors: &[f64], anchor: f64, velocity: f64) -> f64 {
    if velocity == 0.0 || anchors.is_empty() {
        return anchor;
    }
    let mut sorted = anchors.to_vec();
    sorted.sort_by(f64::total_cmp);
    let Some(index) = sorted.iter().position(|&a| a == anchor) else {
        return anchor;
    };
    let next = if velocity > 0.0 {
        (index + 1).min(sorted.len() - 1)
    } else {
        index.saturating_sub(1)
    };
    sorted[next]
}

/// Anchor to settle on after releasing at `offset` with `velocity`.
#[must_use]
pub fn select(offset: f64, velocity: f64, anchors: &[f64], deceleration_rate: f64) -> Option<f64> {
    let projected = project(offset, velocity, deceleration_rate);
    let anchor = nearest(anchors, projected)?;
    if (anchor - offset) * velocity < 0.0 {
        Some(next_anchor(anchors, anchor, velocity))
    } else {
        Some(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHORS: [f64; 3] = [0.0, 100.0, 200.0];

    #[test]
    fn projection_uses_rate() {
        assert!((project(10.0, 1.0, 0.5) - 11.0).abs() < 1e-12);
        assert!((project(10.0, 1.0, DECELERATION_RATE_FAST) - 109.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_rate_projects_in_place() {
        assert!((project(10.0, 5.0, 1.0) - 10.0).abs() < f64::EPSILON);
        assert!((project(10.0, 5.0, -0.1) - 10.0).abs() < f64::EPSILON);
        assert!((project(10.0, 5.0, f64::NAN) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_prefers_first_on_tie() {
        assert_eq!(nearest(&ANCHORS, 50.0), Some(0.0));
        assert_eq!(nearest(&[100.0, 0.0], 50.0), Some(100.0));
        assert_eq!(nearest(&ANCHORS, 160.0), Some(200.0));
        assert_eq!(nearest(&[], 1.0), None);
    }

    #[test]
    fn next_anchor_clamps_at_ends() {
        assert!((next_anchor(&ANCHORS, 200.0, 1.0) - 200.0).abs() < f64::EPSILON);
        assert!((next_anchor(&ANCHORS, 0.0, -1.0) - 0.0).abs() < f64::EPSILON);
        assert!((next_anchor(&ANCHORS, 100.0, 1.0) - 200.0).abs() < f64::EPSILON);
        assert!((next_anchor(&ANCHORS, 100.0, -1.0) - 0.0).abs() < f64::EPSILON);
        assert!((next_anchor(&ANCHORS, 100.0, 0.0) - 100.0).abs() < f64::EPSILON);
        assert!((next_anchor(&ANCHORS, 42.0, 1.0) - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn next_anchor_sorts_unsorted_lists() {
        assert!((next_anchor(&[200.0, 0.0, 100.0], 0.0, 1.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn minimum_flick_moves_one_detent() {
        // Rate 0 keeps the projection on the current offset.
        assert_eq!(select(50.0, 0.01, &ANCHORS, 0.0), Some(100.0));
        assert_eq!(select(50.0, -0.01, &ANCHORS, 0.0), Some(0.0));
    }

    #[test]
    fn strong_flick_follows_projection() {
        assert_eq!(select(10.0, 2.0, &ANCHORS, DECELERATION_RATE_FAST), Some(200.0));
        assert_eq!(select(190.0, -2.0, &ANCHORS, DECELERATION_RATE_FAST), Some(0.0));
    }

    #[test]
    fn zero_velocity_picks_nearest() {
        assert_eq!(select(130.0, 0.0, &ANCHORS, DECELERATION_RATE_FAST), Some(100.0));
        assert_eq!(select(130.0, 0.0, &[], DECELERATION_RATE_FAST), None);
    }
}
