#![forbid(unsafe_code)]

//! Symbolic sheet positions and their resolution into anchors.
//!
//! A [`Position`] is geometry independent: "the middle of the container",
//! "100 units above the bottom edge". [`Detents`] owns the position set and
//! turns it into absolute offsets (anchors) for the current [`Geometry`].
//!
//! # Invariants
//!
//! 1. Anchors are recomputed on every geometry change and every mutation of
//!    the position set; they are never reused across geometries.
//! 2. Before the first layout every resolution yields `0.0` and
//!    [`Detents::update_anchors`] leaves the anchor list empty.
//! 3. Anchor order follows the order of the (filtered) position list; the
//!    list is not sorted.
//!
//! # Failure Modes
//!
//! - A proportion outside `[0, 1]` (or NaN) resolves to `0.0`.
//! - An `available` subset that shares nothing with `positions` yields an
//!   empty anchor list, which turns moves into no-ops.

pub use crate::geometry::{Geometry, Insets};

/// Container edge a [`Position`] is measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    /// Top edge; the offset pushes the sheet down.
    Top,
    /// Vertical centre; the offset pushes the sheet down.
    Middle,
    /// Bottom edge; the offset pulls the sheet up.
    Bottom,
    /// Fraction of the container height, `0.0` (top) to `1.0` (bottom).
    Proportion(f64),
}

/// A symbolic target location for the sheet's top edge.
///
/// Two positions with identical fields are equal. Resolution needs a
/// [`Geometry`] and is never cached on the value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Reference edge.
    pub edge: Edge,
    /// Additional offset in units.
    pub offset: f64,
    /// Whether safe-area insets are ignored during resolution.
    pub ignores_safe_area: bool,
}

impl Position {
    /// Create a position from raw parts.
    #[inline]
    pub const fn new(edge: Edge, offset: f64, ignores_safe_area: bool) -> Self {
        Self {
            edge,
            offset,
            ignores_safe_area,
        }
    }

    /// Exactly at the top edge, below the safe area.
    #[must_use]
    pub const fn top() -> Self {
        Self::new(Edge::Top, 0.0, false)
    }

    /// `offset` units below the top edge, below the safe area.
    #[must_use]
    pub const fn from_top(offset: f64) -> Self {
        Self::new(Edge::Top, offset, false)
    }

    /// Centre of the safe area.
    #[must_use]
    pub const fn middle() -> Self {
        Self::new(Edge::Middle, 0.0, false)
    }

    /// Exactly at the bottom edge, above the safe area.
    #[must_use]
    pub const fn bottom() -> Self {
        Self::new(Edge::Bottom, 0.0, false)
    }

    /// `offset` units above the bottom edge, above the safe area.
    #[must_use]
    pub const fn from_bottom(offset: f64) -> Self {
        Self::new(Edge::Bottom, offset, false)
    }

    /// Fraction `p` of the safe-area height.
    #[must_use]
    pub const fn proportion(p: f64) -> Self {
        Self::new(Edge::Proportion(p), 0.0, false)
    }

    /// Fully below the container: bottom edge, ignoring the safe area.
    #[must_use]
    pub const fn hidden() -> Self {
        Self::new(Edge::Bottom, 0.0, true)
    }

    /// Replace the offset (builder pattern).
    #[must_use]
    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set whether safe-area insets are ignored (builder pattern).
    #[must_use]
    pub const fn ignoring_safe_area(mut self, ignores: bool) -> Self {
        self.ignores_safe_area = ignores;
        self
    }

    /// Resolve to an absolute offset from the container's top edge.
    #[must_use]
    pub fn resolve(&self, geometry: &Geometry) -> f64 {
        let insets = geometry.safe_area;
        match self.edge {
            Edge::Top => {
                if self.ignores_safe_area {
                    self.offset
                } else {
                    self.offset + insets.top
                }
            }
            Edge::Middle => geometry.span(self.ignores_safe_area) / 2.0 + self.offset,
            Edge::Bottom => {
                let y = geometry.height - self.offset;
                if self.ignores_safe_area {
                    y
                } else {
                    y - insets.bottom
                }
            }
            Edge::Proportion(p) => {
                if !(0.0..=1.0).contains(&p) {
                    return 0.0;
                }
                geometry.span(self.ignores_safe_area) * p + self.offset
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::from_bottom(0.0).ignoring_safe_area(true)
    }
}

// ---------------------------------------------------------------------------
// Detents
// ---------------------------------------------------------------------------

/// The position set and its resolved anchors.
#[derive(Debug, Clone)]
pub struct Detents {
    positions: Vec<Position>,
    available: Option<Vec<Position>>,
    initial: Position,
    bottom_bar_connected: Option<Position>,
    geometry: Option<Geometry>,
    anchors: Vec<f64>,
}

impl Default for Detents {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Detents {
    /// Create detents from an ordered position list.
    #[must_use]
    pub fn new(positions: Vec<Position>) -> Self {
        Self {
            positions,
            available: None,
            initial: Position::default(),
            bottom_bar_connected: None,
            geometry: None,
            anchors: Vec::new(),
        }
    }

    /// Restrict reachable positions (builder pattern).
    #[must_use]
    pub fn with_available(mut self, available: Option<Vec<Position>>) -> Self {
        self.available = available;
        self
    }

    /// Position used on the first layout (builder pattern).
    #[must_use]
    pub fn with_initial(mut self, initial: Position) -> Self {
        self.initial = initial;
        self
    }

    /// All declared positions, in declaration order.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// The available subset, `None` meaning every position.
    #[inline]
    #[must_use]
    pub fn available(&self) -> Option<&[Position]> {
        self.available.as_deref()
    }

    /// Position the sheet takes on its first layout.
    #[inline]
    #[must_use]
    pub fn initial(&self) -> Position {
        self.initial
    }

    /// Position at which the bottom bar is fully attached, if any.
    #[inline]
    #[must_use]
    pub fn bottom_bar_connected(&self) -> Option<Position> {
        self.bottom_bar_connected
    }

    /// Resolved anchors for the current geometry.
    #[inline]
    #[must_use]
    pub fn anchors(&self) -> &[f64] {
        &self.anchors
    }

    /// Geometry of the last layout pass.
    #[inline]
    #[must_use]
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Whether a layout pass has happened.
    #[inline]
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.geometry.is_some()
    }

    /// Replace the position list and recompute anchors.
    pub fn set_positions(&mut self, positions: Vec<Position>) {
        self.positions = positions;
        self.update_anchors();
    }

    /// Replace the available subset and recompute anchors.
    pub fn set_available(&mut self, available: Option<Vec<Position>>) {
        self.available = available;
        self.update_anchors();
    }

    /// Set the position used on the first layout.
    pub fn set_initial(&mut self, initial: Position) {
        self.initial = initial;
    }

    /// Set the bottom-bar connected position.
    pub fn set_bottom_bar_connected(&mut self, position: Option<Position>) {
        self.bottom_bar_connected = position;
    }

    /// Record a new geometry. Returns `true` if it differs from the last one,
    /// in which case anchors have been recomputed.
    pub fn set_geometry(&mut self, geometry: Geometry) -> bool {
        if self.geometry == Some(geometry) {
            return false;
        }
        self.geometry = Some(geometry);
        self.update_anchors();
        true
    }

    /// Whether `position` may be targeted, given the available subset.
    #[must_use]
    pub fn is_available(&self, position: &Position) -> bool {
        match &self.available {
            Some(available) => available.contains(position),
            None => true,
        }
    }

    /// Positions that survive the available filter, in declaration order.
    pub fn reachable(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| self.is_available(p))
    }

    /// Resolve against the last geometry; `0.0` before the first layout.
    #[must_use]
    pub fn resolve(&self, position: &Position) -> f64 {
        match &self.geometry {
            Some(g) => position.resolve(g),
            None => 0.0,
        }
    }

    /// Recompute the anchor list. No-op before the first layout.
    pub fn update_anchors(&mut self) {
        let Some(geometry) = self.geometry else {
            return;
        };
        let anchors: Vec<f64> = self.reachable().map(|p| p.resolve(&geometry)).collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            anchors = ?anchors,
            height = geometry.height,
            "sheet anchors updated"
        );

        self.anchors = anchors;
    }

    /// Smallest anchor (most expanded), if any.
    #[must_use]
    pub fn min_anchor(&self) -> Option<f64> {
        self.anchors.iter().copied().reduce(f64::min)
    }

    /// Largest anchor (most collapsed), if any.
    #[must_use]
    pub fn max_anchor(&self) -> Option<f64> {
        self.anchors.iter().copied().reduce(f64::max)
    }

    /// Anchor range as `(min, max)`, if any anchors exist.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.min_anchor()?, self.max_anchor()?))
    }

    /// First declared position whose resolution lies within `epsilon` of
    /// `offset`.
    #[must_use]
    pub fn position_at(&self, offset: f64, epsilon: f64) -> Option<Position> {
        self.positions
            .iter()
            .copied()
            .find(|p| (self.resolve(p) - offset).abs() <= epsilon)
    }

    /// Fraction of the way `offset` has travelled from `from` to `to`,
    /// clamped to `[0, 1]`. Equal endpoints yield `1.0`; before the first
    /// layout the result is `0.0`.
    #[must_use]
    pub fn interpolate(&self, from: &Position, to: &Position, offset: f64) -> f64 {
        if !self.is_laid_out() {
            return 0.0;
        }
        interpolate(self.resolve(from), self.resolve(to), offset)
    }
}

/// Fraction of the way `y` has travelled from `y1` to `y2`, clamped to
/// `[0, 1]`. Works in either direction; equal endpoints yield `1.0`.
#[must_use]
pub fn interpolate(y1: f64, y2: f64, y: f64) -> f64 {
    if y1 == y2 {
        return 1.0;
    }
    if y1 > y2 {
        1.0 - ((y - y2).max(0.0) / (y1 - y2)).min(1.0)
    } else {
        ((y - y1).max(0.0) / (y2 - y1)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h1000() -> Geometry {
        Geometry::from_height(1000.0)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn resolves_symbolic_positions_without_insets() {
        let g = h1000();
        assert!(approx(Position::top().resolve(&g), 0.0));
        assert!(approx(Position::middle().resolve(&g), 500.0));
        assert!(approx(Position::bottom().resolve(&g), 1000.0));
        assert!(approx(Position::from_bottom(100.0).resolve(&g), 900.0));
        assert!(approx(Position::proportion(0.25).resolve(&g), 250.0));
    }

    #[test]
    fn safe_area_applies_unless_ignored() {
        let g = Geometry::new(1000.0, Insets::new(40.0, 30.0));
        assert!(approx(Position::top().resolve(&g), 40.0));
        assert!(approx(Position::top().ignoring_safe_area(true).resolve(&g), 0.0));
        assert!(approx(Position::bottom().resolve(&g), 970.0));
        assert!(approx(Position::hidden().resolve(&g), 1000.0));
        assert!(approx(Position::middle().resolve(&g), 465.0));
        assert!(approx(Position::middle().ignoring_safe_area(true).resolve(&g), 500.0));
        assert!(approx(Position::proportion(0.5).resolve(&g), 465.0));
    }

    #[test]
    fn offsets_shift_every_edge() {
        let g = h1000();
        assert!(approx(Position::from_top(20.0).resolve(&g), 20.0));
        assert!(approx(Position::middle().with_offset(-10.0).resolve(&g), 490.0));
        assert!(approx(Position::proportion(0.5).with_offset(5.0).resolve(&g), 505.0));
    }

    #[test]
    fn out_of_range_proportion_resolves_to_zero() {
        let g = h1000();
        assert!(approx(Position::proportion(1.5).resolve(&g), 0.0));
        assert!(approx(Position::proportion(-0.1).resolve(&g), 0.0));
        assert!(approx(Position::proportion(f64::NAN).resolve(&g), 0.0));
        assert!(approx(Position::proportion(1.0).resolve(&g), 1000.0));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Position::from_bottom(0.0), Position::bottom());
        assert_ne!(Position::bottom(), Position::hidden());
        assert_eq!(Position::default(), Position::hidden());
    }

    #[test]
    fn anchors_empty_before_layout() {
        let mut d = Detents::new(vec![Position::top(), Position::bottom()]);
        d.update_anchors();
        assert!(d.anchors().is_empty());
        assert!(approx(d.resolve(&Position::bottom()), 0.0));
        assert!(!d.is_laid_out());
    }

    #[test]
    fn update_anchors_is_idempotent() {
        let mut d = Detents::new(vec![
            Position::top(),
            Position::middle(),
            Position::from_bottom(100.0),
        ]);
        d.set_geometry(h1000());
        let first = d.anchors().to_vec();
        d.update_anchors();
        assert_eq!(first, d.anchors());
        assert_eq!(first, vec![0.0, 500.0, 900.0]);
    }

    #[test]
    fn set_geometry_reports_changes_only() {
        let mut d = Detents::new(vec![Position::bottom()]);
        assert!(d.set_geometry(h1000()));
        assert!(!d.set_geometry(h1000()));
        assert!(d.set_geometry(Geometry::from_height(800.0)));
        assert_eq!(d.anchors(), &[800.0]);
    }

    #[test]
    fn available_subset_filters_anchors() {
        let mut d = Detents::new(vec![Position::top(), Position::middle(), Position::bottom()]);
        d.set_geometry(h1000());
        d.set_available(Some(vec![Position::middle(), Position::bottom()]));
        assert_eq!(d.anchors(), &[500.0, 1000.0]);
        assert!(!d.is_available(&Position::top()));
        d.set_available(None);
        assert_eq!(d.anchors(), &[0.0, 500.0, 1000.0]);
    }

    #[test]
    fn bounds_track_min_and_max() {
        let mut d = Detents::new(vec![Position::middle(), Position::top(), Position::bottom()]);
        assert_eq!(d.bounds(), None);
        d.set_geometry(h1000());
        assert_eq!(d.bounds(), Some((0.0, 1000.0)));
    }

    #[test]
    fn position_at_uses_epsilon_and_first_match() {
        let mut d = Detents::new(vec![
            Position::from_top(100.0),
            Position::from_bottom(900.0),
            Position::bottom(),
        ]);
        d.set_geometry(h1000());
        assert_eq!(d.position_at(100.5, 1.0), Some(Position::from_top(100.0)));
        assert_eq!(d.position_at(998.0, 1.0), None);
        assert_eq!(d.position_at(1000.0, 1.0), Some(Position::bottom()));
    }

    #[test]
    fn interpolate_clamps_and_inverts() {
        assert!(approx(interpolate(0.0, 100.0, 25.0), 0.25));
        assert!(approx(interpolate(0.0, 100.0, -10.0), 0.0));
        assert!(approx(interpolate(0.0, 100.0, 150.0), 1.0));
        assert!(approx(interpolate(100.0, 0.0, 25.0), 0.75));
        assert!(approx(interpolate(100.0, 0.0, 200.0), 0.0));
        assert!(approx(interpolate(50.0, 50.0, 0.0), 1.0));
    }

    #[test]
    fn detents_interpolate_resolves_positions() {
        let mut d = Detents::new(vec![Position::top(), Position::bottom()]);
        assert!(approx(d.interpolate(&Position::top(), &Position::top(), 0.0), 0.0));
        d.set_geometry(h1000());
        let v = d.interpolate(&Position::bottom(), &Position::top(), 250.0);
        assert!(approx(v, 0.75), "got {v}");
    }
}
