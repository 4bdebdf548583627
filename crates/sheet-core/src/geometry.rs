#![forbid(unsafe_code)]

//! Container geometry supplied by the host on every layout pass.

/// Vertical safe-area insets of the container.
///
/// Only the top and bottom edges matter for a single-axis sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    /// Inset from the top edge (status bar, notch).
    pub top: f64,
    /// Inset from the bottom edge (home indicator).
    pub bottom: f64,
}

impl Insets {
    /// No insets.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create insets from top and bottom values.
    #[inline]
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Sum of top and bottom insets.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}

impl From<(f64, f64)> for Insets {
    fn from((top, bottom): (f64, f64)) -> Self {
        Self::new(top, bottom)
    }
}

/// Snapshot of the container the sheet lives in.
///
/// Offsets are measured from the container's top edge, so a larger offset
/// means the sheet is more collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// Full container height.
    pub height: f64,
    /// Safe-area insets of the container.
    pub safe_area: Insets,
}

impl Geometry {
    /// Create a geometry snapshot.
    #[inline]
    pub const fn new(height: f64, safe_area: Insets) -> Self {
        Self { height, safe_area }
    }

    /// Geometry with no safe-area insets.
    #[inline]
    pub const fn from_height(height: f64) -> Self {
        Self::new(height, Insets::ZERO)
    }

    /// Height between the safe-area insets.
    #[inline]
    pub fn safe_height(&self) -> f64 {
        self.height - self.safe_area.vertical_sum()
    }

    /// Height used by relative positions, depending on safe-area handling.
    #[inline]
    pub fn span(&self, ignores_safe_area: bool) -> f64 {
        if ignores_safe_area {
            self.height
        } else {
            self.safe_height()
        }
    }

    /// Whether every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.height.is_finite() && self.safe_area.top.is_finite() && self.safe_area.bottom.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::{Geometry, Insets};

    #[test]
    fn safe_height_subtracts_both_insets() {
        let g = Geometry::new(800.0, Insets::new(44.0, 34.0));
        assert!((g.safe_height() - 722.0).abs() < f64::EPSILON);
    }

    #[test]
    fn span_respects_flag() {
        let g = Geometry::new(800.0, Insets::new(40.0, 20.0));
        assert!((g.span(true) - 800.0).abs() < f64::EPSILON);
        assert!((g.span(false) - 740.0).abs() < f64::EPSILON);
    }

    #[test]
    fn insets_from_tuple() {
        assert_eq!(Insets::from((1.0, 2.0)), Insets::new(1.0, 2.0));
        assert!((Insets::new(1.0, 2.0).vertical_sum() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn geometry_equality_drives_change_detection() {
        let a = Geometry::from_height(100.0);
        let b = Geometry::from_height(100.0);
        let c = Geometry::new(100.0, Insets::new(1.0, 0.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn non_finite_detected() {
        assert!(Geometry::from_height(10.0).is_finite());
        assert!(!Geometry::from_height(f64::NAN).is_finite());
        assert!(!Geometry::new(10.0, Insets::new(f64::INFINITY, 0.0)).is_finite());
    }
}
