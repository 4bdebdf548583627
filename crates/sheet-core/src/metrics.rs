#![forbid(unsafe_code)]

//! Layout metrics derived from the sheet offset.
//!
//! The render layer sizes three surfaces from the engine state: the sheet
//! body, the content inside it, and the bottom-bar area that slides away as
//! the sheet collapses past its connected position.

use crate::config::SheetConfig;
use crate::geometry::Geometry;

/// Sizes of the sheet's dependent surfaces for one offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SheetMetrics {
    /// Sheet offset from the container top.
    pub offset: f64,
    /// Height of the visible sheet body (container height minus offset).
    pub visible_height: f64,
    /// Top inset applied to the content so it clears the top safe area.
    pub content_top_inset: f64,
    /// Height of the content view.
    pub content_height: f64,
    /// Height of the bottom-bar area, including the bottom safe area.
    pub bottom_bar_area_height: f64,
}

impl SheetMetrics {
    /// Compute metrics for `offset`.
    ///
    /// `min_anchor` is the most expanded anchor and `connected_offset` the
    /// offset at which the bottom bar is fully attached; with no anchors the
    /// content height and bar area are zero.
    #[must_use]
    pub fn compute(
        offset: f64,
        geometry: &Geometry,
        min_anchor: Option<f64>,
        connected_offset: Option<f64>,
        config: &SheetConfig,
    ) -> Self {
        let safe = geometry.safe_area;

        let content_top_inset = if offset < safe.top && !config.view_ignores_top_safe_area {
            (safe.top - offset).max(0.0)
        } else {
            0.0
        };

        let content_height = match min_anchor {
            None => 0.0,
            Some(min_y) if config.view_ignores_top_safe_area => {
                let mut bottom = if config.view_ignores_bottom_safe_area {
                    0.0
                } else {
                    safe.bottom
                };
                if !config.bottom_bar.hidden && !config.view_ignores_bottom_bar_height {
                    bottom += config.bottom_bar.height;
                }
                let mut height = geometry.height - min_y - bottom;
                if offset < min_y {
                    height += min_y - offset;
                }
                height
            }
            Some(min_y) => geometry.height - min_y.max(safe.top) - safe.bottom,
        };

        let bottom_bar_area_height = match connected_offset {
            _ if config.bottom_bar.hidden => 0.0,
            None => 0.0,
            Some(connected) => {
                let full = safe.bottom + config.bottom_bar.height;
                if offset <= connected {
                    full
                } else {
                    (full - (offset - connected)).max(0.0)
                }
            }
        };

        Self {
            offset,
            visible_height: geometry.height - offset,
            content_top_inset,
            content_height,
            bottom_bar_area_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BottomBarConfig;
    use crate::geometry::Insets;

    fn geometry() -> Geometry {
        Geometry::new(800.0, Insets::new(50.0, 30.0))
    }

    #[test]
    fn content_height_ignoring_top_safe_area() {
        let m = SheetMetrics::compute(200.0, &geometry(), Some(100.0), Some(600.0), &SheetConfig::default());
        assert!((m.content_height - 670.0).abs() < 1e-9, "{m:?}");
        assert!(m.content_top_inset.abs() < f64::EPSILON);
        assert!((m.visible_height - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn content_grows_when_pulled_above_top_anchor() {
        let m = SheetMetrics::compute(80.0, &geometry(), Some(100.0), None, &SheetConfig::default());
        assert!((m.content_height - 690.0).abs() < 1e-9, "{m:?}");
    }

    #[test]
    fn visible_bar_shrinks_content() {
        let config = SheetConfig::default().with_bottom_bar(BottomBarConfig::visible(64.0));
        let m = SheetMetrics::compute(200.0, &geometry(), Some(100.0), Some(600.0), &config);
        assert!((m.content_height - 606.0).abs() < 1e-9, "{m:?}");
        let ignoring = config.with_view_ignores(true, true, true);
        let m = SheetMetrics::compute(200.0, &geometry(), Some(100.0), Some(600.0), &ignoring);
        assert!((m.content_height - 700.0).abs() < 1e-9, "{m:?}");
    }

    #[test]
    fn respecting_top_safe_area() {
        let config = SheetConfig::default().with_view_ignores(false, false, false);
        let m = SheetMetrics::compute(20.0, &geometry(), Some(0.0), None, &config);
        assert!((m.content_top_inset - 30.0).abs() < f64::EPSILON);
        assert!((m.content_height - 720.0).abs() < 1e-9, "{m:?}");
        let m = SheetMetrics::compute(60.0, &geometry(), Some(0.0), None, &config);
        assert!(m.content_top_inset.abs() < f64::EPSILON);
    }

    #[test]
    fn no_anchors_no_content() {
        let m = SheetMetrics::compute(0.0, &geometry(), None, None, &SheetConfig::default());
        assert!(m.content_height.abs() < f64::EPSILON);
        assert!(m.bottom_bar_area_height.abs() < f64::EPSILON);
    }

    #[test]
    fn bottom_bar_area_slides_away() {
        let config = SheetConfig::default().with_bottom_bar(BottomBarConfig::visible(64.0));
        let g = geometry();
        let attached = SheetMetrics::compute(500.0, &g, Some(100.0), Some(600.0), &config);
        assert!((attached.bottom_bar_area_height - 94.0).abs() < f64::EPSILON);
        let partial = SheetMetrics::compute(640.0, &g, Some(100.0), Some(600.0), &config);
        assert!((partial.bottom_bar_area_height - 54.0).abs() < f64::EPSILON);
        let gone = SheetMetrics::compute(790.0, &g, Some(100.0), Some(600.0), &config);
        assert!(gone.bottom_bar_area_height.abs() < f64::EPSILON);
    }

    #[test]
    fn hidden_bar_has_no_area() {
        let m = SheetMetrics::compute(500.0, &geometry(), Some(100.0), Some(600.0), &SheetConfig::default());
        assert!(m.bottom_bar_area_height.abs() < f64::EPSILON);
    }
}
