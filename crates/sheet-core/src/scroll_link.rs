#![forbid(unsafe_code)]

//! Linked scroll content: sharing one drag between content and sheet.
//!
//! When the sheet hosts scrollable content, a single finger drag has to
//! either scroll the content or move the sheet, never both. [`ScrollLink`]
//! watches the content's offset while it is being dragged and steals the
//! motion for the sheet at the content's boundary:
//!
//! - **Steal.** Content is pushed away from its top while the sheet can
//!   still expand, or pulled past its top while the sheet can still
//!   collapse. The content is pinned and the sheet moves by the delta,
//!   clamped to the anchor range.
//! - **Overflow.** The sheet already rests on its last (most collapsed)
//!   anchor and the content sits at rest: further pull accumulates into an
//!   overflow that is applied to the sheet through the rubber band. Skipped
//!   when the content can be refreshed, so its refresh control keeps the
//!   gesture.
//! - **Pass through.** Anything else scrolls the content normally.
//!
//! Content offsets grow as content scrolls up; the rest offset is
//! `-inset_top`. Deltas are `last - current`, so a positive delta means the
//! finger moves down.
//!
//! # Invariants
//!
//! 1. The content offset is only rewritten while `listening` is off, so
//!    feedback from those writes is not mistaken for user motion.
//! 2. The overflow accumulator is never negative and is reset on every
//!    release.
//! 3. A drag rejected by the interrupt policy is never tracked, so its
//!    release does not settle the sheet.

use crate::interrupt::InterruptTrigger;
use crate::rubber;

/// Host scroll view linked to the sheet.
pub trait ScrollContent {
    /// Current vertical content offset.
    fn content_offset(&self) -> f64;
    /// Overwrite the vertical content offset.
    fn set_content_offset(&mut self, offset: f64);
    /// Top content inset; the rest offset is its negation.
    fn content_inset_top(&self) -> f64;
    /// Whether the content has a refresh control that owns pull-down.
    fn can_be_refreshed(&self) -> bool {
        false
    }
    /// Halt any deceleration in progress.
    fn stop_scrolling(&mut self);
}

/// Drag tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScrollState {
    /// Content is not being dragged (or the drag is not tracked).
    #[default]
    Idle,
    /// Content drag in progress; last offset observed or written.
    Dragging { last_content_offset: f64 },
}

/// Sheet state the arbitration reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetFrame {
    /// Sheet offset.
    pub offset: f64,
    /// Anchor range `(min, max)`, if any anchors exist.
    pub bounds: Option<(f64, f64)>,
    /// Container height, for the rubber band.
    pub container_height: f64,
    /// Whether overshoot is softened.
    pub bounces: bool,
    /// Rubber-band coefficient.
    pub bounces_factor: f64,
    /// Offset comparison tolerance.
    pub epsilon: f64,
}

/// Velocity magnitude (units per second) treated as a standstill on release.
pub const RELEASE_VELOCITY_EPSILON: f64 = 1e-3;

/// Scroll-link arbitration state.
#[derive(Debug, Clone)]
pub struct ScrollLink {
    state: ScrollState,
    listening: bool,
    overflow: f64,
}

impl Default for ScrollLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollLink {
    /// Idle, listening link.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ScrollState::Idle,
            listening: true,
            overflow: 0.0,
        }
    }

    /// Current drag state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Whether content callbacks are being processed.
    #[inline]
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Accumulated pull past the last anchor.
    #[inline]
    #[must_use]
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Whether a content drag is tracked.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ScrollState::Dragging { .. })
    }

    /// Content is about to be dragged. Returns `true` if the drag is
    /// tracked, in which case the engine cancels its animation and
    /// announces a scroll update.
    pub fn will_begin_dragging(
        &mut self,
        content: &dyn ScrollContent,
        active_policy: Option<InterruptTrigger>,
    ) -> bool {
        let blocked =
            active_policy.is_some_and(|p| !p.permits(InterruptTrigger::SCROLL_DRAGGING));
        if !self.listening || blocked {
            self.state = ScrollState::Idle;
            #[cfg(feature = "tracing")]
            tracing::trace!(listening = self.listening, blocked, "scroll drag ignored");
            return false;
        }
        self.state = ScrollState::Dragging {
            last_content_offset: content.content_offset(),
        };
        true
    }

    /// Content offset changed. Returns the new sheet offset when the motion
    /// was stolen for the sheet.
    pub fn did_scroll(&mut self, content: &mut dyn ScrollContent, sheet: &SheetFrame) -> Option<f64> {
        let offset = content.content_offset();
        let rest = -content.content_inset_top();

        let ScrollState::Dragging {
            last_content_offset,
        } = self.state
        else {
            if self.listening && offset < rest && !content.can_be_refreshed() {
                content.stop_scrolling();
            }
            return None;
        };
        if !self.listening {
            return None;
        }
        let (lower, upper) = sheet.bounds?;
        let eps = sheet.epsilon;
        let y = sheet.offset;
        let delta = last_content_offset - offset;

        let expanding = delta < 0.0 && offset > rest && y > lower + eps;
        let collapsing = delta > 0.0 && offset < rest && y < upper - eps;
        if (expanding || collapsing) && self.overflow == 0.0 {
            let pinned = if delta > 0.0 { rest } else { offset + delta };
            self.write_content(content, pinned);
            self.state = ScrollState::Dragging {
                last_content_offset: content.content_offset(),
            };
            #[cfg(feature = "tracing")]
            tracing::trace!(delta, "scroll stolen for sheet");
            return Some((y + delta).clamp(lower, upper));
        }

        let at_rest = (last_content_offset - rest).abs() <= eps;
        if !content.can_be_refreshed()
            && at_rest
            && y >= upper - eps
            && (delta > 0.0 || self.overflow > 0.0)
        {
            self.overflow = (self.overflow + delta).max(0.0);
            if content.content_offset() != rest {
                self.write_content(content, rest);
            }
            self.state = ScrollState::Dragging {
                last_content_offset: rest,
            };
            return Some(rubber::clamp_offset(
                upper + self.overflow,
                (lower, upper),
                sheet.container_height,
                sheet.bounces,
                sheet.bounces_factor,
            ));
        }

        self.state = ScrollState::Dragging {
            last_content_offset: offset,
        };
        None
    }

    /// Content drag released with `velocity` (content units per second,
    /// positive when content scrolls up). `target_content_offset` is the
    /// host's deceleration target and may be rewritten to stop the content.
    ///
    /// Returns the sheet velocity (units per second) to settle with, or
    /// `None` when the drag was not tracked.
    pub fn will_end_dragging(
        &mut self,
        content: &dyn ScrollContent,
        velocity: f64,
        target_content_offset: &mut f64,
        sheet: &SheetFrame,
    ) -> Option<f64> {
        if !self.listening {
            return None;
        }
        let was_dragging = self.is_dragging();
        self.state = ScrollState::Idle;
        self.overflow = 0.0;
        if !was_dragging {
            return None;
        }

        let panel_velocity = -velocity;
        if panel_velocity.abs() <= RELEASE_VELOCITY_EPSILON {
            return Some(0.0);
        }
        let eps = sheet.epsilon;
        let above_min = sheet.bounds.is_some_and(|(lower, _)| sheet.offset > lower + eps);
        let current = content.content_offset();

        if panel_velocity > 0.0 {
            if above_min {
                *target_content_offset = current;
                Some(panel_velocity)
            } else {
                Some(0.0)
            }
        } else {
            let rest = -content.content_inset_top();
            if current > rest + eps {
                Some(0.0)
            } else {
                if above_min {
                    *target_content_offset = current;
                }
                Some(panel_velocity)
            }
        }
    }

    /// Drop any tracked drag and overflow.
    pub fn reset(&mut self) {
        self.state = ScrollState::Idle;
        self.overflow = 0.0;
        self.listening = true;
    }

    fn write_content(&mut self, content: &mut dyn ScrollContent, offset: f64) {
        self.listening = false;
        content.set_content_offset(offset);
        self.listening = true;
    }
}
