#![forbid(unsafe_code)]

//! Scripted stand-ins for the host's scroll view and pan recognizer.

use sheet_core::{DragEvent, ScrollContent, SourceId};

/// Scroll view whose offset is moved by the test script.
///
/// Writes made by the engine are counted separately from script moves so
/// tests can tell pinning from user motion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedContent {
    offset: f64,
    inset_top: f64,
    refreshable: bool,
    stop_requests: u32,
    engine_writes: u32,
}

impl ScriptedContent {
    /// Content resting at its top with `inset_top`.
    #[must_use]
    pub fn new(inset_top: f64) -> Self {
        Self {
            offset: -inset_top,
            inset_top,
            ..Self::default()
        }
    }

    /// Give the content a refresh control (builder pattern).
    #[must_use]
    pub fn refreshable(mut self, refreshable: bool) -> Self {
        self.refreshable = refreshable;
        self
    }

    /// Rest offset (`-inset_top`).
    #[inline]
    #[must_use]
    pub fn rest(&self) -> f64 {
        -self.inset_top
    }

    /// Current offset.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Script move: the finger scrolled the content to `offset`.
    pub fn scroll_to(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Script move by `delta` (positive scrolls content up).
    pub fn scroll_by(&mut self, delta: f64) {
        self.offset += delta;
    }

    /// How often the engine asked the content to stop decelerating.
    #[inline]
    #[must_use]
    pub fn stop_requests(&self) -> u32 {
        self.stop_requests
    }

    /// How often the engine overwrote the offset.
    #[inline]
    #[must_use]
    pub fn engine_writes(&self) -> u32 {
        self.engine_writes
    }
}

impl ScrollContent for ScriptedContent {
    fn content_offset(&self) -> f64 {
        self.offset
    }

    fn set_content_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.engine_writes += 1;
    }

    fn content_inset_top(&self) -> f64 {
        self.inset_top
    }

    fn can_be_refreshed(&self) -> bool {
        self.refreshable
    }

    fn stop_scrolling(&mut self) {
        self.stop_requests += 1;
    }
}

/// One finger on the sheet: emits cumulative pan samples.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedDrag {
    source: SourceId,
    translation: f64,
}

impl ScriptedDrag {
    /// Drag bound to the gesture instance `source`.
    #[must_use]
    pub fn new(source: u64) -> Self {
        Self {
            source: SourceId(source),
            translation: 0.0,
        }
    }

    /// Gesture instance.
    #[inline]
    #[must_use]
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Finger down.
    pub fn begin(&mut self) -> DragEvent {
        self.translation = 0.0;
        DragEvent::began(self.source)
    }

    /// Finger moved by `dy` (positive is down).
    pub fn move_by(&mut self, dy: f64) -> DragEvent {
        self.translation += dy;
        DragEvent::changed(self.source, self.translation)
    }

    /// Finger lifted with `velocity` in units per second.
    #[must_use]
    pub fn release(&self, velocity: f64) -> DragEvent {
        DragEvent::ended(self.source, self.translation, velocity)
    }

    /// System cancelled the gesture.
    #[must_use]
    pub fn cancel(&self) -> DragEvent {
        DragEvent::cancelled(self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::DragPhase;

    #[test]
    fn content_starts_at_rest() {
        let c = ScriptedContent::new(20.0);
        assert!((c.offset() + 20.0).abs() < f64::EPSILON);
        assert!((c.rest() + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn engine_writes_are_counted_apart_from_script() {
        let mut c = ScriptedContent::new(0.0);
        c.scroll_by(10.0);
        c.set_content_offset(0.0);
        c.stop_scrolling();
        assert_eq!(c.engine_writes(), 1);
        assert_eq!(c.stop_requests(), 1);
        assert!(c.offset().abs() < f64::EPSILON);
    }

    #[test]
    fn drag_accumulates_translation() {
        let mut d = ScriptedDrag::new(3);
        assert_eq!(d.begin().phase, DragPhase::Began);
        d.move_by(10.0);
        let e = d.move_by(-4.0);
        assert!((e.translation - 6.0).abs() < f64::EPSILON);
        let r = d.release(250.0);
        assert_eq!(r.phase, DragPhase::Ended);
        assert!((r.velocity - 250.0).abs() < f64::EPSILON);
        assert_eq!(r.source, SourceId(3));
    }
}
