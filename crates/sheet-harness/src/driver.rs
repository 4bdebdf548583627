#![forbid(unsafe_code)]

//! Fixed-step frame driver.
//!
//! Stands in for the host's display link: every call to
//! [`FrameDriver::step`] is one rendered frame of exactly
//! [`FrameDriver::interval`]. No wall clock is read, so a script replays
//! the same offsets on every machine.

use std::fmt;
use std::time::Duration;

use sheet_core::SheetEngine;

/// The animation did not settle within the frame budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stalled {
    /// Frames stepped before giving up.
    pub frames: u64,
}

impl fmt::Display for Stalled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet still animating after {} frames", self.frames)
    }
}

impl std::error::Error for Stalled {}

/// Manual frame clock.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    interval: Duration,
    frame: u64,
    elapsed: Duration,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::with_fps(60)
    }
}

impl FrameDriver {
    /// Default frame budget for [`FrameDriver::run_until_idle`].
    pub const DEFAULT_MAX_FRAMES: u64 = 1_200;

    /// Driver with an explicit frame interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Driver at `fps` frames per second (at least 1).
    #[must_use]
    pub fn with_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    /// Frame interval.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Frames stepped so far.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated time stepped so far.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Step one frame. Returns whether the sheet is still animating.
    pub fn step(&mut self, sheet: &mut SheetEngine) -> bool {
        self.frame += 1;
        self.elapsed += self.interval;
        sheet.tick(self.interval)
    }

    /// Step `n` frames, stopping early once the sheet is idle.
    pub fn step_n(&mut self, sheet: &mut SheetEngine, n: u64) -> bool {
        for _ in 0..n {
            if !self.step(sheet) {
                return false;
            }
        }
        sheet.is_animating()
    }

    /// Step until no animation is running, at most `max_frames` frames.
    ///
    /// Returns the number of frames stepped.
    pub fn run_until_idle(&mut self, sheet: &mut SheetEngine, max_frames: u64) -> Result<u64, Stalled> {
        let mut stepped = 0;
        while sheet.is_animating() {
            if stepped == max_frames {
                tracing::warn!(frames = stepped, offset = sheet.offset(), "sheet did not settle");
                return Err(Stalled { frames: stepped });
            }
            self.step(sheet);
            stepped += 1;
        }
        Ok(stepped)
    }
}
