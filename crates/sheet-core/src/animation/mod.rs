#![forbid(unsafe_code)]

//! Frame-driven settle animation.
//!
//! A [`SpringAnimation`] carries the sheet from its current offset to a
//! target along a [`spring::SpringTiming`] curve. It owns no timer: the host
//! calls [`SpringAnimation::advance`] once per rendered frame with the time
//! since the previous frame, and [`FrameClock`] turns wall-clock instants
//! into those deltas.
//!
//! # Invariants
//!
//! 1. A finished animation reports the exact target once, never a value
//!    within the threshold.
//! 2. Retargeting restarts the curve from the current offset and the current
//!    instantaneous velocity, so the offset is continuous across the change.
//! 3. Advancing a finished animation is a no-op that keeps reporting the
//!    target.

pub mod spring;

use std::time::Duration;

use crate::interrupt::InterruptTrigger;
use spring::{SpringParameters, SpringTiming};

/// Identity of one animation over the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

impl AnimationId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Reference to a running animation, handed to subscribers when it starts.
///
/// The handle stays valid only while that animation is the active one; the
/// engine ignores requests made through a stale handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationHandle {
    id: AnimationId,
    target: f64,
    interrupt_triggers: InterruptTrigger,
}

impl AnimationHandle {
    /// Animation identity.
    #[inline]
    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// Target offset at the time the handle was issued.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Interrupt policy of the animation.
    #[inline]
    pub fn interrupt_triggers(&self) -> InterruptTrigger {
        self.interrupt_triggers
    }
}

/// Result of advancing an animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Offset to commit for this frame.
    pub offset: f64,
    /// Whether the animation has settled; `offset` is then the exact target.
    pub finished: bool,
}

/// A retargetable spring settle toward one offset.
#[derive(Debug, Clone)]
pub struct SpringAnimation {
    id: AnimationId,
    parameters: SpringParameters,
    threshold: f64,
    interrupt_triggers: InterruptTrigger,
    target: f64,
    timing: SpringTiming,
    elapsed: Duration,
    offset: f64,
    finished: bool,
}

impl SpringAnimation {
    /// Start a settle from `origin` toward `target` with `velocity` in units
    /// per second.
    #[must_use]
    pub fn new(
        id: AnimationId,
        origin: f64,
        target: f64,
        velocity: f64,
        parameters: SpringParameters,
        threshold: f64,
        interrupt_triggers: InterruptTrigger,
    ) -> Self {
        let threshold = threshold.abs();
        Self {
            id,
            parameters,
            threshold,
            interrupt_triggers,
            target,
            timing: SpringTiming::new(parameters, origin - target, velocity, threshold),
            elapsed: Duration::ZERO,
            offset: origin,
            finished: false,
        }
    }

    /// Animation identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// Handle describing this animation.
    #[must_use]
    pub fn handle(&self) -> AnimationHandle {
        AnimationHandle {
            id: self.id,
            target: self.target,
            interrupt_triggers: self.interrupt_triggers,
        }
    }

    /// Current target offset.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Offset reported by the last frame.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Instantaneous velocity in units per second.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        if self.finished {
            0.0
        } else {
            self.timing.velocity(self.elapsed.as_secs_f64())
        }
    }

    /// Interrupt policy declared at start.
    #[inline]
    #[must_use]
    pub fn interrupt_triggers(&self) -> InterruptTrigger {
        self.interrupt_triggers
    }

    /// Whether the animation has settled.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time since the curve (re)started.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Analytic settle time of the current curve.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timing.duration()).unwrap_or(Duration::MAX)
    }

    /// Change the target mid-flight, keeping offset and velocity continuous.
    pub fn retarget(&mut self, target: f64) {
        if self.finished {
            return;
        }
        let velocity = self.velocity();
        self.target = target;
        self.timing = SpringTiming::new(
            self.parameters,
            self.offset - target,
            velocity,
            self.threshold,
        );
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `dt` and report the offset for this frame.
    pub fn advance(&mut self, dt: Duration) -> Tick {
        if self.finished {
            return Tick {
                offset: self.target,
                finished: true,
            };
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let t = self.elapsed.as_secs_f64();
        if self.timing.amplitude(t) < self.threshold {
            self.finished = true;
            self.offset = self.target;
        } else {
            self.offset = self.target + self.timing.value(t);
        }
        Tick {
            offset: self.offset,
            finished: self.finished,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame clock
// ---------------------------------------------------------------------------

/// Turns frame timestamps into per-frame deltas.
///
/// The first frame after construction or [`FrameClock::reset`] yields a zero
/// delta. Deltas are capped so a stalled host does not teleport the sheet.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<web_time::Instant>,
    max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Default cap on a single frame delta (100ms).
    pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(100);

    /// Create a clock with the default cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: None,
            max_delta: Self::DEFAULT_MAX_DELTA,
        }
    }

    /// Set the per-frame cap (builder pattern).
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Delta since the previous frame, stamped with `now`.
    pub fn frame_at(&mut self, now: web_time::Instant) -> Duration {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).min(self.max_delta),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        dt
    }

    /// Delta since the previous frame, stamped with the current instant.
    pub fn frame(&mut self) -> Duration {
        self.frame_at(web_time::Instant::now())
    }

    /// Forget the previous frame.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
