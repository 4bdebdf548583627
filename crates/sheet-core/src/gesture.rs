#![forbid(unsafe_code)]

//! Direct-drag adapter: turns host pan phases into sheet actions.
//!
//! [`PanState`] is a small state machine fed with [`DragSource`] samples.
//! It does not touch the sheet; it tells the engine what to do via
//! [`PanAction`].
//!
//! # State Machine
//!
//! ```text
//! Idle --Began (policy allows pan)--> Dragging { initial_offset, source }
//! Dragging --Changed (same source)--> Dragging            => Update
//! Dragging --Ended (same source)----> Idle                => Release
//! Dragging --Cancelled | Failed-----> Idle                => Abort
//! ```
//!
//! # Invariants
//!
//! 1. Changes and ends from a source other than the one that began the
//!    drag are ignored.
//! 2. A begin rejected by the interrupt policy leaves the state idle, so
//!    the rest of that gesture is ignored as well.
//! 3. Every `Begin` is followed by exactly one `Release` or `Abort` unless a
//!    new `Begin` replaces the drag first.
//!
//! # Failure Modes
//!
//! - A `Began` while already dragging restarts the drag from the current
//!   offset; the host lost an end event.

use crate::interrupt::InterruptTrigger;

/// Identity of one host gesture instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u64);

/// Phase reported by the host's pan recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragPhase {
    /// Finger went down and the recognizer claimed the touch.
    Began,
    /// Translation changed.
    Changed,
    /// Finger lifted.
    Ended,
    /// The system cancelled the gesture.
    Cancelled,
    /// The recognizer failed.
    Failed,
}

/// A pan sample from the host.
pub trait DragSource {
    /// Phase of this sample.
    fn phase(&self) -> DragPhase;
    /// Identity of the gesture instance.
    fn source_id(&self) -> SourceId;
    /// Vertical translation since the gesture began.
    fn translation(&self) -> f64;
    /// Vertical velocity in units per second.
    fn velocity(&self) -> f64;
}

/// Plain-data [`DragSource`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    /// Phase.
    pub phase: DragPhase,
    /// Gesture instance.
    pub source: SourceId,
    /// Translation since begin.
    pub translation: f64,
    /// Velocity in units per second.
    pub velocity: f64,
}

impl DragEvent {
    /// A begin sample.
    #[must_use]
    pub fn began(source: SourceId) -> Self {
        Self {
            phase: DragPhase::Began,
            source,
            translation: 0.0,
            velocity: 0.0,
        }
    }

    /// A change sample with the cumulative translation.
    #[must_use]
    pub fn changed(source: SourceId, translation: f64) -> Self {
        Self {
            phase: DragPhase::Changed,
            source,
            translation,
            velocity: 0.0,
        }
    }

    /// An end sample with the release velocity.
    #[must_use]
    pub fn ended(source: SourceId, translation: f64, velocity: f64) -> Self {
        Self {
            phase: DragPhase::Ended,
            source,
            translation,
            velocity,
        }
    }

    /// A cancel sample.
    #[must_use]
    pub fn cancelled(source: SourceId) -> Self {
        Self {
            phase: DragPhase::Cancelled,
            source,
            translation: 0.0,
            velocity: 0.0,
        }
    }
}

impl DragSource for DragEvent {
    fn phase(&self) -> DragPhase {
        self.phase
    }

    fn source_id(&self) -> SourceId {
        self.source
    }

    fn translation(&self) -> f64 {
        self.translation
    }

    fn velocity(&self) -> f64 {
        self.velocity
    }
}

/// What the engine should do in response to a pan sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanAction {
    /// Nothing.
    Ignore,
    /// Cancel any animation and announce a pan update.
    Begin,
    /// Move to `candidate` (before overshoot clamping).
    Update { candidate: f64 },
    /// Settle on the nearest anchor with `velocity` (units per second).
    Release { velocity: f64 },
    /// Stop without further movement: the drag was cancelled or the
    /// running animation excludes pan input.
    Abort,
}

/// Direct-drag state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Dragging since `initial_offset`, bound to `source`.
    Dragging { initial_offset: f64, source: SourceId },
}

impl PanState {
    /// Whether a drag is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Feed one sample.
    ///
    /// `offset` is the sheet offset now and `active_policy` the interrupt
    /// policy of the running animation, if any. A drag in progress is
    /// aborted as soon as a running animation excludes pan input.
    pub fn process(
        &mut self,
        event: &dyn DragSource,
        offset: f64,
        active_policy: Option<InterruptTrigger>,
    ) -> PanAction {
        let id = event.source_id();
        let excluded = active_policy.is_some_and(|p| !p.permits(InterruptTrigger::PAN_GESTURE));
        let tracked = matches!(*self, Self::Dragging { source, .. } if source == id);
        let action = match event.phase() {
            DragPhase::Began if excluded => {
                self.reset();
                PanAction::Ignore
            }
            DragPhase::Began => {
                *self = Self::Dragging {
                    initial_offset: offset,
                    source: id,
                };
                PanAction::Begin
            }
            _ if !tracked => PanAction::Ignore,
            DragPhase::Cancelled | DragPhase::Failed => {
                self.reset();
                PanAction::Abort
            }
            _ if excluded => {
                self.reset();
                PanAction::Abort
            }
            DragPhase::Changed => match *self {
                Self::Dragging { initial_offset, .. } => PanAction::Update {
                    candidate: initial_offset + event.translation(),
                },
                Self::Idle => PanAction::Ignore,
            },
            DragPhase::Ended => {
                self.reset();
                PanAction::Release {
                    velocity: event.velocity(),
                }
            }
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(phase = ?event.phase(), source = id.0, action = ?action, "pan sample");

        action
    }

    /// Drop any drag without emitting anything.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
