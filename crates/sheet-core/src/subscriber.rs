#![forbid(unsafe_code)]

//! Subscriber registry and notification surface.
//!
//! Subscribers are registered explicitly and identified by a
//! [`SubscriberId`]; they stay registered until unsubscribed. Every
//! notification receives the engine mutably, so a subscriber may call back
//! into it (for example to request another move) from inside a callback.
//!
//! # Invariants
//!
//! 1. Notifications are delivered synchronously, in subscription order.
//! 2. Dispatch iterates over a snapshot: subscribers added or removed
//!    during a dispatch take effect from the next notification on.

use std::fmt;
use std::rc::Rc;

use crate::animation::AnimationHandle;
use crate::engine::SheetEngine;
use crate::interrupt::InterruptTrigger;
use crate::metrics::SheetMetrics;
use crate::position::Position;

/// Input class that caused an offset change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Direct drag on the sheet.
    PanGesture,
    /// Drag on linked scroll content.
    ScrollDragging,
    /// Programmatic request or layout.
    Program,
}

impl ChangeSource {
    /// Interrupt trigger bit of this source.
    #[must_use]
    pub fn trigger(self) -> InterruptTrigger {
        match self {
            Self::PanGesture => InterruptTrigger::PAN_GESTURE,
            Self::ScrollDragging => InterruptTrigger::SCROLL_DRAGGING,
            Self::Program => InterruptTrigger::PROGRAM,
        }
    }
}

/// Receiver of sheet notifications. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait SheetSubscriber {
    /// An interaction from `source` is about to change the offset.
    fn will_begin_updating(&self, sheet: &mut SheetEngine, offset: f64, source: ChangeSource) {}

    /// The offset changed.
    fn did_update(&self, sheet: &mut SheetEngine, offset: f64, source: ChangeSource) {}

    /// The interaction from `source` is over.
    fn did_end_updating(&self, sheet: &mut SheetEngine, offset: f64, source: ChangeSource) {}

    /// A settle animation is starting.
    fn will_begin_animation(
        &self,
        sheet: &mut SheetEngine,
        animation: AnimationHandle,
        source: ChangeSource,
    ) {
    }

    /// The sheet is about to move to `new_offset`.
    fn will_move_to(
        &self,
        sheet: &mut SheetEngine,
        new_offset: f64,
        source: ChangeSource,
        animated: bool,
        interrupt_triggers: InterruptTrigger,
        velocity: Option<f64>,
    ) {
    }

    /// The sheet settled on a declared position.
    fn did_change_position(&self, sheet: &mut SheetEngine, position: &Position, source: ChangeSource) {}

    /// Geometry or bar configuration changed the layout metrics.
    fn did_update_layout(&self, sheet: &mut SheetEngine, metrics: &SheetMetrics, source: ChangeSource) {}
}

/// Registration handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Ordered subscriber registry.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriberId, Rc<dyn SheetSubscriber>)>,
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("ids", &self.entries.iter().map(|(id, _)| id.0).collect::<Vec<_>>())
            .finish()
    }
}

impl Subscribers {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber at the end of the dispatch order.
    pub fn subscribe(&mut self, subscriber: Rc<dyn SheetSubscriber>) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.entries.push((id, subscriber));
        id
    }

    /// Remove a subscriber. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    /// Number of registered subscribers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no subscriber is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribers in dispatch order, detached from the registry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn SheetSubscriber>> {
        self.entries.iter().map(|(_, s)| Rc::clone(s)).collect()
    }
}
