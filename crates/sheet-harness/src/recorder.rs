#![forbid(unsafe_code)]

//! Subscriber that records every engine notification.

use std::cell::RefCell;

use serde_json::{Value, json};
use sheet_core::{
    AnimationHandle, ChangeSource, InterruptTrigger, Position, SheetEngine, SheetMetrics,
    SheetSubscriber,
};

/// One recorded notification.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    WillBeginUpdating {
        offset: f64,
        source: ChangeSource,
    },
    DidUpdate {
        offset: f64,
        source: ChangeSource,
    },
    DidEndUpdating {
        offset: f64,
        source: ChangeSource,
    },
    WillBeginAnimation {
        id: u64,
        target: f64,
        source: ChangeSource,
    },
    WillMoveTo {
        offset: f64,
        source: ChangeSource,
        animated: bool,
        triggers: InterruptTrigger,
        velocity: Option<f64>,
    },
    DidChangePosition {
        position: Position,
        source: ChangeSource,
    },
    DidUpdateLayout {
        metrics: SheetMetrics,
    },
}

fn source_name(source: ChangeSource) -> &'static str {
    match source {
        ChangeSource::PanGesture => "pan",
        ChangeSource::ScrollDragging => "scroll",
        ChangeSource::Program => "program",
    }
}

impl SheetEvent {
    /// Stable event name used in traces.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WillBeginUpdating { .. } => "will_begin_updating",
            Self::DidUpdate { .. } => "did_update",
            Self::DidEndUpdating { .. } => "did_end_updating",
            Self::WillBeginAnimation { .. } => "will_begin_animation",
            Self::WillMoveTo { .. } => "will_move_to",
            Self::DidChangePosition { .. } => "did_change_position",
            Self::DidUpdateLayout { .. } => "did_update_layout",
        }
    }

    /// Source of the change, when the event carries one.
    #[must_use]
    pub fn source(&self) -> Option<ChangeSource> {
        match *self {
            Self::WillBeginUpdating { source, .. }
            | Self::DidUpdate { source, .. }
            | Self::DidEndUpdating { source, .. }
            | Self::WillBeginAnimation { source, .. }
            | Self::WillMoveTo { source, .. }
            | Self::DidChangePosition { source, .. } => Some(source),
            Self::DidUpdateLayout { .. } => None,
        }
    }

    /// JSON fields of this event (without the name).
    #[must_use]
    pub fn fields(&self) -> Value {
        match self {
            Self::WillBeginUpdating { offset, source }
            | Self::DidUpdate { offset, source }
            | Self::DidEndUpdating { offset, source } => {
                json!({ "offset": offset, "source": source_name(*source) })
            }
            Self::WillBeginAnimation { id, target, source } => {
                json!({ "id": id, "target": target, "source": source_name(*source) })
            }
            Self::WillMoveTo {
                offset,
                source,
                animated,
                triggers,
                velocity,
            } => json!({
                "offset": offset,
                "source": source_name(*source),
                "animated": animated,
                "triggers": triggers.bits(),
                "velocity": velocity,
            }),
            Self::DidChangePosition { position, source } => json!({
                "edge": format!("{:?}", position.edge),
                "position_offset": position.offset,
                "ignores_safe_area": position.ignores_safe_area,
                "source": source_name(*source),
            }),
            Self::DidUpdateLayout { metrics } => json!({
                "offset": metrics.offset,
                "visible_height": metrics.visible_height,
                "content_top_inset": metrics.content_top_inset,
                "content_height": metrics.content_height,
                "bottom_bar_area_height": metrics.bottom_bar_area_height,
            }),
        }
    }
}

/// Records notifications in delivery order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: RefCell<Vec<SheetEvent>>,
}

impl EventRecorder {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<SheetEvent> {
        self.events.borrow().clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<SheetEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Event names with consecutive `did_update`s collapsed, for order
    /// assertions that should not depend on frame counts.
    #[must_use]
    pub fn outline(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for event in self.events.borrow().iter() {
            let name = event.name();
            if name == "did_update" && out.last() == Some(&"did_update") {
                continue;
            }
            out.push(name);
        }
        out
    }

    /// Completed settles: positions reported by `did_change_position`.
    #[must_use]
    pub fn settled_positions(&self) -> Vec<Position> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SheetEvent::DidChangePosition { position, .. } => Some(*position),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SheetEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl SheetSubscriber for EventRecorder {
    fn will_begin_updating(&self, _: &mut SheetEngine, offset: f64, source: ChangeSource) {
        self.push(SheetEvent::WillBeginUpdating { offset, source });
    }

    fn did_update(&self, _: &mut SheetEngine, offset: f64, source: ChangeSource) {
        self.push(SheetEvent::DidUpdate { offset, source });
    }

    fn did_end_updating(&self, _: &mut SheetEngine, offset: f64, source: ChangeSource) {
        self.push(SheetEvent::DidEndUpdating { offset, source });
    }

    fn will_begin_animation(&self, _: &mut SheetEngine, animation: AnimationHandle, source: ChangeSource) {
        self.push(SheetEvent::WillBeginAnimation {
            id: animation.id().get(),
            target: animation.target(),
            source,
        });
    }

    fn will_move_to(
        &self,
        _: &mut SheetEngine,
        new_offset: f64,
        source: ChangeSource,
        animated: bool,
        interrupt_triggers: InterruptTrigger,
        velocity: Option<f64>,
    ) {
        self.push(SheetEvent::WillMoveTo {
            offset: new_offset,
            source,
            animated,
            triggers: interrupt_triggers,
            velocity,
        });
    }

    fn did_change_position(&self, _: &mut SheetEngine, position: &Position, source: ChangeSource) {
        self.push(SheetEvent::DidChangePosition {
            position: *position,
            source,
        });
    }

    fn did_update_layout(&self, _: &mut SheetEngine, metrics: &SheetMetrics, _: ChangeSource) {
        self.push(SheetEvent::DidUpdateLayout { metrics: *metrics });
    }
}
