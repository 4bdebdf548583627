//! Property-based invariant tests for the sheet engine under arbitrary
//! interleavings of drags, programmatic moves, and frame ticks.
//!
//! 1. The offset is always finite
//! 2. Every completion callback runs exactly once
//! 3. At most one animation is active, and the handle tracks it
//! 4. After draining, a settled sheet with no pending drag rests on an anchor
//! 5. The same input sequence yields the same offset trace

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use sheet_core::{Completion, DragEvent, Geometry, InterruptTrigger, Position, SheetConfig, SheetEngine, SourceId};

const FRAME: Duration = Duration::from_millis(16);
const DRAIN_FRAMES: usize = 5_000;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    MoveTo { index: usize, animated: bool, triggers: u8 },
    ScrollTo { offset: f64, animated: bool },
    Nearest { velocity: f64 },
    DragBegin,
    DragChange { translation: f64 },
    DragEnd { velocity: f64 },
    DragCancel,
    Cancel,
    Tick { ms: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, any::<bool>(), 0u8..8).prop_map(|(index, animated, triggers)| Op::MoveTo {
            index,
            animated,
            triggers
        }),
        (-200.0f64..1_200.0, any::<bool>())
            .prop_map(|(offset, animated)| Op::ScrollTo { offset, animated }),
        (-5_000.0f64..5_000.0).prop_map(|velocity| Op::Nearest { velocity }),
        Just(Op::DragBegin),
        (-800.0f64..800.0).prop_map(|translation| Op::DragChange { translation }),
        (-5_000.0f64..5_000.0).prop_map(|velocity| Op::DragEnd { velocity }),
        Just(Op::DragCancel),
        Just(Op::Cancel),
        (0u64..50).prop_map(|ms| Op::Tick { ms }),
    ]
}

fn positions() -> Vec<Position> {
    vec![
        Position::from_top(50.0),
        Position::middle(),
        Position::from_bottom(100.0),
    ]
}

fn sheet() -> SheetEngine {
    let mut sheet = SheetEngine::new(SheetConfig::default())
        .with_positions(positions())
        .with_initial_position(Position::middle());
    sheet.layout(Geometry::from_height(1000.0));
    sheet
}

fn completion(counters: &mut Vec<Rc<Cell<u32>>>) -> Option<Completion> {
    let counter = Rc::new(Cell::new(0));
    counters.push(Rc::clone(&counter));
    Some(Box::new(move |_| counter.set(counter.get() + 1)))
}

/// Apply `ops`, returning one counter per completion handed out and the
/// offset after every op.
fn apply(sheet: &mut SheetEngine, ops: &[Op]) -> (Vec<Rc<Cell<u32>>>, Vec<f64>) {
    let mut counters = Vec::new();
    let mut trace = Vec::new();
    let id = SourceId(1);
    for op in ops {
        match *op {
            Op::MoveTo { index, animated, triggers } => {
                let triggers = InterruptTrigger::from_bits_truncate(triggers);
                let c = completion(&mut counters);
                sheet.move_to(positions()[index], animated, triggers, c);
            }
            Op::ScrollTo { offset, animated } => {
                let c = completion(&mut counters);
                sheet.scroll_to(offset, animated, InterruptTrigger::all(), c);
            }
            Op::Nearest { velocity } => {
                let c = completion(&mut counters);
                sheet.move_to_nearest_anchor(velocity, c);
            }
            Op::DragBegin => sheet.handle_drag(&DragEvent::began(id)),
            Op::DragChange { translation } => {
                sheet.handle_drag(&DragEvent::changed(id, translation));
            }
            Op::DragEnd { velocity } => sheet.handle_drag(&DragEvent::ended(id, 0.0, velocity)),
            Op::DragCancel => sheet.handle_drag(&DragEvent::cancelled(id)),
            Op::Cancel => {
                sheet.cancel_animation();
            }
            Op::Tick { ms } => {
                sheet.tick(Duration::from_millis(ms));
            }
        }
        trace.push(sheet.offset());
    }
    (counters, trace)
}

fn drain(sheet: &mut SheetEngine) -> bool {
    for _ in 0..DRAIN_FRAMES {
        if !sheet.tick(FRAME) {
            return true;
        }
    }
    false
}

// ═══════════════════════════════════════════════════════════════════════
// 1-3. Safety under arbitrary input
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offset_stays_finite(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut sheet = sheet();
        let (_, trace) = apply(&mut sheet, &ops);
        prop_assert!(trace.iter().all(|y| y.is_finite()));
    }

    #[test]
    fn every_completion_runs_once(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut sheet = sheet();
        let (counters, _) = apply(&mut sheet, &ops);
        sheet.cancel_animation();
        for (i, counter) in counters.iter().enumerate() {
            prop_assert_eq!(counter.get(), 1, "completion {} ran {} times", i, counter.get());
        }
    }

    #[test]
    fn handle_tracks_single_animation(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut sheet = sheet();
        apply(&mut sheet, &ops);
        prop_assert_eq!(sheet.is_animating(), sheet.animation_handle().is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4-5. Settling and determinism
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn release_then_drain_rests_on_anchor(
        ops in prop::collection::vec(op_strategy(), 0..100),
        velocity in -5_000.0f64..5_000.0,
    ) {
        let mut sheet = sheet();
        apply(&mut sheet, &ops);
        sheet.cancel_animation();
        sheet.handle_drag(&DragEvent::cancelled(SourceId(1)));
        sheet.move_to_nearest_anchor(velocity, None);
        prop_assert!(drain(&mut sheet), "animation never settled");
        let y = sheet.offset();
        prop_assert!(
            sheet.anchors().iter().any(|a| (a - y).abs() <= sheet.config().pixel_epsilon),
            "offset {} not on an anchor {:?}", y, sheet.anchors()
        );
    }

    #[test]
    fn same_ops_same_trace(ops in prop::collection::vec(op_strategy(), 0..150)) {
        let mut a = sheet();
        let mut b = sheet();
        let (_, trace_a) = apply(&mut a, &ops);
        let (_, trace_b) = apply(&mut b, &ops);
        prop_assert_eq!(trace_a, trace_b);
    }
}
