//! End-to-end sheet scenarios replayed through the scripted host.

use sheet_core::{ChangeSource, DragEvent, InterruptTrigger, Position, SourceId};
use sheet_harness::{Scenario, SheetEvent, Step, init_test_logging};

fn detents() -> Vec<Position> {
    vec![
        Position::from_top(0.0),
        Position::from_top(100.0),
        Position::from_top(300.0),
    ]
}

fn at(offset: f64) -> Scenario {
    Scenario::new(format!("sheet_at_{offset}"))
        .with_positions(detents())
        .with_initial(Position::from_top(offset))
}

fn updates(events: &[SheetEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            SheetEvent::DidUpdate { offset, .. } => Some(*offset),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Scroll steal then release
// ============================================================================

#[test]
fn scroll_steal_then_release_settles_nearest() {
    init_test_logging();
    let run = at(100.0)
        .steps([
            Step::ScrollBegin,
            Step::ScrollBy(30.0),
            Step::ScrollEnd { velocity: 0.0 },
            Step::Settle,
        ])
        .run()
        .expect("settles");

    let stolen = run
        .events
        .iter()
        .find_map(|e| match e {
            SheetEvent::DidUpdate {
                offset,
                source: ChangeSource::ScrollDragging,
            } => Some(*offset),
            _ => None,
        })
        .expect("scroll moved the sheet");
    assert!((stolen - 70.0).abs() < f64::EPSILON);
    assert!(run.content.offset().abs() < f64::EPSILON, "content pinned to its inset edge");
    assert!((run.offset() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn scroll_steal_respects_content_inset() {
    let run = at(100.0)
        .with_content_inset(20.0)
        .steps([Step::ScrollBegin, Step::ScrollBy(30.0)])
        .run()
        .expect("no animation");
    assert!((run.offset() - 70.0).abs() < f64::EPSILON);
    assert!((run.content.offset() + 20.0).abs() < f64::EPSILON);
    assert_eq!(run.content.engine_writes(), 1);
}

#[test]
fn expanded_sheet_passes_scroll_to_content() {
    let run = at(0.0)
        .steps([Step::ScrollBegin, Step::ScrollBy(30.0), Step::ScrollBy(20.0)])
        .run()
        .expect("no animation");
    assert!(run.offset().abs() < f64::EPSILON);
    assert!((run.content.offset() - 50.0).abs() < f64::EPSILON);
    assert_eq!(run.content.engine_writes(), 0);
}

#[test]
fn pull_past_last_anchor_rubber_bands() {
    let run = at(300.0)
        .steps([Step::ScrollBegin, Step::ScrollBy(-40.0)])
        .run()
        .expect("no animation");
    let y = run.offset();
    assert!(y > 300.0 && y < 340.0, "overflow softened to {y}");
    assert!(run.content.offset().abs() < f64::EPSILON);
}

#[test]
fn refreshable_content_keeps_pull_down_at_last_anchor() {
    let run = at(300.0)
        .with_refreshable_content(true)
        .steps([Step::ScrollBegin, Step::ScrollBy(-40.0)])
        .run()
        .expect("no animation");
    assert!((run.offset() - 300.0).abs() < f64::EPSILON);
    assert!((run.content.offset() + 40.0).abs() < f64::EPSILON);
}

// ============================================================================
// Programmatic move while a gesture settle is in flight
// ============================================================================

#[test]
fn program_move_interrupts_pan_settle_without_jump() {
    init_test_logging();
    let id = SourceId(1);
    let run = at(100.0)
        .steps([
            Step::Drag(DragEvent::began(id)),
            Step::Drag(DragEvent::changed(id, 40.0)),
            Step::Drag(DragEvent::ended(id, 40.0, 800.0)),
            Step::Frames(4),
            Step::MoveTo {
                position: Position::from_top(0.0),
                animated: true,
                triggers: InterruptTrigger::all(),
            },
            Step::Settle,
        ])
        .run()
        .expect("settles");

    assert_eq!(run.completions_for(4), vec![true]);
    assert!(run.offset().abs() < f64::EPSILON);

    let animations: Vec<_> = run
        .events
        .iter()
        .filter(|e| matches!(e, SheetEvent::WillBeginAnimation { .. }))
        .collect();
    assert_eq!(animations.len(), 2, "pan settle then program move");

    let ends: Vec<_> = run
        .events
        .iter()
        .filter_map(|e| match e {
            SheetEvent::DidEndUpdating { source, .. } => Some(*source),
            _ => None,
        })
        .collect();
    assert_eq!(ends, vec![ChangeSource::PanGesture, ChangeSource::Program]);

    let trail = updates(&run.events);
    let max_step = trail
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0_f64, f64::max);
    assert!(max_step < 80.0, "largest per-frame jump {max_step}");
}

#[test]
fn program_only_animation_ignores_pan_begin() {
    let id = SourceId(9);
    let run = at(100.0)
        .steps([
            Step::MoveTo {
                position: Position::from_top(300.0),
                animated: true,
                triggers: InterruptTrigger::PROGRAM,
            },
            Step::Frames(2),
            Step::Drag(DragEvent::began(id)),
            Step::Drag(DragEvent::changed(id, -50.0)),
            Step::Drag(DragEvent::ended(id, -50.0, 0.0)),
            Step::Settle,
        ])
        .run()
        .expect("settles");

    assert!(
        !run.events.iter().any(|e| matches!(
            e,
            SheetEvent::WillBeginUpdating {
                source: ChangeSource::PanGesture,
                ..
            }
        )),
        "pan must not begin an update"
    );
    assert_eq!(run.completions_for(0), vec![true]);
    assert!((run.offset() - 300.0).abs() < f64::EPSILON);
}

#[test]
fn second_move_leaves_one_animation() {
    let run = at(100.0)
        .steps([
            Step::MoveTo {
                position: Position::from_top(300.0),
                animated: true,
                triggers: InterruptTrigger::all(),
            },
            Step::Frames(1),
            Step::MoveTo {
                position: Position::from_top(0.0),
                animated: true,
                triggers: InterruptTrigger::all(),
            },
            Step::Settle,
        ])
        .run()
        .expect("settles");
    assert_eq!(run.completions_for(0), vec![false]);
    assert_eq!(run.completions_for(2), vec![true]);
    assert_eq!(
        run.events
            .iter()
            .filter(|e| matches!(e, SheetEvent::DidChangePosition { .. }))
            .count(),
        1
    );
}

#[test]
fn flick_moves_one_detent_even_when_projection_stays() {
    let id = SourceId(2);
    let run = at(100.0)
        .steps([
            Step::Drag(DragEvent::began(id)),
            Step::Drag(DragEvent::changed(id, 30.0)),
            Step::Drag(DragEvent::ended(id, 30.0, -50.0)),
            Step::Settle,
        ])
        .run()
        .expect("settles");
    // Released at 130 moving up: nearest to the projection is 100, which is
    // already in the direction of motion.
    assert!((run.offset() - 100.0).abs() < f64::EPSILON);

    let run = at(100.0)
        .steps([
            Step::Drag(DragEvent::began(id)),
            Step::Drag(DragEvent::changed(id, -60.0)),
            Step::Drag(DragEvent::ended(id, -60.0, 10.0)),
            Step::Settle,
        ])
        .run()
        .expect("settles");
    // Released at 40 moving down slowly: projection lands nearest 0, behind
    // the motion, so the sheet advances to 100.
    assert!((run.offset() - 100.0).abs() < f64::EPSILON);
}
