#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! The engine reports animation lifecycle and rejected input through
//! `tracing` events under the `sheet_core` target.
//!
//! Run:
//!   cargo test -p sheet-core --features tracing --test tracing_events

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sheet_core::{Geometry, InterruptTrigger, Position, SheetConfig, SheetEngine};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<CapturedEvent>>>);

impl Capture {
    fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Capture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields: visitor.0,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Capture) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, capture)
}

fn sheet() -> SheetEngine {
    let mut sheet = SheetEngine::new(SheetConfig::default())
        .with_positions(vec![Position::top(), Position::middle()])
        .with_initial_position(Position::middle());
    sheet.layout(Geometry::from_height(800.0));
    sheet
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn animation_lifecycle_is_logged() {
    let (offset, capture) = capture(|| {
        let mut sheet = sheet();
        sheet.move_to(Position::top(), true, InterruptTrigger::all(), None);
        for _ in 0..600 {
            sheet.tick(Duration::from_millis(16));
            if !sheet.is_animating() {
                break;
            }
        }
        sheet.offset()
    });
    assert!(offset.abs() < f64::EPSILON);

    let messages = capture.messages();
    let started = messages
        .iter()
        .position(|m| m == "sheet animation started")
        .expect("start logged");
    let finished = messages
        .iter()
        .position(|m| m == "sheet animation finished")
        .expect("finish logged");
    assert!(started < finished);

    let start = &capture.events()[started];
    assert_eq!(start.level, tracing::Level::DEBUG);
    assert_eq!(start.target, "sheet_core::engine");
    assert_eq!(start.field("target"), Some("0"));
    assert_eq!(start.field("source"), Some("Program"));
}

#[test]
fn interrupted_animation_logs_cancel() {
    let ((), capture) = capture(|| {
        let mut sheet = sheet();
        sheet.move_to(Position::top(), true, InterruptTrigger::all(), None);
        sheet.tick(Duration::from_millis(16));
        sheet.move_to(Position::middle(), true, InterruptTrigger::all(), None);
    });
    let messages = capture.messages();
    assert_eq!(
        messages
            .iter()
            .filter(|m| *m == "sheet animation started")
            .count(),
        2
    );
    assert!(messages.iter().any(|m| m == "sheet animation cancelled"));
}

#[test]
fn rejected_inputs_are_logged() {
    let ((), capture) = capture(|| {
        let mut sheet = sheet();
        sheet.move_to(Position::bottom(), true, InterruptTrigger::all(), None);
        sheet.layout(Geometry::from_height(f64::NAN));
    });
    let events = capture.events();
    assert!(
        events
            .iter()
            .any(|e| e.message == "sheet move to unavailable position rejected")
    );
    let warn = events
        .iter()
        .find(|e| e.message == "non-finite sheet geometry ignored")
        .expect("geometry warning");
    assert_eq!(warn.level, tracing::Level::WARN);
}

#[test]
fn invalid_config_warns_when_sanitised() {
    let ((), capture) = capture(|| {
        let _ = SheetEngine::new(SheetConfig::default().with_time_scale(0.0));
    });
    let warn = capture
        .events()
        .into_iter()
        .find(|e| e.message == "sheet config sanitised")
        .expect("sanitise warning");
    assert_eq!(warn.field("field"), Some("time_scale"));
}
