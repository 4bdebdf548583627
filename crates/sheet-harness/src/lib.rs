#![forbid(unsafe_code)]

//! Deterministic host simulation for `sheet-core`.
//!
//! A real host owns a display link, a pan recognizer, and a scroll view.
//! This crate replaces each with a scripted stand-in so scenarios replay
//! identically:
//!
//! - [`FrameDriver`] steps the engine at a fixed frame interval.
//! - [`ScriptedContent`] is a scroll view whose offset the script moves.
//! - [`ScriptedDrag`] emits the pan samples of one finger.
//! - [`EventRecorder`] subscribes to the engine and keeps every
//!   notification.
//! - [`TraceLog`] turns a run into JSONL lines and a `blake3` digest.
//! - [`Scenario`] ties the above together into a replayable script.
//!
//! # Running scenarios with logs
//!
//! ```sh
//! RUST_LOG=sheet_core=debug cargo test -p sheet-harness
//! ```

pub mod content;
pub mod driver;
pub mod logging;
pub mod recorder;
pub mod scenario;
pub mod trace;

pub use content::{ScriptedContent, ScriptedDrag};
pub use driver::{FrameDriver, Stalled};
pub use logging::init_test_logging;
pub use recorder::{EventRecorder, SheetEvent};
pub use scenario::{Scenario, ScenarioRun, Step};
pub use trace::TraceLog;
