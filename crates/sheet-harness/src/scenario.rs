#![forbid(unsafe_code)]

//! Replayable sheet scenarios.
//!
//! A [`Scenario`] is a sheet setup plus a list of [`Step`]s. Running it
//! builds a fresh engine, subscribes an [`EventRecorder`], applies the
//! steps through scripted host stand-ins, and returns everything observed
//! in a [`ScenarioRun`], including a JSONL [`TraceLog`].
//!
//! # Invariants
//!
//! 1. A scenario owns no wall clock; the same scenario yields the same trace
//!    digest on every run.
//! 2. Every completion handed to the engine is recorded in the trace with
//!    the index of the step that issued it.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use sheet_core::{
    DragEvent, DragPhase, Geometry, InterruptTrigger, Position, SheetConfig, SheetEngine,
};

use crate::content::ScriptedContent;
use crate::driver::{FrameDriver, Stalled};
use crate::recorder::{EventRecorder, SheetEvent};
use crate::trace::TraceLog;

/// One scripted host action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// New container geometry.
    Layout(Geometry),
    /// A pan sample on the sheet itself.
    Drag(DragEvent),
    /// Finger down on the linked content.
    ScrollBegin,
    /// Content scrolled by `delta` (positive scrolls content up).
    ScrollBy(f64),
    /// Finger lifted from the content with `velocity` (content units per
    /// second, positive scrolls content up).
    ScrollEnd { velocity: f64 },
    /// Programmatic move to a declared position.
    MoveTo {
        position: Position,
        animated: bool,
        triggers: InterruptTrigger,
    },
    /// Programmatic move to a raw offset.
    ScrollTo {
        offset: f64,
        animated: bool,
        triggers: InterruptTrigger,
    },
    /// Programmatic settle with `velocity` in units per second.
    MoveToNearest { velocity: f64 },
    /// Cancel the running animation.
    Cancel,
    /// Step this many frames (stops early when idle).
    Frames(u64),
    /// Step until idle.
    Settle,
}

impl Step {
    fn fields(&self) -> Value {
        match self {
            Self::Layout(g) => json!({
                "step": "layout",
                "height": g.height,
                "safe_top": g.safe_area.top,
                "safe_bottom": g.safe_area.bottom,
            }),
            Self::Drag(e) => json!({
                "step": "drag",
                "phase": format!("{:?}", e.phase),
                "source": e.source.0,
                "translation": e.translation,
                "velocity": e.velocity,
            }),
            Self::ScrollBegin => json!({ "step": "scroll_begin" }),
            Self::ScrollBy(delta) => json!({ "step": "scroll_by", "delta": delta }),
            Self::ScrollEnd { velocity } => json!({ "step": "scroll_end", "velocity": velocity }),
            Self::MoveTo {
                position,
                animated,
                triggers,
            } => json!({
                "step": "move_to",
                "edge": format!("{:?}", position.edge),
                "position_offset": position.offset,
                "animated": animated,
                "triggers": triggers.bits(),
            }),
            Self::ScrollTo {
                offset,
                animated,
                triggers,
            } => json!({
                "step": "scroll_to",
                "offset": offset,
                "animated": animated,
                "triggers": triggers.bits(),
            }),
            Self::MoveToNearest { velocity } => {
                json!({ "step": "move_to_nearest", "velocity": velocity })
            }
            Self::Cancel => json!({ "step": "cancel" }),
            Self::Frames(n) => json!({ "step": "frames", "count": n }),
            Self::Settle => json!({ "step": "settle" }),
        }
    }
}

/// Sheet setup plus a script.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    config: SheetConfig,
    positions: Vec<Position>,
    initial: Position,
    geometry: Geometry,
    content_inset: f64,
    refreshable: bool,
    fps: u32,
    steps: Vec<Step>,
}

impl Scenario {
    /// Scenario `name` on a 1000-unit container with no positions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: SheetConfig::default(),
            positions: Vec::new(),
            initial: Position::hidden(),
            geometry: Geometry::from_height(1000.0),
            content_inset: 0.0,
            refreshable: false,
            fps: 60,
            steps: Vec::new(),
        }
    }

    /// Engine configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: SheetConfig) -> Self {
        self.config = config;
        self
    }

    /// Declared positions (builder pattern).
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self
    }

    /// Position of the first layout (builder pattern).
    #[must_use]
    pub fn with_initial(mut self, initial: Position) -> Self {
        self.initial = initial;
        self
    }

    /// Geometry of the first layout (builder pattern).
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Top inset of the linked content (builder pattern).
    #[must_use]
    pub fn with_content_inset(mut self, inset_top: f64) -> Self {
        self.content_inset = inset_top;
        self
    }

    /// Give the linked content a refresh control (builder pattern).
    #[must_use]
    pub fn with_refreshable_content(mut self, refreshable: bool) -> Self {
        self.refreshable = refreshable;
        self
    }

    /// Frame rate of the driver (builder pattern).
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Append a step (builder pattern).
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps (builder pattern).
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Scenario name; also the trace run id.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the script on a fresh engine.
    pub fn run(&self) -> Result<ScenarioRun, Stalled> {
        let span = tracing::info_span!("scenario", name = %self.name);
        let _guard = span.enter();

        let mut sheet = SheetEngine::new(self.config.clone())
            .with_positions(self.positions.clone())
            .with_initial_position(self.initial);
        let recorder = Rc::new(EventRecorder::new());
        sheet.subscribe(recorder.clone());

        let mut runner = Runner {
            sheet,
            recorder,
            content: ScriptedContent::new(self.content_inset).refreshable(self.refreshable),
            driver: FrameDriver::with_fps(self.fps),
            trace: TraceLog::new(self.name.clone()),
            events: Vec::new(),
            completions: Rc::new(RefCell::new(Vec::new())),
            flushed_completions: 0,
        };

        runner.sheet.layout(self.geometry);
        runner.flush();
        for (index, step) in self.steps.iter().enumerate() {
            runner.apply(index, step)?;
        }

        tracing::info!(
            steps = self.steps.len(),
            frames = runner.driver.frame(),
            offset = runner.sheet.offset(),
            "scenario finished"
        );

        let completions = runner.completions.borrow().clone();
        Ok(ScenarioRun {
            sheet: runner.sheet,
            content: runner.content,
            events: runner.events,
            completions,
            frames: runner.driver.frame(),
            trace: runner.trace,
        })
    }
}

/// Everything observed while running a [`Scenario`].
#[derive(Debug)]
pub struct ScenarioRun {
    /// The engine after the last step.
    pub sheet: SheetEngine,
    /// The linked content after the last step.
    pub content: ScriptedContent,
    /// Every notification, in order.
    pub events: Vec<SheetEvent>,
    /// `(step index, finished)` for every completion that ran.
    pub completions: Vec<(usize, bool)>,
    /// Frames stepped.
    pub frames: u64,
    /// JSONL trace of steps, notifications, and completions.
    pub trace: TraceLog,
}

impl ScenarioRun {
    /// Digest of the trace.
    #[must_use]
    pub fn digest(&self) -> String {
        self.trace.digest()
    }

    /// Final sheet offset.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.sheet.offset()
    }

    /// Completion results reported for step `index`.
    #[must_use]
    pub fn completions_for(&self, index: usize) -> Vec<bool> {
        self.completions
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|&(_, finished)| finished)
            .collect()
    }
}

struct Runner {
    sheet: SheetEngine,
    recorder: Rc<EventRecorder>,
    content: ScriptedContent,
    driver: FrameDriver,
    trace: TraceLog,
    events: Vec<SheetEvent>,
    completions: Rc<RefCell<Vec<(usize, bool)>>>,
    flushed_completions: usize,
}

impl Runner {
    fn completion(&self, index: usize) -> Option<Box<dyn FnOnce(bool)>> {
        let sink = Rc::clone(&self.completions);
        Some(Box::new(move |finished| sink.borrow_mut().push((index, finished))))
    }

    /// Move recorded notifications and completions into the trace.
    fn flush(&mut self) {
        let frame = self.driver.frame();
        for event in self.recorder.take() {
            self.trace.record(frame, &event);
            self.events.push(event);
        }
        let completions = self.completions.borrow();
        for &(step, finished) in &completions[self.flushed_completions..] {
            self.trace
                .emit(frame, "completion", json!({ "step_index": step, "finished": finished }));
        }
        self.flushed_completions = completions.len();
    }

    fn frames(&mut self, n: u64) {
        for _ in 0..n {
            let running = self.driver.step(&mut self.sheet);
            self.flush();
            if !running {
                break;
            }
        }
    }

    fn apply(&mut self, index: usize, step: &Step) -> Result<(), Stalled> {
        let mut fields = step.fields();
        fields["step_index"] = json!(index);
        self.trace.emit(self.driver.frame(), "step", fields);
        tracing::debug!(index, ?step, "scenario step");

        match *step {
            Step::Layout(geometry) => self.sheet.layout(geometry),
            Step::Drag(event) => {
                self.sheet.handle_drag(&event);
                if matches!(event.phase, DragPhase::Ended) {
                    tracing::trace!(offset = self.sheet.offset(), "drag released");
                }
            }
            Step::ScrollBegin => self.sheet.scroll_will_begin_dragging(&self.content),
            Step::ScrollBy(delta) => {
                self.content.scroll_by(delta);
                self.sheet.scroll_did_scroll(&mut self.content);
            }
            Step::ScrollEnd { velocity } => {
                let mut target = self.content.offset();
                self.sheet
                    .scroll_will_end_dragging(&self.content, velocity, &mut target);
                self.content.scroll_to(target);
            }
            Step::MoveTo {
                position,
                animated,
                triggers,
            } => {
                let completion = self.completion(index);
                self.sheet.move_to(position, animated, triggers, completion);
            }
            Step::ScrollTo {
                offset,
                animated,
                triggers,
            } => {
                let completion = self.completion(index);
                self.sheet.scroll_to(offset, animated, triggers, completion);
            }
            Step::MoveToNearest { velocity } => {
                let completion = self.completion(index);
                self.sheet.move_to_nearest_anchor(velocity, completion);
            }
            Step::Cancel => {
                self.sheet.cancel_animation();
            }
            Step::Frames(n) => {
                self.flush();
                self.frames(n);
            }
            Step::Settle => {
                self.flush();
                let budget = FrameDriver::DEFAULT_MAX_FRAMES;
                let start = self.driver.frame();
                while self.sheet.is_animating() {
                    if self.driver.frame() - start == budget {
                        return Err(Stalled { frames: budget });
                    }
                    self.driver.step(&mut self.sheet);
                    self.flush();
                }
            }
        }
        self.flush();
        Ok(())
    }
}
