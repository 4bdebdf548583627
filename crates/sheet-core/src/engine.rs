#![forbid(unsafe_code)]

//! The sheet position engine.
//!
//! [`SheetEngine`] owns the offset, the detents and their anchors, the one
//! active settle animation, and the subscriber list. Input adapters (direct
//! drag, linked scroll content, programmatic calls, frame ticks) all funnel
//! into it; nothing else writes the offset.
//!
//! # Lifecycle of an update
//!
//! ```text
//! will_begin_updating(source)
//!   will_move_to(target, ...)          moves only
//!   will_begin_animation(handle)       animated moves only
//!   did_update(offset)*                every committed offset
//! did_end_updating(source)
//!   did_change_position(position)      settled on a declared position
//! ```
//!
//! # Invariants
//!
//! 1. The offset is always finite.
//! 2. At most one animation is active. Starting a move first cancels the
//!    previous animation, whose completion receives `false`.
//! 3. While an animation runs, inputs whose class is not in its
//!    [`InterruptTrigger`] set are inert; a drag already in progress is
//!    aborted. Permitted input cancels the animation before it moves the
//!    sheet.
//! 4. Subscribers may re-enter the engine from any callback. A request made
//!    from inside a callback supersedes the request that triggered the
//!    callback.
//!
//! # Failure Modes
//!
//! - Non-finite offsets and geometries are dropped.
//! - Moves with no anchors, or to positions outside the available subset,
//!   complete with `false` and change nothing.
//! - Moves requested before the first layout only record the initial
//!   position and complete with `true`.

use std::rc::Rc;
use std::time::Duration;

use crate::animation::spring::SpringParameters;
use crate::animation::{AnimationHandle, AnimationId, SpringAnimation};
use crate::config::{BottomBarConfig, SheetConfig};
use crate::geometry::Geometry;
use crate::gesture::{DragSource, PanAction, PanState};
use crate::interrupt::InterruptTrigger;
use crate::metrics::SheetMetrics;
use crate::position::{Detents, Position};
use crate::rubber;
use crate::scroll_link::{ScrollContent, ScrollLink, SheetFrame};
use crate::selector;
use crate::subscriber::{ChangeSource, SheetSubscriber, SubscriberId, Subscribers};

/// Callback receiving whether a move finished (`true`) or was cancelled or
/// rejected (`false`).
pub type Completion = Box<dyn FnOnce(bool)>;

/// Milliseconds per second; release velocities are projected per millisecond.
const MS_PER_SEC: f64 = 1000.0;

fn complete(completion: Option<Completion>, finished: bool) {
    if let Some(completion) = completion {
        completion(finished);
    }
}

struct ActiveAnimation {
    animation: SpringAnimation,
    source: ChangeSource,
    completion: Option<Completion>,
}

// ============================================================================
// Engine
// ============================================================================

/// Single-axis sheet positioning engine.
pub struct SheetEngine {
    config: SheetConfig,
    detents: Detents,
    offset: f64,
    active: Option<ActiveAnimation>,
    next_animation_id: u64,
    move_generation: u64,
    pan: PanState,
    scroll: ScrollLink,
    subscribers: Subscribers,
}

impl std::fmt::Debug for SheetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetEngine")
            .field("offset", &self.offset)
            .field("anchors", &self.detents.anchors())
            .field("animating", &self.is_animating())
            .field("pan", &self.pan)
            .field("scroll", &self.scroll.state())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl Default for SheetEngine {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

impl SheetEngine {
    /// Create an engine. Out-of-range configuration values are clamped.
    #[must_use]
    pub fn new(config: SheetConfig) -> Self {
        Self {
            config: config.sanitized(),
            detents: Detents::default(),
            offset: 0.0,
            active: None,
            next_animation_id: 0,
            move_generation: 0,
            pan: PanState::Idle,
            scroll: ScrollLink::new(),
            subscribers: Subscribers::new(),
        }
    }

    /// Set the declared positions (builder pattern).
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.detents.set_positions(positions);
        self
    }

    /// Restrict reachable positions (builder pattern).
    #[must_use]
    pub fn with_available_positions(mut self, available: Option<Vec<Position>>) -> Self {
        self.detents = std::mem::take(&mut self.detents).with_available(available);
        self
    }

    /// Set the position used on the first layout (builder pattern).
    #[must_use]
    pub fn with_initial_position(mut self, position: Position) -> Self {
        self.detents.set_initial(position);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current offset from the container top.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Detents and anchors.
    #[inline]
    #[must_use]
    pub fn detents(&self) -> &Detents {
        &self.detents
    }

    /// Resolved anchors for the current geometry.
    #[inline]
    #[must_use]
    pub fn anchors(&self) -> &[f64] {
        self.detents.anchors()
    }

    /// Whether the first layout has happened.
    #[inline]
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.detents.is_laid_out()
    }

    /// Whether a settle animation is running.
    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Handle of the running animation, if any.
    #[must_use]
    pub fn animation_handle(&self) -> Option<AnimationHandle> {
        self.active.as_ref().map(|a| a.animation.handle())
    }

    /// Direct-drag state.
    #[inline]
    #[must_use]
    pub fn pan_state(&self) -> PanState {
        self.pan
    }

    /// Linked-scroll state.
    #[inline]
    #[must_use]
    pub fn scroll_link(&self) -> &ScrollLink {
        &self.scroll
    }

    /// Whether `y` (container coordinates) lies on the sheet.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, y: f64) -> bool {
        y >= self.offset
    }

    /// Progress of the offset from `from` to `to`, in `[0, 1]`.
    #[must_use]
    pub fn interpolate(&self, from: &Position, to: &Position) -> f64 {
        self.detents.interpolate(from, to, self.offset)
    }

    /// Offset `position` resolves to; `0.0` before the first layout.
    #[must_use]
    pub fn resolve(&self, position: &Position) -> f64 {
        self.detents.resolve(position)
    }

    /// Layout metrics for the current offset.
    #[must_use]
    pub fn metrics(&self) -> SheetMetrics {
        let geometry = self.detents.geometry().unwrap_or_default();
        let connected = self
            .detents
            .bottom_bar_connected()
            .map(|p| self.detents.resolve(&p))
            .or_else(|| self.detents.max_anchor());
        SheetMetrics::compute(
            self.offset,
            &geometry,
            self.detents.min_anchor(),
            connected,
            &self.config,
        )
    }

    // ------------------------------------------------------------------------
    // Subscribers
    // ------------------------------------------------------------------------

    /// Register a subscriber.
    pub fn subscribe(&mut self, subscriber: Rc<dyn SheetSubscriber>) -> SubscriberId {
        self.subscribers.subscribe(subscriber)
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn emit(&mut self, notify: impl Fn(&dyn SheetSubscriber, &mut SheetEngine)) {
        for subscriber in self.subscribers.snapshot() {
            notify(subscriber.as_ref(), self);
        }
    }

    // ------------------------------------------------------------------------
    // Configuration and detents
    // ------------------------------------------------------------------------

    /// Replace the configuration. Out-of-range values are clamped.
    pub fn set_config(&mut self, config: SheetConfig) {
        self.config = config.sanitized();
        self.layout_changed();
    }

    /// Replace the declared positions.
    pub fn set_positions(&mut self, positions: Vec<Position>) {
        self.detents.set_positions(positions);
        self.layout_changed();
    }

    /// Restrict reachable positions; `None` makes every position reachable.
    pub fn set_available_positions(&mut self, available: Option<Vec<Position>>) {
        self.detents.set_available(available);
        self.layout_changed();
    }

    /// Position used on the first layout.
    pub fn set_initial_position(&mut self, position: Position) {
        self.detents.set_initial(position);
    }

    /// Position at which the bottom bar is fully attached; `None` uses the
    /// most collapsed anchor.
    pub fn set_bottom_bar_connected_position(&mut self, position: Option<Position>) {
        self.detents.set_bottom_bar_connected(position);
        self.layout_changed();
    }

    /// Show or hide the bottom bar.
    pub fn set_bottom_bar_hidden(&mut self, hidden: bool) {
        self.config.bottom_bar.hidden = hidden;
        self.layout_changed();
    }

    /// Change the bottom bar height; negative heights become zero.
    pub fn set_bottom_bar_height(&mut self, height: f64) {
        let bar = BottomBarConfig {
            height: if height.is_finite() { height.max(0.0) } else { 0.0 },
            ..self.config.bottom_bar
        };
        self.config.bottom_bar = bar;
        self.layout_changed();
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    /// Layout pass. Anchors are recomputed only if `geometry` differs from
    /// the previous pass; the first pass also places the sheet at the
    /// initial position.
    pub fn layout(&mut self, geometry: Geometry) {
        if !geometry.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::warn!(?geometry, "non-finite sheet geometry ignored");
            return;
        }
        let first = !self.detents.is_laid_out();
        if !self.detents.set_geometry(geometry) {
            return;
        }
        if first {
            let initial = self.detents.resolve(&self.detents.initial());
            #[cfg(feature = "tracing")]
            tracing::debug!(offset = initial, "sheet first layout");
            self.commit(initial, ChangeSource::Program);
        }
        self.layout_changed();
    }

    fn layout_changed(&mut self) {
        if !self.detents.is_laid_out() {
            return;
        }
        let metrics = self.metrics();
        self.emit(|s, sheet| s.did_update_layout(sheet, &metrics, ChangeSource::Program));
    }

    // ------------------------------------------------------------------------
    // Core update routine
    // ------------------------------------------------------------------------

    fn commit(&mut self, offset: f64, source: ChangeSource) {
        if !offset.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::warn!(offset, ?source, "non-finite sheet offset dropped");
            return;
        }
        self.offset = offset;
        #[cfg(feature = "tracing")]
        tracing::trace!(offset, ?source, "sheet offset committed");
        self.emit(|s, sheet| {
            let y = sheet.offset;
            s.did_update(sheet, y, source);
        });
    }

    fn begin_update(&mut self, source: ChangeSource) {
        self.emit(|s, sheet| {
            let y = sheet.offset;
            s.will_begin_updating(sheet, y, source);
        });
    }

    fn end_update(&mut self, source: ChangeSource, settled: bool) {
        self.emit(|s, sheet| {
            let y = sheet.offset;
            s.did_end_updating(sheet, y, source);
        });
        if !settled {
            return;
        }
        if let Some(position) = self
            .detents
            .position_at(self.offset, self.config.position_epsilon)
        {
            self.emit(|s, sheet| s.did_change_position(sheet, &position, source));
        }
    }

    fn clamp(&self, y: f64) -> f64 {
        match self.detents.bounds() {
            Some(bounds) => rubber::clamp_offset(
                y,
                bounds,
                self.detents.geometry().map_or(0.0, |g| g.height),
                self.config.bounces,
                self.config.bounces_factor,
            ),
            None => y,
        }
    }

    fn active_policy(&self) -> Option<InterruptTrigger> {
        self.active.as_ref().map(|a| a.animation.interrupt_triggers())
    }

    /// Whether input from `source` may act while the current animation runs.
    fn admits(&self, source: ChangeSource) -> bool {
        self.active_policy()
            .is_none_or(|p| p.permits(source.trigger()))
    }

    fn spring_parameters(&self) -> SpringParameters {
        self.config.animation.spring_parameters()
    }

    fn frame(&self) -> SheetFrame {
        SheetFrame {
            offset: self.offset,
            bounds: self.detents.bounds(),
            container_height: self.detents.geometry().map_or(0.0, |g| g.height),
            bounces: self.config.bounces,
            bounces_factor: self.config.bounces_factor,
            epsilon: self.config.pixel_epsilon,
        }
    }

    // ------------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------------

    /// Cancel the running animation without snapping to its target.
    ///
    /// Its completion receives `false`. Returns `false` if nothing was
    /// running.
    pub fn cancel_animation(&mut self) -> bool {
        self.stop_animation().is_some()
    }

    /// Stop the active animation; returns its instantaneous velocity.
    fn stop_animation(&mut self) -> Option<f64> {
        let active = self.active.take()?;
        let velocity = active.animation.velocity();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = active.animation.id().get(),
            offset = self.offset,
            velocity,
            "sheet animation cancelled"
        );
        self.end_update(active.source, false);
        complete(active.completion, false);
        Some(velocity)
    }

    /// Move the running animation to a new target, keeping offset and
    /// velocity continuous. Returns `false` if `handle` is stale.
    pub fn retarget_animation(&mut self, handle: AnimationHandle, target: f64) -> bool {
        if !target.is_finite() {
            return false;
        }
        match self.active.as_mut() {
            Some(active) if active.animation.id() == handle.id() => {
                active.animation.retarget(target);
                #[cfg(feature = "tracing")]
                tracing::debug!(id = handle.id().get(), target, "sheet animation retargeted");
                true
            }
            _ => false,
        }
    }

    /// Advance the running animation by one frame of `dt` (scaled by the
    /// configured time scale). Returns whether an animation is still
    /// running afterwards.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let scaled = Duration::try_from_secs_f64(dt.as_secs_f64() * self.config.time_scale)
            .unwrap_or(Duration::MAX);
        let id = active.animation.id();
        let source = active.source;
        let tick = active.animation.advance(scaled);

        self.commit(tick.offset, source);

        if tick.finished && self.active.as_ref().is_some_and(|a| a.animation.id() == id) {
            if let Some(done) = self.active.take() {
                #[cfg(feature = "tracing")]
                tracing::debug!(id = id.get(), offset = self.offset, "sheet animation finished");
                self.end_update(source, true);
                complete(done.completion, true);
            }
        }
        self.active.is_some()
    }

    // ------------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------------

    /// Move to a declared position.
    ///
    /// Before the first layout this only records `position` as the initial
    /// position. Positions outside the available subset are rejected.
    pub fn move_to(
        &mut self,
        position: Position,
        animated: bool,
        interrupt_triggers: InterruptTrigger,
        completion: Option<Completion>,
    ) {
        if !self.detents.is_laid_out() {
            self.detents.set_initial(position);
            complete(completion, true);
            return;
        }
        if !self.detents.is_available(&position) {
            #[cfg(feature = "tracing")]
            tracing::debug!(?position, "sheet move to unavailable position rejected");
            complete(completion, false);
            return;
        }
        let target = self.detents.resolve(&position);
        self.scroll_to(target, animated, interrupt_triggers, completion);
    }

    /// Move to a raw offset.
    pub fn scroll_to(
        &mut self,
        offset: f64,
        animated: bool,
        interrupt_triggers: InterruptTrigger,
        completion: Option<Completion>,
    ) {
        if !self.program_may_move() || !offset.is_finite() {
            complete(completion, false);
            return;
        }
        let velocity = self.stop_animation().unwrap_or(0.0);
        self.begin_update(ChangeSource::Program);
        self.start_move(
            offset,
            ChangeSource::Program,
            animated,
            interrupt_triggers,
            velocity,
            completion,
        );
    }

    /// Settle on the anchor selected for `velocity` (units per second).
    pub fn move_to_nearest_anchor(&mut self, velocity: f64, completion: Option<Completion>) {
        if !self.program_may_move() {
            complete(completion, false);
            return;
        }
        self.stop_animation();
        self.begin_update(ChangeSource::Program);
        self.settle_nearest(velocity, ChangeSource::Program, completion);
    }

    /// Declared position the sheet would settle on for `velocity`.
    #[must_use]
    pub fn nearest_position(&self, velocity: f64) -> Option<Position> {
        let anchor = selector::select(
            self.offset,
            velocity / MS_PER_SEC,
            self.detents.anchors(),
            self.config.deceleration_rate,
        )?;
        self.detents
            .reachable()
            .copied()
            .find(|p| (self.detents.resolve(p) - anchor).abs() <= self.config.pixel_epsilon)
    }

    fn program_may_move(&self) -> bool {
        if !self.detents.is_laid_out() || self.detents.anchors().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!("sheet move without anchors rejected");
            return false;
        }
        if !self.admits(ChangeSource::Program) {
            #[cfg(feature = "tracing")]
            tracing::debug!("sheet move blocked by interrupt policy");
            return false;
        }
        true
    }

    /// Settle from a release with `velocity` in units per second. The spring
    /// starts from the per-millisecond value, as projection does.
    fn settle_nearest(&mut self, velocity: f64, source: ChangeSource, completion: Option<Completion>) {
        self.stop_animation();
        let selected = selector::select(
            self.offset,
            velocity / MS_PER_SEC,
            self.detents.anchors(),
            self.config.deceleration_rate,
        );
        match selected {
            None => {
                self.end_update(source, false);
                complete(completion, false);
            }
            Some(anchor) if (anchor - self.offset).abs() <= self.config.pixel_epsilon => {
                self.end_update(source, true);
                complete(completion, true);
            }
            Some(anchor) => self.start_move(
                anchor,
                source,
                true,
                InterruptTrigger::all(),
                velocity / MS_PER_SEC,
                completion,
            ),
        }
    }

    fn start_move(
        &mut self,
        target: f64,
        source: ChangeSource,
        animated: bool,
        interrupt_triggers: InterruptTrigger,
        velocity: f64,
        completion: Option<Completion>,
    ) {
        self.move_generation += 1;
        let generation = self.move_generation;
        let reported_velocity = animated.then_some(velocity);
        self.emit(|s, sheet| {
            s.will_move_to(sheet, target, source, animated, interrupt_triggers, reported_velocity);
        });
        if self.move_generation != generation {
            // A subscriber started another move from `will_move_to`.
            complete(completion, false);
            return;
        }

        if !animated {
            self.commit(target, source);
            self.end_update(source, true);
            complete(completion, true);
            return;
        }

        // A subscriber may have started an animation while we notified.
        self.stop_animation();
        self.next_animation_id += 1;
        let animation = SpringAnimation::new(
            AnimationId::new(self.next_animation_id),
            self.offset,
            target,
            velocity,
            self.spring_parameters(),
            self.config.settle_threshold,
            interrupt_triggers,
        );
        let handle = animation.handle();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = handle.id().get(),
            from = self.offset,
            target,
            velocity,
            ?source,
            duration_ms = animation.duration().as_millis() as u64,
            "sheet animation started"
        );
        self.active = Some(ActiveAnimation {
            animation,
            source,
            completion,
        });
        self.emit(|s, sheet| s.will_begin_animation(sheet, handle, source));
    }

    // ------------------------------------------------------------------------
    // Direct drag
    // ------------------------------------------------------------------------

    /// Feed one sample from the host pan recognizer.
    pub fn handle_drag(&mut self, event: &dyn DragSource) {
        let policy = self.active_policy();
        match self.pan.process(event, self.offset, policy) {
            PanAction::Ignore => {}
            PanAction::Begin => {
                self.stop_animation();
                self.begin_update(ChangeSource::PanGesture);
            }
            PanAction::Update { candidate } => {
                self.stop_animation();
                let y = self.clamp(candidate);
                self.commit(y, ChangeSource::PanGesture);
            }
            PanAction::Release { velocity } => {
                self.settle_nearest(velocity, ChangeSource::PanGesture, None);
            }
            PanAction::Abort => self.end_update(ChangeSource::PanGesture, false),
        }
    }

    // ------------------------------------------------------------------------
    // Linked scroll content
    // ------------------------------------------------------------------------

    /// The linked content is about to be dragged.
    pub fn scroll_will_begin_dragging(&mut self, content: &dyn ScrollContent) {
        let policy = self.active_policy();
        if self.scroll.will_begin_dragging(content, policy) {
            self.stop_animation();
            self.begin_update(ChangeSource::ScrollDragging);
        }
    }

    /// The linked content's offset changed.
    pub fn scroll_did_scroll(&mut self, content: &mut dyn ScrollContent) {
        if self.drop_excluded_scroll() {
            return;
        }
        let frame = self.frame();
        if let Some(y) = self.scroll.did_scroll(content, &frame) {
            self.stop_animation();
            self.commit(y, ChangeSource::ScrollDragging);
        }
    }

    /// The linked content's drag was released with `velocity` (content
    /// units per second). `target_content_offset` may be rewritten to stop
    /// the content's deceleration.
    pub fn scroll_will_end_dragging(
        &mut self,
        content: &dyn ScrollContent,
        velocity: f64,
        target_content_offset: &mut f64,
    ) {
        if self.drop_excluded_scroll() {
            return;
        }
        let frame = self.frame();
        if let Some(sheet_velocity) =
            self.scroll
                .will_end_dragging(content, velocity, target_content_offset, &frame)
        {
            self.settle_nearest(sheet_velocity, ChangeSource::ScrollDragging, None);
        }
    }

    /// End a tracked content drag that the running animation excludes.
    fn drop_excluded_scroll(&mut self) -> bool {
        if !self.scroll.is_dragging() || self.admits(ChangeSource::ScrollDragging) {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("scroll drag dropped by interrupt policy");
        self.scroll.reset();
        self.end_update(ChangeSource::ScrollDragging, false);
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
