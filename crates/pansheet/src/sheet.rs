#![forbid(unsafe_code)]

//! The sheet controller.
//!
//! [`PanSheet`] ties the pieces together: it resolves anchors on every
//! layout pass, routes pan gestures through the interpreter, drives the
//! motion controller and reacts to the embedded scroll surface.
//!
//! # Ownership
//!
//! The sheet owns its state behind an `Rc`. Everything handed to the host
//! (the gesture target, the offset listener, animation completions) holds a
//! `Weak` reference, so dropping the sheet releases everything and late
//! callbacks become no-ops.
//!
//! # Reentrancy
//!
//! Hosts may call back synchronously: a surface may notify listeners from
//! inside `set_content_offset`, an animator may complete from inside
//! `animate`. Offset notifications that arrive while the sheet is already
//! busy are dropped (they are the echo of its own halt). Animation
//! completions are queued and applied as soon as the sheet is idle.
//!
//! Presentable hooks run while the sheet is busy. Calls they make back into
//! the sheet are deferred the same way: `layout`, `transition` and
//! `set_needs_layout_update` run once the current operation returns,
//! `tap_outside` reports `false`, and `with_presentable*` return `None`.
//! Read accessors report the sheet as it was when it last went idle.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use pansheet_core::animation::{AnimationId, AnimationOutcome, Animator};
use pansheet_core::drag::GesturePhase;
use pansheet_core::geometry::{Point, Rect, Vector};
use pansheet_core::height::{Anchors, ContainerMetrics, HeightContext};

use crate::PresentationState;
use crate::config::SheetConfig;
use crate::interpreter::{self, GestureInterpreter, PanRecognizer};
use crate::motion::MotionController;
use crate::presentable::Presentable;
use crate::scroll::{self, OffsetChange, OffsetListener, ScrollAction, ScrollCoordinator, ScrollInput, SurfaceId};

/// An interactive bottom sheet presenting `P`.
pub struct PanSheet<P: Presentable + 'static> {
    shared: Rc<Shared<P>>,
}

struct Shared<P: Presentable + 'static> {
    core: RefCell<SheetCore<P>>,
    completions: RefCell<VecDeque<(AnimationId, AnimationOutcome)>>,
    deferred: RefCell<VecDeque<Deferred>>,
    settled: RefCell<SheetView>,
}

/// What the read accessors report. Refreshed whenever the sheet goes idle so
/// hooks can still read it while the sheet is busy.
#[derive(Debug, Clone, Default)]
struct SheetView {
    state: PresentationState,
    attached: bool,
    motion: MotionController,
    tracked_offset: f64,
    observing: bool,
    corner_radius: Option<f64>,
    user_interaction_enabled: bool,
}

/// A public call that arrived while the sheet was busy.
#[derive(Debug, Clone, Copy)]
enum Deferred {
    Layout(ContainerMetrics),
    Transition(PresentationState, bool),
    LayoutUpdate,
    ResumeObservation,
}

struct SheetCore<P: Presentable + 'static> {
    presentable: P,
    animator: Rc<dyn Animator>,
    interpreter: GestureInterpreter,
    motion: MotionController,
    scroll: ScrollCoordinator,
    state: PresentationState,
    attached: bool,
    metrics: Option<ContainerMetrics>,
    user_interaction_enabled: bool,
    pending_did_transition: Option<(AnimationId, PresentationState)>,
    this: Weak<Shared<P>>,
}

impl<P: Presentable + 'static> PanSheet<P> {
    /// A sheet with the default [`SheetConfig`].
    pub fn new(presentable: P, animator: Rc<dyn Animator>) -> Self {
        Self::with_config(presentable, animator, SheetConfig::default())
    }

    /// A sheet with custom interaction tunables. The config is used as
    /// given; run [`SheetConfig::validate`] first if it comes from users.
    pub fn with_config(presentable: P, animator: Rc<dyn Animator>, config: SheetConfig) -> Self {
        let shared = Rc::new_cyclic(|this| Shared {
            core: RefCell::new(SheetCore {
                presentable,
                animator,
                interpreter: GestureInterpreter::from_config(&config),
                motion: MotionController::new(config.fallback_animation()),
                scroll: ScrollCoordinator::default(),
                state: PresentationState::Hidden,
                attached: false,
                metrics: None,
                user_interaction_enabled: true,
                pending_did_transition: None,
                this: this.clone(),
            }),
            completions: RefCell::new(VecDeque::new()),
            deferred: RefCell::new(VecDeque::new()),
            settled: RefCell::new(SheetView::default()),
        });
        shared.drain();
        Self { shared }
    }

    /// Host layout pass.
    ///
    /// The first call attaches the sheet: the panel is fitted to the
    /// container, the scroll surface is observed and the recorded state is
    /// applied without animation. Every call re-reads the presentable and
    /// recomputes the anchors.
    pub fn layout(&self, metrics: ContainerMetrics) {
        self.shared.run(Deferred::Layout(metrics));
    }

    /// Move to `to`, animated unless `animated` is false.
    ///
    /// Before the first layout this only records the state.
    pub fn transition(&self, to: PresentationState, animated: bool) {
        self.shared.run(Deferred::Transition(to, animated));
    }

    /// Run `updates` with scroll observation suspended, then resume tracking
    /// from the surface's new offset.
    ///
    /// Use this around content changes that move the scroll offset.
    pub fn perform_updates(&self, updates: impl FnOnce()) {
        match self.shared.core.try_borrow_mut() {
            Ok(mut core) => core.scroll.detach(),
            Err(_) => {
                tracing::trace!(target: "pansheet.scroll", "updates run while sheet is busy");
            }
        }
        updates();
        self.shared.run(Deferred::ResumeObservation);
    }

    /// Re-read the presentable, refit the panel, re-observe the scroll
    /// surface and reconfigure its insets.
    ///
    /// Call after any presentable value changes.
    pub fn set_needs_layout_update(&self) {
        self.shared.run(Deferred::LayoutUpdate);
    }

    /// Handle a tap at `point`.
    ///
    /// Taps outside the panel hide it when the presentable allows tap to
    /// dismiss. Returns whether the tap dismissed the sheet; a tap delivered
    /// while the sheet is busy is ignored.
    pub fn tap_outside(&self, point: Point) -> bool {
        let dismissed = match self.shared.core.try_borrow_mut() {
            Ok(mut core) => core.tap_outside(point),
            Err(_) => {
                tracing::trace!(target: "pansheet.gesture", "reentrant tap dropped");
                false
            }
        };
        self.shared.drain();
        dismissed
    }

    /// Gesture handler to install on the host's pan recognizer.
    pub fn gesture_target(&self) -> PanGestureTarget<P> {
        PanGestureTarget {
            sheet: Rc::downgrade(&self.shared),
        }
    }

    /// The most recently requested state.
    pub fn state(&self) -> PresentationState {
        self.read(|v| v.state)
    }

    pub fn is_attached(&self) -> bool {
        self.read(|v| v.attached)
    }

    /// Panel frame; its top edge is the current position.
    pub fn frame(&self) -> Rect {
        self.read(|v| v.motion.frame())
    }

    pub fn current_y(&self) -> f64 {
        self.read(|v| v.motion.current_y())
    }

    /// Height of the panel's visible bounds.
    pub fn visible_height(&self) -> f64 {
        self.read(|v| v.motion.visible_height())
    }

    /// Frame of the presented content inside the panel.
    pub fn content_frame(&self) -> Rect {
        self.read(|v| v.motion.content_frame())
    }

    pub fn anchors(&self) -> Anchors {
        self.read(|v| v.motion.anchors())
    }

    pub fn anchored_y(&self) -> f64 {
        self.read(|v| v.motion.anchored_y())
    }

    pub fn is_animating(&self) -> bool {
        self.read(|v| v.motion.is_animating())
    }

    pub fn is_anchored(&self) -> bool {
        self.read(|v| v.motion.is_anchored())
    }

    /// Resting offset the scroll surface is held at.
    pub fn tracked_scroll_offset(&self) -> f64 {
        self.read(|v| v.tracked_offset)
    }

    pub fn is_observing_scroll(&self) -> bool {
        self.read(|v| v.observing)
    }

    /// Hit test: only points inside the panel belong to the sheet.
    pub fn contains(&self, point: Point) -> bool {
        self.read(|v| v.motion.frame().contains(point))
    }

    /// Radius the host should apply to the top corners, if any.
    pub fn corner_radius(&self) -> Option<f64> {
        self.read(|v| v.corner_radius)
    }

    /// Whether the host should deliver touches to the sheet.
    pub fn is_user_interaction_enabled(&self) -> bool {
        self.read(|v| v.user_interaction_enabled)
    }

    /// Read accessors see the live sheet, or the last settled view when
    /// called from a hook.
    fn read<R>(&self, f: impl FnOnce(&SheetView) -> R) -> R {
        match self.shared.core.try_borrow() {
            Ok(core) => f(&core.view()),
            Err(_) => f(&self.shared.settled.borrow()),
        }
    }

    /// Read the presentable. `None` while the sheet is busy (from a hook).
    pub fn with_presentable<R>(&self, f: impl FnOnce(&P) -> R) -> Option<R> {
        let core = self.shared.core.try_borrow().ok()?;
        Some(f(&core.presentable))
    }

    /// Mutate the presentable. Follow up with
    /// [`set_needs_layout_update`](Self::set_needs_layout_update).
    ///
    /// `None` while the sheet is busy (from a hook).
    pub fn with_presentable_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> Option<R> {
        let mut core = self.shared.core.try_borrow_mut().ok()?;
        Some(f(&mut core.presentable))
    }
}

impl<P: Presentable + 'static> fmt::Debug for PanSheet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shared.core.try_borrow() {
            Ok(core) => f
                .debug_struct("PanSheet")
                .field("state", &core.state)
                .field("attached", &core.attached)
                .field("frame", &core.motion.frame())
                .field("animating", &core.motion.is_animating())
                .finish_non_exhaustive(),
            Err(_) => f.debug_struct("PanSheet").finish_non_exhaustive(),
        }
    }
}

/// Pan gesture handler for the host recognizer.
///
/// Holds only a weak reference; once the sheet is dropped every call is a
/// no-op.
pub struct PanGestureTarget<P: Presentable + 'static> {
    sheet: Weak<Shared<P>>,
}

impl<P: Presentable + 'static> Clone for PanGestureTarget<P> {
    fn clone(&self) -> Self {
        Self {
            sheet: self.sheet.clone(),
        }
    }
}

impl<P: Presentable + 'static> fmt::Debug for PanGestureTarget<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanGestureTarget")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<P: Presentable + 'static> PanGestureTarget<P> {
    /// Whether the sheet still exists.
    pub fn is_alive(&self) -> bool {
        self.sheet.strong_count() > 0
    }

    /// Deliver one recognizer update.
    pub fn handle(&self, recognizer: &dyn PanRecognizer) {
        let Some(shared) = self.sheet.upgrade() else {
            return;
        };
        match shared.core.try_borrow_mut() {
            Ok(mut core) => core.handle_pan(recognizer),
            Err(_) => {
                tracing::trace!(target: "pansheet.gesture", "reentrant pan event dropped");
                return;
            }
        }
        shared.drain();
    }

    /// Recognize together with another recognizer only when it belongs to
    /// the embedded scroll surface.
    pub fn should_recognize_simultaneously(&self, other: Option<SurfaceId>) -> bool {
        let Some(shared) = self.sheet.upgrade() else {
            return false;
        };
        let Some(other) = other else {
            return false;
        };
        shared.core.try_borrow().is_ok_and(|core| {
            core.presentable
                .pan_scrollable()
                .is_some_and(|surface| surface.id() == other)
        })
    }

    /// No other recognizer is ever required to fail first.
    pub fn should_be_required_to_fail_by(&self, _other: Option<SurfaceId>) -> bool {
        false
    }
}

impl<P: Presentable + 'static> Shared<P> {
    /// Apply `call` now, or queue it when the sheet is busy.
    fn run(&self, call: Deferred) {
        match self.core.try_borrow_mut() {
            Ok(mut core) => core.apply(call),
            Err(_) => {
                tracing::trace!(target: "pansheet.motion", ?call, "reentrant call deferred");
                self.deferred.borrow_mut().push_back(call);
                return;
            }
        }
        self.drain();
    }

    fn enqueue_completion(&self, id: AnimationId, outcome: AnimationOutcome) {
        self.completions.borrow_mut().push_back((id, outcome));
        self.drain();
    }

    /// Apply queued completions, then deferred calls, while the core is idle.
    fn drain(&self) {
        loop {
            let Ok(mut core) = self.core.try_borrow_mut() else {
                return;
            };
            let completion = self.completions.borrow_mut().pop_front();
            if let Some((id, outcome)) = completion {
                core.finish_animation(id, outcome);
                continue;
            }
            let call = self.deferred.borrow_mut().pop_front();
            match call {
                Some(call) => core.apply(call),
                None => {
                    let view = core.view();
                    *self.settled.borrow_mut() = view;
                    return;
                }
            }
        }
    }
}

fn offset_listener<P: Presentable + 'static>(sheet: Weak<Shared<P>>) -> OffsetListener {
    Rc::new(move |change: OffsetChange| {
        let Some(shared) = sheet.upgrade() else {
            return;
        };
        match shared.core.try_borrow_mut() {
            Ok(mut core) => core.did_scroll(change),
            Err(_) => {
                tracing::trace!(
                    target: "pansheet.scroll",
                    offset = change.new,
                    "reentrant offset change dropped"
                );
                return;
            }
        }
        shared.drain();
    })
}

impl<P: Presentable + 'static> SheetCore<P> {
    fn apply(&mut self, call: Deferred) {
        match call {
            Deferred::Layout(metrics) => self.layout(metrics),
            Deferred::Transition(to, animated) => self.transition(to, animated),
            Deferred::LayoutUpdate => self.set_needs_layout_update(),
            Deferred::ResumeObservation => self.resume_observation(),
        }
    }

    fn view(&self) -> SheetView {
        SheetView {
            state: self.state,
            attached: self.attached,
            motion: self.motion.clone(),
            tracked_offset: self.scroll.tracked_offset(),
            observing: self.scroll.is_observing(),
            corner_radius: self
                .presentable
                .should_round_top_corners()
                .then(|| self.presentable.corner_radius()),
            user_interaction_enabled: self.user_interaction_enabled,
        }
    }

    fn layout(&mut self, metrics: ContainerMetrics) {
        self.metrics = Some(metrics);
        if !self.attached {
            self.attached = true;
            tracing::debug!(
                target: "pansheet.layout",
                width = metrics.bounds.width,
                height = metrics.bounds.height,
                state = ?self.state,
                "sheet attached"
            );
            self.set_needs_layout_update();
            self.transition(self.state, false);
        }
        self.configure_layout();
    }

    /// Recompute anchors and flags from the presentable.
    fn configure_layout(&mut self) {
        let Some(metrics) = self.metrics else {
            return;
        };
        let p = &self.presentable;
        let top_offset = p.top_offset(&metrics);
        let ctx = HeightContext::from_metrics(&metrics, top_offset);
        let anchors = Anchors::resolve(
            &ctx,
            p.short_form_height(),
            p.long_form_height(),
            metrics.voice_over_running,
            |width| p.intrinsic_height(width),
        );
        self.motion.set_layout(
            anchors,
            top_offset,
            p.anchor_modal_to_long_form(),
            p.allows_extended_pan_scrolling(&metrics),
        );
        self.user_interaction_enabled = p.is_user_interaction_enabled();
    }

    fn set_needs_layout_update(&mut self) {
        let Some(metrics) = self.metrics else {
            return;
        };
        self.configure_layout();
        self.motion.fit_to_container(metrics.bounds);
        self.observe();
        self.configure_scroll_insets(&metrics);
    }

    fn observe(&mut self) {
        let surface = self.presentable.pan_scrollable();
        self.scroll
            .observe(surface.as_ref(), offset_listener(self.this.clone()));
    }

    fn resume_observation(&mut self) {
        if let Some(surface) = self.presentable.pan_scrollable() {
            self.scroll.track(surface.as_ref());
            self.observe();
        }
    }

    fn configure_scroll_insets(&self, metrics: &ContainerMetrics) {
        let Some(surface) = self.presentable.pan_scrollable() else {
            return;
        };
        if surface.is_scrolling() {
            return;
        }
        surface.set_shows_vertical_indicator(false);
        let mut insets = self.presentable.scroll_indicator_insets(metrics);
        insets.bottom = 0.0;
        surface.set_scroll_indicator_insets(insets);
        surface.set_content_inset_bottom(metrics.safe_area.bottom);
        surface.disable_automatic_inset_adjustment();
    }

    fn transition(&mut self, to: PresentationState, animated: bool) {
        if !self.attached {
            tracing::debug!(target: "pansheet.motion", ?to, "state recorded before attach");
            self.state = to;
            return;
        }
        if !self.presentable.should_transition(to) {
            tracing::debug!(target: "pansheet.motion", ?to, "transition vetoed");
            return;
        }
        self.presentable.will_transition(to);

        let anchors = self.motion.anchors();
        let y = match to {
            PresentationState::Hidden => anchors.hidden_form_y,
            PresentationState::Short => anchors.short_form_y,
            PresentationState::Long => anchors.long_form_y,
        };
        let animation = self.snap(y, animated);
        tracing::debug!(
            target: "pansheet.motion",
            from = ?self.state,
            ?to,
            y = self.motion.current_y(),
            animated,
            "transition"
        );
        self.state = to;

        match animation {
            Some(id) => self.pending_did_transition = Some((id, to)),
            None => self.presentable.did_transition(to),
        }
    }

    /// Move to `y`; returns the animation id when animated.
    fn snap(&mut self, y: f64, animated: bool) -> Option<AnimationId> {
        self.pending_did_transition = None;
        if !animated {
            self.motion.adjust(y);
            return None;
        }
        let p = &self.presentable;
        let params = self.motion.animation_params(
            p.transition_duration(),
            p.spring_damping(),
            p.transition_options(),
        );
        let request = self.motion.begin_snap(y, params);
        let id = request.id;
        let sheet = self.this.clone();
        self.animator.animate(
            request,
            Box::new(move |outcome| {
                if let Some(shared) = sheet.upgrade() {
                    shared.enqueue_completion(id, outcome);
                }
            }),
        );
        Some(id)
    }

    fn finish_animation(&mut self, id: AnimationId, outcome: AnimationOutcome) {
        if !self.motion.finish_animation(id, outcome) {
            return;
        }
        match self.pending_did_transition {
            Some((pending, to)) if pending == id => {
                self.pending_did_transition = None;
                self.presentable.did_transition(to);
            }
            _ => {}
        }
    }

    fn tap_outside(&mut self, point: Point) -> bool {
        if !self.attached
            || !self.presentable.allows_tap_to_dismiss()
            || self.motion.frame().contains(point)
        {
            return false;
        }
        tracing::debug!(target: "pansheet.gesture", x = point.x, y = point.y, "tap outside");
        self.transition(PresentationState::Hidden, true);
        self.state == PresentationState::Hidden
    }

    fn handle_pan(&mut self, recognizer: &dyn PanRecognizer) {
        if !self.attached || !self.user_interaction_enabled || !self.should_respond(recognizer) {
            recognizer.set_translation(Vector::ZERO);
            return;
        }

        if recognizer.phase().is_moving() {
            self.respond(recognizer);
            if self.motion.current_y() == self.motion.anchored_y()
                && self.motion.extends_pan_scrolling()
            {
                self.presentable.will_transition(PresentationState::Long);
            }
        } else {
            let velocity_y = recognizer.velocity().dy;
            let current_y = self.motion.current_y();
            let target = self.interpreter.release_target(
                velocity_y,
                current_y,
                &self.motion.anchors(),
                self.presentable.allows_drag_to_dismiss(),
            );
            tracing::debug!(
                target: "pansheet.gesture",
                velocity_y,
                current_y,
                kind = ?self.interpreter.classify(velocity_y),
                ?target,
                "pan released"
            );
            self.transition(target, true);
        }
    }

    fn should_respond(&self, recognizer: &dyn PanRecognizer) -> bool {
        let phase = recognizer.phase();
        if !self.presentable.should_respond(recognizer)
            && matches!(phase, GesturePhase::Began | GesturePhase::Cancelled)
        {
            tracing::debug!(target: "pansheet.gesture", ?phase, "pan rejected by presentable");
            recognizer.reset();
            return false;
        }
        !self.should_fail(recognizer)
    }

    fn should_fail(&self, recognizer: &dyn PanRecognizer) -> bool {
        if recognizer.phase() == GesturePhase::Began
            && self.presentable.should_prioritize(recognizer)
        {
            if let Some(surface) = self.presentable.pan_scrollable() {
                surface.reset_pan_gesture();
            }
            return false;
        }
        if !self.motion.is_anchored() {
            return false;
        }
        let Some(surface) = self.presentable.pan_scrollable() else {
            return false;
        };
        let claimed = interpreter::surface_claims_touch(surface.as_ref(), recognizer.location());
        if claimed {
            tracing::trace!(target: "pansheet.gesture", "pan left to scroll surface");
        }
        claimed
    }

    fn respond(&mut self, recognizer: &dyn PanRecognizer) {
        self.presentable.will_respond(recognizer);
        let delta = recognizer.translation().dy;
        let target = self.interpreter.drag_target(
            self.motion.current_y(),
            delta,
            self.motion.anchors().long_form_y,
        );
        self.motion.adjust(target);
        recognizer.set_translation(Vector::ZERO);
    }

    fn did_scroll(&mut self, change: OffsetChange) {
        let Some(surface) = self.presentable.pan_scrollable() else {
            return;
        };
        let input = ScrollInput {
            presenting_or_dismissing: self.presentable.is_being_presented()
                || self.presentable.is_being_dismissed(),
            anchored: self.motion.is_anchored(),
            animating: self.motion.is_animating(),
            scrolling: surface.is_scrolling(),
            decelerating: surface.is_decelerating(),
            content_is_surface: self.presentable.content_is_scroll_surface(),
            change,
        };
        let action = scroll::decide(&input);
        tracing::trace!(target: "pansheet.scroll", ?change, ?action, "offset changed");

        match action {
            ScrollAction::Ignore => {}
            ScrollAction::Halt => self.scroll.halt(surface.as_ref()),
            ScrollAction::Track => self.scroll.track(surface.as_ref()),
            ScrollAction::BounceFollow { offset } => {
                let height = self.motion.frame().height;
                self.motion.set_visible_height(height + offset);
                self.motion
                    .adjust(self.motion.anchors().long_form_y - offset);
                surface.set_shows_vertical_indicator(false);
            }
            ScrollAction::BounceSettle { offset } => {
                tracing::debug!(target: "pansheet.scroll", offset, "top bounce settled");
                self.motion.restore_visible_height();
                self.scroll.reset_tracking();
                self.snap(self.motion.anchors().long_form_y, true);
                surface.set_shows_vertical_indicator(false);
            }
        }
    }
}
