#![forbid(unsafe_code)]

//! Panel position and animated moves.
//!
//! [`MotionController`] is the only writer of the panel frame. It clamps
//! every move against the anchored position, turns animated snaps into
//! [`AnimationRequest`]s for the host and tracks which request is current.
//!
//! # Invariants
//!
//! 1. After any `adjust`, `current_y >= anchored_y`.
//! 2. Animation ids are strictly increasing; only the completion of the most
//!    recent request clears `is_animating`.
//! 3. An interrupted animation leaves `is_animating` set.
//!
//! # Failure Modes
//!
//! - Late completions of superseded requests are ignored.
//! - Unusable presentable animation values (zero duration, damping outside
//!   `(0, 1]`, no curve) fall back to the configured defaults.

use std::time::Duration;

use pansheet_core::animation::{
    AnimationId, AnimationOptions, AnimationOutcome, AnimationParams, AnimationRequest,
};
use pansheet_core::geometry::{Rect, Size, rounded_le};
use pansheet_core::height::Anchors;

/// Owner of the panel frame and the animation generation.
#[derive(Debug, Clone)]
pub struct MotionController {
    anchors: Anchors,
    top_offset: f64,
    anchor_to_long_form: bool,
    extends_pan_scrolling: bool,
    frame: Rect,
    visible_height: f64,
    content_frame: Rect,
    is_animating: bool,
    next_animation: u64,
    latest_animation: Option<AnimationId>,
    fallback: AnimationParams,
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(AnimationParams::fallback())
    }
}

impl MotionController {
    pub fn new(fallback: AnimationParams) -> Self {
        Self {
            anchors: Anchors::default(),
            top_offset: 0.0,
            anchor_to_long_form: true,
            extends_pan_scrolling: false,
            frame: Rect::default(),
            visible_height: 0.0,
            content_frame: Rect::default(),
            is_animating: false,
            next_animation: 1,
            latest_animation: None,
            fallback,
        }
    }

    /// Install the values computed by a layout pass.
    pub fn set_layout(
        &mut self,
        anchors: Anchors,
        top_offset: f64,
        anchor_to_long_form: bool,
        extends_pan_scrolling: bool,
    ) {
        self.anchors = anchors;
        self.top_offset = top_offset;
        self.anchor_to_long_form = anchor_to_long_form;
        self.extends_pan_scrolling = extends_pan_scrolling;
    }

    #[inline]
    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    #[inline]
    pub fn top_offset(&self) -> f64 {
        self.top_offset
    }

    #[inline]
    pub fn extends_pan_scrolling(&self) -> bool {
        self.extends_pan_scrolling
    }

    /// The highest position the panel may take.
    #[inline]
    pub fn anchored_y(&self) -> f64 {
        if self.anchor_to_long_form {
            self.anchors.long_form_y
        } else {
            self.top_offset
        }
    }

    #[inline]
    pub fn current_y(&self) -> f64 {
        self.frame.y
    }

    #[inline]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Height of the panel's visible bounds. Shrinks during a top bounce.
    #[inline]
    pub fn visible_height(&self) -> f64 {
        self.visible_height
    }

    #[inline]
    pub fn content_frame(&self) -> Rect {
        self.content_frame
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    /// Id of the most recent animation request.
    #[inline]
    pub fn latest_animation(&self) -> Option<AnimationId> {
        self.latest_animation
    }

    /// Anchored: at (or above) the anchored position, at rest, with extended
    /// scrolling allowed.
    pub fn is_anchored(&self) -> bool {
        !self.is_animating
            && self.extends_pan_scrolling
            && rounded_le(self.frame.y, self.anchored_y())
    }

    /// Move the panel top to `y`, clamped to the anchored position.
    pub fn adjust(&mut self, y: f64) {
        let clamped = y.max(self.anchored_y());
        tracing::trace!(
            target: "pansheet.motion",
            requested = y,
            applied = clamped,
            "adjust"
        );
        self.frame.y = clamped;
    }

    /// Apply the move to `y` and describe it as an animation for the host.
    ///
    /// The model is updated immediately; the request tells the host where the
    /// visual interpolation starts and ends.
    pub fn begin_snap(&mut self, y: f64, params: AnimationParams) -> AnimationRequest {
        let from_y = self.frame.y;
        self.adjust(y);
        let id = AnimationId(self.next_animation);
        self.next_animation += 1;
        self.latest_animation = Some(id);
        self.is_animating = true;
        tracing::debug!(
            target: "pansheet.motion",
            id = id.0,
            from_y,
            to_y = self.frame.y,
            duration_ms = params.duration.as_millis() as u64,
            "animated snap requested"
        );
        AnimationRequest {
            id,
            from_y,
            to_y: self.frame.y,
            params,
        }
    }

    /// Record how an animation ended.
    ///
    /// Returns `true` when `id` is the current request and it completed.
    pub fn finish_animation(&mut self, id: AnimationId, outcome: AnimationOutcome) -> bool {
        if self.latest_animation != Some(id) {
            tracing::trace!(
                target: "pansheet.motion",
                id = id.0,
                ?outcome,
                "stale animation completion ignored"
            );
            return false;
        }
        tracing::debug!(target: "pansheet.motion", id = id.0, ?outcome, "animation finished");
        if outcome.is_completed() {
            self.is_animating = false;
        }
        outcome.is_completed()
    }

    /// Animation parameters, replacing unusable values with the fallbacks.
    pub fn animation_params(
        &self,
        duration: Duration,
        spring_damping: f64,
        options: AnimationOptions,
    ) -> AnimationParams {
        AnimationParams {
            duration: if duration.is_zero() {
                self.fallback.duration
            } else {
                duration
            },
            spring_damping: if spring_damping > 0.0 && spring_damping <= 1.0 {
                spring_damping
            } else {
                self.fallback.spring_damping
            },
            options: if options.is_empty() {
                self.fallback.options
            } else {
                options
            },
        }
    }

    /// Size the panel to the container.
    ///
    /// A panel not resting on the short or long anchor keeps its distance
    /// from the container bottom, clamped to the anchored position. The
    /// content frame spans from the anchored position to the bottom.
    pub fn fit_to_container(&mut self, container: Rect) {
        let old = self.frame;
        self.frame = Rect::new(container.x, old.y, container.width, container.height);
        if !self.anchors.is_resting_at(old.y) {
            let y = old.y - old.height + container.height;
            self.frame.y = y.max(self.anchored_y());
        }
        self.visible_height = container.height;
        self.content_frame = Rect::from_size(Size::new(
            container.width,
            container.height - self.anchored_y(),
        ));
        tracing::trace!(
            target: "pansheet.layout",
            y = self.frame.y,
            width = self.frame.width,
            height = self.frame.height,
            "panel frame fitted"
        );
    }

    /// Override the visible bounds height.
    pub fn set_visible_height(&mut self, height: f64) {
        self.visible_height = height;
    }

    /// Restore the visible bounds to the full panel height.
    pub fn restore_visible_height(&mut self) {
        self.visible_height = self.frame.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> MotionController {
        let mut m = MotionController::default();
        m.set_layout(
            Anchors {
                short_form_y: 500.0,
                long_form_y: 40.0,
                hidden_form_y: 844.0,
            },
            20.0,
            true,
            true,
        );
        m.fit_to_container(Rect::new(0.0, 0.0, 390.0, 844.0));
        m
    }

    #[test]
    fn adjust_clamps_to_long_form() {
        let mut m = controller();
        m.adjust(10.0);
        assert_eq!(m.current_y(), 40.0);
        m.adjust(300.0);
        assert_eq!(m.current_y(), 300.0);
    }

    #[test]
    fn adjust_clamps_to_top_offset_when_not_anchored_to_long_form() {
        let mut m = controller();
        m.set_layout(m.anchors(), 20.0, false, true);
        m.adjust(10.0);
        assert_eq!(m.current_y(), 20.0);
        m.adjust(30.0);
        assert_eq!(m.current_y(), 30.0);
    }

    #[test]
    fn snap_requests_carry_increasing_ids() {
        let mut m = controller();
        m.adjust(844.0);
        let first = m.begin_snap(500.0, AnimationParams::fallback());
        let second = m.begin_snap(40.0, AnimationParams::fallback());
        assert!(second.id > first.id);
        assert_eq!(first.from_y, 844.0);
        assert_eq!(second.from_y, 500.0);
        assert_eq!(second.to_y, 40.0);
        assert_eq!(m.current_y(), 40.0);
        assert!(m.is_animating());
    }

    #[test]
    fn snap_target_is_clamped() {
        let mut m = controller();
        let request = m.begin_snap(-100.0, AnimationParams::fallback());
        assert_eq!(request.to_y, 40.0);
    }

    #[test]
    fn only_latest_completion_clears_animating() {
        let mut m = controller();
        let first = m.begin_snap(500.0, AnimationParams::fallback());
        let second = m.begin_snap(40.0, AnimationParams::fallback());
        assert!(!m.finish_animation(first.id, AnimationOutcome::Completed));
        assert!(m.is_animating());
        assert!(m.finish_animation(second.id, AnimationOutcome::Completed));
        assert!(!m.is_animating());
    }

    #[test]
    fn interrupted_animation_stays_animating() {
        let mut m = controller();
        let request = m.begin_snap(500.0, AnimationParams::fallback());
        assert!(!m.finish_animation(request.id, AnimationOutcome::Interrupted));
        assert!(m.is_animating());
    }

    #[test]
    fn anchored_requires_rest_and_extension() {
        let mut m = controller();
        m.adjust(40.4);
        assert!(m.is_anchored());
        m.adjust(41.0);
        assert!(!m.is_anchored());
        m.adjust(40.0);
        m.set_layout(m.anchors(), 20.0, true, false);
        assert!(!m.is_anchored());
        m.set_layout(m.anchors(), 20.0, true, true);
        m.begin_snap(40.0, AnimationParams::fallback());
        assert!(!m.is_anchored());
    }

    #[test]
    fn fit_keeps_distance_from_bottom_when_between_anchors() {
        let mut m = controller();
        m.adjust(300.0);
        m.fit_to_container(Rect::new(0.0, 0.0, 390.0, 744.0));
        assert_eq!(m.current_y(), 200.0);
        assert_eq!(m.frame().height, 744.0);
        assert_eq!(m.content_frame(), Rect::new(0.0, 0.0, 390.0, 704.0));
    }

    #[test]
    fn fit_leaves_resting_panel_in_place() {
        let mut m = controller();
        m.adjust(500.0);
        m.fit_to_container(Rect::new(0.0, 0.0, 390.0, 744.0));
        assert_eq!(m.current_y(), 500.0);
    }

    #[test]
    fn fit_clamps_to_anchored() {
        let mut m = controller();
        m.adjust(100.0);
        m.fit_to_container(Rect::new(0.0, 0.0, 390.0, 744.0));
        assert_eq!(m.current_y(), 40.0);
    }

    #[test]
    fn unusable_params_fall_back() {
        let m = controller();
        let params = m.animation_params(Duration::ZERO, 0.0, AnimationOptions::empty());
        assert_eq!(params, AnimationParams::fallback());
        let params = m.animation_params(
            Duration::from_millis(250),
            0.8,
            AnimationOptions::CURVE_LINEAR,
        );
        assert_eq!(params.duration, Duration::from_millis(250));
        assert_eq!(params.spring_damping, 0.8);
        assert_eq!(params.options, AnimationOptions::CURVE_LINEAR);
    }

    #[test]
    fn visible_height_restores_to_frame() {
        let mut m = controller();
        m.set_visible_height(800.0);
        assert_eq!(m.visible_height(), 800.0);
        m.restore_visible_height();
        assert_eq!(m.visible_height(), 844.0);
    }
}
