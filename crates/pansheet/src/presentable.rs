#![forbid(unsafe_code)]

//! The contract between a sheet and the screen it presents.
//!
//! [`Presentable`] lists every value and hook the sheet reads. All members
//! are required; [`PresentableConfig`] is the companion that computes the
//! standard value for each of them, so implementors only decide what they
//! want to change. [`ConfiguredPresentable`] is a ready-made implementation
//! driven entirely by a config plus optional hook closures.
//!
//! Values are re-read at the start of every layout pass and gesture, so an
//! implementation may return different answers over time (for example when
//! its content grows). Call `PanSheet::set_needs_layout_update` after such a
//! change.
//!
//! Hooks run while the sheet is mid-update and must not call back into the
//! sheet synchronously.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use pansheet_core::animation::{AnimationOptions, DEFAULT_TRANSITION_DURATION};
use pansheet_core::geometry::EdgeInsets;
use pansheet_core::height::{ContainerMetrics, HeightSpec};

use crate::PresentationState;
use crate::interpreter::PanRecognizer;
use crate::scroll::ScrollSurface;

/// Everything a sheet needs from the screen it presents.
pub trait Presentable {
    /// Offset of the sheet's usable area from the container top.
    fn top_offset(&self, metrics: &ContainerMetrics) -> f64;
    fn short_form_height(&self) -> HeightSpec;
    fn long_form_height(&self) -> HeightSpec;
    /// Embedded scrollable content whose scrolling hands off to the sheet.
    fn pan_scrollable(&self) -> Option<Rc<dyn ScrollSurface>>;
    /// Whether the presented content is itself the observed scroll surface
    /// (rather than containing it somewhere in its hierarchy).
    fn content_is_scroll_surface(&self) -> bool;
    /// Fitting height of the content at the given width.
    fn intrinsic_height(&self, width: f64) -> f64;
    fn corner_radius(&self) -> f64;
    fn spring_damping(&self) -> f64;
    fn transition_duration(&self) -> Duration;
    fn transition_options(&self) -> AnimationOptions;
    fn scroll_indicator_insets(&self, metrics: &ContainerMetrics) -> EdgeInsets;
    /// Anchor the sheet to the long form instead of the top offset.
    fn anchor_modal_to_long_form(&self) -> bool;
    /// Let the embedded content keep scrolling once the sheet is anchored.
    fn allows_extended_pan_scrolling(&self, metrics: &ContainerMetrics) -> bool;
    fn allows_drag_to_dismiss(&self) -> bool;
    fn allows_tap_to_dismiss(&self) -> bool;
    fn is_user_interaction_enabled(&self) -> bool;
    fn should_round_top_corners(&self) -> bool;
    fn is_being_presented(&self) -> bool;
    fn is_being_dismissed(&self) -> bool;

    /// Whether the sheet should follow this drag.
    fn should_respond(&self, gesture: &dyn PanRecognizer) -> bool;
    /// Called before each drag increment is applied.
    fn will_respond(&self, gesture: &dyn PanRecognizer);
    /// Veto a transition.
    fn should_transition(&self, to: PresentationState) -> bool;
    fn will_transition(&self, to: PresentationState);
    /// Called once the sheet has settled in the new state.
    fn did_transition(&self, to: PresentationState);
    /// Give the sheet's drag priority over the embedded content's pan.
    fn should_prioritize(&self, gesture: &dyn PanRecognizer) -> bool;
}

/// Standard values for every [`Presentable`] member.
///
/// `None` fields are derived from the container metrics or the scroll
/// surface when read.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentableConfig {
    /// `None`: the top safe-area inset.
    pub top_offset: Option<f64>,
    /// `None`: same as the long form.
    pub short_form_height: Option<HeightSpec>,
    /// `None`: the scroll surface's content height, or `MaxHeight` without one.
    pub long_form_height: Option<HeightSpec>,
    pub corner_radius: f64,
    pub spring_damping: f64,
    pub transition_duration: Duration,
    pub transition_options: AnimationOptions,
    /// `None`: corner radius on top (when rounding) and the bottom safe area.
    pub scroll_indicator_insets: Option<EdgeInsets>,
    pub anchor_modal_to_long_form: bool,
    /// `None`: only when the scroll content overflows its frame.
    pub allows_extended_pan_scrolling: Option<bool>,
    pub allows_drag_to_dismiss: bool,
    pub allows_tap_to_dismiss: bool,
    pub is_user_interaction_enabled: bool,
    pub should_round_top_corners: bool,
}

impl Default for PresentableConfig {
    fn default() -> Self {
        Self {
            top_offset: None,
            short_form_height: None,
            long_form_height: None,
            corner_radius: 8.0,
            spring_damping: 0.8,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            transition_options: AnimationOptions::SHEET_DEFAULT,
            scroll_indicator_insets: None,
            anchor_modal_to_long_form: true,
            allows_extended_pan_scrolling: None,
            allows_drag_to_dismiss: true,
            allows_tap_to_dismiss: true,
            is_user_interaction_enabled: true,
            should_round_top_corners: true,
        }
    }
}

impl PresentableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both form heights.
    #[must_use]
    pub fn heights(mut self, short: HeightSpec, long: HeightSpec) -> Self {
        self.short_form_height = Some(short);
        self.long_form_height = Some(long);
        self
    }

    #[must_use]
    pub fn top_offset(mut self, offset: f64) -> Self {
        self.top_offset = Some(offset);
        self
    }

    #[must_use]
    pub fn anchor_to_long_form(mut self, anchor: bool) -> Self {
        self.anchor_modal_to_long_form = anchor;
        self
    }

    #[must_use]
    pub fn extended_pan_scrolling(mut self, allowed: bool) -> Self {
        self.allows_extended_pan_scrolling = Some(allowed);
        self
    }

    #[must_use]
    pub fn drag_to_dismiss(mut self, allowed: bool) -> Self {
        self.allows_drag_to_dismiss = allowed;
        self
    }

    #[must_use]
    pub fn tap_to_dismiss(mut self, allowed: bool) -> Self {
        self.allows_tap_to_dismiss = allowed;
        self
    }

    pub fn resolve_top_offset(&self, metrics: &ContainerMetrics) -> f64 {
        self.top_offset.unwrap_or(metrics.safe_area.top)
    }

    pub fn resolve_long_form_height(&self, scrollable: Option<&dyn ScrollSurface>) -> HeightSpec {
        self.long_form_height.unwrap_or_else(|| {
            scrollable.map_or(HeightSpec::MaxHeight, |surface| {
                HeightSpec::ContentHeight(surface.content_height())
            })
        })
    }

    pub fn resolve_short_form_height(&self, scrollable: Option<&dyn ScrollSurface>) -> HeightSpec {
        self.short_form_height
            .unwrap_or_else(|| self.resolve_long_form_height(scrollable))
    }

    pub fn resolve_scroll_indicator_insets(&self, metrics: &ContainerMetrics) -> EdgeInsets {
        self.scroll_indicator_insets.unwrap_or_else(|| {
            let top = if self.should_round_top_corners {
                self.corner_radius
            } else {
                0.0
            };
            EdgeInsets::vertical(top, metrics.safe_area.bottom)
        })
    }

    pub fn resolve_extended_pan_scrolling(
        &self,
        scrollable: Option<&dyn ScrollSurface>,
        metrics: &ContainerMetrics,
    ) -> bool {
        self.allows_extended_pan_scrolling.unwrap_or_else(|| {
            scrollable.is_some_and(|surface| {
                surface.content_height() > surface.frame().height - metrics.safe_area.bottom
            })
        })
    }
}

type GestureFilter = Box<dyn Fn(&dyn PanRecognizer) -> bool>;
type GestureHook = Box<dyn Fn(&dyn PanRecognizer)>;
type TransitionFilter = Box<dyn Fn(PresentationState) -> bool>;
type TransitionHook = Box<dyn Fn(PresentationState)>;

/// A [`Presentable`] assembled from a [`PresentableConfig`], an optional
/// scroll surface and optional hook closures.
pub struct ConfiguredPresentable {
    config: PresentableConfig,
    scrollable: Option<Rc<dyn ScrollSurface>>,
    content_is_scroll_surface: bool,
    measure: Option<Box<dyn Fn(f64) -> f64>>,
    being_presented: Cell<bool>,
    being_dismissed: Cell<bool>,
    should_respond: Option<GestureFilter>,
    will_respond: Option<GestureHook>,
    should_prioritize: Option<GestureFilter>,
    should_transition: Option<TransitionFilter>,
    will_transition: Option<TransitionHook>,
    did_transition: Option<TransitionHook>,
}

impl ConfiguredPresentable {
    pub fn new(config: PresentableConfig) -> Self {
        Self {
            config,
            scrollable: None,
            content_is_scroll_surface: false,
            measure: None,
            being_presented: Cell::new(false),
            being_dismissed: Cell::new(false),
            should_respond: None,
            will_respond: None,
            should_prioritize: None,
            should_transition: None,
            will_transition: None,
            did_transition: None,
        }
    }

    /// Embed a scroll surface.
    ///
    /// `is_content` marks the surface as the presented content itself, which
    /// enables the top-bounce hand-off.
    #[must_use]
    pub fn with_scrollable(mut self, surface: Rc<dyn ScrollSurface>, is_content: bool) -> Self {
        self.scrollable = Some(surface);
        self.content_is_scroll_surface = is_content;
        self
    }

    /// Measure the content for [`HeightSpec::IntrinsicHeight`].
    #[must_use]
    pub fn with_measure(mut self, measure: impl Fn(f64) -> f64 + 'static) -> Self {
        self.measure = Some(Box::new(measure));
        self
    }

    #[must_use]
    pub fn on_should_respond(mut self, f: impl Fn(&dyn PanRecognizer) -> bool + 'static) -> Self {
        self.should_respond = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_will_respond(mut self, f: impl Fn(&dyn PanRecognizer) + 'static) -> Self {
        self.will_respond = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_should_prioritize(
        mut self,
        f: impl Fn(&dyn PanRecognizer) -> bool + 'static,
    ) -> Self {
        self.should_prioritize = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_should_transition(mut self, f: impl Fn(PresentationState) -> bool + 'static) -> Self {
        self.should_transition = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_will_transition(mut self, f: impl Fn(PresentationState) + 'static) -> Self {
        self.will_transition = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_did_transition(mut self, f: impl Fn(PresentationState) + 'static) -> Self {
        self.did_transition = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &PresentableConfig {
        &self.config
    }

    /// Mutable access; follow up with `PanSheet::set_needs_layout_update`.
    pub fn config_mut(&mut self) -> &mut PresentableConfig {
        &mut self.config
    }

    pub fn set_being_presented(&self, presenting: bool) {
        self.being_presented.set(presenting);
    }

    pub fn set_being_dismissed(&self, dismissing: bool) {
        self.being_dismissed.set(dismissing);
    }

    fn scrollable_ref(&self) -> Option<&dyn ScrollSurface> {
        self.scrollable.as_deref()
    }
}

impl fmt::Debug for ConfiguredPresentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredPresentable")
            .field("config", &self.config)
            .field("has_scrollable", &self.scrollable.is_some())
            .field("content_is_scroll_surface", &self.content_is_scroll_surface)
            .finish_non_exhaustive()
    }
}

impl Presentable for ConfiguredPresentable {
    fn top_offset(&self, metrics: &ContainerMetrics) -> f64 {
        self.config.resolve_top_offset(metrics)
    }

    fn short_form_height(&self) -> HeightSpec {
        self.config.resolve_short_form_height(self.scrollable_ref())
    }

    fn long_form_height(&self) -> HeightSpec {
        self.config.resolve_long_form_height(self.scrollable_ref())
    }

    fn pan_scrollable(&self) -> Option<Rc<dyn ScrollSurface>> {
        self.scrollable.clone()
    }

    fn content_is_scroll_surface(&self) -> bool {
        self.content_is_scroll_surface
    }

    fn intrinsic_height(&self, width: f64) -> f64 {
        match &self.measure {
            Some(measure) => measure(width),
            None => self
                .scrollable_ref()
                .map_or(0.0, |surface| surface.content_height()),
        }
    }

    fn corner_radius(&self) -> f64 {
        self.config.corner_radius
    }

    fn spring_damping(&self) -> f64 {
        self.config.spring_damping
    }

    fn transition_duration(&self) -> Duration {
        self.config.transition_duration
    }

    fn transition_options(&self) -> AnimationOptions {
        self.config.transition_options
    }

    fn scroll_indicator_insets(&self, metrics: &ContainerMetrics) -> EdgeInsets {
        self.config.resolve_scroll_indicator_insets(metrics)
    }

    fn anchor_modal_to_long_form(&self) -> bool {
        self.config.anchor_modal_to_long_form
    }

    fn allows_extended_pan_scrolling(&self, metrics: &ContainerMetrics) -> bool {
        self.config
            .resolve_extended_pan_scrolling(self.scrollable_ref(), metrics)
    }

    fn allows_drag_to_dismiss(&self) -> bool {
        self.config.allows_drag_to_dismiss
    }

    fn allows_tap_to_dismiss(&self) -> bool {
        self.config.allows_tap_to_dismiss
    }

    fn is_user_interaction_enabled(&self) -> bool {
        self.config.is_user_interaction_enabled
    }

    fn should_round_top_corners(&self) -> bool {
        self.config.should_round_top_corners
    }

    fn is_being_presented(&self) -> bool {
        self.being_presented.get()
    }

    fn is_being_dismissed(&self) -> bool {
        self.being_dismissed.get()
    }

    fn should_respond(&self, gesture: &dyn PanRecognizer) -> bool {
        self.should_respond.as_ref().is_none_or(|f| f(gesture))
    }

    fn will_respond(&self, gesture: &dyn PanRecognizer) {
        if let Some(f) = &self.will_respond {
            f(gesture);
        }
    }

    fn should_transition(&self, to: PresentationState) -> bool {
        self.should_transition.as_ref().is_none_or(|f| f(to))
    }

    fn will_transition(&self, to: PresentationState) {
        if let Some(f) = &self.will_transition {
            f(to);
        }
    }

    fn did_transition(&self, to: PresentationState) {
        if let Some(f) = &self.did_transition {
            f(to);
        }
    }

    fn should_prioritize(&self, gesture: &dyn PanRecognizer) -> bool {
        self.should_prioritize.as_ref().is_some_and(|f| f(gesture))
    }
}
