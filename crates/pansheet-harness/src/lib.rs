#![forbid(unsafe_code)]

//! Deterministic host fixtures for pansheet.
//!
//! Everything a host normally provides, implemented in memory: a scroll
//! surface ([`MockScrollView`]), a pan recognizer ([`MockRecognizer`]),
//! animators that complete on demand or on a virtual clock
//! ([`RecordingAnimator`], [`ImmediateAnimator`]) and a hook recorder
//! ([`HookLog`]). [`SheetFixture`] wires them to a [`PanSheet`] with phone
//! sized container metrics.
//!
//! # Role in pansheet
//! Integration tests in `pansheet` drive sheets exclusively through this
//! crate. Hosts can use it the same way to test their own presentables
//! headlessly.

pub mod animator;
pub mod hooks;
pub mod recognizer;
pub mod scroll_view;

use std::rc::Rc;

use pansheet::presentable::{ConfiguredPresentable, PresentableConfig};
use pansheet::scroll::ScrollSurface;
use pansheet::{PanGestureTarget, PanSheet, SheetConfig};
use pansheet_core::drag::GesturePhase;
use pansheet_core::geometry::{EdgeInsets, Rect, Size};
use pansheet_core::height::{ContainerMetrics, HeightSpec};

pub use animator::{Easing, ImmediateAnimator, RecordingAnimator, sample};
pub use hooks::{HookEvent, HookLog};
pub use recognizer::MockRecognizer;
pub use scroll_view::MockScrollView;

/// Container width of the reference phone.
pub const PHONE_WIDTH: f64 = 390.0;
/// Container height of the reference phone.
pub const PHONE_HEIGHT: f64 = 844.0;
/// Top safe-area inset of the reference phone.
pub const PHONE_SAFE_TOP: f64 = 47.0;
/// Bottom safe-area inset of the reference phone.
pub const PHONE_SAFE_BOTTOM: f64 = 34.0;

/// Metrics of the reference phone.
pub fn phone_metrics() -> ContainerMetrics {
    ContainerMetrics::new(Size::new(PHONE_WIDTH, PHONE_HEIGHT))
        .with_safe_area(EdgeInsets::vertical(PHONE_SAFE_TOP, PHONE_SAFE_BOTTOM))
}

/// Short form of 300pt content, long form at max height.
///
/// On the reference phone: long 47, short 510, hidden 844.
pub fn standard_config() -> PresentableConfig {
    PresentableConfig::new().heights(HeightSpec::ContentHeight(300.0), HeightSpec::MaxHeight)
}

/// A sheet wired to in-memory host fixtures.
#[derive(Debug)]
pub struct SheetFixture {
    pub sheet: PanSheet<ConfiguredPresentable>,
    pub scroll: Rc<MockScrollView>,
    pub animator: Rc<RecordingAnimator>,
    pub recognizer: MockRecognizer,
    pub hooks: HookLog,
    pub metrics: ContainerMetrics,
}

impl SheetFixture {
    /// A detached sheet whose content is a 2000pt tall scroll view.
    pub fn new(config: PresentableConfig) -> Self {
        Self::build(config, SheetConfig::default(), |p| p)
    }

    /// Like [`new`](Self::new), then attached and settled.
    pub fn attached(config: PresentableConfig) -> Self {
        let fixture = Self::new(config);
        fixture.attach();
        fixture
    }

    /// Full control over the presentable and the sheet config.
    ///
    /// `customize` runs before the hook log is installed, so recording hooks
    /// replace any `will_respond`, `will_transition` or `did_transition`
    /// hooks it sets.
    pub fn build(
        config: PresentableConfig,
        sheet_config: SheetConfig,
        customize: impl FnOnce(ConfiguredPresentable) -> ConfiguredPresentable,
    ) -> Self {
        let metrics = phone_metrics();
        let scroll = Rc::new(MockScrollView::new(
            1,
            Rect::new(0.0, 0.0, PHONE_WIDTH, PHONE_HEIGHT - PHONE_SAFE_TOP),
            2000.0,
        ));
        let surface: Rc<dyn ScrollSurface> = scroll.clone();
        let hooks = HookLog::new();
        let presentable =
            hooks.install(customize(ConfiguredPresentable::new(config).with_scrollable(surface, true)));
        let animator = Rc::new(RecordingAnimator::new());
        let sheet = PanSheet::with_config(presentable, animator.clone(), sheet_config);
        Self {
            sheet,
            scroll,
            animator,
            recognizer: MockRecognizer::new(),
            hooks,
            metrics,
        }
    }

    /// Run the host layout pass and finish any animation it started.
    pub fn attach(&self) {
        self.sheet.layout(self.metrics);
        self.settle();
    }

    /// Complete every pending animation.
    pub fn settle(&self) {
        self.animator.complete_all();
    }

    pub fn target(&self) -> PanGestureTarget<ConfiguredPresentable> {
        self.sheet.gesture_target()
    }

    /// Deliver one drag increment.
    pub fn drag(&self, phase: GesturePhase, dy: f64) {
        self.recognizer.move_by(phase, dy);
        self.sheet.gesture_target().handle(&self.recognizer);
    }

    /// Deliver a release with the given vertical velocity.
    pub fn release(&self, velocity_y: f64) {
        self.recognizer.release(velocity_y);
        self.sheet.gesture_target().handle(&self.recognizer);
    }
}
