#![forbid(unsafe_code)]

//! Height specifications and anchor resolution.
//!
//! A [`HeightSpec`] is a declarative description of how tall a sheet form
//! should be. [`HeightContext::resolve`] turns it into the Y coordinate of the
//! sheet's top edge, and [`Anchors::resolve`] derives the three resting
//! positions the sheet can snap to.
//!
//! # Invariants
//!
//! 1. Resolution is a pure function of the height spec, the context and the measured
//!    content height: identical inputs always yield identical outputs.
//! 2. `short_form_y >= long_form_y` for every resolved [`Anchors`].
//! 3. `hidden_form_y == container height`.
//! 4. `long_form_y` is never above the resolved `MaxHeight` position plus the
//!    top offset.
//!
//! # Failure Modes
//!
//! - Content taller than the container resolves to a negative Y; the anchor
//!   clamps pull it back to the `MaxHeight` position.
//! - The intrinsic measurement closure is only invoked for
//!   [`HeightSpec::IntrinsicHeight`].

use crate::geometry::{EdgeInsets, Rect, Size};

/// How tall a sheet form should be.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HeightSpec {
    /// The full container height (the top offset still applies).
    #[default]
    MaxHeight,
    /// The full height minus a top inset. An inset of 0 equals `MaxHeight`.
    MaxHeightWithTopInset(f64),
    /// A content height, sitting above the bottom safe area.
    ContentHeight(f64),
    /// A content height that extends into the bottom safe area.
    ContentHeightIgnoringSafeArea(f64),
    /// The content's own fitting height, measured at the container width.
    IntrinsicHeight,
}

/// Layout inputs supplied by the host container on every layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    /// Container bounds.
    pub bounds: Rect,
    /// Safe-area insets of the container.
    pub safe_area: EdgeInsets,
    /// Whether a screen reader or similar assistive technology is active.
    pub voice_over_running: bool,
}

impl ContainerMetrics {
    /// Metrics for a container of the given size with no safe area.
    pub fn new(size: Size) -> Self {
        Self {
            bounds: Rect::from_size(size),
            safe_area: EdgeInsets::ZERO,
            voice_over_running: false,
        }
    }

    /// Set the safe-area insets.
    #[must_use]
    pub fn with_safe_area(mut self, safe_area: EdgeInsets) -> Self {
        self.safe_area = safe_area;
        self
    }

    /// Set the assistive-technology flag.
    #[must_use]
    pub fn with_voice_over(mut self, running: bool) -> Self {
        self.voice_over_running = running;
        self
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.bounds.size()
    }
}

/// Everything needed to turn a [`HeightSpec`] into a Y coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightContext {
    /// Container size.
    pub container: Size,
    /// Offset of the sheet's usable area from the container top.
    pub top_offset: f64,
    /// Bottom safe-area inset.
    pub bottom_inset: f64,
}

impl HeightContext {
    /// Build a context from container metrics and a top offset.
    pub fn from_metrics(metrics: &ContainerMetrics, top_offset: f64) -> Self {
        Self {
            container: metrics.size(),
            top_offset,
            bottom_inset: metrics.safe_area.bottom,
        }
    }

    /// Bottom of the usable area, relative to the top offset.
    #[inline]
    pub fn bottom_y(&self) -> f64 {
        self.container.height - self.top_offset
    }

    /// Resolve a height spec to the distance of the sheet's top edge from the top.
    ///
    /// `measure` receives the container width and returns the fitting
    /// content height; it is only called for [`HeightSpec::IntrinsicHeight`].
    pub fn resolve(&self, spec: HeightSpec, measure: impl FnOnce(f64) -> f64) -> f64 {
        match spec {
            HeightSpec::MaxHeight => 0.0,
            HeightSpec::MaxHeightWithTopInset(inset) => inset,
            HeightSpec::ContentHeight(height) => self.bottom_y() - (height + self.bottom_inset),
            HeightSpec::ContentHeightIgnoringSafeArea(height) => self.bottom_y() - height,
            HeightSpec::IntrinsicHeight => {
                let height = measure(self.container.width);
                self.bottom_y() - (height + self.bottom_inset)
            }
        }
    }

    /// Inverse of the `ContentHeight` formula: the content height that
    /// resolves to `y`.
    #[inline]
    pub fn content_height_at(&self, y: f64) -> f64 {
        self.bottom_y() - self.bottom_inset - y
    }
}

/// The three resting positions of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchors {
    /// Top edge when resting in the short form.
    pub short_form_y: f64,
    /// Top edge when resting in the long form.
    pub long_form_y: f64,
    /// Top edge when hidden (fully below the container).
    pub hidden_form_y: f64,
}

impl Anchors {
    /// Resolve the anchors for the given forms.
    ///
    /// When `voice_over_running` is set the short form collapses onto the
    /// long form: stepping between forms is not offered to screen-reader
    /// users.
    pub fn resolve(
        ctx: &HeightContext,
        short: HeightSpec,
        long: HeightSpec,
        voice_over_running: bool,
        measure: impl Fn(f64) -> f64,
    ) -> Self {
        let max_y = ctx.resolve(HeightSpec::MaxHeight, &measure);
        let long_form_y = ctx.resolve(long, &measure).max(max_y) + ctx.top_offset;
        let short_form_y = if voice_over_running {
            long_form_y
        } else {
            (ctx.resolve(short, &measure) + ctx.top_offset).max(long_form_y)
        };
        let anchors = Self {
            short_form_y,
            long_form_y,
            hidden_form_y: ctx.container.height,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "pansheet.layout",
            short_form_y = anchors.short_form_y,
            long_form_y = anchors.long_form_y,
            hidden_form_y = anchors.hidden_form_y,
            voice_over_running,
            "anchors resolved"
        );

        anchors
    }

    /// Whether `y` sits exactly on the short or long anchor.
    #[inline]
    pub fn is_resting_at(&self, y: f64) -> bool {
        y == self.short_form_y || y == self.long_form_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> HeightContext {
        HeightContext {
            container: Size::new(390.0, 844.0),
            top_offset: 47.0,
            bottom_inset: 34.0,
        }
    }

    fn no_measure(_: f64) -> f64 {
        panic!("measure must not be called for non-intrinsic specs")
    }

    #[test]
    fn max_height_is_top() {
        assert_eq!(ctx().resolve(HeightSpec::MaxHeight, no_measure), 0.0);
    }

    #[test]
    fn zero_top_inset_equals_max_height() {
        let c = ctx();
        assert_eq!(
            c.resolve(HeightSpec::MaxHeightWithTopInset(0.0), no_measure),
            c.resolve(HeightSpec::MaxHeight, no_measure)
        );
        assert_eq!(c.resolve(HeightSpec::MaxHeightWithTopInset(60.0), no_measure), 60.0);
    }

    #[test]
    fn content_height_respects_safe_area() {
        let c = ctx();
        // bottom_y = 844 - 47 = 797
        assert_eq!(c.resolve(HeightSpec::ContentHeight(300.0), no_measure), 463.0);
        assert_eq!(
            c.resolve(HeightSpec::ContentHeightIgnoringSafeArea(300.0), no_measure),
            497.0
        );
    }

    #[test]
    fn intrinsic_height_measures_at_container_width() {
        let c = ctx();
        let y = c.resolve(HeightSpec::IntrinsicHeight, |width| {
            assert_eq!(width, 390.0);
            200.0
        });
        assert_eq!(y, c.resolve(HeightSpec::ContentHeight(200.0), no_measure));
    }

    #[test]
    fn content_height_round_trips() {
        let c = ctx();
        let y = c.resolve(HeightSpec::ContentHeight(321.5), no_measure);
        assert_eq!(c.content_height_at(y), 321.5);
    }

    #[test]
    fn anchors_basic() {
        let c = ctx();
        let a = Anchors::resolve(
            &c,
            HeightSpec::ContentHeight(300.0),
            HeightSpec::MaxHeight,
            false,
            no_measure,
        );
        assert_eq!(a.long_form_y, 47.0);
        assert_eq!(a.short_form_y, 463.0 + 47.0);
        assert_eq!(a.hidden_form_y, 844.0);
    }

    #[test]
    fn short_form_never_above_long_form() {
        let c = ctx();
        let a = Anchors::resolve(
            &c,
            HeightSpec::MaxHeight,
            HeightSpec::ContentHeight(200.0),
            false,
            no_measure,
        );
        assert_eq!(a.short_form_y, a.long_form_y);
    }

    #[test]
    fn long_form_capped_at_max_height() {
        let c = ctx();
        let a = Anchors::resolve(
            &c,
            HeightSpec::ContentHeight(5000.0),
            HeightSpec::ContentHeight(5000.0),
            false,
            no_measure,
        );
        assert_eq!(a.long_form_y, c.top_offset);
        assert_eq!(a.short_form_y, c.top_offset);
    }

    #[test]
    fn voice_over_collapses_short_form() {
        let c = ctx();
        let a = Anchors::resolve(
            &c,
            HeightSpec::ContentHeight(300.0),
            HeightSpec::MaxHeight,
            true,
            no_measure,
        );
        assert_eq!(a.short_form_y, a.long_form_y);
    }

    #[test]
    fn resting_detection() {
        let a = Anchors {
            short_form_y: 500.0,
            long_form_y: 40.0,
            hidden_form_y: 844.0,
        };
        assert!(a.is_resting_at(500.0));
        assert!(a.is_resting_at(40.0));
        assert!(!a.is_resting_at(844.0));
    }
}
