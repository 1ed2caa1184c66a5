#![forbid(unsafe_code)]

//! Drag interpretation.
//!
//! The host reports its pan recognizer through [`PanRecognizer`]. While the
//! drag moves, [`GestureInterpreter::drag_target`] turns each incremental
//! translation into a new top edge, resisting movement above the long form.
//! On release, [`GestureInterpreter::release_target`] picks the state to
//! settle in from the release velocity and the nearest anchor.
//!
//! # Invariants
//!
//! 1. A release is a flick only when its speed strictly exceeds
//!    `velocity_scale * (1 - sensitivity)`.
//! 2. With drag-to-dismiss disabled the release target is never
//!    [`PresentationState::Hidden`].
//! 3. Nearest-anchor ties resolve to the earliest candidate in the order
//!    hidden, short, long (slow) or long, hidden (flick).

use pansheet_core::drag::{self, GesturePhase, ReleaseKind};
use pansheet_core::geometry::{Point, Vector};
use pansheet_core::height::Anchors;

use crate::PresentationState;
use crate::config::SheetConfig;
use crate::scroll::ScrollSurface;

/// The host's pan gesture recognizer.
///
/// Translation is incremental: the sheet reads it, applies it, then sets it
/// back to zero.
pub trait PanRecognizer {
    fn phase(&self) -> GesturePhase;
    /// Translation accumulated since it was last zeroed.
    fn translation(&self) -> Vector;
    fn set_translation(&self, translation: Vector);
    /// Current velocity in points per second.
    fn velocity(&self) -> Vector;
    /// Touch location in the sheet's coordinate space.
    fn location(&self) -> Point;
    /// Cancel the gesture and re-enable the recognizer, discarding any
    /// accumulated translation.
    fn reset(&self);
}

/// Release and drag rules, parameterized by [`SheetConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureInterpreter {
    sensitivity: f64,
    velocity_scale: f64,
    overdrag_resistance: f64,
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

impl GestureInterpreter {
    pub fn from_config(config: &SheetConfig) -> Self {
        Self {
            sensitivity: config.snap_movement_sensitivity,
            velocity_scale: config.velocity_scale,
            overdrag_resistance: config.overdrag_resistance.max(1.0),
        }
    }

    /// Classify a vertical release velocity.
    #[inline]
    pub fn classify(&self, velocity_y: f64) -> ReleaseKind {
        drag::classify_release(velocity_y, self.sensitivity, self.velocity_scale)
    }

    /// Top edge after applying one drag increment, before clamping.
    pub fn drag_target(&self, current_y: f64, delta_y: f64, long_form_y: f64) -> f64 {
        let delta = if current_y < long_form_y {
            delta_y / self.overdrag_resistance
        } else {
            delta_y
        };
        current_y + delta
    }

    /// State to settle in after a release.
    pub fn release_target(
        &self,
        velocity_y: f64,
        current_y: f64,
        anchors: &Anchors,
        allows_drag_to_dismiss: bool,
    ) -> PresentationState {
        match self.classify(velocity_y) {
            ReleaseKind::Flick => {
                if velocity_y < 0.0 {
                    PresentationState::Long
                } else if (drag::nearest(current_y, &[anchors.long_form_y, anchors.hidden_form_y])
                    == anchors.long_form_y
                    && current_y < anchors.short_form_y)
                    || !allows_drag_to_dismiss
                {
                    PresentationState::Short
                } else {
                    PresentationState::Hidden
                }
            }
            ReleaseKind::Slow => {
                let position = drag::nearest(
                    current_y,
                    &[
                        anchors.hidden_form_y,
                        anchors.short_form_y,
                        anchors.long_form_y,
                    ],
                );
                if position == anchors.long_form_y {
                    PresentationState::Long
                } else if position == anchors.short_form_y || !allows_drag_to_dismiss {
                    PresentationState::Short
                } else {
                    PresentationState::Hidden
                }
            }
        }
    }
}

/// Whether the embedded content should keep a touch at `location` for its
/// own scrolling instead of the sheet.
///
/// Only meaningful once the sheet is anchored.
pub(crate) fn surface_claims_touch(surface: &dyn ScrollSurface, location: Point) -> bool {
    surface.content_offset() > 0.0
        && (surface.frame().contains(location) || surface.is_scrolling())
}
