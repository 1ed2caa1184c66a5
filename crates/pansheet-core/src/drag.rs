#![forbid(unsafe_code)]

//! Single-pointer vertical drag primitives.
//!
//! The host's gesture system reports drags as a phase plus an incremental
//! translation and a release velocity. This module holds the small pure
//! pieces the sheet's interpreter is built from: phase classification,
//! release-velocity classification and nearest-anchor selection.
//!
//! # Invariants
//!
//! 1. [`classify_release`] uses a strict comparator: a velocity exactly at
//!    the threshold is [`ReleaseKind::Slow`].
//! 2. [`nearest`] is deterministic: equal distances resolve to the earliest
//!    candidate.
//! 3. [`nearest`] on an empty candidate set returns its input unchanged.

/// Default snap movement sensitivity.
pub const DEFAULT_SNAP_SENSITIVITY: f64 = 0.7;

/// Velocity (points per second) corresponding to a sensitivity of zero.
pub const DEFAULT_VELOCITY_SCALE: f64 = 1000.0;

/// Lifecycle phase of a pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// Touch down, not yet recognized.
    #[default]
    Possible,
    /// The drag was recognized.
    Began,
    /// The pointer moved.
    Changed,
    /// The pointer lifted.
    Ended,
    /// The system cancelled the gesture.
    Cancelled,
    /// Recognition failed.
    Failed,
}

impl GesturePhase {
    /// Whether this phase carries movement to apply to the sheet.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Whether this phase ends the interaction and should settle the sheet.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_moving()
    }
}

/// How a gesture release is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    /// Fast release: decided by direction.
    Flick,
    /// Slow release: decided by the nearest anchor.
    Slow,
}

/// Velocity threshold for the given sensitivity.
#[inline]
pub fn flick_threshold(sensitivity: f64, velocity_scale: f64) -> f64 {
    velocity_scale * (1.0 - sensitivity)
}

/// Classify a vertical release velocity.
#[inline]
pub fn classify_release(velocity_y: f64, sensitivity: f64, velocity_scale: f64) -> ReleaseKind {
    if velocity_y.abs() - flick_threshold(sensitivity, velocity_scale) > 0.0 {
        ReleaseKind::Flick
    } else {
        ReleaseKind::Slow
    }
}

/// The candidate closest to `value`.
///
/// Ties go to the first candidate; an empty slice yields `value` itself.
pub fn nearest(value: f64, candidates: &[f64]) -> f64 {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| (value - a).abs().total_cmp(&(value - b).abs()))
        .unwrap_or(value)
}
