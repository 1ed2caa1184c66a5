#![forbid(unsafe_code)]

//! Animation requests handed to the host.
//!
//! The sheet never interpolates frames itself. When it wants an animated
//! move it builds an [`AnimationRequest`] (start, target, duration, spring
//! damping, options) and passes it to the host's [`Animator`] together with a
//! completion callback. The host reports back with an [`AnimationOutcome`].
//! Curve evaluation belongs to the host; the options only name the curve.
//!
//! # Invariants
//!
//! - Every request carries a unique, increasing [`AnimationId`] per sheet.

use std::time::Duration;

use bitflags::bitflags;

/// Duration used when no presentable supplies one.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(500);

/// Spring damping used when no presentable supplies one.
pub const DEFAULT_SPRING_DAMPING: f64 = 1.0;

bitflags! {
    /// Animation curve and behavior options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AnimationOptions: u8 {
        /// Linear timing.
        const CURVE_LINEAR = 0b0000_0001;
        /// Accelerating timing.
        const CURVE_EASE_IN = 0b0000_0010;
        /// Decelerating timing.
        const CURVE_EASE_OUT = 0b0000_0100;
        /// S-curve timing.
        const CURVE_EASE_IN_OUT = 0b0000_1000;
        /// Keep delivering touches while the animation runs.
        const ALLOW_USER_INTERACTION = 0b0001_0000;
        /// Start from the current presentation value instead of the model value.
        const BEGIN_FROM_CURRENT_STATE = 0b0010_0000;
    }
}

impl AnimationOptions {
    /// Options the sheet uses unless the presentable overrides them.
    pub const SHEET_DEFAULT: Self = Self::CURVE_EASE_IN_OUT
        .union(Self::ALLOW_USER_INTERACTION)
        .union(Self::BEGIN_FROM_CURRENT_STATE);
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self::SHEET_DEFAULT
    }
}

/// Identifier of one animation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AnimationId(pub u64);

/// Duration, damping and options of an animated move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationParams {
    pub duration: Duration,
    pub spring_damping: f64,
    pub options: AnimationOptions,
}

impl AnimationParams {
    /// Parameters used when nothing more specific is configured.
    pub fn fallback() -> Self {
        Self {
            duration: DEFAULT_TRANSITION_DURATION,
            spring_damping: DEFAULT_SPRING_DAMPING,
            options: AnimationOptions::CURVE_EASE_IN_OUT,
        }
    }
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self::fallback()
    }
}

/// An animated move of the sheet's top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub id: AnimationId,
    /// Top edge when the animation starts.
    pub from_y: f64,
    /// Top edge the sheet settles at. Already applied to the model.
    pub to_y: f64,
    pub params: AnimationParams,
}

/// How an animation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// Ran to its end.
    Completed,
    /// Superseded or cut short before its end.
    Interrupted,
}

impl AnimationOutcome {
    /// Map a host-side "did finish" flag.
    #[inline]
    pub fn from_finished(finished: bool) -> Self {
        if finished {
            Self::Completed
        } else {
            Self::Interrupted
        }
    }

    #[inline]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Callback a host invokes once an animation ends.
pub type AnimationCompletion = Box<dyn FnOnce(AnimationOutcome)>;

/// Host-side animation driver.
///
/// Implementations interpolate the sheet's top edge from `request.from_y`
/// to `request.to_y` and call `on_complete` exactly once. Calling it
/// synchronously from inside `animate` is allowed.
pub trait Animator {
    fn animate(&self, request: AnimationRequest, on_complete: AnimationCompletion);
}
