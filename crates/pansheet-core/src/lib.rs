#![forbid(unsafe_code)]

//! Core: geometry, height resolution, drag and animation primitives.
//!
//! # Role in pansheet
//! `pansheet-core` holds the pure, host-independent pieces of the bottom
//! sheet: coordinate types, the [`height`] resolver that turns declarative
//! heights into anchor positions, the [`drag`] release heuristics and the
//! [`animation`] request types exchanged with the host's animator.
//!
//! # How it fits in the system
//! The controller crate (`pansheet`) owns the interaction state machine and
//! calls into these modules. Nothing here keeps state between calls, so every
//! function can be tested in isolation.

pub mod animation;
pub mod drag;
pub mod geometry;
pub mod height;

pub use animation::{
    AnimationCompletion, AnimationId, AnimationOptions, AnimationOutcome, AnimationParams,
    AnimationRequest, Animator,
};
pub use drag::{GesturePhase, ReleaseKind};
pub use geometry::{EdgeInsets, Point, Rect, Size, Vector};
pub use height::{Anchors, ContainerMetrics, HeightContext, HeightSpec};
