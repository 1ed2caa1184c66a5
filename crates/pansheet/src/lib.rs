#![forbid(unsafe_code)]

//! pansheet: an interactive bottom-sheet controller.
//!
//! A sheet is a draggable panel laid over a host container. It rests at one
//! of three positions ([`PresentationState`]) and hands scroll gestures back
//! and forth with the scrollable content embedded in it.
//!
//! # Key Components
//!
//! - [`PanSheet`] - the controller: layout, transitions, gesture and scroll
//!   handling
//! - [`Presentable`] - what the presented screen supplies (heights, flags,
//!   hooks); [`PresentableConfig`] holds the standard values
//! - [`ScrollSurface`] - the embedded scrollable content
//! - [`PanRecognizer`] - the host's pan gesture recognizer
//! - [`SheetConfig`] - interaction tunables, loadable from TOML or JSON with
//!   the `config` feature
//!
//! # Role in pansheet
//! This crate is the stateful layer. Pure geometry, height resolution, drag
//! heuristics and animation request types live in `pansheet-core`; the host
//! supplies rendering, the animator and gesture recognition through traits.
//!
//! # Logging
//! Events are emitted through `tracing` under the targets
//! `pansheet.layout`, `pansheet.motion`, `pansheet.gesture` and
//! `pansheet.scroll`.

pub mod config;
pub mod interpreter;
pub mod motion;
pub mod presentable;
pub mod scroll;
pub mod sheet;

pub use config::{SheetConfig, SheetConfigError};
pub use interpreter::{GestureInterpreter, PanRecognizer};
pub use motion::MotionController;
pub use presentable::{ConfiguredPresentable, Presentable, PresentableConfig};
pub use scroll::{OffsetChange, OffsetListener, ScrollSubscription, ScrollSurface, SurfaceId};
pub use sheet::{PanGestureTarget, PanSheet};

pub use pansheet_core::{
    AnimationId, AnimationOptions, AnimationOutcome, AnimationParams, AnimationRequest, Animator,
    Anchors, ContainerMetrics, EdgeInsets, GesturePhase, HeightSpec, Point, Rect, Size, Vector,
};

/// Resting position of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentationState {
    /// Fully below the container.
    #[default]
    Hidden,
    /// Resting at the short-form anchor.
    Short,
    /// Resting at the long-form anchor.
    Long,
}
