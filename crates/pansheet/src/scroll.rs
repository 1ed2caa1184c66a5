#![forbid(unsafe_code)]

//! Coordination between the sheet and an embedded scroll surface.
//!
//! The host exposes its scrollable content through [`ScrollSurface`]. The
//! sheet subscribes to content-offset changes and, on every change, decides
//! whether to hold the content still (halt), let it scroll freely (track), or
//! carry a decelerating overscroll into the sheet itself (top bounce).
//!
//! # Invariants
//!
//! 1. At most one [`ScrollSubscription`] is live per sheet; re-observing
//!    always unsubscribes the previous one first.
//! 2. The tracked offset is never negative.
//! 3. Dropping a [`ScrollSubscription`] unsubscribes it.
//!
//! # Failure Modes
//!
//! - No scroll surface: every coordination step is a no-op.
//! - Offset notifications raised while the sheet is already handling one
//!   (for example the echo of a halt) are dropped by the listener.

use std::fmt;
use std::rc::Rc;

use pansheet_core::geometry::{EdgeInsets, Rect};

/// Identity of a scroll surface, used to recognize its own pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// A content-offset change reported by a scroll surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetChange {
    /// Vertical offset before the change, when the surface knows it.
    pub old: Option<f64>,
    /// Vertical offset after the change.
    pub new: f64,
}

/// Listener installed through [`ScrollSurface::subscribe`].
pub type OffsetListener = Rc<dyn Fn(OffsetChange)>;

/// Handle for one live offset subscription.
///
/// Call [`unsubscribe`](Self::unsubscribe) or drop the handle to stop
/// receiving changes.
pub struct ScrollSubscription {
    id: u64,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ScrollSubscription {
    /// Wrap a host-side cancellation routine.
    pub fn new(id: u64, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Host-assigned identifier.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving changes.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for ScrollSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSubscription")
            .field("id", &self.id)
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// The embedded scrollable content, as seen by the sheet.
///
/// Methods take `&self`; hosts back them with interior mutability. Setting
/// the content offset may notify listeners synchronously.
pub trait ScrollSurface {
    fn id(&self) -> SurfaceId;
    /// Frame of the surface in the sheet's coordinate space.
    fn frame(&self) -> Rect;
    /// Total height of the scrollable content.
    fn content_height(&self) -> f64;
    /// Current vertical content offset.
    fn content_offset(&self) -> f64;
    fn set_content_offset(&self, y: f64);
    /// The user's finger is moving the content.
    fn is_dragging(&self) -> bool;
    /// The content is coasting after a release.
    fn is_decelerating(&self) -> bool;
    /// The user's finger is down on the content.
    fn is_tracking(&self) -> bool;
    fn set_shows_vertical_indicator(&self, visible: bool);
    fn set_scroll_indicator_insets(&self, insets: EdgeInsets);
    fn set_content_inset_bottom(&self, inset: f64);
    /// Stop the surface from adjusting its insets on its own.
    fn disable_automatic_inset_adjustment(&self);
    /// Cancel and re-enable the surface's own pan recognizer.
    fn reset_pan_gesture(&self);
    /// Install an offset listener.
    fn subscribe(&self, listener: OffsetListener) -> ScrollSubscription;

    /// Actively driven by the user, as opposed to coasting.
    fn is_scrolling(&self) -> bool {
        (self.is_dragging() && !self.is_decelerating()) || self.is_tracking()
    }
}

/// Snapshot of everything the offset decision depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScrollInput {
    pub presenting_or_dismissing: bool,
    pub anchored: bool,
    pub animating: bool,
    pub scrolling: bool,
    pub decelerating: bool,
    pub content_is_surface: bool,
    pub change: OffsetChange,
}

/// What to do with one offset change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ScrollAction {
    /// Leave everything as is.
    Ignore,
    /// Pin the content at the tracked offset.
    Halt,
    /// Accept the new offset as the resting offset.
    Track,
    /// Overscroll still growing: move the sheet with it.
    BounceFollow { offset: f64 },
    /// Overscroll turned around: settle the sheet on the long form.
    BounceSettle { offset: f64 },
}

pub(crate) fn decide(input: &ScrollInput) -> ScrollAction {
    if input.presenting_or_dismissing {
        return ScrollAction::Ignore;
    }
    let offset = input.change.new;

    if !input.anchored && offset > 0.0 {
        ScrollAction::Halt
    } else if input.scrolling || input.animating {
        if input.anchored {
            ScrollAction::Track
        } else {
            ScrollAction::Halt
        }
    } else if input.content_is_surface && !input.animating && offset <= 0.0 {
        match input.change.old {
            Some(old) if input.decelerating => {
                if old > offset {
                    ScrollAction::BounceFollow { offset }
                } else {
                    ScrollAction::BounceSettle { offset }
                }
            }
            _ => ScrollAction::Ignore,
        }
    } else {
        ScrollAction::Track
    }
}

/// Owns the offset subscription and the tracked resting offset.
#[derive(Debug, Default)]
pub(crate) struct ScrollCoordinator {
    subscription: Option<ScrollSubscription>,
    tracked_offset: f64,
}

impl ScrollCoordinator {
    /// Last resting offset the content is held at.
    #[inline]
    pub fn tracked_offset(&self) -> f64 {
        self.tracked_offset
    }

    #[inline]
    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Replace the current subscription with one on `surface`.
    pub fn observe(&mut self, surface: Option<&Rc<dyn ScrollSurface>>, listener: OffsetListener) {
        self.detach();
        if let Some(surface) = surface {
            let subscription = surface.subscribe(listener);
            tracing::debug!(
                target: "pansheet.scroll",
                surface = surface.id().0,
                subscription = subscription.id(),
                "offset observer attached"
            );
            self.subscription = Some(subscription);
        }
    }

    /// Drop the current subscription, if any.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!(
                target: "pansheet.scroll",
                subscription = subscription.id(),
                "offset observer detached"
            );
            subscription.unsubscribe();
        }
    }

    /// Record the surface's offset as the resting offset and show the indicator.
    pub fn track(&mut self, surface: &dyn ScrollSurface) {
        self.tracked_offset = surface.content_offset().max(0.0);
        surface.set_shows_vertical_indicator(true);
    }

    /// Pin the surface at the resting offset and hide the indicator.
    pub fn halt(&self, surface: &dyn ScrollSurface) {
        surface.set_content_offset(self.tracked_offset);
        surface.set_shows_vertical_indicator(false);
    }

    /// Forget the resting offset after the sheet absorbed an overscroll.
    pub fn reset_tracking(&mut self) {
        self.tracked_offset = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn input(new: f64) -> ScrollInput {
        ScrollInput {
            presenting_or_dismissing: false,
            anchored: true,
            animating: false,
            scrolling: false,
            decelerating: false,
            content_is_surface: true,
            change: OffsetChange {
                old: Some(0.0),
                new,
            },
        }
    }

    #[test]
    fn presenting_ignores_changes() {
        let mut i = input(50.0);
        i.presenting_or_dismissing = true;
        i.anchored = false;
        assert_eq!(decide(&i), ScrollAction::Ignore);
    }

    #[test]
    fn unanchored_positive_offset_halts() {
        let mut i = input(12.0);
        i.anchored = false;
        assert_eq!(decide(&i), ScrollAction::Halt);
    }

    #[test]
    fn scrolling_while_anchored_tracks() {
        let mut i = input(40.0);
        i.scrolling = true;
        assert_eq!(decide(&i), ScrollAction::Track);
    }

    #[test]
    fn scrolling_while_unanchored_halts_even_at_top() {
        let mut i = input(-5.0);
        i.anchored = false;
        i.scrolling = true;
        assert_eq!(decide(&i), ScrollAction::Halt);
    }

    #[test]
    fn animating_tracks_when_anchored() {
        let mut i = input(30.0);
        i.animating = true;
        assert_eq!(decide(&i), ScrollAction::Track);
    }

    #[test]
    fn growing_overscroll_follows() {
        let mut i = input(-50.0);
        i.decelerating = true;
        i.change.old = Some(-30.0);
        assert_eq!(decide(&i), ScrollAction::BounceFollow { offset: -50.0 });
    }

    #[test]
    fn reversing_overscroll_settles() {
        let mut i = input(-40.0);
        i.decelerating = true;
        i.change.old = Some(-50.0);
        assert_eq!(decide(&i), ScrollAction::BounceSettle { offset: -40.0 });
    }

    #[test]
    fn bounce_requires_deceleration_and_old_value() {
        let i = input(-20.0);
        assert_eq!(decide(&i), ScrollAction::Ignore);

        let mut i = input(-20.0);
        i.decelerating = true;
        i.change.old = None;
        assert_eq!(decide(&i), ScrollAction::Ignore);
    }

    #[test]
    fn nested_surface_never_bounces() {
        let mut i = input(-20.0);
        i.decelerating = true;
        i.content_is_surface = false;
        assert_eq!(decide(&i), ScrollAction::Track);
    }

    #[test]
    fn positive_offset_at_rest_tracks() {
        assert_eq!(decide(&input(80.0)), ScrollAction::Track);
    }

    #[test]
    fn subscription_cancels_once_on_drop() {
        let cancelled = Rc::new(Cell::new(0));
        let counter = Rc::clone(&cancelled);
        let sub = ScrollSubscription::new(7, move || counter.set(counter.get() + 1));
        assert_eq!(sub.id(), 7);
        drop(sub);
        assert_eq!(cancelled.get(), 1);
    }

    #[test]
    fn explicit_unsubscribe_does_not_cancel_twice() {
        let cancelled = Rc::new(Cell::new(0));
        let counter = Rc::clone(&cancelled);
        let sub = ScrollSubscription::new(1, move || counter.set(counter.get() + 1));
        sub.unsubscribe();
        assert_eq!(cancelled.get(), 1);
    }
}
