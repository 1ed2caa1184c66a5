#![forbid(unsafe_code)]

//! In-memory scroll surface.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use pansheet::scroll::{OffsetChange, OffsetListener, ScrollSubscription, ScrollSurface, SurfaceId};
use pansheet_core::geometry::{EdgeInsets, Rect};

type ListenerList = RefCell<Vec<(u64, OffsetListener)>>;

/// A scroll view that records everything the sheet does to it.
///
/// Setting the content offset notifies every listener synchronously, like a
/// real key-value observer would.
pub struct MockScrollView {
    id: SurfaceId,
    frame: Cell<Rect>,
    content_height: Cell<f64>,
    offset: Cell<f64>,
    dragging: Cell<bool>,
    decelerating: Cell<bool>,
    tracking: Cell<bool>,
    shows_indicator: Cell<bool>,
    indicator_insets: Cell<EdgeInsets>,
    content_inset_bottom: Cell<f64>,
    automatic_adjustment: Cell<bool>,
    pan_resets: Cell<usize>,
    subscriptions_made: Cell<u64>,
    listeners: Rc<ListenerList>,
}

impl std::fmt::Debug for MockScrollView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockScrollView")
            .field("id", &self.id)
            .field("offset", &self.offset.get())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl MockScrollView {
    pub fn new(id: u64, frame: Rect, content_height: f64) -> Self {
        Self {
            id: SurfaceId(id),
            frame: Cell::new(frame),
            content_height: Cell::new(content_height),
            offset: Cell::new(0.0),
            dragging: Cell::new(false),
            decelerating: Cell::new(false),
            tracking: Cell::new(false),
            shows_indicator: Cell::new(true),
            indicator_insets: Cell::new(EdgeInsets::ZERO),
            content_inset_bottom: Cell::new(0.0),
            automatic_adjustment: Cell::new(true),
            pan_resets: Cell::new(0),
            subscriptions_made: Cell::new(0),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Scroll to `y` and notify listeners.
    pub fn scroll_to(&self, y: f64) {
        self.set_content_offset(y);
    }

    /// Change the offset without notifying anyone.
    pub fn set_offset_silently(&self, y: f64) {
        self.offset.set(y);
    }

    /// Deliver an arbitrary change to every listener.
    pub fn notify(&self, change: OffsetChange) {
        let listeners: Vec<OffsetListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    /// Finger down and moving.
    pub fn begin_drag(&self) {
        self.tracking.set(true);
        self.dragging.set(true);
        self.decelerating.set(false);
    }

    /// Finger lifted with momentum.
    pub fn release_with_momentum(&self) {
        self.tracking.set(false);
        self.dragging.set(true);
        self.decelerating.set(true);
    }

    /// Finger lifted, content at rest.
    pub fn come_to_rest(&self) {
        self.tracking.set(false);
        self.dragging.set(false);
        self.decelerating.set(false);
    }

    pub fn set_dragging(&self, dragging: bool) {
        self.dragging.set(dragging);
    }

    pub fn set_decelerating(&self, decelerating: bool) {
        self.decelerating.set(decelerating);
    }

    pub fn set_tracking(&self, tracking: bool) {
        self.tracking.set(tracking);
    }

    pub fn set_frame(&self, frame: Rect) {
        self.frame.set(frame);
    }

    pub fn set_content_height(&self, height: f64) {
        self.content_height.set(height);
    }

    pub fn shows_indicator(&self) -> bool {
        self.shows_indicator.get()
    }

    pub fn indicator_insets(&self) -> EdgeInsets {
        self.indicator_insets.get()
    }

    pub fn content_inset_bottom(&self) -> f64 {
        self.content_inset_bottom.get()
    }

    pub fn automatic_adjustment(&self) -> bool {
        self.automatic_adjustment.get()
    }

    /// How often the sheet reset this surface's pan gesture.
    pub fn pan_resets(&self) -> usize {
        self.pan_resets.get()
    }

    /// Live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Subscriptions ever handed out.
    pub fn subscriptions_made(&self) -> u64 {
        self.subscriptions_made.get()
    }
}

impl ScrollSurface for MockScrollView {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn frame(&self) -> Rect {
        self.frame.get()
    }

    fn content_height(&self) -> f64 {
        self.content_height.get()
    }

    fn content_offset(&self) -> f64 {
        self.offset.get()
    }

    fn set_content_offset(&self, y: f64) {
        let old = self.offset.replace(y);
        self.notify(OffsetChange { old: Some(old), new: y });
    }

    fn is_dragging(&self) -> bool {
        self.dragging.get()
    }

    fn is_decelerating(&self) -> bool {
        self.decelerating.get()
    }

    fn is_tracking(&self) -> bool {
        self.tracking.get()
    }

    fn set_shows_vertical_indicator(&self, visible: bool) {
        self.shows_indicator.set(visible);
    }

    fn set_scroll_indicator_insets(&self, insets: EdgeInsets) {
        self.indicator_insets.set(insets);
    }

    fn set_content_inset_bottom(&self, inset: f64) {
        self.content_inset_bottom.set(inset);
    }

    fn disable_automatic_inset_adjustment(&self) {
        self.automatic_adjustment.set(false);
    }

    fn reset_pan_gesture(&self) {
        self.pan_resets.set(self.pan_resets.get() + 1);
    }

    fn subscribe(&self, listener: OffsetListener) -> ScrollSubscription {
        let id = self.subscriptions_made.get() + 1;
        self.subscriptions_made.set(id);
        self.listeners.borrow_mut().push((id, listener));
        let listeners: Weak<ListenerList> = Rc::downgrade(&self.listeners);
        ScrollSubscription::new(id, move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(existing, _)| *existing != id);
            }
        })
    }
}
