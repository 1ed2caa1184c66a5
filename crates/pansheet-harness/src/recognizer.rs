#![forbid(unsafe_code)]

//! Scriptable pan recognizer.

use std::cell::Cell;

use pansheet::interpreter::PanRecognizer;
use pansheet_core::drag::GesturePhase;
use pansheet_core::geometry::{Point, Vector};

/// A pan recognizer driven by test code.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    phase: Cell<GesturePhase>,
    translation: Cell<Vector>,
    velocity: Cell<Vector>,
    location: Cell<Point>,
    resets: Cell<usize>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set phase and incremental vertical translation.
    pub fn move_by(&self, phase: GesturePhase, dy: f64) {
        self.phase.set(phase);
        self.translation.set(Vector::vertical(dy));
    }

    /// End the gesture with a vertical velocity.
    pub fn release(&self, velocity_y: f64) {
        self.phase.set(GesturePhase::Ended);
        self.translation.set(Vector::ZERO);
        self.velocity.set(Vector::vertical(velocity_y));
    }

    pub fn set_phase(&self, phase: GesturePhase) {
        self.phase.set(phase);
    }

    pub fn set_location(&self, location: Point) {
        self.location.set(location);
    }

    pub fn set_velocity(&self, velocity: Vector) {
        self.velocity.set(velocity);
    }

    /// How often the sheet cancelled and re-enabled this recognizer.
    pub fn resets(&self) -> usize {
        self.resets.get()
    }
}

impl PanRecognizer for MockRecognizer {
    fn phase(&self) -> GesturePhase {
        self.phase.get()
    }

    fn translation(&self) -> Vector {
        self.translation.get()
    }

    fn set_translation(&self, translation: Vector) {
        self.translation.set(translation);
    }

    fn velocity(&self) -> Vector {
        self.velocity.get()
    }

    fn location(&self) -> Point {
        self.location.get()
    }

    fn reset(&self) {
        self.resets.set(self.resets.get() + 1);
        self.phase.set(GesturePhase::Possible);
        self.translation.set(Vector::ZERO);
    }
}
