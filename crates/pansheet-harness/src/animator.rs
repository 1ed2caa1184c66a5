#![forbid(unsafe_code)]

//! Deterministic animators.
//!
//! [`RecordingAnimator`] keeps every request pending until the test decides
//! how it ends, and can play requests forward on a virtual clock.
//! [`ImmediateAnimator`] completes every request synchronously, from inside
//! `animate`. [`Easing`] and [`sample`] stand in for the host's curve
//! evaluation when a test wants to see where a running animation draws.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use pansheet_core::animation::{
    AnimationCompletion, AnimationId, AnimationOptions, AnimationOutcome, AnimationRequest,
    Animator,
};

/// Timing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    /// The curve named by `options`.
    ///
    /// With several curve flags set the first of ease-in-out, ease-in,
    /// ease-out, linear wins; with none, ease-in-out.
    pub fn from_options(options: AnimationOptions) -> Self {
        if options.contains(AnimationOptions::CURVE_EASE_IN_OUT) {
            Self::EaseInOut
        } else if options.contains(AnimationOptions::CURVE_EASE_IN) {
            Self::EaseIn
        } else if options.contains(AnimationOptions::CURVE_EASE_OUT) {
            Self::EaseOut
        } else if options.contains(AnimationOptions::CURVE_LINEAR) {
            Self::Linear
        } else {
            Self::EaseInOut
        }
    }

    /// Apply the curve to a progress value, clamped to `[0.0, 1.0]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// Interpolated top edge of `request` after `elapsed`.
pub fn sample(request: &AnimationRequest, elapsed: Duration) -> f64 {
    let total = request.params.duration.as_secs_f64();
    let progress = if total > 0.0 {
        elapsed.as_secs_f64() / total
    } else {
        1.0
    };
    let eased = Easing::from_options(request.params.options).apply(progress);
    request.from_y + (request.to_y - request.from_y) * eased
}

struct Pending {
    request: AnimationRequest,
    started_at: Duration,
    on_complete: AnimationCompletion,
}

/// Records requests and completes them on demand.
#[derive(Default)]
pub struct RecordingAnimator {
    requests: RefCell<Vec<AnimationRequest>>,
    pending: RefCell<Vec<Pending>>,
    clock: Cell<Duration>,
}

impl std::fmt::Debug for RecordingAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingAnimator")
            .field("requests", &self.requests.borrow().len())
            .field("pending", &self.pending_count())
            .field("clock", &self.clock.get())
            .finish()
    }
}

impl RecordingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<AnimationRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<AnimationRequest> {
        self.requests.borrow().last().copied()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// End one pending request.
    ///
    /// Returns `false` if `id` is not pending.
    pub fn finish(&self, id: AnimationId, outcome: AnimationOutcome) -> bool {
        let taken = {
            let mut pending = self.pending.borrow_mut();
            pending
                .iter()
                .position(|p| p.request.id == id)
                .map(|index| pending.remove(index))
        };
        match taken {
            Some(pending) => {
                (pending.on_complete)(outcome);
                true
            }
            None => false,
        }
    }

    /// Complete every pending request, oldest first.
    pub fn complete_all(&self) {
        let drained: Vec<Pending> = self.pending.borrow_mut().drain(..).collect();
        for pending in drained {
            (pending.on_complete)(AnimationOutcome::Completed);
        }
    }

    /// Complete the newest pending request.
    pub fn complete_latest(&self) -> bool {
        self.finish_latest(AnimationOutcome::Completed)
    }

    /// Interrupt the newest pending request.
    pub fn interrupt_latest(&self) -> bool {
        self.finish_latest(AnimationOutcome::Interrupted)
    }

    fn finish_latest(&self, outcome: AnimationOutcome) -> bool {
        let latest = self.pending.borrow().last().map(|p| p.request.id);
        latest.is_some_and(|id| self.finish(id, outcome))
    }

    /// Advance the virtual clock, completing requests whose duration has
    /// elapsed.
    pub fn advance(&self, dt: Duration) {
        let now = self.clock.get() + dt;
        self.clock.set(now);
        let finished: Vec<Pending> = {
            let mut pending = self.pending.borrow_mut();
            let (done, running): (Vec<Pending>, Vec<Pending>) = pending
                .drain(..)
                .partition(|p| now - p.started_at >= p.request.params.duration);
            *pending = running;
            done
        };
        for pending in finished {
            (pending.on_complete)(AnimationOutcome::Completed);
        }
    }

    /// Where the newest pending animation currently draws the top edge.
    pub fn visual_y(&self) -> Option<f64> {
        let now = self.clock.get();
        self.pending
            .borrow()
            .last()
            .map(|p| sample(&p.request, now - p.started_at))
    }
}

impl Animator for RecordingAnimator {
    fn animate(&self, request: AnimationRequest, on_complete: AnimationCompletion) {
        tracing::trace!(
            target: "pansheet.harness",
            id = request.id.0,
            from_y = request.from_y,
            to_y = request.to_y,
            "animation recorded"
        );
        self.requests.borrow_mut().push(request);
        self.pending.borrow_mut().push(Pending {
            request,
            started_at: self.clock.get(),
            on_complete,
        });
    }
}

/// Completes every request before `animate` returns.
#[derive(Debug, Default)]
pub struct ImmediateAnimator {
    count: Cell<usize>,
}

impl ImmediateAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests completed so far.
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl Animator for ImmediateAnimator {
    fn animate(&self, _request: AnimationRequest, on_complete: AnimationCompletion) {
        self.count.set(self.count.get() + 1);
        on_complete(AnimationOutcome::Completed);
    }
}
