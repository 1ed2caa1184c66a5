#![forbid(unsafe_code)]

//! Recording of presentable hook calls.

use std::cell::RefCell;
use std::rc::Rc;

use pansheet::PresentationState;
use pansheet::presentable::ConfiguredPresentable;

/// One observed hook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    WillRespond,
    WillTransition(PresentationState),
    DidTransition(PresentationState),
}

/// Shared log of hook calls.
#[derive(Debug, Clone, Default)]
pub struct HookLog {
    events: Rc<RefCell<Vec<HookEvent>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install recording `will_respond`, `will_transition` and
    /// `did_transition` hooks.
    pub fn install(&self, presentable: ConfiguredPresentable) -> ConfiguredPresentable {
        let respond = Rc::clone(&self.events);
        let will = Rc::clone(&self.events);
        let did = Rc::clone(&self.events);
        presentable
            .on_will_respond(move |_| respond.borrow_mut().push(HookEvent::WillRespond))
            .on_will_transition(move |to| will.borrow_mut().push(HookEvent::WillTransition(to)))
            .on_did_transition(move |to| did.borrow_mut().push(HookEvent::DidTransition(to)))
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.borrow().clone()
    }

    /// Drain and return the recorded events.
    pub fn take(&self) -> Vec<HookEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn did_transitions(&self) -> Vec<PresentationState> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HookEvent::DidTransition(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn will_transitions(&self) -> Vec<PresentationState> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HookEvent::WillTransition(state) => Some(*state),
                _ => None,
            })
            .collect()
    }
}
