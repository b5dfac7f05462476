//! Execution zones the bridge re-enters before publishing.
//!
//! Host callbacks (DOM listeners, controller calls, `message` events) run outside the reactive
//! owner of the application. Publishing through a zone puts channel delivery back under that
//! owner so reactive consumers created there observe it.

use leptos::{logging, try_with_owner, Owner};

/// Runs work inside a particular execution context.
pub trait ExecutionZone {
    /// Runs `task` inside the zone.
    fn run<'a>(&self, task: Box<dyn FnOnce() + 'a>);
}

#[derive(Debug, Clone, Copy, Default)]
/// Zone that runs work in place on the caller's context.
pub struct ImmediateZone;

impl ExecutionZone for ImmediateZone {
    fn run<'a>(&self, task: Box<dyn FnOnce() + 'a>) {
        task();
    }
}

#[derive(Debug, Clone, Copy)]
/// Zone that re-enters a captured Leptos reactive [`Owner`].
pub struct LeptosZone {
    owner: Owner,
}

impl LeptosZone {
    /// Wraps an explicit owner.
    pub fn new(owner: Owner) -> Self {
        Self { owner }
    }

    /// Captures the owner of the current reactive scope, if any.
    pub fn current() -> Option<Self> {
        Owner::current().map(Self::new)
    }
}

impl ExecutionZone for LeptosZone {
    fn run<'a>(&self, task: Box<dyn FnOnce() + 'a>) {
        if let Err(err) = try_with_owner(self.owner, task) {
            logging::warn!("gadget bridge owner unavailable, dropping delivery: {err:?}");
        }
    }
}
