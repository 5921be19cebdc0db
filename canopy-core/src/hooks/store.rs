//! Per-instance hook storage.
//!
//! Every component instance owns one [`HookStore`]. It holds the positional
//! state slots, the effect handlers registered during the current render, the
//! cleanups left behind by the last commit, and the debounce lock that keeps
//! a burst of state updates down to one deferred re-render.

use std::any::{self, Any};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::scheduler::Scheduler;
use crate::vdom::Context;

/// Unique identifier for a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Generate a new unique instance ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Teardown returned by an effect handler.
pub type Cleanup = Box<dyn FnOnce()>;

/// An effect handler scheduled to run after the current commit.
pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

pub(crate) struct HookStore {
    id: InstanceId,
    name: Rc<str>,
    slots: RefCell<Vec<Rc<dyn Any>>>,
    /// Effect registrations of the render in progress, by effect index.
    /// `None` means "unchanged dependencies, keep the previous cleanup".
    updated: RefCell<Vec<Option<EffectFn>>>,
    /// Cleanups of the last commit, by effect index.
    cleanups: RefCell<Vec<Option<Cleanup>>>,
    context: RefCell<Context>,
    pending: Cell<bool>,
    removed: Cell<bool>,
    renders: Cell<u64>,
    scheduler: Scheduler,
}

impl HookStore {
    pub(crate) fn new(name: Rc<str>, scheduler: Scheduler) -> Rc<Self> {
        Rc::new(Self {
            id: InstanceId::new(),
            name,
            slots: RefCell::new(Vec::new()),
            updated: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            context: RefCell::new(Context::default()),
            pending: Cell::new(false),
            removed: Cell::new(false),
            renders: Cell::new(0),
            scheduler,
        })
    }

    pub(crate) fn id(&self) -> InstanceId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// The value in slot `index`, created with `init` on first use.
    ///
    /// `init` runs with no borrow held, so it may do arbitrary work.
    pub(crate) fn slot<T: 'static>(&self, index: usize, init: impl FnOnce() -> T) -> Result<Rc<T>> {
        let existing = self.slots.borrow().get(index).cloned();
        let value = match existing {
            Some(value) => value,
            None => {
                let value: Rc<dyn Any> = Rc::new(init());
                let mut slots = self.slots.borrow_mut();
                if slots.len() != index {
                    return Err(Error::HookMismatch {
                        index,
                        expected: any::type_name::<T>(),
                    });
                }
                slots.push(value.clone());
                value
            }
        };

        value.downcast::<T>().map_err(|_| Error::HookMismatch {
            index,
            expected: any::type_name::<T>(),
        })
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Prepare for a render pass under `context`.
    pub(crate) fn begin_render(&self, context: &Context) {
        self.updated.borrow_mut().clear();
        *self.context.borrow_mut() = context.clone();
    }

    pub(crate) fn context(&self) -> Context {
        self.context.borrow().clone()
    }

    /// Register the effect at the next effect index. Returns that index.
    pub(crate) fn push_effect(&self, handler: Option<EffectFn>) -> usize {
        let mut updated = self.updated.borrow_mut();
        updated.push(handler);
        updated.len() - 1
    }

    /// Run the previous cleanup of every effect about to re-run.
    pub(crate) fn run_stale_cleanups(&self) {
        let stale: Vec<Cleanup> = {
            let updated = self.updated.borrow();
            let mut cleanups = self.cleanups.borrow_mut();
            updated
                .iter()
                .enumerate()
                .filter(|(_, handler)| handler.is_some())
                .filter_map(|(index, _)| cleanups.get_mut(index).and_then(Option::take))
                .collect()
        };
        for cleanup in stale {
            cleanup();
        }
    }

    /// Run the effects registered this render and record their cleanups.
    /// Effects that did not re-run keep their previous cleanup.
    pub(crate) fn commit_effects(&self) {
        let updated = std::mem::take(&mut *self.updated.borrow_mut());
        let mut previous = std::mem::take(&mut *self.cleanups.borrow_mut());
        let count = updated.len();

        let mut next = Vec::with_capacity(count);
        for (index, handler) in updated.into_iter().enumerate() {
            let cleanup = match handler {
                Some(handler) => handler(),
                None => previous.get_mut(index).and_then(Option::take),
            };
            next.push(cleanup);
        }

        // Effects no longer registered: tear them down.
        for cleanup in previous.into_iter().skip(count).flatten() {
            cleanup();
        }

        *self.cleanups.borrow_mut() = next;
        self.renders.set(self.renders.get() + 1);
    }

    /// Number of committed renders.
    pub(crate) fn renders(&self) -> u64 {
        self.renders.get()
    }

    /// Ask for a deferred re-render. Calls while one is pending coalesce.
    pub(crate) fn request_render(&self) {
        if self.removed.get() {
            tracing::trace!(component = %self.name, "update after teardown ignored");
            return;
        }
        if self.pending.replace(true) {
            tracing::trace!(component = %self.name, "update coalesced into pending render");
            return;
        }
        self.scheduler.enqueue(self.id);
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub(crate) fn clear_pending(&self) {
        self.pending.set(false);
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.get()
    }

    /// Mark the instance removed and run every outstanding cleanup.
    pub(crate) fn teardown(&self) {
        if self.removed.replace(true) {
            return;
        }
        self.pending.set(false);
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        for cleanup in cleanups.into_iter().flatten() {
            cleanup();
        }
    }
}
