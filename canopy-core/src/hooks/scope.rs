//! Render Scope
//!
//! Hooks are free functions: they find the component they belong to through
//! the render scope rather than through an argument. The scope is a
//! thread-local stack of frames, one per component render in progress. A
//! component that renders a child component nests a frame; the child's hooks
//! therefore never see the parent's slots, and the parent's cursor is intact
//! when its frame becomes the top again.
//!
//! # Implementation
//!
//! [`RenderScope::enter`] pushes a frame and returns a guard that pops it on
//! drop, so the stack stays balanced even when a component body returns an
//! error or panics.

use std::cell::RefCell;
use std::rc::Rc;

use super::store::{HookStore, InstanceId};
use crate::error::{Error, Result};

thread_local! {
    static RENDER_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// One component render in progress.
struct Frame {
    store: Rc<HookStore>,
    /// Index of the next hook slot.
    cursor: usize,
}

/// Guard that pops the render frame when dropped.
pub struct RenderScope {
    id: InstanceId,
}

impl RenderScope {
    /// Begin rendering the instance owning `store`.
    ///
    /// Fails if that instance is already rendering further up the stack.
    pub(crate) fn enter(store: Rc<HookStore>) -> Result<Self> {
        let id = store.id();
        RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|frame| frame.store.id() == id) {
                return Err(Error::ReentrantRender(store.name().to_string()));
            }
            stack.push(Frame { store, cursor: 0 });
            Ok(Self { id })
        })
    }

    /// Whether a component render is in progress on this thread.
    pub fn is_active() -> bool {
        RENDER_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Claim the next hook slot of the rendering instance.
    pub(crate) fn next_slot() -> Result<(Rc<HookStore>, usize)> {
        RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = stack.last_mut().ok_or(Error::NoActiveRender)?;
            let index = frame.cursor;
            frame.cursor += 1;
            Ok((frame.store.clone(), index))
        })
    }

    /// The rendering instance, without claiming a slot.
    pub(crate) fn current() -> Result<Rc<HookStore>> {
        RENDER_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|frame| frame.store.clone())
                .ok_or(Error::NoActiveRender)
        })
    }
}

impl Drop for RenderScope {
    fn drop(&mut self) {
        RENDER_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.store.id(),
                    self.id,
                    "RenderScope mismatch: expected {:?}, got {:?}",
                    self.id,
                    frame.store.id()
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;

    fn store(name: &str) -> Rc<HookStore> {
        HookStore::new(name.into(), Scheduler::default())
    }

    #[test]
    fn scope_tracks_the_rendering_instance() {
        let a = store("A");

        assert!(!RenderScope::is_active());
        assert!(matches!(RenderScope::next_slot(), Err(Error::NoActiveRender)));

        {
            let _scope = RenderScope::enter(a.clone()).unwrap();
            assert!(RenderScope::is_active());
            assert_eq!(RenderScope::current().unwrap().id(), a.id());
        }

        assert!(!RenderScope::is_active());
    }

    #[test]
    fn nested_scopes_keep_their_own_cursor() {
        let outer = store("Outer");
        let inner = store("Inner");

        let _outer = RenderScope::enter(outer.clone()).unwrap();
        assert_eq!(RenderScope::next_slot().unwrap().1, 0);
        assert_eq!(RenderScope::next_slot().unwrap().1, 1);

        {
            let _inner = RenderScope::enter(inner.clone()).unwrap();
            let (current, index) = RenderScope::next_slot().unwrap();
            assert_eq!(current.id(), inner.id());
            assert_eq!(index, 0);
        }

        let (current, index) = RenderScope::next_slot().unwrap();
        assert_eq!(current.id(), outer.id());
        assert_eq!(index, 2);
    }

    #[test]
    fn reentry_is_rejected() {
        let a = store("A");
        let _scope = RenderScope::enter(a.clone()).unwrap();

        let err = RenderScope::enter(a).err().unwrap();
        assert!(matches!(err, Error::ReentrantRender(ref name) if name == "A"));
    }
}
