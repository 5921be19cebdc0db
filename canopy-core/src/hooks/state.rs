//! State hooks: [`use_state`], [`use_state_with`] and [`use_reducer`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::scope::RenderScope;
use super::store::HookStore;
use crate::error::Result;

/// Setter returned by [`use_state`].
///
/// Setting stores the value immediately and asks for a deferred re-render of
/// the owning instance. Any number of calls inside one debounce window
/// produce a single re-render that observes the last value.
pub struct SetState<T> {
    cell: Rc<RefCell<T>>,
    store: Weak<HookStore>,
}

impl<T: 'static> SetState<T> {
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
        self.schedule();
    }

    /// Replace the value with `f(current)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }

    /// The value as last set, which may be newer than the one the current
    /// render observed.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    fn schedule(&self) {
        if let Some(store) = self.store.upgrade() {
            store.request_render();
        }
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetState").field(&self.cell.borrow()).finish()
    }
}

/// A state slot initialized with `initial` on the first render.
///
/// Returns the current value and its setter. Slots are positional: a
/// component must call its hooks in the same order on every render.
pub fn use_state<T: Clone + 'static>(initial: T) -> Result<(T, SetState<T>)> {
    use_state_with(|| initial)
}

/// Like [`use_state`], computing the initial value lazily.
pub fn use_state_with<T, F>(init: F) -> Result<(T, SetState<T>)>
where
    T: Clone + 'static,
    F: FnOnce() -> T,
{
    let (store, index) = RenderScope::next_slot()?;
    let cell = store.slot(index, || RefCell::new(init()))?;
    let value = cell.borrow().clone();
    Ok((
        value,
        SetState {
            cell,
            store: Rc::downgrade(&store),
        },
    ))
}

/// Dispatcher returned by [`use_reducer`].
pub struct Dispatch<S, A> {
    setter: SetState<S>,
    reducer: Rc<dyn Fn(Option<&S>, A) -> S>,
}

impl<S: 'static, A> Dispatch<S, A> {
    /// Fold `action` into the state and schedule a re-render.
    pub fn dispatch(&self, action: A) {
        let next = {
            let current = self.setter.cell.borrow();
            (self.reducer)(Some(&current), action)
        };
        self.setter.set(next);
    }
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            setter: self.setter.clone(),
            reducer: self.reducer.clone(),
        }
    }
}

/// Reducer-driven state built on a state slot.
///
/// The initial state is `reducer(None, initial)`; every dispatched action
/// replaces it with `reducer(Some(&state), action)`.
pub fn use_reducer<S, A, R>(reducer: R, initial: A) -> Result<(S, Dispatch<S, A>)>
where
    S: Clone + 'static,
    A: 'static,
    R: Fn(Option<&S>, A) -> S + 'static,
{
    let (state, setter) = use_state_with(|| reducer(None, initial))?;
    Ok((
        state,
        Dispatch {
            setter,
            reducer: Rc::new(reducer),
        },
    ))
}
