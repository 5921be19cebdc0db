//! Hooks Runtime
//!
//! Components are plain functions from props and context to a [`VNode`].
//! Hooks give them memory across renders: each hook call claims the next
//! positional slot of the component instance currently rendering.
//!
//! - [`use_state`] / [`use_state_with`]: a value plus a [`SetState`] setter
//! - [`use_reducer`]: state folded through a reducer, with a [`Dispatch`]
//! - [`use_effect`] / [`use_effect_with`]: post-commit side effects with cleanup
//! - [`use_memo`]: a cached computation keyed on dependencies
//! - [`use_context`] / [`use_context_value`] / [`use_context_of`]: context reads
//!
//! # Rules
//!
//! Hooks only work while a component is rendering (anything else returns
//! [`Error::NoActiveRender`](crate::Error::NoActiveRender)), and a component
//! must call the same hooks in the same order on every render. A slot read
//! back with a different type yields
//! [`Error::HookMismatch`](crate::Error::HookMismatch).
//!
//! [`VNode`]: crate::vdom::VNode

mod context;
mod effect;
mod memo;
mod scope;
mod state;
mod store;

pub use context::{create_context, use_context, use_context_of, use_context_value, ContextHandle};
pub use effect::{use_effect, use_effect_with, Teardown};
pub use memo::use_memo;
pub use state::{use_reducer, use_state, use_state_with, Dispatch, SetState};
pub use store::{Cleanup, InstanceId};

pub use scope::RenderScope;

pub(crate) use store::HookStore;
