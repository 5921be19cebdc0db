//! Canopy Core
//!
//! This crate provides the core of the Canopy declarative tree engine.
//! It implements:
//!
//! - An immutable virtual node model with keyed children
//! - A reconciler that patches a host tree through a pluggable adapter
//! - A component runtime with positional hooks (state, effects, memo, context)
//! - A debounced scheduler for state-driven re-renders
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `vdom`: virtual nodes, props, keys and context
//! - `host`: the [`HostAdapter`] trait and the in-memory [`MemoryHost`]
//! - `reconcile`: the [`Renderer`] and its diffing passes
//! - `hooks`: hooks callable from inside component functions
//! - `scheduler`: the deferred re-render queue and its clocks
//! - `options`: process-wide settings
//!
//! # Example
//!
//! ```rust,ignore
//! use canopy_core::{h, use_state, Component, Context, Handler, MemoryHost, Props, Renderer, Result, VNode};
//!
//! fn counter(_: &Props, _: &Context) -> Result<VNode> {
//!     let (count, set_count) = use_state(0)?;
//!     h("button")
//!         .attr("onclick", Handler::new(move |_| set_count.set(count + 1)))
//!         .child(count)
//!         .build()
//! }
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_root();
//! let mut renderer = Renderer::new(host);
//! let node = renderer.render(VNode::component(&Component::new("Counter", counter), Props::new(), vec![])?, &root, None)?;
//!
//! // Later, after a click:
//! renderer.flush_due()?;
//! ```

pub mod error;
pub mod hooks;
pub mod host;
pub mod options;
pub mod reconcile;
pub mod scheduler;
pub mod vdom;

pub use error::{Error, Result};
pub use hooks::{
    create_context, use_context, use_context_of, use_context_value, use_effect, use_effect_with, use_memo,
    use_reducer, use_state, use_state_with, Cleanup, ContextHandle, Dispatch, SetState,
};
pub use host::memory::{MemNode, MemoryHost};
pub use host::HostAdapter;
pub use options::Options;
pub use reconcile::Renderer;
pub use scheduler::{Clock, ManualClock, SystemClock};
pub use vdom::{h, Child, Component, Context, Event, Handler, Key, NodeRef, PropValue, Props, Tag, VNode};
