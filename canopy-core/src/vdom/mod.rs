//! Virtual Node Model
//!
//! This module defines the immutable description of a desired tree:
//!
//! - [`VNode`]: one node, a [`Tag`] plus a shared [`Props`] bag
//! - [`Props`] / [`PropValue`]: ordered attributes plus typed reserved entries
//! - [`Key`]: sibling identity used by keyed reconciliation
//! - [`Context`]: the key/value overlay threaded down the tree
//! - [`h`] / [`Builder`]: fluent construction with child flattening
//!
//! Nothing in this module touches a host tree. The reconciler consumes these
//! values and the host adapter never sees them directly.

mod context;
mod node;
mod props;

pub use context::Context;
pub use node::{h, Builder, Child, Component, Key, RenderFn, Tag, VNode};
pub use props::{is_reserved, Event, Handler, Lifecycle, NodeRef, Phase, PropValue, Props, RenderProp, RESERVED};
