//! Host Adapter
//!
//! The reconciler never manipulates a concrete tree. Everything it does to
//! the output goes through the [`HostAdapter`] trait: creating nodes,
//! splicing them into a parent, and projecting properties onto them.
//!
//! # Node handles
//!
//! `HostAdapter::Node` is an opaque, cheaply cloneable handle. The reconciler
//! keys its own side state (the previously committed virtual node, the
//! component instances rendering at that position, bound event listeners) off
//! the handle's `Hash`/`Eq` identity, so two handles to the same host node
//! must compare equal and handles to different nodes must not.
//!
//! # Containers
//!
//! Children are always spliced into a node's *child container*. For most
//! nodes that is the node itself; a node rendered with `scoped` asks the host
//! for an isolated container instead (a shadow root in a DOM host).
//!
//! [`memory::MemoryHost`] is a complete arena-backed implementation used by
//! the test suite and benchmarks.

pub mod memory;

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::Result;
use crate::vdom::{Event, PropValue};

/// Listener installed on a host node. The reconciler installs one forwarding
/// listener per event name and swaps the handler behind it.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Primitive operations the reconciler needs from a host tree.
pub trait HostAdapter {
    /// Opaque node handle.
    type Node: Clone + Eq + Hash + fmt::Debug + 'static;

    /// Create a node: a text node for `""`, otherwise an element, created in
    /// the SVG namespace when `svg` is set.
    fn create(&mut self, tag: &str, svg: bool) -> Result<Self::Node>;

    /// Add `node` as the last child of `parent`.
    fn append(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<()>;

    /// Insert `node` right before `reference`, or append when there is no
    /// reference. Inserting a node that already has a parent moves it.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<()>;

    /// Put `new` where `old` is.
    fn replace(&mut self, parent: &Self::Node, new: &Self::Node, old: &Self::Node) -> Result<()>;

    /// Detach `node` from `parent`.
    fn remove(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<()>;

    /// The container children of `node` live in. With `isolate` set the host
    /// creates an isolated container if there is none yet; without it an
    /// existing isolated container is still returned.
    fn child_container(&mut self, node: &Self::Node, isolate: bool) -> Result<Self::Node>;

    /// Current children of a container, in order.
    fn children(&self, container: &Self::Node) -> Vec<Self::Node>;

    /// Replace the content of a text node.
    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<()>;

    /// Whether the node natively exposes `name` as a property.
    fn has_property(&self, node: &Self::Node, name: &str) -> bool;

    fn set_property(&mut self, node: &Self::Node, name: &str, value: &PropValue) -> Result<()>;

    /// Set a plain attribute, or a namespaced one inside SVG subtrees.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str, namespaced: bool) -> Result<()>;

    fn remove_attribute(&mut self, node: &Self::Node, name: &str, namespaced: bool) -> Result<()>;

    /// Set (`Some`) or clear (`None`) one entry of the native style surface.
    fn set_style(&mut self, node: &Self::Node, name: &str, value: Option<&str>) -> Result<()>;

    /// Replace the whole style surface with a declaration string.
    fn set_style_text(&mut self, node: &Self::Node, css: &str) -> Result<()>;

    fn add_listener(&mut self, node: &Self::Node, event: &str, listener: Listener) -> Result<()>;

    fn remove_listener(&mut self, node: &Self::Node, event: &str) -> Result<()>;
}
