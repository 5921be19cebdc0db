//! Side table of reconciler state, keyed by host node handle.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use smallvec::SmallVec;

use super::component::InstanceRef;
use crate::vdom::{Handler, Key, VNode};

/// Component instances rendering at one host position, outermost first.
///
/// The list is shared by every depth of a component chain, so the instance
/// at depth `d` always lives at index `d`.
pub(crate) type Slots<N> = Rc<RefCell<SmallVec<[InstanceRef<N>; 2]>>>;

/// What the reconciler remembers about one committed host node.
pub(crate) struct NodeState<N> {
    /// The description committed to the node last.
    pub prev: VNode,
    /// Key the node is addressed by among its siblings.
    pub key: Option<Key>,
    pub slots: Slots<N>,
    /// Set once removal has started; later lifecycle emissions are skipped.
    pub removed: bool,
    /// Handler cells behind the forwarding listener of each bound event.
    pub listeners: HashMap<String, Rc<RefCell<Handler>>>,
}

impl<N> NodeState<N> {
    pub(crate) fn new(prev: VNode, slots: Slots<N>) -> Self {
        Self {
            prev,
            key: None,
            slots,
            removed: false,
            listeners: HashMap::new(),
        }
    }
}

pub(crate) struct SideTable<N> {
    entries: HashMap<N, NodeState<N>>,
}

impl<N: Clone + Eq + Hash> SideTable<N> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, node: &N) -> Option<&NodeState<N>> {
        self.entries.get(node)
    }

    pub(crate) fn get_mut(&mut self, node: &N) -> Option<&mut NodeState<N>> {
        self.entries.get_mut(node)
    }

    pub(crate) fn insert(&mut self, node: N, state: NodeState<N>) {
        self.entries.insert(node, state);
    }

    /// The entry for `node`, created empty if the node is new to us.
    pub(crate) fn state_mut(&mut self, node: &N) -> &mut NodeState<N> {
        self.entries
            .entry(node.clone())
            .or_insert_with(|| NodeState::new(VNode::empty(), Slots::default()))
    }

    pub(crate) fn remove(&mut self, node: &N) -> Option<NodeState<N>> {
        self.entries.remove(node)
    }

    /// Shared slots recorded for `node`, if it was committed by us.
    pub(crate) fn slots(&self, node: &N) -> Option<Slots<N>> {
        self.get(node).map(|state| state.slots.clone())
    }

    pub(crate) fn prev(&self, node: &N) -> Option<VNode> {
        self.get(node).map(|state| state.prev.clone())
    }

    pub(crate) fn key(&self, node: &N) -> Option<Key> {
        self.get(node).and_then(|state| state.key.clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
