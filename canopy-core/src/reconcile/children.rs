//! Keyed children reconciliation.
//!
//! # Algorithm
//!
//! 1. Index the container's current children by the key they were committed
//!    under (explicit key, or position for unkeyed children).
//! 2. Walk the next children in order. A child whose key is indexed reuses
//!    that host node, moving it to the child's position first if it is
//!    elsewhere; any other child is created in place.
//! 3. Whatever was never claimed is torn down and detached, in document
//!    order.
//!
//! A local mirror of the container's child list keeps move detection to one
//! lookup per child instead of a host query.

use std::collections::HashMap;

use super::{Renderer, Site};
use crate::error::Result;
use crate::host::HostAdapter;
use crate::vdom::{Context, Key, VNode};

impl<H: HostAdapter> Renderer<H> {
    pub(super) fn reconcile_children(
        &mut self,
        base: &H::Node,
        next: &VNode,
        context: &Context,
        svg: bool,
    ) -> Result<()> {
        let container = self.host.child_container(base, next.props().scoped())?;
        let mut live = self.host.children(&container);

        let mut index: HashMap<Key, (usize, H::Node)> = HashMap::with_capacity(live.len());
        let mut orphans = Vec::new();
        for (position, child) in live.iter().enumerate() {
            let key = self.table.key(child).unwrap_or(Key::Index(position));
            if let Some(shadowed) = index.insert(key, (position, child.clone())) {
                orphans.push(shadowed);
            }
        }

        let keys = next.props().child_keys();
        for (position, (child, key)) in next.children().iter().zip(keys).enumerate() {
            let existing = index.remove(key).map(|(_, node)| node);

            let node = match existing {
                Some(existing) => {
                    let at = live.iter().position(|n| *n == existing);
                    if at != Some(position) {
                        tracing::trace!(key = %key, from = ?at, to = position, "child moved");
                        self.host.insert_before(&container, &existing, live.get(position))?;
                        if let Some(at) = at {
                            live.remove(at);
                        }
                        live.insert(position, existing.clone());
                    }
                    self.reconcile(
                        Site::new(container.clone(), Some(existing), None, context.clone(), svg),
                        child.clone(),
                    )?
                }
                None => {
                    let before = live.get(position).cloned();
                    let node = self.reconcile(
                        Site::new(container.clone(), None, before, context.clone(), svg),
                        child.clone(),
                    )?;
                    live.insert(position, node.clone());
                    node
                }
            };

            live[position] = node.clone();
            self.table.state_mut(&node).key = child.key().cloned();
        }

        let mut leftovers: Vec<(usize, H::Node)> = index.into_values().chain(orphans).collect();
        leftovers.sort_by_key(|(position, _)| *position);
        for (_, node) in leftovers {
            self.recollect(&node, true)?;
            self.host.remove(&container, &node)?;
        }
        Ok(())
    }
}
