//! Single-node reconciliation and teardown.
//!
//! [`Renderer::reconcile`] brings one host position in line with one virtual
//! node. Component tags are expanded one depth at a time until a text node
//! or element comes out; that description is then matched against the host
//! node at the position, which is reused when its tag agrees and replaced
//! otherwise.
//!
//! [`Renderer::recollect`] is the inverse: it walks a committed subtree,
//! tears down component instances, emits the removal lifecycle and drops the
//! side table entries.

use super::table::{NodeState, Slots};
use super::{Renderer, Site};
use crate::error::Result;
use crate::host::HostAdapter;
use crate::vdom::{Phase, Props, Tag, VNode};

impl<H: HostAdapter> Renderer<H> {
    pub(super) fn reconcile(&mut self, site: Site<H::Node>, next: VNode) -> Result<H::Node> {
        // Instances already attached to the node win over the caller's list.
        let slots = site
            .node
            .as_ref()
            .and_then(|node| self.table.slots(node))
            .or_else(|| site.slots.clone())
            .unwrap_or_default();

        let context = match next.props().context() {
            Some(overlay) => site.context.overlay(overlay),
            None => site.context.clone(),
        };
        let svg = site.svg || matches!(next.tag(), Tag::Element(name) if &**name == "svg");
        let site = Site { context, svg, ..site };

        // A different component (or none) now owns this depth.
        let stale = slots
            .borrow()
            .get(site.depth)
            .is_some_and(|instance| next.tag().as_component() != Some(&instance.borrow().component));
        if stale {
            self.teardown_slots(&slots, site.depth);
        }

        match next.tag().as_component().cloned() {
            Some(component) => self.reconcile_component(&component, &next, site, slots),
            None => self.reconcile_host(next, site, slots),
        }
    }

    fn reconcile_host(&mut self, next: VNode, site: Site<H::Node>, slots: Slots<H::Node>) -> Result<H::Node> {
        let tag = next.tag().host_name().unwrap_or_default();
        let prev = site.node.as_ref().and_then(|node| self.table.prev(node));

        let reusable = match (&site.node, &prev) {
            (Some(node), Some(prev)) if prev.tag().host_name() == Some(tag) => Some(node.clone()),
            _ => None,
        };

        let (base, prev) = match reusable {
            Some(node) => (node, prev),
            None => {
                let base = self.create_host(&next, &site, prev.as_ref(), &slots)?;
                (base, None)
            }
        };

        let commit = match &prev {
            None => {
                self.apply(&base, None, &next, &site)?;
                true
            }
            Some(prev) if prev.props().is_static() => {
                tracing::trace!(tag, "static node left untouched");
                false
            }
            Some(prev) => {
                if next.props().lifecycle().emit_update(&base, prev.props(), next.props()) {
                    self.apply(&base, Some(prev), &next, &site)?;
                    true
                } else {
                    tracing::trace!(tag, "update vetoed by onUpdate");
                    false
                }
            }
        };

        let state = self.table.state_mut(&base);
        state.slots = slots;
        state.removed = false;
        if commit {
            state.prev = next.clone();
        }

        if let Some(node_ref) = next.props().node_ref() {
            node_ref.set(base.clone());
        }

        let lifecycle = next.props().lifecycle();
        match prev {
            None => lifecycle.emit(Phase::Created, &base),
            Some(prev) if prev.props().is_static() => {}
            Some(_) => lifecycle.emit(Phase::Updated, &base),
        }

        Ok(base)
    }

    /// Create the host node for `next` and put it in place: replacing `old`
    /// when there is one, otherwise before `site.before`.
    fn create_host(
        &mut self,
        next: &VNode,
        site: &Site<H::Node>,
        old_prev: Option<&VNode>,
        slots: &Slots<H::Node>,
    ) -> Result<H::Node> {
        let tag = next.tag().host_name().unwrap_or_default();
        let base = self.host.create(tag, site.svg)?;
        tracing::debug!(tag, svg = site.svg, "host node created");

        let mut key = None;
        match &site.node {
            Some(old) => {
                key = self.table.key(old);
                let element_swap = !next.tag().is_text()
                    && old_prev.is_some_and(|prev| matches!(prev.tag(), Tag::Element(_)));
                if element_swap {
                    self.transfer_children(old, &base, next)?;
                }
                self.host.replace(&site.parent, &base, old)?;
                self.recollect(old, false)?;
            }
            None => self.host.insert_before(&site.parent, &base, site.before.as_ref())?,
        }

        // The replacement takes over the sibling key; a deferred re-render
        // never passes through the parent's children loop to restore it.
        let mut state = NodeState::new(VNode::empty(), slots.clone());
        state.key = key;
        self.table.insert(base.clone(), state);
        next.props().lifecycle().emit(Phase::Create, &base);
        Ok(base)
    }

    /// Move up to as many children as `next` wants from `old` into `new`.
    fn transfer_children(&mut self, old: &H::Node, new: &H::Node, next: &VNode) -> Result<()> {
        let from = self.host.child_container(old, false)?;
        let into = self.host.child_container(new, next.props().scoped())?;
        let moving: Vec<H::Node> = self
            .host
            .children(&from)
            .into_iter()
            .take(next.children().len())
            .collect();
        for child in &moving {
            self.host.append(&into, child)?;
        }
        tracing::trace!(moved = moving.len(), "children transferred to replacement node");
        Ok(())
    }

    /// Project `next` onto `base`: text content, or properties then children.
    fn apply(&mut self, base: &H::Node, prev: Option<&VNode>, next: &VNode, site: &Site<H::Node>) -> Result<()> {
        match next.tag() {
            Tag::Text(text) => {
                let old = prev.and_then(VNode::text_content).unwrap_or("");
                if old != &**text {
                    self.host.set_text(base, text)?;
                }
                Ok(())
            }
            Tag::Element(_) => {
                let empty = Props::default();
                let prev_props = prev.map(VNode::props).unwrap_or(&empty);
                self.reconcile_props(base, prev_props, next.props(), site.svg)?;
                self.reconcile_children(base, next, &site.context, site.svg)
            }
            Tag::Component(_) => Ok(()),
        }
    }

    /// Tear down the committed subtree at `node`.
    ///
    /// With `components` unset the instances rendering into `node` survive;
    /// that is the case when `node` is being replaced by a new node the same
    /// instances render into.
    pub(super) fn recollect(&mut self, node: &H::Node, components: bool) -> Result<()> {
        let (prev, slots) = match self.table.get_mut(node) {
            Some(state) if !state.removed => {
                state.removed = true;
                (state.prev.clone(), state.slots.clone())
            }
            _ => return Ok(()),
        };

        if components {
            self.teardown_slots(&slots, 0);
        }

        let lifecycle = prev.props().lifecycle();
        lifecycle.emit(Phase::Remove, node);

        if matches!(prev.tag(), Tag::Element(_)) {
            let container = self.host.child_container(node, false)?;
            for child in self.host.children(&container) {
                self.recollect(&child, true)?;
            }
        }

        lifecycle.emit(Phase::Removed, node);
        if let Some(node_ref) = prev.props().node_ref() {
            node_ref.clear();
        }
        self.table.remove(node);
        tracing::trace!(node = ?node, "node recollected");
        Ok(())
    }
}
