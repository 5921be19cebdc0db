//! Component instances.
//!
//! An instance is created the first time a component tag is reconciled at a
//! given position and depth, and lives until a different component (or a
//! host element) takes that depth, or its host node is removed. It owns the
//! instance's [`HookStore`] and remembers everything a deferred re-render
//! needs to run without its parent: the last props and context, the host
//! parent, the committed host node, and the shared slot list it sits in.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::table::Slots;
use super::{Renderer, Site};
use crate::error::Result;
use crate::hooks::{HookStore, InstanceId, RenderScope};
use crate::host::HostAdapter;
use crate::scheduler::Scheduler;
use crate::vdom::{Component, Context, Props, VNode};

pub(crate) type InstanceRef<N> = Rc<RefCell<ComponentInstance<N>>>;

pub(crate) struct ComponentInstance<N> {
    pub component: Component,
    pub hooks: Rc<HookStore>,
    pub props: Rc<Props>,
    pub context: Context,
    /// Host node the instance currently renders into.
    pub base: Option<N>,
    pub parent: N,
    pub svg: bool,
    pub depth: usize,
    pub slots: Weak<RefCell<SmallVec<[InstanceRef<N>; 2]>>>,
}

impl<N> ComponentInstance<N> {
    pub(crate) fn new(
        component: Component,
        scheduler: Scheduler,
        parent: N,
        depth: usize,
        slots: &Slots<N>,
    ) -> Self {
        let hooks = HookStore::new(component.name().into(), scheduler);
        Self {
            component,
            hooks,
            props: Rc::new(Props::default()),
            context: Context::default(),
            base: None,
            parent,
            svg: false,
            depth,
            slots: Rc::downgrade(slots),
        }
    }

    pub(crate) fn id(&self) -> InstanceId {
        self.hooks.id()
    }
}

impl<N: fmt::Debug> fmt::Debug for ComponentInstance<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("component", &self.component)
            .field("id", &self.id())
            .field("depth", &self.depth)
            .field("base", &self.base)
            .finish()
    }
}

impl<H: HostAdapter> Renderer<H> {
    /// Reconcile a component tag at `site.depth`: reuse or create the
    /// instance, then run it unless a deferred re-render is pending.
    pub(super) fn reconcile_component(
        &mut self,
        component: &Component,
        next: &VNode,
        site: Site<H::Node>,
        slots: Slots<H::Node>,
    ) -> Result<H::Node> {
        let existing = slots.borrow().get(site.depth).cloned();
        let mounting = existing.is_none();
        let instance = match existing {
            Some(instance) => instance,
            None => {
                let instance = Rc::new(RefCell::new(ComponentInstance::new(
                    component.clone(),
                    self.scheduler.clone(),
                    site.parent.clone(),
                    site.depth,
                    &slots,
                )));
                let id = instance.borrow().id();
                tracing::debug!(component = component.name(), instance = ?id, depth = site.depth, "component mounted");
                slots.borrow_mut().push(instance.clone());
                self.registry.insert(id, Rc::downgrade(&instance));
                instance
            }
        };

        {
            let mut inst = instance.borrow_mut();
            inst.props = next.props_rc().clone();
            inst.context = site.context.clone();
            inst.base = site.node.clone();
            inst.parent = site.parent.clone();
            inst.svg = site.svg;
        }

        let hooks = instance.borrow().hooks.clone();
        if hooks.is_pending() {
            if let Some(base) = site.node {
                tracing::trace!(component = component.name(), "render skipped, deferred render pending");
                return Ok(base);
            }
        }

        let depth = site.depth;
        let result = self.run_component(&instance, &slots, site.before);
        if mounting && result.is_err() {
            // A mount that never rendered leaves nothing behind.
            self.teardown_slots(&slots, depth);
        }
        result
    }

    /// Render an instance and reconcile its output one depth further down.
    pub(super) fn run_component(
        &mut self,
        instance: &InstanceRef<H::Node>,
        slots: &Slots<H::Node>,
        before: Option<H::Node>,
    ) -> Result<H::Node> {
        let (component, hooks, props, context) = {
            let inst = instance.borrow();
            (
                inst.component.clone(),
                inst.hooks.clone(),
                inst.props.clone(),
                inst.context.clone(),
            )
        };

        hooks.begin_render(&context);
        let rendered = {
            let _scope = RenderScope::enter(hooks.clone())?;
            component.call(&props, &context)?
        };
        hooks.run_stale_cleanups();

        let (parent, base, svg, depth) = {
            let inst = instance.borrow();
            (inst.parent.clone(), inst.base.clone(), inst.svg, inst.depth)
        };

        let node = self.reconcile(
            Site {
                parent,
                node: base,
                before,
                context,
                svg,
                depth: depth + 1,
                slots: Some(slots.clone()),
            },
            rendered,
        )?;

        // Every instance in the chain down to this one now renders into `node`.
        for outer in slots.borrow().iter().take(depth + 1) {
            outer.borrow_mut().base = Some(node.clone());
        }

        hooks.commit_effects();
        tracing::trace!(component = component.name(), renders = hooks.renders(), "component committed");
        Ok(node)
    }

    /// Tear down every instance at `from` and deeper.
    pub(super) fn teardown_slots(&mut self, slots: &Slots<H::Node>, from: usize) {
        let removed: Vec<InstanceRef<H::Node>> = {
            let mut slots = slots.borrow_mut();
            if slots.len() <= from {
                return;
            }
            slots.drain(from..).collect()
        };

        for instance in removed {
            let (id, hooks, name) = {
                let inst = instance.borrow();
                (inst.id(), inst.hooks.clone(), inst.component.name().to_string())
            };
            self.registry.remove(&id);
            hooks.teardown();
            tracing::debug!(component = %name, instance = ?id, "component torn down");
        }
    }

    /// Run the deferred re-render of `id`, if the instance is still live.
    pub(super) fn rerender(&mut self, id: InstanceId) -> Result<()> {
        let Some(instance) = self.registry.get(&id).and_then(Weak::upgrade) else {
            tracing::trace!(instance = ?id, "deferred render for dropped instance ignored");
            return Ok(());
        };

        let hooks = instance.borrow().hooks.clone();
        let slots = instance.borrow().slots.upgrade();
        let Some(slots) = slots.filter(|_| !hooks.is_removed()) else {
            hooks.clear_pending();
            return Ok(());
        };

        let result = self.run_component(&instance, &slots, None);
        hooks.clear_pending();
        result.map(drop)
    }
}
