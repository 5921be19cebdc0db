//! Reconciler
//!
//! The [`Renderer`] turns virtual node trees into host trees and keeps them
//! in sync across renders, touching only what changed.
//!
//! # Architecture
//!
//! - `diff`: one position at a time; component expansion, node reuse or
//!   replacement, removal
//! - `children`: keyed matching of a node's children
//! - `props`: attributes, properties, style and event listeners
//! - `component`: component instances, their runs and teardown
//! - `table`: what the reconciler remembers per committed host node
//!
//! # Deferred renders
//!
//! State setters never render synchronously. They enqueue a task on the
//! renderer's [`Scheduler`]; the host drives the queue with
//! [`Renderer::flush_due`] (or [`Renderer::drive`] under tokio) and each due
//! task re-renders exactly one instance in place.
//!
//! # Example
//!
//! ```rust,ignore
//! use canopy_core::{h, MemoryHost, Renderer};
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_root();
//! let mut renderer = Renderer::new(host);
//!
//! let list = h("ul").child(h("li").key("a").child("A").build()?).build()?;
//! let node = renderer.render(list, &root, None)?;
//! ```

mod children;
mod component;
mod diff;
mod props;
mod table;

use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use std::cell::RefCell;

use crate::error::Result;
use crate::hooks::InstanceId;
use crate::host::HostAdapter;
use crate::scheduler::{Clock, Scheduler, SystemClock};
use crate::vdom::{Context, VNode};

use component::ComponentInstance;
use table::{SideTable, Slots};

/// Where in the host tree a reconciliation happens.
pub(crate) struct Site<N> {
    pub parent: N,
    /// Host node currently at the position, if any.
    pub node: Option<N>,
    /// Insertion reference for a newly created node.
    pub before: Option<N>,
    pub context: Context,
    pub svg: bool,
    /// Component nesting depth at this position.
    pub depth: usize,
    pub slots: Option<Slots<N>>,
}

impl<N> Site<N> {
    pub(crate) fn new(parent: N, node: Option<N>, before: Option<N>, context: Context, svg: bool) -> Self {
        Self {
            parent,
            node,
            before,
            context,
            svg,
            depth: 0,
            slots: None,
        }
    }
}

/// Renders virtual node trees into a host through a [`HostAdapter`].
pub struct Renderer<H: HostAdapter> {
    host: H,
    table: SideTable<H::Node>,
    registry: HashMap<InstanceId, Weak<RefCell<ComponentInstance<H::Node>>>>,
    scheduler: Scheduler,
}

impl<H: HostAdapter> Renderer<H> {
    /// A renderer driving `host`, with deferred renders timed by the wall
    /// clock.
    pub fn new(host: H) -> Self {
        Self::with_clock(host, Rc::new(SystemClock))
    }

    /// A renderer whose scheduler reads time from `clock`.
    pub fn with_clock(host: H, clock: Rc<dyn Clock>) -> Self {
        Self {
            host,
            table: SideTable::new(),
            registry: HashMap::new(),
            scheduler: Scheduler::new(clock),
        }
    }

    /// The host adapter, for inspecting the committed tree.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host adapter.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the renderer and hand back its host adapter.
    pub fn into_host(self) -> H {
        self.host
    }

    /// The deferred re-render queue shared with every instance of this
    /// renderer.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Pin the debounce window of this renderer (`None` follows the global
    /// option).
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.scheduler.set_delay(delay);
    }

    /// Render `next` into `root`.
    ///
    /// `previous` is the node a prior call returned for this root; pass it to
    /// update in place, or `None` to mount fresh. Returns the host node that
    /// now represents `next`.
    pub fn render(&mut self, next: impl Into<VNode>, root: &H::Node, previous: Option<&H::Node>) -> Result<H::Node> {
        self.render_with(next, root, previous, Context::default(), false)
    }

    /// [`Renderer::render`] with an initial context and namespace.
    pub fn render_with(
        &mut self,
        next: impl Into<VNode>,
        root: &H::Node,
        previous: Option<&H::Node>,
        context: Context,
        svg: bool,
    ) -> Result<H::Node> {
        let container = self.host.child_container(root, false)?;
        let node = self.reconcile(
            Site::new(container, previous.cloned(), None, context, svg),
            next.into(),
        )?;
        tracing::debug!(node = ?node, tracked = self.table.len(), "render committed");
        Ok(node)
    }

    /// Tear down and detach a tree previously rendered into `root`.
    pub fn unmount(&mut self, root: &H::Node, node: &H::Node) -> Result<()> {
        let container = self.host.child_container(root, false)?;
        self.recollect(node, true)?;
        self.host.remove(&container, node)?;
        tracing::debug!(node = ?node, "tree unmounted");
        Ok(())
    }

    /// Number of mounted component instances.
    pub fn instances(&self) -> usize {
        self.registry.len()
    }

    /// Number of deferred renders waiting.
    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    /// When the earliest deferred render comes due.
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Run every queued deferred render regardless of due time. Returns how
    /// many tasks ran.
    pub fn flush(&mut self) -> Result<usize> {
        self.run_tasks(None)
    }

    /// Run the deferred renders that are due now.
    pub fn flush_due(&mut self) -> Result<usize> {
        let now = self.scheduler.now();
        self.run_tasks(Some(now))
    }

    /// Run the deferred renders due at or before `deadline`.
    pub fn flush_until(&mut self, deadline: Instant) -> Result<usize> {
        self.run_tasks(Some(deadline))
    }

    /// Sleep until each deferred render comes due and run it, until the
    /// queue is empty.
    pub async fn drive(&mut self) -> Result<usize> {
        let mut ran = 0;
        while let Some(due) = self.scheduler.next_due() {
            tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
            ran += self.flush_until(due)?;
        }
        Ok(ran)
    }

    fn run_tasks(&mut self, deadline: Option<Instant>) -> Result<usize> {
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(deadline) {
            self.rerender(task.instance)?;
            ran += 1;
        }
        if ran > 0 {
            tracing::debug!(ran, "deferred renders flushed");
        }
        Ok(ran)
    }
}
