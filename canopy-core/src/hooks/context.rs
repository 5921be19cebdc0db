//! Context access from inside components.
//!
//! The reconciler threads a [`Context`] down the tree; any node may overlay
//! entries onto it for its subtree. Components read the context they were
//! rendered under with [`use_context`].
//!
//! [`create_context`] packages one context entry behind a unique key and
//! returns a [`ContextHandle`] that builds provider and consumer nodes for
//! it, so unrelated libraries never collide on entry names.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::scope::RenderScope;
use crate::error::Result;
use crate::vdom::{Child, Component, Context, PropValue, Props, RenderProp, VNode};

/// The context the current component was rendered under.
pub fn use_context() -> Result<Context> {
    Ok(RenderScope::current()?.context())
}

/// One entry of the current context.
pub fn use_context_value(key: &str) -> Result<Option<PropValue>> {
    Ok(RenderScope::current()?.context().get(key).cloned())
}

/// The value provided for `handle`, or its default.
pub fn use_context_of(handle: &ContextHandle) -> Result<PropValue> {
    Ok(handle.read(&RenderScope::current()?.context()))
}

/// A context entry under a generated key, with a default value.
#[derive(Debug, Clone)]
pub struct ContextHandle {
    space: Rc<str>,
    default: PropValue,
}

/// Allocate a fresh context entry.
pub fn create_context(default: impl Into<PropValue>) -> ContextHandle {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    ContextHandle {
        space: format!("__context_{n}").into(),
        default: default.into(),
    }
}

impl ContextHandle {
    /// The context key this handle reads and writes.
    pub fn key(&self) -> &str {
        &self.space
    }

    pub fn default_value(&self) -> &PropValue {
        &self.default
    }

    /// The value in `context`, falling back to the default.
    pub fn read(&self, context: &Context) -> PropValue {
        context
            .get(&self.space)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// A node that provides `value` to `children`.
    ///
    /// The provider renders its first child; wrap several children in an
    /// element.
    pub fn provider(&self, value: impl Into<PropValue>, children: Vec<Child>) -> Result<VNode> {
        let context = Context::new().with(self.space.to_string(), value);
        VNode::component(
            &Component::new("Provider", provide),
            Props::new().with_context(context),
            children,
        )
    }

    /// A node that renders `render(value)` with the provided value.
    pub fn consumer<F>(&self, render: F) -> VNode
    where
        F: Fn(&PropValue) -> Result<VNode> + 'static,
    {
        let props = Props::new()
            .with("space", self.space.clone())
            .with("default", self.default.clone())
            .with("render", RenderProp::new(render));
        VNode::from_parts(Component::new("Consumer", consume), props)
    }
}

fn provide(props: &Props, _: &Context) -> Result<VNode> {
    Ok(props.children().first().cloned().unwrap_or_default())
}

fn consume(props: &Props, context: &Context) -> Result<VNode> {
    let value = props
        .get("space")
        .and_then(PropValue::as_str)
        .and_then(|space| context.get(space))
        .or_else(|| props.get("default"))
        .cloned()
        .unwrap_or_default();

    match props.get("render").and_then(PropValue::as_render) {
        Some(render) => render.call(&value),
        None => Ok(VNode::empty()),
    }
}
