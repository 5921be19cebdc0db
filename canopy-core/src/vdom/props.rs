//! Property Bags
//!
//! A [`Props`] value is the property bag of one virtual node. It has two
//! halves:
//!
//! - an ordered attribute map (`IndexMap<String, PropValue>`) that the
//!   property reconciler projects onto the host node, and
//! - typed reserved entries (`children`, `key`, `ref`, `context`, `static`,
//!   `scoped` and the six lifecycle callbacks) that drive the reconciler
//!   itself and never reach the host as attributes.
//!
//! Reserved names passed through the generic [`Props::insert`] path are
//! routed to their typed entry when the value has the right shape, and are
//! dropped with a warning otherwise.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::context::Context;
use super::node::{Key, VNode};
use crate::error::{Error, Result};

/// Property names the reconciler interprets itself.
pub const RESERVED: &[&str] = &[
    "children",
    "key",
    "ref",
    "context",
    "static",
    "scoped",
    "onCreate",
    "onCreated",
    "onUpdate",
    "onUpdated",
    "onRemove",
    "onRemoved",
];

/// Whether `name` is one of the [`RESERVED`] property names.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

// ----------------------------------------------------------------------------
// Values
// ----------------------------------------------------------------------------

/// Event delivered to a [`Handler`] by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name, matching the property name the handler was bound under.
    pub name: String,
    /// Host-specific payload.
    pub detail: PropValue,
}

impl Event {
    pub fn new(name: impl Into<String>, detail: impl Into<PropValue>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// An event-handler callable. Compared by pointer identity.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A render-prop callable: turns a value into a subtree.
#[derive(Clone)]
pub struct RenderProp(Rc<dyn Fn(&PropValue) -> Result<VNode>>);

impl RenderProp {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PropValue) -> Result<VNode> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, value: &PropValue) -> Result<VNode> {
        (self.0)(value)
    }

    pub fn ptr_eq(&self, other: &RenderProp) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A single property value.
#[derive(Clone, Default)]
pub enum PropValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<[PropValue]>),
    Map(Rc<IndexMap<String, PropValue>>),
    Handler(Handler),
    Render(RenderProp),
}

impl PropValue {
    /// Build a map value (used for `style` sub-maps and context overlays).
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<PropValue>,
    {
        PropValue::Map(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn list<V: Into<PropValue>>(items: impl IntoIterator<Item = V>) -> Self {
        PropValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, PropValue>> {
        match self {
            PropValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_render(&self) -> Option<&RenderProp> {
        match self {
            PropValue::Render(r) => Some(r),
            _ => None,
        }
    }

    /// String form used when the value is written as a plain attribute.
    ///
    /// Returns `None` for values that have no attribute form (null and
    /// callables). Lists and maps are written as JSON.
    pub fn to_attr_string(&self) -> Option<String> {
        match self {
            PropValue::Null | PropValue::Handler(_) | PropValue::Render(_) => None,
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Int(n) => Some(n.to_string()),
            PropValue::Float(f) => Some(f.to_string()),
            PropValue::Str(s) => Some(s.to_string()),
            PropValue::List(_) | PropValue::Map(_) => serde_json::to_string(self).ok(),
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        use PropValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) => Rc::ptr_eq(a, b) || a == b,
            (Map(a), Map(b)) => Rc::ptr_eq(a, b) || a == b,
            (Handler(a), Handler(b)) => a.ptr_eq(b),
            (Render(a), Render(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("Null"),
            PropValue::Bool(b) => write!(f, "{b:?}"),
            PropValue::Int(n) => write!(f, "{n:?}"),
            PropValue::Float(x) => write!(f, "{x:?}"),
            PropValue::Str(s) => write!(f, "{s:?}"),
            PropValue::List(items) => f.debug_list().entries(items.iter()).finish(),
            PropValue::Map(map) => f.debug_map().entries(map.iter()).finish(),
            PropValue::Handler(_) => f.write_str("<handler>"),
            PropValue::Render(_) => f.write_str("<render>"),
        }
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PropValue::Null | PropValue::Handler(_) | PropValue::Render(_) => serializer.serialize_unit(),
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            PropValue::Int(n) => serializer.serialize_i64(*n),
            PropValue::Float(x) => serializer.serialize_f64(*x),
            PropValue::Str(s) => serializer.serialize_str(s),
            PropValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            PropValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        PropValue::Handler(value)
    }
}

impl From<RenderProp> for PropValue {
    fn from(value: RenderProp) -> Self {
        PropValue::Render(value)
    }
}

impl From<IndexMap<String, PropValue>> for PropValue {
    fn from(value: IndexMap<String, PropValue>) -> Self {
        PropValue::Map(Rc::new(value))
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        PropValue::List(value.into())
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropValue::Null)
    }
}

// ----------------------------------------------------------------------------
// Refs
// ----------------------------------------------------------------------------

/// A slot that receives the committed host node of the element it is
/// attached to, and is cleared when that node is torn down.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<RefCell<Option<Rc<dyn Any>>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current host node, if it is of type `N`.
    pub fn get<N: Clone + 'static>(&self) -> Option<N> {
        self.0
            .borrow()
            .as_ref()
            .and_then(|node| node.downcast_ref::<N>().cloned())
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub(crate) fn set<N: 'static>(&self, node: N) {
        *self.0.borrow_mut() = Some(Rc::new(node));
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().take();
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef").field("set", &self.is_set()).finish()
    }
}

// ----------------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------------

/// Callback receiving the host node as `&dyn Any`.
pub(crate) type NodeCallback = Rc<dyn Fn(&dyn Any)>;

/// `onUpdate` callback: host node, previous props, next props. Returning
/// `false` skips property and children reconciliation for that pass.
pub(crate) type UpdateCallback = Rc<dyn Fn(&dyn Any, &Props, &Props) -> bool>;

/// Lifecycle phases that receive only the host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Create,
    Created,
    Updated,
    Remove,
    Removed,
}

/// Lifecycle callbacks attached to a virtual node.
#[derive(Clone, Default)]
pub struct Lifecycle {
    on_create: Option<NodeCallback>,
    on_created: Option<NodeCallback>,
    on_update: Option<UpdateCallback>,
    on_updated: Option<NodeCallback>,
    on_remove: Option<NodeCallback>,
    on_removed: Option<NodeCallback>,
}

impl Lifecycle {
    pub(crate) fn emit(&self, phase: Phase, node: &dyn Any) {
        let callback = match phase {
            Phase::Create => &self.on_create,
            Phase::Created => &self.on_created,
            Phase::Updated => &self.on_updated,
            Phase::Remove => &self.on_remove,
            Phase::Removed => &self.on_removed,
        };
        if let Some(callback) = callback {
            callback(node);
        }
    }

    /// Run `onUpdate`. No callback means "proceed".
    pub(crate) fn emit_update(&self, node: &dyn Any, prev: &Props, next: &Props) -> bool {
        match &self.on_update {
            Some(callback) => callback(node, prev, next),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.on_create.is_none()
            && self.on_created.is_none()
            && self.on_update.is_none()
            && self.on_updated.is_none()
            && self.on_remove.is_none()
            && self.on_removed.is_none()
    }
}

fn node_callback<N, F>(f: F) -> NodeCallback
where
    N: 'static,
    F: Fn(&N) + 'static,
{
    Rc::new(move |node: &dyn Any| {
        if let Some(node) = node.downcast_ref::<N>() {
            f(node)
        }
    })
}

// ----------------------------------------------------------------------------
// Props
// ----------------------------------------------------------------------------

/// The property bag of a virtual node.
#[derive(Clone, Default)]
pub struct Props {
    attrs: IndexMap<String, PropValue>,
    children: Vec<VNode>,
    child_keys: Vec<Key>,
    key: Option<Key>,
    node_ref: Option<NodeRef>,
    context: Option<Context>,
    lifecycle: Lifecycle,
    scoped: bool,
    is_static: bool,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Props::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property. Reserved names go to their typed entry.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();

        if !is_reserved(&name) {
            self.attrs.insert(name, value);
            return;
        }

        match (name.as_str(), &value) {
            ("key", PropValue::Str(s)) => self.key = Some(Key::Named(s.clone())),
            ("key", PropValue::Int(n)) => self.key = Some(Key::Number(*n)),
            ("context", PropValue::Map(map)) => {
                self.context = Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            ("scoped", PropValue::Bool(b)) => self.scoped = *b,
            ("static", PropValue::Bool(b)) => self.is_static = *b,
            _ => tracing::warn!(prop = %name, value = ?value, "reserved property ignored"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    /// Ordered attribute entries (reserved entries excluded).
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    /// Flattened children.
    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    /// Effective key of each child: its explicit key, or its position.
    pub fn child_keys(&self) -> &[Key] {
        &self.child_keys
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref()
    }

    pub fn with_ref(mut self, node_ref: &NodeRef) -> Self {
        self.node_ref = Some(node_ref.clone());
        self
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn scoped(&self) -> bool {
        self.scoped
    }

    pub fn with_scoped(mut self, scoped: bool) -> Self {
        self.scoped = scoped;
        self
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn on_create<N: 'static>(mut self, f: impl Fn(&N) + 'static) -> Self {
        self.lifecycle.on_create = Some(node_callback(f));
        self
    }

    pub fn on_created<N: 'static>(mut self, f: impl Fn(&N) + 'static) -> Self {
        self.lifecycle.on_created = Some(node_callback(f));
        self
    }

    /// `f` receives the host node, the previously committed props and the
    /// next props. Returning `false` skips this update.
    pub fn on_update<N: 'static>(mut self, f: impl Fn(&N, &Props, &Props) -> bool + 'static) -> Self {
        self.lifecycle.on_update = Some(Rc::new(move |node: &dyn Any, prev: &Props, next: &Props| {
            match node.downcast_ref::<N>() {
                Some(node) => f(node, prev, next),
                None => true,
            }
        }));
        self
    }

    pub fn on_updated<N: 'static>(mut self, f: impl Fn(&N) + 'static) -> Self {
        self.lifecycle.on_updated = Some(node_callback(f));
        self
    }

    pub fn on_remove<N: 'static>(mut self, f: impl Fn(&N) + 'static) -> Self {
        self.lifecycle.on_remove = Some(node_callback(f));
        self
    }

    pub fn on_removed<N: 'static>(mut self, f: impl Fn(&N) + 'static) -> Self {
        self.lifecycle.on_removed = Some(node_callback(f));
        self
    }

    /// Install an already-flattened child list and compute effective keys.
    pub(crate) fn set_children(&mut self, children: Vec<VNode>) -> Result<()> {
        let mut keys = Vec::with_capacity(children.len());
        let mut seen = HashSet::with_capacity(children.len());

        for (index, child) in children.iter().enumerate() {
            let key = child.key().cloned().unwrap_or(Key::Index(index));
            if !seen.insert(key.clone()) {
                return Err(Error::DuplicateKey(key));
            }
            keys.push(key);
        }

        self.children = children;
        self.child_keys = keys;
        Ok(())
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Props");
        s.field("attrs", &self.attrs);
        if let Some(key) = &self.key {
            s.field("key", key);
        }
        if let Some(context) = &self.context {
            s.field("context", context);
        }
        if self.scoped {
            s.field("scoped", &true);
        }
        if self.is_static {
            s.field("static", &true);
        }
        s.field("children", &self.children.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_route_to_typed_entries() {
        let props = Props::new()
            .with("id", "main")
            .with("key", "row-1")
            .with("scoped", true)
            .with("static", true)
            .with("context", PropValue::map([("theme", "dark")]));

        assert_eq!(props.attr_count(), 1);
        assert_eq!(props.get("id"), Some(&PropValue::from("main")));
        assert_eq!(props.key(), Some(&Key::Named("row-1".into())));
        assert!(props.scoped());
        assert!(props.is_static());
        assert_eq!(
            props.context().and_then(|c| c.get("theme")),
            Some(&PropValue::from("dark"))
        );
    }

    #[test]
    fn handlers_compare_by_identity() {
        let a = Handler::new(|_| {});
        let b = Handler::new(|_| {});

        assert_eq!(PropValue::from(a.clone()), PropValue::from(a.clone()));
        assert_ne!(PropValue::from(a), PropValue::from(b));
    }

    #[test]
    fn attribute_strings() {
        assert_eq!(PropValue::from(3).to_attr_string().as_deref(), Some("3"));
        assert_eq!(PropValue::from(true).to_attr_string().as_deref(), Some("true"));
        assert_eq!(PropValue::Null.to_attr_string(), None);
        assert_eq!(
            PropValue::list([1, 2]).to_attr_string().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(
            PropValue::map([("a", "b")]).to_attr_string().as_deref(),
            Some(r#"{"a":"b"}"#)
        );
    }

    #[test]
    fn duplicate_child_keys_are_rejected() {
        let mut props = Props::new();
        let children = vec![
            VNode::from_parts("li", Props::new().with_key("a")),
            VNode::from_parts("li", Props::new().with_key("a")),
        ];

        let err = props.set_children(children).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(Key::Named(ref k)) if &**k == "a"));
    }

    #[test]
    fn positional_keys_fill_gaps() {
        let mut props = Props::new();
        props
            .set_children(vec![
                VNode::text("x"),
                VNode::from_parts("li", Props::new().with_key(7)),
                VNode::text("y"),
            ])
            .unwrap();

        assert_eq!(
            props.child_keys(),
            &[Key::Index(0), Key::Number(7), Key::Index(2)]
        );
    }

    #[test]
    fn node_ref_downcasts() {
        let node_ref = NodeRef::new();
        assert!(node_ref.get::<u32>().is_none());

        node_ref.set(5u32);
        assert_eq!(node_ref.get::<u32>(), Some(5));
        assert_eq!(node_ref.get::<String>(), None);

        node_ref.clear();
        assert!(!node_ref.is_set());
    }
}
