//! Virtual Nodes
//!
//! A [`VNode`] is an immutable description of one desired tree node: a
//! [`Tag`] plus a reference-counted [`Props`] bag that also holds the
//! flattened children. Cloning a node is two pointer copies, and
//! [`VNode::with_tag`] re-tags a node while sharing the very same props and
//! children.
//!
//! Children are supplied as [`Child`] values so that nested lists, strings,
//! numbers and absent values can be mixed freely; construction flattens them
//! into one ordered list and assigns every child an effective [`Key`].

use std::fmt;
use std::rc::Rc;

use super::context::Context;
use super::props::{NodeRef, PropValue, Props};
use crate::error::Result;

// ----------------------------------------------------------------------------
// Keys
// ----------------------------------------------------------------------------

/// Sibling identity.
///
/// Explicit keys are strings or integers. Children without one are addressed
/// by position through [`Key::Index`], which never equals an explicit key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Named(Rc<str>),
    Number(i64),
    Index(usize),
}

impl Key {
    /// Whether the key was supplied by the caller (as opposed to positional).
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Key::Index(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Named(s) => f.write_str(s),
            Key::Number(n) => write!(f, "{n}"),
            Key::Index(i) => write!(f, "#{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Named(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Named(value.into())
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Number(value.into())
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Number(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Number(value as i64)
    }
}

// ----------------------------------------------------------------------------
// Components
// ----------------------------------------------------------------------------

/// Signature of a plain component function.
pub type RenderFn = fn(&Props, &Context) -> Result<VNode>;

#[derive(Clone)]
enum ComponentFn {
    Plain(RenderFn),
    Shared(Rc<dyn Fn(&Props, &Context) -> Result<VNode>>),
}

/// A component: a render function plus a display name.
///
/// Identity is what the reconciler compares to decide whether an instance
/// survives: plain functions compare by address, closures by the `Rc` they
/// were wrapped in. Build closure components once and clone the handle.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: ComponentFn,
}

impl Component {
    pub fn new(name: &str, render: RenderFn) -> Self {
        Self {
            name: name.into(),
            render: ComponentFn::Plain(render),
        }
    }

    pub fn from_closure<F>(name: &str, render: F) -> Self
    where
        F: Fn(&Props, &Context) -> Result<VNode> + 'static,
    {
        Self {
            name: name.into(),
            render: ComponentFn::Shared(Rc::new(render)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, props: &Props, context: &Context) -> Result<VNode> {
        match &self.render {
            ComponentFn::Plain(f) => f(props, context),
            ComponentFn::Shared(f) => f(props, context),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (&self.render, &other.render) {
            (ComponentFn::Plain(a), ComponentFn::Plain(b)) => *a as usize == *b as usize,
            (ComponentFn::Shared(a), ComponentFn::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)
    }
}

// ----------------------------------------------------------------------------
// Tags
// ----------------------------------------------------------------------------

/// What a virtual node is.
#[derive(Clone, PartialEq)]
pub enum Tag {
    /// A text node with its content.
    Text(Rc<str>),
    /// A host element.
    Element(Rc<str>),
    /// A component to be rendered down to host nodes.
    Component(Component),
}

impl Tag {
    /// The host tag name: `""` for text, the element name for elements, and
    /// `None` for components (which have no host node of their own).
    pub fn host_name(&self) -> Option<&str> {
        match self {
            Tag::Text(_) => Some(""),
            Tag::Element(name) => Some(name),
            Tag::Component(_) => None,
        }
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Tag::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Tag::Component(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Tag::Text(_))
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        if name.is_empty() {
            Tag::Text("".into())
        } else {
            Tag::Element(name.into())
        }
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Tag::Component(component)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Text(text) => write!(f, "#text({text:?})"),
            Tag::Element(name) => f.write_str(name),
            Tag::Component(c) => c.fmt(f),
        }
    }
}

// ----------------------------------------------------------------------------
// Nodes
// ----------------------------------------------------------------------------

/// Immutable description of a desired tree node.
#[derive(Clone)]
pub struct VNode {
    tag: Tag,
    props: Rc<Props>,
}

impl VNode {
    /// Build a node, flattening `children` and validating sibling keys.
    pub fn new(tag: impl Into<Tag>, mut props: Props, children: Vec<Child>) -> Result<Self> {
        let mut flat = Vec::with_capacity(children.len());
        flatten(children, &mut flat);
        props.set_children(flat)?;

        Ok(Self {
            tag: tag.into(),
            props: Rc::new(props),
        })
    }

    /// Build a node from props that already carry their children.
    pub fn from_parts(tag: impl Into<Tag>, props: Props) -> Self {
        Self {
            tag: tag.into(),
            props: Rc::new(props),
        }
    }

    pub fn element(name: &str, props: Props, children: Vec<Child>) -> Result<Self> {
        Self::new(Tag::Element(name.into()), props, children)
    }

    pub fn component(component: &Component, props: Props, children: Vec<Child>) -> Result<Self> {
        Self::new(Tag::Component(component.clone()), props, children)
    }

    pub fn text(text: impl Into<Rc<str>>) -> Self {
        Self::from_parts(Tag::Text(text.into()), Props::default())
    }

    /// An empty text node, the stand-in for "nothing".
    pub fn empty() -> Self {
        Self::text("")
    }

    /// Re-tag this node, sharing the same props and children.
    pub fn with_tag(&self, tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            props: Rc::clone(&self.props),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn props_rc(&self) -> &Rc<Props> {
        &self.props
    }

    pub fn key(&self) -> Option<&Key> {
        self.props.key()
    }

    pub fn children(&self) -> &[VNode] {
        self.props.children()
    }

    /// Text content, for text nodes.
    pub fn text_content(&self) -> Option<&str> {
        match &self.tag {
            Tag::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether two handles share the same props allocation.
    pub fn ptr_eq(&self, other: &VNode) -> bool {
        Rc::ptr_eq(&self.props, &other.props) && self.tag == other.tag
    }
}

impl Default for VNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Tag::Text(text) = &self.tag {
            return write!(f, "{text:?}");
        }
        f.debug_struct("VNode")
            .field("tag", &self.tag)
            .field("props", &self.props)
            .field("children", &self.props.children())
            .finish()
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::text(text)
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::text(text)
    }
}

impl From<Option<VNode>> for VNode {
    fn from(node: Option<VNode>) -> Self {
        node.unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// Children
// ----------------------------------------------------------------------------

/// One child argument: a node or a nested list of children.
#[derive(Debug, Clone)]
pub enum Child {
    Node(VNode),
    List(Vec<Child>),
}

fn flatten(children: Vec<Child>, out: &mut Vec<VNode>) {
    for child in children {
        match child {
            Child::Node(node) => out.push(node),
            Child::List(list) => flatten(list, out),
        }
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Node(VNode::text(text))
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Node(VNode::text(text))
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Child::Node(VNode::text(n.to_string()))
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Child::Node(VNode::text(n.to_string()))
    }
}

impl From<usize> for Child {
    fn from(n: usize) -> Self {
        Child::Node(VNode::text(n.to_string()))
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Child::Node(VNode::text(n.to_string()))
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(child: Option<T>) -> Self {
        child.map(Into::into).unwrap_or_else(|| Child::Node(VNode::empty()))
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Child::List(children.into_iter().map(Into::into).collect())
    }
}

// ----------------------------------------------------------------------------
// Builder
// ----------------------------------------------------------------------------

/// Start building an element (or a text node, for `""`).
pub fn h(tag: &str) -> Builder {
    Builder::new(Tag::from(tag))
}

/// Fluent construction of a [`VNode`].
///
/// ```rust,ignore
/// let list = h("ul")
///     .attr("class", "items")
///     .children(items.iter().map(|item| h("li").key(item.id).child(item.label.as_str()).build()).collect::<Result<Vec<_>>>()?)
///     .build()?;
/// ```
pub struct Builder {
    tag: Tag,
    props: Props,
    children: Vec<Child>,
}

impl Builder {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn component(component: &Component) -> Self {
        Self::new(Tag::Component(component.clone()))
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name, value);
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.props = self.props.with_key(key);
        self
    }

    pub fn node_ref(mut self, node_ref: &NodeRef) -> Self {
        self.props = self.props.with_ref(node_ref);
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.props = self.props.with_context(context);
        self
    }

    pub fn scoped(mut self) -> Self {
        self.props = self.props.with_scoped(true);
        self
    }

    pub fn static_node(mut self) -> Self {
        self.props = self.props.with_static(true);
        self
    }

    /// Apply an arbitrary transformation to the props (lifecycle setters and
    /// the like).
    pub fn props(mut self, f: impl FnOnce(Props) -> Props) -> Self {
        self.props = f(self.props);
        self
    }

    pub fn on_create<N: 'static>(self, f: impl Fn(&N) + 'static) -> Self {
        self.props(|p| p.on_create(f))
    }

    pub fn on_created<N: 'static>(self, f: impl Fn(&N) + 'static) -> Self {
        self.props(|p| p.on_created(f))
    }

    pub fn on_update<N: 'static>(self, f: impl Fn(&N, &Props, &Props) -> bool + 'static) -> Self {
        self.props(|p| p.on_update(f))
    }

    pub fn on_updated<N: 'static>(self, f: impl Fn(&N) + 'static) -> Self {
        self.props(|p| p.on_updated(f))
    }

    pub fn on_remove<N: 'static>(self, f: impl Fn(&N) + 'static) -> Self {
        self.props(|p| p.on_remove(f))
    }

    pub fn on_removed<N: 'static>(self, f: impl Fn(&N) + 'static) -> Self {
        self.props(|p| p.on_removed(f))
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<VNode> {
        VNode::new(self.tag, self.props, self.children)
    }
}
