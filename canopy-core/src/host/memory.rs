//! In-memory host tree.
//!
//! An arena of nodes with DOM-like semantics, plus an operation log so tests
//! can assert exactly which mutations a render performed.

use std::fmt::Write as _;

use indexmap::IndexMap;

use super::{HostAdapter, Listener};
use crate::error::{Error, Result};
use crate::vdom::{Event, PropValue};

/// Names an element exposes as native properties rather than attributes.
pub const NATIVE_PROPERTIES: &[&str] = &["value", "checked", "selected", "disabled", "className"];

/// Handle to a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemNode(u32);

impl MemNode {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// A mutation recorded by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create { node: MemNode, tag: String, svg: bool },
    Append { parent: MemNode, node: MemNode },
    InsertBefore { parent: MemNode, node: MemNode, reference: Option<MemNode> },
    Replace { parent: MemNode, new: MemNode, old: MemNode },
    Remove { parent: MemNode, node: MemNode },
    Isolate { node: MemNode, container: MemNode },
    SetText { node: MemNode, text: String },
    SetProperty { node: MemNode, name: String },
    SetAttribute { node: MemNode, name: String, value: String, namespaced: bool },
    RemoveAttribute { node: MemNode, name: String },
    SetStyle { node: MemNode, name: String, value: Option<String> },
    SetStyleText { node: MemNode, css: String },
    AddListener { node: MemNode, event: String },
    RemoveListener { node: MemNode, event: String },
}

#[derive(Default)]
struct NodeData {
    /// `""` for text, `#root` for roots, `#scope` for isolated containers.
    tag: String,
    svg: bool,
    text: String,
    parent: Option<MemNode>,
    children: Vec<MemNode>,
    attrs: IndexMap<String, String>,
    namespaced: Vec<String>,
    properties: IndexMap<String, PropValue>,
    style: IndexMap<String, String>,
    listeners: IndexMap<String, Listener>,
    scope: Option<MemNode>,
}

/// Arena-backed host tree.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<NodeData>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached root container to render into.
    pub fn create_root(&mut self) -> MemNode {
        self.alloc("#root", false)
    }

    fn alloc(&mut self, tag: &str, svg: bool) -> MemNode {
        let id = MemNode(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            tag: tag.to_string(),
            svg,
            ..NodeData::default()
        });
        id
    }

    fn data(&self, node: MemNode) -> Result<&NodeData> {
        self.nodes
            .get(node.0 as usize)
            .ok_or_else(|| Error::host(format!("unknown node {node:?}")))
    }

    fn data_mut(&mut self, node: MemNode) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(node.0 as usize)
            .ok_or_else(|| Error::host(format!("unknown node {node:?}")))
    }

    fn get(&self, node: MemNode) -> Option<&NodeData> {
        self.nodes.get(node.0 as usize)
    }

    /// Detach `node` from wherever it currently is.
    fn detach(&mut self, node: MemNode) -> Result<()> {
        if let Some(parent) = self.data(node)?.parent {
            self.data_mut(parent)?.children.retain(|c| *c != node);
            self.data_mut(node)?.parent = None;
        }
        Ok(())
    }

    fn position(&self, parent: MemNode, child: MemNode) -> Result<usize> {
        self.data(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or_else(|| Error::host(format!("{child:?} is not a child of {parent:?}")))
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn tag(&self, node: MemNode) -> Option<&str> {
        self.get(node).map(|d| d.tag.as_str())
    }

    pub fn is_svg(&self, node: MemNode) -> bool {
        self.get(node).map(|d| d.svg).unwrap_or(false)
    }

    pub fn parent(&self, node: MemNode) -> Option<MemNode> {
        self.get(node).and_then(|d| d.parent)
    }

    pub fn child_nodes(&self, node: MemNode) -> &[MemNode] {
        self.get(node).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    /// The isolated container of `node`, if one was requested.
    pub fn scope(&self, node: MemNode) -> Option<MemNode> {
        self.get(node).and_then(|d| d.scope)
    }

    pub fn attribute(&self, node: MemNode, name: &str) -> Option<&str> {
        self.get(node).and_then(|d| d.attrs.get(name)).map(String::as_str)
    }

    pub fn is_namespaced(&self, node: MemNode, name: &str) -> bool {
        self.get(node)
            .map(|d| d.namespaced.iter().any(|n| n == name))
            .unwrap_or(false)
    }

    pub fn property(&self, node: MemNode, name: &str) -> Option<&PropValue> {
        self.get(node).and_then(|d| d.properties.get(name))
    }

    pub fn style(&self, node: MemNode, name: &str) -> Option<&str> {
        self.get(node).and_then(|d| d.style.get(name)).map(String::as_str)
    }

    pub fn has_listener(&self, node: MemNode, event: &str) -> bool {
        self.get(node).map(|d| d.listeners.contains_key(event)).unwrap_or(false)
    }

    /// Invoke the listener bound for `event.name`, if any.
    pub fn dispatch(&self, node: MemNode, event: &Event) -> bool {
        let listener = self.get(node).and_then(|d| d.listeners.get(&event.name)).cloned();
        match listener {
            Some(listener) => {
                listener(event);
                true
            }
            None => false,
        }
    }

    /// Concatenated text of the node and its light-tree descendants.
    pub fn text_content(&self, node: MemNode) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: MemNode, out: &mut String) {
        if let Some(data) = self.get(node) {
            if data.tag.is_empty() {
                out.push_str(&data.text);
            }
            for child in &data.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Depth-first search for an element whose `id` attribute matches.
    /// Descends into isolated containers.
    pub fn find_by_id(&self, root: MemNode, id: &str) -> Option<MemNode> {
        let data = self.get(root)?;
        if data.attrs.get("id").map(String::as_str) == Some(id) {
            return Some(root);
        }
        data.scope
            .iter()
            .chain(data.children.iter())
            .find_map(|child| self.find_by_id(*child, id))
    }

    /// All descendants (excluding `root`) with the given tag, in document order.
    pub fn find_by_tag(&self, root: MemNode, tag: &str) -> Vec<MemNode> {
        let mut found = Vec::new();
        self.collect_tag(root, tag, &mut found);
        found
    }

    fn collect_tag(&self, node: MemNode, tag: &str, found: &mut Vec<MemNode>) {
        if let Some(data) = self.get(node) {
            for child in data.scope.iter().chain(data.children.iter()) {
                if self.get(*child).map(|d| d.tag == tag).unwrap_or(false) {
                    found.push(*child);
                }
                self.collect_tag(*child, tag, found);
            }
        }
    }

    /// Markup of the node's children (like `innerHTML`).
    pub fn inner_markup(&self, node: MemNode) -> String {
        let mut out = String::new();
        for child in self.child_nodes(node) {
            self.write_markup(*child, &mut out);
        }
        out
    }

    /// Markup of the node itself (like `outerHTML`).
    pub fn outer_markup(&self, node: MemNode) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: MemNode, out: &mut String) {
        let Some(data) = self.get(node) else {
            return;
        };
        if data.tag.is_empty() {
            out.push_str(&escape(&data.text));
            return;
        }
        if data.tag.starts_with('#') {
            for child in &data.children {
                self.write_markup(*child, out);
            }
            return;
        }

        let _ = write!(out, "<{}", data.tag);
        for (name, value) in &data.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !data.style.is_empty() {
            let css = data
                .style
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&css));
        }
        out.push('>');
        for child in &data.children {
            self.write_markup(*child, out);
        }
        let _ = write!(out, "</{}>", data.tag);
    }

    // ------------------------------------------------------------------------
    // Operation log
    // ------------------------------------------------------------------------

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of nodes created since the log was last drained.
    pub fn created_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, HostOp::Create { .. }))
            .count()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl HostAdapter for MemoryHost {
    type Node = MemNode;

    fn create(&mut self, tag: &str, svg: bool) -> Result<MemNode> {
        let node = self.alloc(tag, svg && !tag.is_empty());
        self.ops.push(HostOp::Create {
            node,
            tag: tag.to_string(),
            svg,
        });
        Ok(node)
    }

    fn append(&mut self, parent: &MemNode, node: &MemNode) -> Result<()> {
        self.detach(*node)?;
        self.data_mut(*parent)?.children.push(*node);
        self.data_mut(*node)?.parent = Some(*parent);
        self.ops.push(HostOp::Append {
            parent: *parent,
            node: *node,
        });
        Ok(())
    }

    fn insert_before(&mut self, parent: &MemNode, node: &MemNode, reference: Option<&MemNode>) -> Result<()> {
        let Some(reference) = reference else {
            return self.append(parent, node);
        };
        if reference == node {
            return Ok(());
        }

        self.detach(*node)?;
        let index = self.position(*parent, *reference)?;
        self.data_mut(*parent)?.children.insert(index, *node);
        self.data_mut(*node)?.parent = Some(*parent);
        self.ops.push(HostOp::InsertBefore {
            parent: *parent,
            node: *node,
            reference: Some(*reference),
        });
        Ok(())
    }

    fn replace(&mut self, parent: &MemNode, new: &MemNode, old: &MemNode) -> Result<()> {
        let index = self.position(*parent, *old)?;
        self.detach(*new)?;
        // Detaching `new` may have shifted `old` if both were siblings.
        let index = if self.data(*parent)?.children.get(index) == Some(old) {
            index
        } else {
            self.position(*parent, *old)?
        };
        self.data_mut(*parent)?.children[index] = *new;
        self.data_mut(*new)?.parent = Some(*parent);
        self.data_mut(*old)?.parent = None;
        self.ops.push(HostOp::Replace {
            parent: *parent,
            new: *new,
            old: *old,
        });
        Ok(())
    }

    fn remove(&mut self, parent: &MemNode, node: &MemNode) -> Result<()> {
        let index = self.position(*parent, *node)?;
        self.data_mut(*parent)?.children.remove(index);
        self.data_mut(*node)?.parent = None;
        self.ops.push(HostOp::Remove {
            parent: *parent,
            node: *node,
        });
        Ok(())
    }

    fn child_container(&mut self, node: &MemNode, isolate: bool) -> Result<MemNode> {
        if let Some(scope) = self.data(*node)?.scope {
            return Ok(scope);
        }
        if !isolate {
            return Ok(*node);
        }
        let scope = self.alloc("#scope", false);
        self.data_mut(*node)?.scope = Some(scope);
        self.ops.push(HostOp::Isolate {
            node: *node,
            container: scope,
        });
        Ok(scope)
    }

    fn children(&self, container: &MemNode) -> Vec<MemNode> {
        self.child_nodes(*container).to_vec()
    }

    fn set_text(&mut self, node: &MemNode, text: &str) -> Result<()> {
        let data = self.data_mut(*node)?;
        if !data.tag.is_empty() {
            return Err(Error::host(format!("{node:?} is not a text node")));
        }
        data.text = text.to_string();
        self.ops.push(HostOp::SetText {
            node: *node,
            text: text.to_string(),
        });
        Ok(())
    }

    fn has_property(&self, node: &MemNode, name: &str) -> bool {
        self.get(*node)
            .map(|d| !d.tag.is_empty() && !d.svg && NATIVE_PROPERTIES.contains(&name))
            .unwrap_or(false)
    }

    fn set_property(&mut self, node: &MemNode, name: &str, value: &PropValue) -> Result<()> {
        self.data_mut(*node)?
            .properties
            .insert(name.to_string(), value.clone());
        self.ops.push(HostOp::SetProperty {
            node: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn set_attribute(&mut self, node: &MemNode, name: &str, value: &str, namespaced: bool) -> Result<()> {
        let data = self.data_mut(*node)?;
        data.attrs.insert(name.to_string(), value.to_string());
        if namespaced && !data.namespaced.iter().any(|n| n == name) {
            data.namespaced.push(name.to_string());
        }
        self.ops.push(HostOp::SetAttribute {
            node: *node,
            name: name.to_string(),
            value: value.to_string(),
            namespaced,
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: &MemNode, name: &str, _namespaced: bool) -> Result<()> {
        let data = self.data_mut(*node)?;
        data.attrs.shift_remove(name);
        data.properties.shift_remove(name);
        data.namespaced.retain(|n| n != name);
        if name == "style" {
            data.style.clear();
        }
        self.ops.push(HostOp::RemoveAttribute {
            node: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn set_style(&mut self, node: &MemNode, name: &str, value: Option<&str>) -> Result<()> {
        let data = self.data_mut(*node)?;
        match value {
            Some(value) => {
                data.style.insert(name.to_string(), value.to_string());
            }
            None => {
                data.style.shift_remove(name);
            }
        }
        self.ops.push(HostOp::SetStyle {
            node: *node,
            name: name.to_string(),
            value: value.map(str::to_string),
        });
        Ok(())
    }

    fn set_style_text(&mut self, node: &MemNode, css: &str) -> Result<()> {
        let data = self.data_mut(*node)?;
        data.style.clear();
        for declaration in css.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    data.style.insert(name.to_string(), value.trim().to_string());
                }
            }
        }
        self.ops.push(HostOp::SetStyleText {
            node: *node,
            css: css.to_string(),
        });
        Ok(())
    }

    fn add_listener(&mut self, node: &MemNode, event: &str, listener: Listener) -> Result<()> {
        self.data_mut(*node)?
            .listeners
            .insert(event.to_string(), listener);
        self.ops.push(HostOp::AddListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(&mut self, node: &MemNode, event: &str) -> Result<()> {
        self.data_mut(*node)?.listeners.shift_remove(event);
        self.ops.push(HostOp::RemoveListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }
}
