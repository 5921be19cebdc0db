//! Property reconciliation.
//!
//! Walks the union of the previous and next attribute names and writes the
//! difference to the host:
//!
//! - callables become event listeners. One forwarding listener is installed
//!   per event name and the handler behind it is swapped on later renders,
//!   so the host never sees a listener churn.
//! - `style` accepts either a map (diffed entry by entry) or a declaration
//!   string (replaced wholesale).
//! - names the host exposes as native properties are set as properties,
//!   except inside SVG subtrees.
//! - everything else is written as an attribute; absent and null values
//!   remove it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use super::Renderer;
use crate::error::Result;
use crate::host::HostAdapter;
use crate::vdom::{Event, Handler, PropValue, Props};

type Listeners = HashMap<String, Rc<RefCell<Handler>>>;

impl<H: HostAdapter> Renderer<H> {
    pub(super) fn reconcile_props(&mut self, node: &H::Node, prev: &Props, next: &Props, svg: bool) -> Result<()> {
        let Self { host, table, .. } = self;
        let listeners = &mut table.state_mut(node).listeners;

        let names: IndexSet<&str> = prev.attrs().chain(next.attrs()).map(|(name, _)| name).collect();
        for name in names {
            let old = prev.get(name).filter(|value| !value.is_null());
            let new = next.get(name).filter(|value| !value.is_null());
            if old == new {
                continue;
            }

            if let Some(handler) = new.and_then(PropValue::as_handler) {
                bind(host, listeners, node, name, handler)?;
                continue;
            }
            if old.is_some_and(PropValue::is_handler) {
                unbind(host, listeners, node, name)?;
                if new.is_none() {
                    continue;
                }
            }

            match new {
                Some(value) if name == "style" => set_style(host, node, old, value)?,
                Some(value) => set_value(host, node, name, value, svg)?,
                None if name == "style" => host.set_style_text(node, "")?,
                None => host.remove_attribute(node, name, svg)?,
            }
        }
        Ok(())
    }
}

fn bind<H: HostAdapter>(
    host: &mut H,
    listeners: &mut Listeners,
    node: &H::Node,
    event: &str,
    handler: &Handler,
) -> Result<()> {
    if let Some(cell) = listeners.get(event) {
        *cell.borrow_mut() = handler.clone();
        return Ok(());
    }

    let cell = Rc::new(RefCell::new(handler.clone()));
    let forward = cell.clone();
    host.add_listener(
        node,
        event,
        Rc::new(move |e: &Event| {
            let handler = forward.borrow().clone();
            handler.call(e);
        }),
    )?;
    listeners.insert(event.to_string(), cell);
    tracing::trace!(event, "listener bound");
    Ok(())
}

fn unbind<H: HostAdapter>(host: &mut H, listeners: &mut Listeners, node: &H::Node, event: &str) -> Result<()> {
    if listeners.remove(event).is_some() {
        host.remove_listener(node, event)?;
        tracing::trace!(event, "listener unbound");
    }
    Ok(())
}

fn set_value<H: HostAdapter>(host: &mut H, node: &H::Node, name: &str, value: &PropValue, svg: bool) -> Result<()> {
    if !svg && host.has_property(node, name) {
        return host.set_property(node, name, value);
    }
    match value.to_attr_string() {
        Some(text) => host.set_attribute(node, name, &text, svg),
        None => host.remove_attribute(node, name, svg),
    }
}

fn set_style<H: HostAdapter>(host: &mut H, node: &H::Node, old: Option<&PropValue>, value: &PropValue) -> Result<()> {
    let Some(next) = value.as_map() else {
        return host.set_style_text(node, &value.to_attr_string().unwrap_or_default());
    };

    let empty = IndexMap::new();
    let prev = match old {
        Some(PropValue::Map(prev)) => &**prev,
        // Switching from a declaration string: start over.
        Some(_) => {
            host.set_style_text(node, "")?;
            &empty
        }
        None => &empty,
    };

    for (name, value) in next.iter() {
        if prev.get(name) != Some(value) {
            host.set_style(node, name, value.to_attr_string().as_deref())?;
        }
    }
    for name in prev.keys().filter(|name| !next.contains_key(*name)) {
        host.set_style(node, name, None)?;
    }
    Ok(())
}
