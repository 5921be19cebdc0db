//! Context Overlays
//!
//! A [`Context`] is a plain key/value map threaded down the tree during
//! reconciliation. Any node may carry a partial overlay in its `context`
//! entry; the reconciler merges that overlay on top of the inherited map for
//! the node's subtree only. Parents never observe their descendants'
//! overlays.
//!
//! The map is reference counted, so passing it down an unchanged subtree is a
//! pointer copy. Merging allocates a new map only when both sides are
//! non-empty.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::props::PropValue;

/// Immutable key/value context map.
#[derive(Clone, Default, PartialEq)]
pub struct Context(Rc<IndexMap<String, PropValue>>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Copies the map only if it is shared.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `overlay` on top of `self`. Entries in `overlay` win.
    pub fn overlay(&self, overlay: &Context) -> Context {
        if overlay.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return overlay.clone();
        }

        let mut merged = (*self.0).clone();
        for (key, value) in overlay.0.iter() {
            merged.insert(key.clone(), value.clone());
        }
        Context(Rc::new(merged))
    }

    /// Whether two handles share the same underlying map.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context(Rc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}

impl From<IndexMap<String, PropValue>> for Context {
    fn from(map: IndexMap<String, PropValue>) -> Self {
        Context(Rc::new(map))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}
