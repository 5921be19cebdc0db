//! Error types shared by the reconciler and the hooks runtime.

use crate::vdom::Key;

/// Errors produced while building virtual nodes, rendering, or running hooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two siblings resolved to the same effective key.
    #[error("duplicate key `{0}` among siblings")]
    DuplicateKey(Key),

    /// A hook was called outside of a component render.
    #[error("hooks require an active component render")]
    NoActiveRender,

    /// A hook slot was read back with a different type than it was created
    /// with. This happens when hooks are called conditionally.
    #[error("hook slot {index} does not hold a `{expected}`; hook call order changed between renders")]
    HookMismatch {
        index: usize,
        expected: &'static str,
    },

    /// A component instance was asked to render while already rendering.
    #[error("component `{0}` is already rendering")]
    ReentrantRender(String),

    /// The host adapter rejected an operation.
    #[error("host adapter error: {0}")]
    Host(String),

    /// The options document could not be parsed.
    #[error("invalid options document: {0}")]
    Options(#[from] serde_json::Error),

    /// An option value was well-formed but unusable.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl Error {
    /// Shorthand for host adapter failures.
    pub fn host(message: impl Into<String>) -> Self {
        Error::Host(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
