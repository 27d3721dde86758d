//! Crate error type.
//!
//! Only structural problems surface as [`Error`]: a lookup for an ancestor that
//! is not in scope, or an operation on a widget whose context no longer exists.
//! Failed asynchronous values are never errors here; they become a
//! [`Snapshot`](crate::widgets::promise::Snapshot) carrying the error instead.

use crate::dom::NodeId;

/// Errors raised by the widget layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An `of(context)` lookup found no ancestor of the requested kind.
    #[error("no {kind} found in context")]
    MissingAncestor { kind: &'static str },

    /// A widget needed its cached build context before it was built, or after
    /// it was disposed.
    #[error("{widget} context is not available before build")]
    ContextUnavailable { widget: &'static str },

    /// A surface operation referenced a node that is no longer in the arena.
    #[error("node {0:?} does not exist in the document")]
    NodeNotFound(NodeId),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
