//! Surface arena: slotmap-backed node tree with style, listeners and queries.

pub mod document;
pub mod node;
pub mod query;
pub mod style;
pub mod tree;

pub use document::{Document, WeakDocument};
pub use node::{NodeData, NodeId, TEXT_TAG};
pub use style::Style;
pub use tree::Dom;
