//! Node types: NodeId, NodeData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use super::style::Style;

new_key_type! {
    /// Unique identifier for a surface node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Tag used for text leaves.
pub const TEXT_TAG: &str = "#text";

/// Data associated with a single surface node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Element tag (e.g. "div", "span", "button"), or [`TEXT_TAG`] for text leaves.
    pub tag: String,
    /// Own text. Always set for text leaves; set on elements by `set_text_content`.
    pub text: Option<String>,
    /// Inline style declarations.
    pub style: Style,
    /// Element attributes and properties (`id`, `placeholder`, `value`, ...).
    pub attributes: BTreeMap<String, String>,
    /// Whether a widget owns this node. Owned nodes are detached, never
    /// destroyed, when their parent is cleared; the owning widget reclaims them.
    pub owned: bool,
}

impl NodeData {
    /// Create an element with the given tag and no content.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            style: Style::new(),
            attributes: BTreeMap::new(),
            owned: false,
        }
    }

    /// Create a text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::element(TEXT_TAG)
        }
    }

    /// Set the `id` attribute (builder).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a style declaration (builder).
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.set(property, value);
        self
    }

    /// Mark the node as widget-owned (builder).
    pub fn owned(mut self, owned: bool) -> Self {
        self.owned = owned;
        self
    }

    /// Whether this is a text leaf.
    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Look up an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
