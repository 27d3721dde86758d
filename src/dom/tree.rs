//! Tree operations: insert, append, detach, clear, replace, discard, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};
use super::style::Style;
use crate::error::{Error, Result};
use crate::event::listener::ListenerRegistry;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The visual surface: a slotmap arena of nodes rooted at `body`.
///
/// Parent/child relationships live in secondary maps so lookup is O(1) and
/// detaching is O(siblings). Nodes may exist detached from the tree; widgets
/// keep their node across rebuilds and re-append it each time.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    body: NodeId,
    pub(crate) listeners: ListenerRegistry,
}

impl Dom {
    /// Create a surface containing only the `body` node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(NodeData::element("body").owned(true));
        let mut children = SecondaryMap::new();
        children.insert(body, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            body,
            listeners: ListenerRegistry::default(),
        }
    }

    /// The permanent root node.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Insert a detached node.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(NodeData::element(tag))
    }

    /// Insert a detached text leaf.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(NodeData::text(text))
    }

    /// Insert a node as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let id = self.insert(data);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(Error::NodeNotFound(child));
        }
        if parent == child || self.ancestors(parent).contains(&child) {
            tracing::warn!(?parent, ?child, "refusing to append a node into its own subtree");
            return Ok(());
        }

        self.detach(child);
        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(child);
        }
        Ok(())
    }

    /// Remove `id` from its parent's child list. The node and its subtree stay
    /// in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }
    }

    /// Empty a node: owned children are detached, everything else is discarded.
    pub fn clear_children(&mut self, id: NodeId) {
        let kids = self
            .children
            .get_mut(id)
            .map(std::mem::take)
            .unwrap_or_default();
        for child in kids {
            self.parent.remove(child);
            let owned = self.nodes.get(child).is_some_and(|d| d.owned);
            if !owned {
                self.discard(child);
            }
        }
    }

    /// Put `new` where `old` sits in its parent. `old` ends up detached.
    ///
    /// A detached `old` leaves `new` untouched.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if !self.nodes.contains_key(old) {
            return Err(Error::NodeNotFound(old));
        }
        if !self.nodes.contains_key(new) {
            return Err(Error::NodeNotFound(new));
        }
        let Some(parent_id) = self.parent.get(old).copied() else {
            return Ok(());
        };

        self.detach(new);
        if let Some(siblings) = self.children.get_mut(parent_id) {
            if let Some(pos) = siblings.iter().position(|&c| c == old) {
                siblings[pos] = new;
            }
        }
        self.parent.remove(old);
        self.parent.insert(new, parent_id);
        Ok(())
    }

    /// Destroy a node. Unowned descendants are destroyed with it; owned
    /// descendants are detached and left for their widgets.
    ///
    /// Returns `false` if the node did not exist. The body is never discarded.
    pub fn discard(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        if id == self.body {
            tracing::warn!("refusing to discard the document body");
            return false;
        }

        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for child in self.children.remove(current).unwrap_or_default() {
                self.parent.remove(child);
                let owned = self.nodes.get(child).is_some_and(|d| d.owned);
                if !owned {
                    stack.push(child);
                }
            }
            self.parent.remove(current);
            self.listeners.remove_node(current);
            self.nodes.remove(current);
        }
        true
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the topmost ancestor.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether the node is connected to the body.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.body || self.ancestors(id).last() == Some(&self.body)
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the arena, the body included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the body is the only node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether the arena contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Set one style declaration. No-op on a missing node.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.style.set(property, value);
        }
    }

    /// Overlay a style map onto the node's inline style.
    pub fn merge_style(&mut self, id: NodeId, style: &Style) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.style.merge(style);
        }
    }

    /// Read one style declaration.
    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|d| d.style.get(property))
    }

    /// Set an attribute. No-op on a missing node.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.attributes.insert(name.to_owned(), value.into());
        }
    }

    /// Read an attribute.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|d| d.attribute(name))
    }

    /// Replace the node's content with plain text.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.clear_children(id);
        if let Some(data) = self.nodes.get_mut(id) {
            data.text = Some(text.into());
        }
    }

    /// Concatenated text of the node and its descendants in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        self.walk_depth_first(id)
            .into_iter()
            .filter_map(|n| self.nodes.get(n).and_then(|d| d.text.as_deref()))
            .collect()
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            let kids = self.children(current);
            for &child in kids.iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Breadth-first traversal starting from `start`.
    pub fn walk_breadth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current) {
                queue.push_back(child);
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
