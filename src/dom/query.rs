//! Surface queries: by id, tag, attribute, text; generic predicate matching.
//!
//! Queries only see nodes attached under `body` and return them in tree order.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// Find the first attached node whose `id` attribute matches.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.iter_attached()
            .find(|(_, data)| data.id() == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// Find all attached elements with the given tag.
    pub fn query_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.query_all(|data| data.tag == tag)
    }

    /// Find all attached nodes carrying `name=value`.
    pub fn query_by_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.query_all(|data| data.attribute(name) == Some(value))
    }

    /// Find the first attached node whose own text equals `text` exactly.
    ///
    /// For a text leaf this returns the leaf's parent element, which is what a
    /// user would click on.
    pub fn query_by_text(&self, text: &str) -> Option<NodeId> {
        let (id, data) = self
            .iter_attached()
            .find(|(_, data)| data.text.as_deref() == Some(text))?;
        if data.is_text() {
            self.parent(id).or(Some(id))
        } else {
            Some(id)
        }
    }

    /// Find all attached nodes matching an arbitrary predicate.
    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.iter_attached()
            .filter(|(_, data)| predicate(data))
            .map(|(node_id, _)| node_id)
            .collect()
    }

    /// Iterate over `(NodeId, &NodeData)` pairs under `body`, pre-order.
    fn iter_attached(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.walk_depth_first(self.body())
            .into_iter()
            .filter_map(move |id| self.nodes.get(id).map(|data| (id, data)))
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;

    /// Build a test tree for queries:
    /// ```text
    ///            body
    ///             |
    ///        div #root
    ///        /        \
    ///  nav #sidebar    main #main
    ///     /   \
    ///  button  button
    ///  #save   #cancel
    ///  "Save"  "Cancel"
    /// ```
    fn build_query_tree() -> Dom {
        let mut dom = Dom::new();
        let body = dom.body();
        let root = dom.insert_child(body, NodeData::element("div").with_id("root")).unwrap();
        let a = dom
            .insert_child(root, NodeData::element("nav").with_id("sidebar"))
            .unwrap();
        dom.insert_child(
            root,
            NodeData::element("main")
                .with_id("main")
                .with_attribute("role", "content"),
        )
        .unwrap();
        let save = dom
            .insert_child(
                a,
                NodeData::element("button")
                    .with_id("save")
                    .with_attribute("role", "action"),
            )
            .unwrap();
        dom.insert_child(save, NodeData::text("Save")).unwrap();
        let cancel = dom
            .insert_child(
                a,
                NodeData::element("button")
                    .with_id("cancel")
                    .with_attribute("role", "action"),
            )
            .unwrap();
        dom.insert_child(cancel, NodeData::text("Cancel")).unwrap();
        dom
    }

    #[test]
    fn query_by_id_found() {
        let dom = build_query_tree();
        let id = dom.query_by_id("sidebar");
        assert!(id.is_some());
        assert_eq!(dom.get(id.unwrap()).unwrap().tag, "nav");
    }

    #[test]
    fn query_by_id_not_found() {
        let dom = build_query_tree();
        assert!(dom.query_by_id("nonexistent").is_none());
    }

    #[test]
    fn query_ignores_detached() {
        let mut dom = build_query_tree();
        dom.insert(NodeData::element("div").with_id("floating"));
        assert!(dom.query_by_id("floating").is_none());
    }

    #[test]
    fn query_by_tag_in_tree_order() {
        let dom = build_query_tree();
        let buttons = dom.query_by_tag("button");
        assert_eq!(buttons.len(), 2);
        assert_eq!(dom.get(buttons[0]).unwrap().id(), Some("save"));
        assert_eq!(dom.get(buttons[1]).unwrap().id(), Some("cancel"));
    }

    #[test]
    fn query_by_attribute() {
        let dom = build_query_tree();
        assert_eq!(dom.query_by_attribute("role", "action").len(), 2);
        assert_eq!(dom.query_by_attribute("role", "content").len(), 1);
        assert!(dom.query_by_attribute("role", "missing").is_empty());
    }

    #[test]
    fn query_by_text_returns_element() {
        let dom = build_query_tree();
        let id = dom.query_by_text("Cancel").unwrap();
        assert_eq!(dom.get(id).unwrap().id(), Some("cancel"));
        assert!(dom.query_by_text("Delete").is_none());
    }

    #[test]
    fn query_all_predicate() {
        let dom = build_query_tree();
        let with_ids = dom.query_all(|d| d.id().is_some());
        assert_eq!(with_ids.len(), 5);
    }
}
