//! Visual node binding: one surface node per widget instance.
//!
//! An [`Element`] owns a lazily created node, the declarative [`Props`]
//! applied to it (style, attributes, listeners), a back-reference to the
//! parent widget, and the child widgets constructed during the last build.
//! Dropping the element reclaims its node.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dom::document::{Document, WeakDocument};
use crate::dom::node::{NodeData, NodeId};
use crate::dom::style::Style;
use crate::event::{Event, EventType, Handler, ListenerId};
use crate::widget::traits::{Widget, WidgetRef};

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// Declarative properties applied to a widget's node when it is realized.
#[derive(Clone, Default)]
pub struct Props {
    pub style: Style,
    pub attributes: BTreeMap<String, String>,
    listeners: Vec<(EventType, Handler)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one style declaration (builder).
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.set(property, value);
        self
    }

    /// Overlay a whole style map (builder).
    pub fn with_styles(mut self, style: &Style) -> Self {
        self.style.merge(style);
        self
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `id` attribute (builder).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Subscribe to an event on the node (builder).
    pub fn on(mut self, kind: EventType, handler: impl Fn(&mut Event) + 'static) -> Self {
        self.listeners.push((kind, Rc::new(handler)));
        self
    }

    /// Number of event subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("style", &self.style)
            .field("attributes", &self.attributes)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// The binding between a widget and its surface node.
pub struct Element {
    tag: String,
    props: RefCell<Props>,
    node: Cell<Option<NodeId>>,
    document: RefCell<Option<WeakDocument>>,
    parent: RefCell<Option<Weak<dyn Widget>>>,
    children: RefCell<Vec<WidgetRef>>,
    prop_listeners: RefCell<Vec<ListenerId>>,
    build_listeners: RefCell<Vec<ListenerId>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_props(tag, Props::default())
    }

    pub fn with_props(tag: impl Into<String>, props: Props) -> Self {
        Self {
            tag: tag.into(),
            props: RefCell::new(props),
            node: Cell::new(None),
            document: RefCell::new(None),
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            prop_listeners: RefCell::new(Vec::new()),
            build_listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The node, creating it in `document` on first use.
    ///
    /// The node is widget-owned: clearing its parent detaches it instead of
    /// destroying it, so the same node survives every rebuild.
    pub fn node(&self, document: &Document) -> NodeId {
        if let Some(id) = self.node.get() {
            if document.dom().contains(id) {
                return id;
            }
        }

        let id = {
            let props = self.props.borrow();
            let mut dom = document.dom_mut();
            let id = dom.insert(NodeData::element(self.tag.as_str()).owned(true));
            dom.merge_style(id, &props.style);
            for (name, value) in &props.attributes {
                dom.set_attribute(id, name, value.as_str());
            }
            id
        };
        self.node.set(Some(id));
        *self.document.borrow_mut() = Some(document.downgrade());
        self.bind_prop_listeners(document, id);
        id
    }

    /// The node, if it has been realized.
    pub fn node_id(&self) -> Option<NodeId> {
        self.node.get()
    }

    /// The document the node lives in, while it is alive.
    pub fn document(&self) -> Option<Document> {
        self.document.borrow().as_ref().and_then(WeakDocument::upgrade)
    }

    pub fn props(&self) -> Props {
        self.props.borrow().clone()
    }

    /// Replace the props. A realized node is updated in place.
    pub fn set_props(&self, props: Props) {
        *self.props.borrow_mut() = props;
        let (Some(id), Some(document)) = (self.node.get(), self.document()) else {
            return;
        };
        {
            let props = self.props.borrow();
            let mut dom = document.dom_mut();
            if let Some(data) = dom.get_mut(id) {
                data.style = props.style.clone();
                data.attributes = props.attributes.clone();
            }
        }
        for listener in self.prop_listeners.take() {
            document.remove_listener(listener);
        }
        self.bind_prop_listeners(&document, id);
    }

    /// Overlay style declarations onto the props and the realized node.
    pub fn merge_style(&self, style: &Style) {
        self.props.borrow_mut().style.merge(style);
        if let (Some(id), Some(document)) = (self.node.get(), self.document()) {
            document.dom_mut().merge_style(id, style);
        }
    }

    /// Set one style declaration on the props and the realized node.
    pub fn set_style(&self, property: &str, value: impl Into<String>) {
        let value = value.into();
        self.props.borrow_mut().style.set(property, value.clone());
        if let (Some(id), Some(document)) = (self.node.get(), self.document()) {
            document.dom_mut().set_style(id, property, value);
        }
    }

    /// Start a rebuild: empty the node, forget last build's children and
    /// drop the listeners bound during it. Returns the (same) node.
    pub fn reset(&self, document: &Document) -> NodeId {
        let node = self.node(document);
        document.dom_mut().clear_children(node);
        for listener in self.build_listeners.take() {
            document.remove_listener(listener);
        }
        let previous = self.children.take();
        drop(previous);
        node
    }

    /// Record a child widget built under this one. Recorded children live
    /// until the next [`reset`](Self::reset).
    pub fn adopt(&self, child: WidgetRef) {
        self.children.borrow_mut().push(child);
    }

    pub fn children(&self) -> Vec<WidgetRef> {
        self.children.borrow().clone()
    }

    /// Subscribe to an event for the lifetime of the current build.
    pub fn listen(
        &self,
        document: &Document,
        kind: EventType,
        handler: impl Fn(&mut Event) + 'static,
    ) -> ListenerId {
        let node = self.node(document);
        let id = document.add_listener(node, kind, Rc::new(handler));
        self.build_listeners.borrow_mut().push(id);
        id
    }

    pub fn parent(&self) -> Option<WidgetRef> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn set_parent(&self, parent: &WidgetRef) {
        *self.parent.borrow_mut() = Some(Rc::downgrade(parent));
    }

    fn bind_prop_listeners(&self, document: &Document, node: NodeId) {
        let listeners = self.props.borrow().listeners.clone();
        let mut ids = self.prop_listeners.borrow_mut();
        for (kind, handler) in listeners {
            ids.push(document.add_listener(node, kind, handler));
        }
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        if let (Some(node), Some(document)) = (self.node.get(), self.document()) {
            document.reclaim(node);
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("node", &self.node.get())
            .field("children", &self.children.borrow().len())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::traits::WidgetExt;
    use crate::widgets::text::Text;

    #[test]
    fn node_is_lazy_and_stable() {
        let doc = Document::new();
        let el = Element::new("div");
        assert!(el.node_id().is_none());
        let first = el.node(&doc);
        let second = el.node(&doc);
        assert_eq!(first, second);
        assert!(doc.dom().get(first).unwrap().owned);
    }

    #[test]
    fn props_applied_on_realize() {
        let doc = Document::new();
        let el = Element::with_props(
            "input",
            Props::new()
                .with_style("padding", "12px")
                .with_attribute("placeholder", "Room name")
                .with_id("room"),
        );
        let node = el.node(&doc);
        let dom = doc.dom();
        assert_eq!(dom.style(node, "padding"), Some("12px"));
        assert_eq!(dom.attribute(node, "placeholder"), Some("Room name"));
        assert_eq!(dom.attribute(node, "id"), Some("room"));
    }

    #[test]
    fn prop_listeners_bound_once() {
        let doc = Document::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let el = Element::with_props(
            "button",
            Props::new().on(EventType::Click, move |_| h.set(h.get() + 1)),
        );
        let node = el.node(&doc);
        el.node(&doc);
        doc.dispatch(node, EventType::Click, None);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn set_props_rebinds() {
        let doc = Document::new();
        let el = Element::with_props("div", Props::new().with_style("color", "red"));
        let node = el.node(&doc);
        el.set_props(Props::new().with_style("color", "blue").on(EventType::Click, |_| {}));
        assert_eq!(doc.dom().style(node, "color"), Some("blue"));
        assert_eq!(doc.dom().listener_count(node), 1);
    }

    #[test]
    fn merge_style_updates_node() {
        let doc = Document::new();
        let el = Element::new("div");
        let node = el.node(&doc);
        el.merge_style(&Style::new().with("opacity", "0"));
        el.set_style("transform", "translateY(100%)");
        assert_eq!(doc.dom().style(node, "opacity"), Some("0"));
        assert_eq!(doc.dom().style(node, "transform"), Some("translateY(100%)"));
        assert_eq!(el.props().style.get("opacity"), Some("0"));
    }

    #[test]
    fn reset_clears_children_and_build_listeners() {
        let doc = Document::new();
        let el = Element::new("div");
        let node = el.node(&doc);
        let text = doc.dom_mut().create_text("stale");
        doc.dom_mut().append_child(node, text).unwrap();
        el.listen(&doc, EventType::Click, |_| {});
        el.adopt(Text::new("child").into_ref());

        assert_eq!(el.reset(&doc), node);
        assert!(doc.dom().children(node).is_empty());
        assert!(!doc.dom().contains(text));
        assert_eq!(doc.dom().listener_count(node), 0);
        assert!(el.children().is_empty());
    }

    #[test]
    fn drop_reclaims_node() {
        let doc = Document::new();
        let node = {
            let el = Element::new("div");
            el.node(&doc)
        };
        assert!(!doc.dom().contains(node));
    }

    #[test]
    fn drop_while_surface_borrowed_defers() {
        let doc = Document::new();
        let el = Element::new("div");
        let node = el.node(&doc);
        {
            let _guard = doc.dom();
            drop(el);
        }
        assert!(doc.dom().contains(node));
        doc.run_idle();
        assert!(!doc.dom().contains(node));
    }
}
