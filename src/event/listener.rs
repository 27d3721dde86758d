//! Listener registry: handlers keyed by node and event type.

use std::rc::Rc;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use super::kind::{Event, EventType};
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

new_key_type! {
    /// Handle returned when a listener is added; used to remove it.
    pub struct ListenerId;
}

/// A shared event callback.
pub type Handler = Rc<dyn Fn(&mut Event)>;

struct Listener {
    node: NodeId,
    kind: EventType,
    handler: Handler,
    once: bool,
}

/// All listeners attached to surface nodes.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: SlotMap<ListenerId, Listener>,
    by_node: SecondaryMap<NodeId, Vec<ListenerId>>,
}

impl ListenerRegistry {
    /// Register a handler. `once` listeners are removed before their first call.
    pub fn add(&mut self, node: NodeId, kind: EventType, handler: Handler, once: bool) -> ListenerId {
        let id = self.listeners.insert(Listener {
            node,
            kind,
            handler,
            once,
        });
        match self.by_node.get_mut(node) {
            Some(ids) => ids.push(id),
            None => {
                self.by_node.insert(node, vec![id]);
            }
        }
        id
    }

    /// Remove one listener. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_node.get_mut(listener.node) {
            ids.retain(|&l| l != id);
        }
        true
    }

    /// Remove every listener attached to `node`.
    pub fn remove_node(&mut self, node: NodeId) {
        for id in self.by_node.remove(node).unwrap_or_default() {
            self.listeners.remove(id);
        }
    }

    /// Handlers on `node` for `kind`, in registration order. Matching `once`
    /// listeners are unregistered as they are taken.
    pub fn take_matching(&mut self, node: NodeId, kind: &EventType) -> Vec<Handler> {
        let ids: Vec<ListenerId> = match self.by_node.get(node) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };
        let mut handlers = Vec::new();
        for id in ids {
            let Some(listener) = self.listeners.get(id) else {
                continue;
            };
            if &listener.kind != kind {
                continue;
            }
            handlers.push(Rc::clone(&listener.handler));
            if listener.once {
                self.remove(id);
            }
        }
        handlers
    }

    /// Number of listeners attached to `node`.
    pub fn count_for(&self, node: NodeId) -> usize {
        self.by_node.get(node).map_or(0, Vec::len)
    }

    /// Total number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Dom {
    /// Number of listeners attached to `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.count_for(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn noop() -> Handler {
        Rc::new(|_: &mut Event| {})
    }

    #[test]
    fn add_and_count() {
        let mut dom = Dom::new();
        let node = dom.create_element("button");
        let mut reg = ListenerRegistry::default();
        reg.add(node, EventType::Click, noop(), false);
        reg.add(node, EventType::MouseEnter, noop(), false);
        assert_eq!(reg.count_for(node), 2);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn take_matching_filters_kind() {
        let mut dom = Dom::new();
        let node = dom.create_element("button");
        let mut reg = ListenerRegistry::default();
        reg.add(node, EventType::Click, noop(), false);
        reg.add(node, EventType::Input, noop(), false);
        assert_eq!(reg.take_matching(node, &EventType::Click).len(), 1);
        assert_eq!(reg.take_matching(node, &EventType::Blur).len(), 0);
        assert_eq!(reg.count_for(node), 2);
    }

    #[test]
    fn once_listener_removed_when_taken() {
        let mut dom = Dom::new();
        let node = dom.create_element("div");
        let mut reg = ListenerRegistry::default();
        reg.add(node, EventType::TransitionEnd, noop(), true);
        assert_eq!(reg.take_matching(node, &EventType::TransitionEnd).len(), 1);
        assert!(reg.take_matching(node, &EventType::TransitionEnd).is_empty());
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_and_remove_node() {
        let mut dom = Dom::new();
        let node = dom.create_element("div");
        let mut reg = ListenerRegistry::default();
        let first = reg.add(node, EventType::Click, noop(), false);
        reg.add(node, EventType::Click, noop(), false);
        assert!(reg.remove(first));
        assert!(!reg.remove(first));
        assert_eq!(reg.count_for(node), 1);
        reg.remove_node(node);
        assert_eq!(reg.count_for(node), 0);
        assert!(reg.is_empty());
    }

    #[test]
    fn handlers_are_shared() {
        let mut dom = Dom::new();
        let node = dom.create_element("div");
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let mut reg = ListenerRegistry::default();
        reg.add(node, EventType::Click, Rc::new(move |_| h.set(h.get() + 1)), false);
        let doc = crate::dom::document::Document::new();
        for handler in reg.take_matching(node, &EventType::Click) {
            handler(&mut Event::new(doc.clone(), EventType::Click, node, None));
        }
        assert_eq!(hits.get(), 1);
    }
}
