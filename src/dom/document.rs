//! Document: the shared handle to the surface and its scheduler.
//!
//! Widgets, listeners and scheduled callbacks all hold a [`Document`] (or a
//! [`WeakDocument`] when they must not keep it alive). Interior borrows are
//! short: no user callback ever runs while the surface or the scheduler is
//! borrowed.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use super::node::NodeId;
use super::tree::Dom;
use crate::event::{EventDispatcher, EventType, Handler, ListenerId};
use crate::schedule::Scheduler;

struct DocumentInner {
    dom: RefCell<Dom>,
    scheduler: RefCell<Scheduler>,
}

/// Reference-counted handle to a surface.
#[derive(Clone)]
pub struct Document(Rc<DocumentInner>);

/// Non-owning counterpart of [`Document`].
#[derive(Clone, Default)]
pub struct WeakDocument(Weak<DocumentInner>);

impl Document {
    /// A fresh surface containing only `body`, with the clock at zero.
    pub fn new() -> Self {
        Self(Rc::new(DocumentInner {
            dom: RefCell::new(Dom::new()),
            scheduler: RefCell::new(Scheduler::default()),
        }))
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument(Rc::downgrade(&self.0))
    }

    /// Whether two handles refer to the same surface.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Borrow the surface.
    ///
    /// # Panics
    ///
    /// Panics if the surface is mutably borrowed. Do not hold the guard
    /// across widget builds or event dispatch.
    pub fn dom(&self) -> Ref<'_, Dom> {
        self.0.dom.borrow()
    }

    /// Mutably borrow the surface. Same rules as [`dom`](Self::dom).
    pub fn dom_mut(&self) -> RefMut<'_, Dom> {
        self.0.dom.borrow_mut()
    }

    /// Mutable borrow that yields `None` while the surface is in use.
    pub(crate) fn try_dom_mut(&self) -> Option<RefMut<'_, Dom>> {
        self.0.dom.try_borrow_mut().ok()
    }

    pub(crate) fn scheduler(&self) -> RefMut<'_, Scheduler> {
        self.0.scheduler.borrow_mut()
    }

    pub(crate) fn try_scheduler(&self) -> Option<RefMut<'_, Scheduler>> {
        self.0.scheduler.try_borrow_mut().ok()
    }

    /// The permanent root node.
    pub fn body(&self) -> NodeId {
        self.dom().body()
    }

    /// Concatenated text under `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        self.dom().text_content(node)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Attach a listener to `node`.
    pub fn add_listener(&self, node: NodeId, kind: EventType, handler: Handler) -> ListenerId {
        self.dom_mut().listeners.add(node, kind, handler, false)
    }

    /// Attach a listener that removes itself before its first call.
    pub fn add_listener_once(&self, node: NodeId, kind: EventType, handler: Handler) -> ListenerId {
        self.dom_mut().listeners.add(node, kind, handler, true)
    }

    /// Detach a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.dom_mut().listeners.remove(id)
    }

    /// Dispatch an event on `target`; it bubbles up to `body`.
    ///
    /// Returns `true` if any listener ran.
    pub fn dispatch(&self, target: NodeId, kind: EventType, detail: Option<String>) -> bool {
        EventDispatcher::dispatch(self, target, kind, detail)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.0.dom.try_borrow().map(|d| d.len()).ok())
            .finish_non_exhaustive()
    }
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.0.upgrade().map(Document)
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakDocument")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_body() {
        let doc = Document::new();
        let body = doc.body();
        assert_eq!(doc.dom().get(body).unwrap().tag, "body");
    }

    #[test]
    fn clones_share_surface() {
        let doc = Document::new();
        let other = doc.clone();
        let node = doc.dom_mut().create_element("div");
        assert!(other.dom().contains(node));
        assert!(doc.ptr_eq(&other));
        assert!(!doc.ptr_eq(&Document::new()));
    }

    #[test]
    fn weak_handle_does_not_keep_alive() {
        let doc = Document::new();
        let weak = doc.downgrade();
        assert!(weak.upgrade().is_some());
        drop(doc);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn try_dom_mut_fails_while_borrowed() {
        let doc = Document::new();
        let _guard = doc.dom();
        assert!(doc.try_dom_mut().is_none());
    }

    #[test]
    fn remove_listener_roundtrip() {
        let doc = Document::new();
        let body = doc.body();
        let id = doc.add_listener(body, EventType::Click, std::rc::Rc::new(|_| {}));
        assert_eq!(doc.dom().listener_count(body), 1);
        assert!(doc.remove_listener(id));
        assert_eq!(doc.dom().listener_count(body), 0);
    }
}
