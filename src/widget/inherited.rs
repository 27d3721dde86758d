//! Inherited widgets: publish data to descendants and rebuild dependents.
//!
//! A descendant becomes a dependent by looking the publisher up through
//! [`inherited_of`] during its build. Dependents are held weakly; a dropped
//! dependent is logged and skipped when the publisher notifies.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::context::{BuildContext, WeakBuildContext};
use super::traits::{rebuild, StateHost, Widget, WidgetRef};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Dependent
// ---------------------------------------------------------------------------

/// A registered dependent, tagged by how it rebuilds.
#[derive(Clone)]
pub enum Dependent {
    /// Rebuilt through its state-mutation entry point.
    Stateful(Weak<dyn StateHost>),
    /// Rebuilt by re-running its build and splicing the result in place.
    Plain(Weak<dyn Widget>),
}

impl Dependent {
    fn for_widget(widget: &WidgetRef) -> Self {
        match widget.state_host() {
            Some(host) => Dependent::Stateful(host),
            None => Dependent::Plain(Rc::downgrade(widget)),
        }
    }

    /// Allocation address, used to keep the set free of duplicates.
    fn key(&self) -> *const () {
        match self {
            Dependent::Stateful(w) => w.as_ptr() as *const (),
            Dependent::Plain(w) => w.as_ptr() as *const (),
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            Dependent::Stateful(w) => w.strong_count() > 0,
            Dependent::Plain(w) => w.strong_count() > 0,
        }
    }
}

// ---------------------------------------------------------------------------
// InheritedState
// ---------------------------------------------------------------------------

/// Dependent set and cached context shared by every inherited widget.
pub struct InheritedState {
    kind: &'static str,
    dependents: RefCell<Vec<Dependent>>,
    context: RefCell<Option<WeakBuildContext>>,
}

impl InheritedState {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            dependents: RefCell::new(Vec::new()),
            context: RefCell::new(None),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register `widget` unless it is already a dependent.
    pub fn add_dependent(&self, widget: &WidgetRef) {
        let dependent = Dependent::for_widget(widget);
        let mut dependents = self.dependents.borrow_mut();
        if dependents.iter().all(|d| d.key() != dependent.key()) {
            trace!(kind = self.kind, dependent = widget.widget_type(), "dependent registered");
            dependents.push(dependent);
        }
    }

    pub fn dependent_count(&self) -> usize {
        self.dependents.borrow().len()
    }

    pub fn is_dependent(&self, widget: &WidgetRef) -> bool {
        let key = Dependent::for_widget(widget).key();
        self.dependents.borrow().iter().any(|d| d.key() == key)
    }

    /// The context of the last build.
    pub fn context(&self) -> Result<BuildContext> {
        self.context
            .borrow()
            .as_ref()
            .and_then(WeakBuildContext::upgrade)
            .ok_or(Error::ContextUnavailable { widget: self.kind })
    }

    pub fn cache_context(&self, cx: &BuildContext) {
        *self.context.borrow_mut() = Some(cx.downgrade());
    }

    /// Record the new build context. On a rebuild, if `should_notify` agrees,
    /// dependents are rebuilt before the caller rebuilds its child subtree.
    pub fn begin_build(&self, cx: &BuildContext, should_notify: impl FnOnce() -> bool) {
        let had_previous = self.context.borrow().is_some();
        self.cache_context(cx);
        if had_previous && should_notify() {
            self.notify_dependents();
        }
    }

    /// Rebuild every dependent in registration order.
    ///
    /// Soft failures (no context yet, a dropped dependent, a failing rebuild)
    /// are logged and skipped.
    pub fn notify_dependents(&self) {
        let cx = match self.context() {
            Ok(cx) => cx,
            Err(_) => {
                warn!(kind = self.kind, "notify_dependents called without a build context");
                return;
            }
        };
        let document = cx.document().clone();
        let dependents = self.dependents.borrow().clone();
        trace!(kind = self.kind, count = dependents.len(), "notifying dependents");

        for dependent in dependents {
            let outcome = match &dependent {
                Dependent::Stateful(host) => match host.upgrade() {
                    Some(host) => host.mark_needs_build(),
                    None => {
                        warn!(kind = self.kind, "dependent was dropped; skipping");
                        continue;
                    }
                },
                Dependent::Plain(widget) => match widget.upgrade() {
                    Some(widget) => rebuild(&widget, &document),
                    None => {
                        warn!(kind = self.kind, "dependent was dropped; skipping");
                        continue;
                    }
                },
            };
            if let Err(err) = outcome {
                warn!(kind = self.kind, error = %err, "dependent rebuild failed");
            }
        }
    }

    /// Forget every dependent and the cached context.
    pub fn dispose(&self) {
        self.dependents.borrow_mut().clear();
        *self.context.borrow_mut() = None;
    }
}

// ---------------------------------------------------------------------------
// InheritedWidget
// ---------------------------------------------------------------------------

/// A widget that publishes data to its descendants.
pub trait InheritedWidget: Widget + Sized {
    /// Name used in "no X found in context" errors.
    const KIND: &'static str;

    fn inherited(&self) -> &InheritedState;

    /// Whether a rebuild of this widget should rebuild its dependents.
    fn update_should_notify(&self) -> bool {
        true
    }
}

/// Find the nearest `T` above `cx` and register the calling widget as one of
/// its dependents.
pub fn inherited_of<T: InheritedWidget>(cx: &BuildContext) -> Result<Rc<T>> {
    let found = cx
        .find_parent::<T>()
        .ok_or(Error::MissingAncestor { kind: T::KIND })?;
    found.inherited().add_dependent(cx.widget());
    Ok(found)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Element;
    use crate::dom::document::Document;
    use crate::dom::node::NodeId;
    use std::cell::Cell;

    struct Counter {
        element: Element,
        inherited: InheritedState,
        value: Cell<u32>,
        notify: Cell<bool>,
        child: RefCell<Option<WidgetRef>>,
    }

    impl Counter {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                element: Element::new("div"),
                inherited: InheritedState::new("Counter"),
                value: Cell::new(0),
                notify: Cell::new(true),
                child: RefCell::new(None),
            })
        }
    }

    impl Widget for Counter {
        fn widget_type(&self) -> &str {
            "Counter"
        }

        fn element(&self) -> &Element {
            &self.element
        }

        fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
            self.inherited.begin_build(cx, || self.update_should_notify());
            let node = self.element.reset(cx.document());
            if let Some(child) = self.child.borrow().clone() {
                cx.append_child(child)?;
            }
            Ok(Some(node))
        }
    }

    impl InheritedWidget for Counter {
        const KIND: &'static str = "Counter";

        fn inherited(&self) -> &InheritedState {
            &self.inherited
        }

        fn update_should_notify(&self) -> bool {
            self.notify.get()
        }
    }

    /// Reads the counter twice per build and records every value it saw.
    struct Reader {
        element: Element,
        seen: RefCell<Vec<u32>>,
    }

    impl Reader {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                element: Element::new("span"),
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    impl Widget for Reader {
        fn widget_type(&self) -> &str {
            "Reader"
        }

        fn element(&self) -> &Element {
            &self.element
        }

        fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
            let node = self.element.reset(cx.document());
            let counter = inherited_of::<Counter>(cx)?;
            let _again = inherited_of::<Counter>(cx)?;
            self.seen.borrow_mut().push(counter.value.get());
            cx.append_child(counter.value.get().to_string())?;
            Ok(Some(node))
        }
    }

    fn mount(counter: &Rc<Counter>, doc: &Document) -> BuildContext {
        let root: WidgetRef = counter.clone();
        let cx = BuildContext::new(root, doc.clone());
        counter.build(&cx).unwrap();
        cx
    }

    #[test]
    fn dependent_registered_once() {
        let doc = Document::new();
        let counter = Counter::new();
        let reader = Reader::new();
        *counter.child.borrow_mut() = Some(reader.clone());
        let _cx = mount(&counter, &doc);

        let reader_ref: WidgetRef = reader;
        assert_eq!(counter.inherited.dependent_count(), 1);
        assert!(counter.inherited.is_dependent(&reader_ref));
    }

    #[test]
    fn missing_ancestor_is_an_error() {
        let doc = Document::new();
        let reader: WidgetRef = Reader::new();
        let cx = BuildContext::new(reader.clone(), doc);
        let err = reader.build(&cx).unwrap_err();
        assert_eq!(err, Error::MissingAncestor { kind: "Counter" });
    }

    #[test]
    fn notify_rebuilds_dependents_in_place() {
        let doc = Document::new();
        let counter = Counter::new();
        let reader = Reader::new();
        *counter.child.borrow_mut() = Some(reader.clone());
        let _cx = mount(&counter, &doc);
        let node = reader.element.node_id().unwrap();

        counter.value.set(5);
        counter.inherited.notify_dependents();
        assert_eq!(*reader.seen.borrow(), vec![0, 5]);
        assert_eq!(reader.element.node_id(), Some(node));
        assert_eq!(doc.text_content(node), "5");
    }

    #[test]
    fn rebuild_notifies_before_children() {
        let doc = Document::new();
        let counter = Counter::new();
        let reader = Reader::new();
        *counter.child.borrow_mut() = Some(reader.clone());
        let cx = mount(&counter, &doc);

        counter.value.set(1);
        counter.build(&cx).unwrap();
        // Once from the notify, once from the child rebuild.
        assert_eq!(*reader.seen.borrow(), vec![0, 1, 1]);
    }

    #[test]
    fn rebuild_without_notify() {
        let doc = Document::new();
        let counter = Counter::new();
        let reader = Reader::new();
        *counter.child.borrow_mut() = Some(reader.clone());
        let cx = mount(&counter, &doc);

        counter.notify.set(false);
        counter.build(&cx).unwrap();
        assert_eq!(*reader.seen.borrow(), vec![0, 0]);
    }

    #[test]
    fn dropped_dependent_is_skipped() {
        let doc = Document::new();
        let counter = Counter::new();
        let _cx = mount(&counter, &doc);
        {
            let reader: WidgetRef = Reader::new();
            counter.inherited.add_dependent(&reader);
        }
        assert_eq!(counter.inherited.dependent_count(), 1);
        counter.inherited.notify_dependents();
        assert_eq!(counter.inherited.dependent_count(), 1);
    }

    #[test]
    fn context_unavailable_before_build() {
        let state = InheritedState::new("Theme");
        assert_eq!(
            state.context().err(),
            Some(Error::ContextUnavailable { widget: "Theme" })
        );
        // Logged no-op.
        state.notify_dependents();
    }

    #[test]
    fn dispose_clears() {
        let doc = Document::new();
        let counter = Counter::new();
        let reader = Reader::new();
        *counter.child.borrow_mut() = Some(reader.clone());
        let _cx = mount(&counter, &doc);

        counter.inherited.dispose();
        assert_eq!(counter.inherited.dependent_count(), 0);
        assert!(counter.inherited.context().is_err());
        counter.inherited.notify_dependents();
        assert_eq!(reader.seen.borrow().len(), 1);
    }
}
