//! PromiseBuilder: renders the progress of a future as a [`Snapshot`].
//!
//! The builder is its own first dependent: every snapshot change rebuilds it
//! (and anything else that looked it up with [`PromiseBuilder::of`]).
//!
//! Futures run on the current tokio `LocalSet`, so the first build and every
//! [`update_promise`](PromiseBuilder::update_promise) must happen inside one.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::binding::Element;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::schedule::spawn_local;
use crate::widget::{inherited_of, BuildContext, InheritedState, InheritedWidget, Widget, WidgetRef};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Where the observed future is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    None,
    Waiting,
    Done,
}

/// The latest known state of a future: connection plus data or error.
#[derive(Debug)]
pub struct Snapshot<T, E> {
    pub connection_state: ConnectionState,
    pub data: Option<Rc<T>>,
    pub error: Option<Rc<E>>,
}

impl<T, E> Snapshot<T, E> {
    pub fn nothing() -> Self {
        Self {
            connection_state: ConnectionState::None,
            data: None,
            error: None,
        }
    }

    pub fn waiting() -> Self {
        Self {
            connection_state: ConnectionState::Waiting,
            ..Self::nothing()
        }
    }

    pub fn with_data(data: T) -> Self {
        Self {
            connection_state: ConnectionState::Done,
            data: Some(Rc::new(data)),
            error: None,
        }
    }

    pub fn with_error(error: E) -> Self {
        Self {
            connection_state: ConnectionState::Done,
            data: None,
            error: Some(Rc::new(error)),
        }
    }

    /// Presence check only: an empty collection still counts as data.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T, E> Clone for Snapshot<T, E> {
    fn clone(&self) -> Self {
        Self {
            connection_state: self.connection_state,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T, E> Default for Snapshot<T, E> {
    fn default() -> Self {
        Self::nothing()
    }
}

// ---------------------------------------------------------------------------
// PromiseBuilder
// ---------------------------------------------------------------------------

type Pending<T, E> = Pin<Box<dyn Future<Output = std::result::Result<T, E>>>>;
type SnapshotBuilder<T, E> = Box<dyn Fn(&BuildContext, &Snapshot<T, E>) -> Result<Option<WidgetRef>>>;

/// Observes a future and rebuilds from its snapshot.
///
/// # Panics
///
/// The first build spawns the initial future with
/// [`spawn_local`](crate::schedule::spawn_local) and panics outside a
/// `LocalSet`.
///
/// # Examples
///
/// ```ignore
/// let rooms = PromiseBuilder::new(fetch_rooms(), |_, snapshot| {
///     Ok(Some(match &snapshot.data {
///         Some(rooms) if rooms.is_empty() => Text::new("No rooms available").into_ref(),
///         Some(rooms) => room_list(rooms),
///         None => Text::new("Loading rooms...").into_ref(),
///     }))
/// });
/// ```
pub struct PromiseBuilder<T: 'static, E: 'static> {
    element: Element,
    inherited: InheritedState,
    snapshot: RefCell<Snapshot<T, E>>,
    initial: RefCell<Option<Pending<T, E>>>,
    builder: SnapshotBuilder<T, E>,
    this: Weak<Self>,
}

impl<T: 'static, E: 'static> PromiseBuilder<T, E> {
    pub fn new<F>(
        future: F,
        builder: impl Fn(&BuildContext, &Snapshot<T, E>) -> Result<Option<WidgetRef>> + 'static,
    ) -> Rc<Self>
    where
        F: Future<Output = std::result::Result<T, E>> + 'static,
    {
        let widget = Rc::new_cyclic(|this| Self {
            element: Element::new("div"),
            inherited: InheritedState::new(Self::KIND),
            snapshot: RefCell::new(Snapshot::nothing()),
            initial: RefCell::new(Some(Box::pin(future))),
            builder: Box::new(builder),
            this: this.clone(),
        });
        let dependent: WidgetRef = Rc::clone(&widget) as WidgetRef;
        widget.inherited.add_dependent(&dependent);
        widget
    }

    /// The nearest snapshot of this type; registers the caller as a dependent.
    pub fn of(cx: &BuildContext) -> Result<Snapshot<T, E>> {
        Ok(inherited_of::<Self>(cx)?.snapshot())
    }

    pub fn snapshot(&self) -> Snapshot<T, E> {
        self.snapshot.borrow().clone()
    }

    /// Restart from `waiting` and observe `future`.
    ///
    /// Earlier futures are not cancelled: whichever settles last decides the
    /// final snapshot.
    pub fn update_promise<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = std::result::Result<T, E>> + 'static,
    {
        self.publish(Snapshot::waiting());
        self.observe(future)
    }

    pub fn inherited_state(&self) -> &InheritedState {
        &self.inherited
    }

    /// Stop rebuilding. Futures still in flight settle into a no-op.
    pub fn dispose(&self) {
        self.inherited.dispose();
    }

    fn observe<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = std::result::Result<T, E>> + 'static,
    {
        let this = self.this.clone();
        spawn_local(async move {
            let outcome = future.await;
            let Some(this) = this.upgrade() else {
                debug!("future settled after its PromiseBuilder was dropped");
                return;
            };
            let snapshot = match outcome {
                Ok(data) => Snapshot::with_data(data),
                Err(error) => Snapshot::with_error(error),
            };
            this.publish(snapshot);
        })
    }

    fn publish(&self, snapshot: Snapshot<T, E>) {
        *self.snapshot.borrow_mut() = snapshot;
        self.inherited.notify_dependents();
    }
}

impl<T: 'static, E: 'static> Widget for PromiseBuilder<T, E> {
    fn widget_type(&self) -> &str {
        "PromiseBuilder"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        // Self is a dependent, so a rebuild must not notify again.
        self.inherited.begin_build(cx, || false);
        let initial = self.initial.borrow_mut().take();
        if let Some(future) = initial {
            *self.snapshot.borrow_mut() = Snapshot::waiting();
            drop(self.observe(future));
        }

        let node = self.element.reset(cx.document());
        let snapshot = self.snapshot();
        if let Some(child) = (self.builder)(cx, &snapshot)? {
            cx.append_child(child)?;
        }
        Ok(Some(node))
    }
}

impl<T: 'static, E: 'static> InheritedWidget for PromiseBuilder<T, E> {
    const KIND: &'static str = "PromiseBuilder";

    fn inherited(&self) -> &InheritedState {
        &self.inherited
    }
}

impl<T: 'static, E: 'static> fmt::Debug for PromiseBuilder<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseBuilder")
            .field("connection_state", &self.snapshot.borrow().connection_state)
            .field("started", &self.initial.borrow().is_none())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::Document;
    use crate::widgets::text::Text;
    use std::future::Future;
    use tokio::sync::oneshot;

    fn run_local<F: Future>(f: F) -> F::Output {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        tokio::task::LocalSet::new().block_on(&rt, f)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    type Seen = Rc<RefCell<Vec<ConnectionState>>>;

    fn recorder(
        seen: Seen,
    ) -> impl Fn(&BuildContext, &Snapshot<u32, String>) -> Result<Option<WidgetRef>> + 'static {
        move |_, snapshot| {
            seen.borrow_mut().push(snapshot.connection_state);
            let label = match (&snapshot.data, &snapshot.error) {
                (Some(n), _) => format!("value {n}"),
                (_, Some(e)) => format!("error {e}"),
                _ => "waiting".to_owned(),
            };
            Ok(Some(Rc::new(Text::new(label))))
        }
    }

    fn mount(widget: &Rc<PromiseBuilder<u32, String>>, doc: &Document) -> NodeId {
        let root: WidgetRef = Rc::clone(widget) as WidgetRef;
        let cx = BuildContext::new(root, doc.clone());
        widget.build(&cx).unwrap().unwrap()
    }

    #[test]
    fn snapshot_presence_checks() {
        let empty: Snapshot<Vec<u32>, String> = Snapshot::with_data(Vec::new());
        assert!(empty.has_data());
        assert!(!empty.has_error());
        let failed: Snapshot<Vec<u32>, String> = Snapshot::with_error("offline".into());
        assert!(failed.has_error());
        assert!(!failed.has_data());
        assert_eq!(Snapshot::<u32, String>::default().connection_state, ConnectionState::None);
    }

    #[test]
    fn registers_itself_as_dependent() {
        let widget = PromiseBuilder::<u32, String>::new(async { Ok(1) }, |_, _| Ok(None));
        assert_eq!(widget.inherited_state().dependent_count(), 1);
    }

    #[test]
    fn waiting_then_data() {
        run_local(async {
            let doc = Document::new();
            let seen = Seen::default();
            let (tx, rx) = oneshot::channel::<u32>();
            let widget = PromiseBuilder::new(
                async move { rx.await.map_err(|e| e.to_string()) },
                recorder(Rc::clone(&seen)),
            );
            let node = mount(&widget, &doc);
            assert_eq!(doc.text_content(node), "waiting");

            tx.send(7).unwrap();
            settle().await;
            assert_eq!(*seen.borrow(), vec![ConnectionState::Waiting, ConnectionState::Done]);
            assert_eq!(doc.text_content(node), "value 7");
        });
    }

    #[test]
    fn update_promise_goes_waiting_then_done() {
        run_local(async {
            let doc = Document::new();
            let seen = Seen::default();
            let widget = PromiseBuilder::new(async { Ok::<u32, String>(1) }, recorder(Rc::clone(&seen)));
            let node = mount(&widget, &doc);
            settle().await;
            assert_eq!(doc.text_content(node), "value 1");
            seen.borrow_mut().clear();

            let (tx, rx) = oneshot::channel::<u32>();
            let _ = widget.update_promise(async move { rx.await.map_err(|e| e.to_string()) });
            assert_eq!(*seen.borrow(), vec![ConnectionState::Waiting]);
            assert_eq!(doc.text_content(node), "waiting");

            tx.send(5).unwrap();
            settle().await;
            assert_eq!(*seen.borrow(), vec![ConnectionState::Waiting, ConnectionState::Done]);
            assert_eq!(doc.text_content(node), "value 5");
        });
    }

    #[test]
    fn rejection_becomes_error_snapshot() {
        run_local(async {
            let doc = Document::new();
            let seen = Seen::default();
            let widget = PromiseBuilder::new(
                async { Err::<u32, String>("offline".into()) },
                recorder(Rc::clone(&seen)),
            );
            let node = mount(&widget, &doc);
            settle().await;
            let snapshot = widget.snapshot();
            assert!(snapshot.has_error());
            assert!(!snapshot.has_data());
            assert_eq!(doc.text_content(node), "error offline");
        });
    }

    #[test]
    fn later_settlement_wins() {
        run_local(async {
            let doc = Document::new();
            let seen = Seen::default();
            let widget = PromiseBuilder::new(async { Ok::<u32, String>(0) }, recorder(Rc::clone(&seen)));
            let node = mount(&widget, &doc);
            settle().await;

            let (first_tx, first_rx) = oneshot::channel::<u32>();
            let (second_tx, second_rx) = oneshot::channel::<u32>();
            widget.update_promise(async move { first_rx.await.map_err(|e| e.to_string()) });
            widget.update_promise(async move { second_rx.await.map_err(|e| e.to_string()) });

            second_tx.send(2).unwrap();
            settle().await;
            assert_eq!(doc.text_content(node), "value 2");
            first_tx.send(1).unwrap();
            settle().await;
            assert_eq!(doc.text_content(node), "value 1");
        });
    }

    #[test]
    fn dispose_ignores_late_results() {
        run_local(async {
            let doc = Document::new();
            let seen = Seen::default();
            let (tx, rx) = oneshot::channel::<u32>();
            let widget = PromiseBuilder::new(
                async move { rx.await.map_err(|e| e.to_string()) },
                recorder(Rc::clone(&seen)),
            );
            mount(&widget, &doc);
            widget.dispose();
            tx.send(3).unwrap();
            settle().await;
            assert_eq!(*seen.borrow(), vec![ConnectionState::Waiting]);
            assert_eq!(widget.snapshot().data.as_deref(), Some(&3));
        });
    }
}
