//! Stateful widgets: a persistent widget identity around a mutable [`State`].
//!
//! The state is initialized on the widget's first build. From then on
//! [`StatefulWidget::set_state`] mutates it and rebuilds the widget's subtree
//! in place. Calls before the first build are rejected with a warning.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use super::context::{BuildContext, Child, WeakBuildContext};
use super::traits::{StateHost, Widget, WidgetRef};
use crate::binding::Element;
use crate::dom::node::NodeId;
use crate::error::Result;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Mutable state owned by a [`StatefulWidget`].
pub trait State: Sized + 'static {
    /// Runs once, at the first build, before [`build`](Self::build).
    fn init_state(&mut self, _handle: &StateHandle<Self>) {}

    /// Describe the subtree for the current state.
    fn build(&self, cx: &BuildContext, handle: &StateHandle<Self>) -> Result<Child>;

    /// Runs when the owning widget is disposed.
    fn dispose(&mut self) {}
}

// ---------------------------------------------------------------------------
// StatefulWidget
// ---------------------------------------------------------------------------

/// Widget that rebuilds from a [`State`] whenever the state changes.
pub struct StatefulWidget<S: State> {
    element: Element,
    name: &'static str,
    state: RefCell<S>,
    mounted: Cell<bool>,
    context: RefCell<Option<WeakBuildContext>>,
    this: Weak<Self>,
}

impl<S: State> StatefulWidget<S> {
    /// Wrap `state` in a widget rendering into a `div`.
    pub fn new(name: &'static str, state: S) -> Rc<Self> {
        Self::with_element(name, Element::new("div"), state)
    }

    pub fn with_element(name: &'static str, element: Element, state: S) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            element,
            name,
            state: RefCell::new(state),
            mounted: Cell::new(false),
            context: RefCell::new(None),
            this: this.clone(),
        })
    }

    pub fn handle(&self) -> StateHandle<S> {
        StateHandle {
            widget: self.this.clone(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Read the state.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Mutate the state and rebuild. Before the first build this logs a
    /// warning and leaves both the state and the surface untouched.
    pub fn set_state(&self, mutate: impl FnOnce(&mut S)) -> Result<()> {
        if !self.mounted.get() {
            warn!(widget = self.name, "set_state called before build; ignoring");
            return Ok(());
        }
        mutate(&mut self.state.borrow_mut());
        self.mark_needs_build()
    }

    /// Tear down: run [`State::dispose`] and forget the cached context.
    pub fn dispose(&self) {
        if self.mounted.replace(false) {
            self.state.borrow_mut().dispose();
        }
        *self.context.borrow_mut() = None;
    }

    fn render(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        let child = self.state.borrow().build(cx, &self.handle())?;
        cx.append_child(child)?;
        Ok(Some(node))
    }
}

impl<S: State> Widget for StatefulWidget<S> {
    fn widget_type(&self) -> &str {
        self.name
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        *self.context.borrow_mut() = Some(cx.downgrade());
        if !self.mounted.get() {
            self.state.borrow_mut().init_state(&self.handle());
            self.mounted.set(true);
        }
        self.render(cx)
    }

    fn state_host(&self) -> Option<Weak<dyn StateHost>> {
        let this: Weak<dyn StateHost> = self.this.clone();
        Some(this)
    }
}

impl<S: State> StateHost for StatefulWidget<S> {
    fn mark_needs_build(&self) -> Result<()> {
        if !self.mounted.get() {
            warn!(widget = self.name, "rebuild requested before build; ignoring");
            return Ok(());
        }
        let cx = self.context.borrow().as_ref().and_then(WeakBuildContext::upgrade);
        match cx {
            Some(cx) => {
                trace!(widget = self.name, "state rebuild");
                self.render(&cx).map(|_| ())
            }
            None => {
                warn!(widget = self.name, "rebuild requested without a live context");
                Ok(())
            }
        }
    }

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }
}

impl<S: State> fmt::Debug for StatefulWidget<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulWidget")
            .field("name", &self.name)
            .field("mounted", &self.mounted.get())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// StateHandle
// ---------------------------------------------------------------------------

/// Weak handle to a [`StatefulWidget`], for event handlers and async tasks.
pub struct StateHandle<S: State> {
    widget: Weak<StatefulWidget<S>>,
}

impl<S: State> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            widget: self.widget.clone(),
        }
    }
}

impl<S: State> StateHandle<S> {
    pub fn upgrade(&self) -> Option<Rc<StatefulWidget<S>>> {
        self.widget.upgrade()
    }

    /// Mutate and rebuild. A dropped widget makes this a no-op.
    pub fn set_state(&self, mutate: impl FnOnce(&mut S)) -> Result<()> {
        match self.widget.upgrade() {
            Some(widget) => widget.set_state(mutate),
            None => {
                debug!("set_state on a dropped widget; ignoring");
                Ok(())
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.widget.upgrade().is_some_and(|w| w.is_mounted())
    }

    /// Read the state, if the widget is still alive.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.widget.upgrade().map(|w| w.read(f))
    }

    /// The widget as a shared handle.
    pub fn widget(&self) -> Option<WidgetRef> {
        self.widget.upgrade().map(|w| w as WidgetRef)
    }
}

impl<S: State> fmt::Debug for StateHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("alive", &(self.widget.strong_count() > 0))
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
