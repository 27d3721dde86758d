//! BuildContext: ancestor lookup and child attachment during a build.

use std::rc::{Rc, Weak};

use tracing::warn;

use super::traits::{downcast_rc, Widget, WidgetRef};
use crate::dom::document::{Document, WeakDocument};
use crate::dom::node::NodeId;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Child
// ---------------------------------------------------------------------------

/// Anything that can be mounted under a widget's node.
#[derive(Clone)]
pub enum Child {
    /// Built recursively, with its parent link set first.
    Widget(WidgetRef),
    /// An existing surface node, appended as-is.
    Node(NodeId),
    /// A new text leaf.
    Text(String),
}

impl From<WidgetRef> for Child {
    fn from(widget: WidgetRef) -> Self {
        Child::Widget(widget)
    }
}

impl<T: Widget> From<Rc<T>> for Child {
    fn from(widget: Rc<T>) -> Self {
        Child::Widget(widget)
    }
}

impl From<NodeId> for Child {
    fn from(node: NodeId) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

// ---------------------------------------------------------------------------
// BuildContext
// ---------------------------------------------------------------------------

/// Handle passed to [`Widget::build`]: the widget being built and the
/// document it builds into.
#[derive(Clone)]
pub struct BuildContext {
    widget: WidgetRef,
    document: Document,
}

impl BuildContext {
    pub fn new(widget: WidgetRef, document: Document) -> Self {
        Self { widget, document }
    }

    /// The widget this context was created for.
    pub fn widget(&self) -> &WidgetRef {
        &self.widget
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Nearest widget of type `T`, starting with this context's own widget
    /// and following parent links upward.
    pub fn find_parent<T: Widget>(&self) -> Option<Rc<T>> {
        let mut current = Some(Rc::clone(&self.widget));
        while let Some(widget) = current {
            if let Some(found) = downcast_rc::<T>(&widget) {
                return Some(found);
            }
            current = widget.element().parent();
        }
        None
    }

    /// Link `child` under this context's widget and return the child's context.
    pub fn for_child(&self, child: &WidgetRef) -> BuildContext {
        child.element().set_parent(&self.widget);
        BuildContext::new(Rc::clone(child), self.document.clone())
    }

    /// Mount `child` under this context's widget node.
    pub fn append_child(&self, child: impl Into<Child>) -> Result<()> {
        let parent = self.widget.element().node(&self.document);
        self.append_child_to(parent, child)
    }

    /// Mount `child` under an arbitrary node owned by this context's widget.
    ///
    /// Widgets are built first; a build that yields no node is logged and
    /// skipped. The child widget is kept alive until this widget's next reset.
    pub fn append_child_to(&self, parent: NodeId, child: impl Into<Child>) -> Result<()> {
        match child.into() {
            Child::Widget(widget) => {
                let cx = self.for_child(&widget);
                let built = widget.build(&cx)?;
                match built {
                    Some(node) => self.document.dom_mut().append_child(parent, node)?,
                    None => warn!(
                        widget = widget.widget_type(),
                        "append_child called with a non-renderable build result"
                    ),
                }
                self.widget.element().adopt(widget);
            }
            Child::Node(node) => self.document.dom_mut().append_child(parent, node)?,
            Child::Text(text) => {
                let mut dom = self.document.dom_mut();
                let leaf = dom.create_text(text);
                dom.append_child(parent, leaf)?;
            }
        }
        Ok(())
    }

    /// A non-owning copy, for widgets that replay builds later.
    pub fn downgrade(&self) -> WeakBuildContext {
        WeakBuildContext {
            widget: Rc::downgrade(&self.widget),
            document: self.document.downgrade(),
        }
    }
}

/// A cached [`BuildContext`] that does not keep its widget or document alive.
#[derive(Clone)]
pub struct WeakBuildContext {
    widget: Weak<dyn Widget>,
    document: WeakDocument,
}

impl WeakBuildContext {
    pub fn upgrade(&self) -> Option<BuildContext> {
        Some(BuildContext {
            widget: self.widget.upgrade()?,
            document: self.document.upgrade()?,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
