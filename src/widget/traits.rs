//! Widget trait: identity, element binding, build.
//!
//! The `Widget` trait is the core abstraction for all UI elements in sapling.
//! Every widget owns an [`Element`] (its surface node plus bookkeeping) and
//! knows how to build itself against a [`BuildContext`]. Widgets are shared
//! as `Rc<dyn Widget>` so that children can hold weak back-references to
//! their parents and inherited widgets can track dependents weakly.

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::binding::Element;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::widget::context::BuildContext;

/// A shared widget handle.
pub type WidgetRef = Rc<dyn Widget>;

// ---------------------------------------------------------------------------
// AsAny
// ---------------------------------------------------------------------------

/// Upcasts to `Any` for runtime type inspection.
///
/// Implemented for every sized `'static` type; call it on `&dyn Widget`,
/// not on `Rc<dyn Widget>`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

// ---------------------------------------------------------------------------
// StateHost
// ---------------------------------------------------------------------------

/// A widget that owns mutable state and rebuilds itself when it changes.
pub trait StateHost {
    /// Rebuild the widget's subtree from its current state.
    fn mark_needs_build(&self) -> Result<()>;

    /// Whether the first build has happened.
    fn is_mounted(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Core trait implemented by all widgets in sapling.
///
/// Widget is object-safe: methods take `&self` and widgets use interior
/// mutability for anything that changes after construction.
pub trait Widget: AsAny {
    /// Short type name used in logs and snapshots (e.g. "Button", "Theme").
    fn widget_type(&self) -> &str;

    /// The widget's node binding.
    fn element(&self) -> &Element;

    /// Build (or rebuild) this widget into its node and return the node to
    /// mount, or `None` if there is nothing renderable.
    ///
    /// Builds replace the node's previous content entirely; `cx.widget()` is
    /// this widget.
    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>>;

    /// The state-mutation entry point, for widgets that have one.
    fn state_host(&self) -> Option<Weak<dyn StateHost>> {
        None
    }
}

impl dyn Widget {
    /// Whether this widget is a `T`.
    pub fn is<T: Widget>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Widget>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Downcast a shared widget to its concrete type.
pub fn downcast_rc<T: Widget>(widget: &WidgetRef) -> Option<Rc<T>> {
    Rc::clone(widget).into_any_rc().downcast::<T>().ok()
}

/// Rebuild `widget` in place against a fresh context of its own.
///
/// If the build produces a different node than the one the widget had, the
/// new node takes the old one's place in the surface.
pub fn rebuild(widget: &WidgetRef, document: &Document) -> Result<()> {
    let previous = widget.element().node_id();
    let cx = BuildContext::new(Rc::clone(widget), document.clone());
    let built = widget.build(&cx)?;
    tracing::trace!(widget = widget.widget_type(), "rebuilt");
    if let (Some(old), Some(new)) = (previous, built) {
        if old != new {
            document.dom_mut().replace_with(old, new)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// WidgetExt
// ---------------------------------------------------------------------------

/// Extension trait providing builder-style convenience methods for widgets.
///
/// Automatically implemented for all types that implement `Widget`.
pub trait WidgetExt: Widget + Sized {
    /// Share this widget.
    fn into_ref(self) -> WidgetRef {
        Rc::new(self)
    }
}

// Blanket implementation: every Widget gets WidgetExt for free.
impl<T: Widget> WidgetExt for T {}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Child;

    // -----------------------------------------------------------------------
    // Test widget
    // -----------------------------------------------------------------------

    struct Label {
        element: Element,
        text: String,
    }

    impl Label {
        fn new(text: &str) -> Self {
            Self {
                element: Element::new("span"),
                text: text.to_owned(),
            }
        }
    }

    impl Widget for Label {
        fn widget_type(&self) -> &str {
            "Label"
        }

        fn element(&self) -> &Element {
            &self.element
        }

        fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
            let node = self.element.reset(cx.document());
            cx.append_child(Child::Text(self.text.clone()))?;
            Ok(Some(node))
        }
    }

    struct Nothing {
        element: Element,
    }

    impl Widget for Nothing {
        fn widget_type(&self) -> &str {
            "Nothing"
        }

        fn element(&self) -> &Element {
            &self.element
        }

        fn build(&self, _cx: &BuildContext) -> Result<Option<NodeId>> {
            Ok(None)
        }
    }

    #[test]
    fn downcast_shared_widget() {
        let widget: WidgetRef = Label::new("hi").into_ref();
        assert!(widget.is::<Label>());
        assert!(!widget.is::<Nothing>());
        assert_eq!(widget.downcast_ref::<Label>().unwrap().text, "hi");
        let label = downcast_rc::<Label>(&widget).unwrap();
        assert_eq!(label.text, "hi");
        assert!(downcast_rc::<Nothing>(&widget).is_none());
    }

    #[test]
    fn rebuild_in_place_keeps_node() {
        let doc = Document::new();
        let widget: WidgetRef = Label::new("hi").into_ref();
        rebuild(&widget, &doc).unwrap();
        let node = widget.element().node_id().unwrap();
        rebuild(&widget, &doc).unwrap();
        assert_eq!(widget.element().node_id(), Some(node));
        assert_eq!(doc.text_content(node), "hi");
    }

    #[test]
    fn state_host_defaults_to_none() {
        let widget = Nothing {
            element: Element::new("div"),
        };
        assert!(widget.state_host().is_none());
    }
}
