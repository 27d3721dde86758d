//! Builder: build a subtree from a closure that sees the caller's context.

use crate::binding::{Element, Props};
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::widget::{BuildContext, Widget, WidgetRef};

type BuildFn = Box<dyn Fn(&BuildContext) -> Result<WidgetRef>>;

/// Runs a closure on every build and mounts the widget it returns.
///
/// Useful for reading inherited data (`Theme::of`, `Navigator::push`) at a
/// point below the widget that provides it.
pub struct Builder {
    element: Element,
    builder: BuildFn,
}

impl Builder {
    pub fn new(builder: impl Fn(&BuildContext) -> Result<WidgetRef> + 'static) -> Self {
        Self {
            element: Element::with_props("div", Props::new().with_style("display", "contents")),
            builder: Box::new(builder),
        }
    }
}

impl Widget for Builder {
    fn widget_type(&self) -> &str {
        "Builder"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        let child = (self.builder)(cx)?;
        cx.append_child(child)?;
        Ok(Some(node))
    }
}
