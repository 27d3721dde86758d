//! Text widget: a themed span of text.

use std::cell::RefCell;

use crate::binding::Element;
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::widget::{BuildContext, Widget};
use crate::widgets::theme::Theme;

/// A span of text. The nearest theme's text style applies first, then the
/// widget's own style.
///
/// # Examples
///
/// ```ignore
/// let title = Text::new("Rooms").with_style(Style::new().with("font-weight", "bold"));
/// ```
pub struct Text {
    element: Element,
    content: RefCell<String>,
    style: Style,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            element: Element::new("span"),
            content: RefCell::new(content.into()),
            style: Style::new(),
        }
    }

    /// Override theme text tokens (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    /// Change the text. Takes effect on the next build.
    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.borrow_mut() = content.into();
    }
}

impl Widget for Text {
    fn widget_type(&self) -> &str {
        "Text"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        let style = match Theme::maybe_of(cx) {
            Some(theme) => theme.text_style.style().merged(&self.style),
            None => self.style.clone(),
        };
        self.element.merge_style(&style);
        cx.append_child(self.content())?;
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::Document;
    use std::rc::Rc;

    #[test]
    fn renders_text_without_theme() {
        let doc = Document::new();
        let text = Rc::new(Text::new("hello").with_style(Style::new().with("color", "red")));
        let cx = BuildContext::new(text.clone(), doc.clone());
        let node = text.build(&cx).unwrap().unwrap();
        assert_eq!(doc.text_content(node), "hello");
        assert_eq!(doc.dom().get(node).unwrap().tag, "span");
        assert_eq!(doc.dom().style(node, "color"), Some("red"));
    }

    #[test]
    fn rebuild_replaces_content() {
        let doc = Document::new();
        let text = Rc::new(Text::new("one"));
        let cx = BuildContext::new(text.clone(), doc.clone());
        let node = text.build(&cx).unwrap().unwrap();
        text.set_content("two");
        text.build(&cx).unwrap();
        assert_eq!(doc.text_content(node), "two");
        assert_eq!(doc.dom().children(node).len(), 1);
    }
}
