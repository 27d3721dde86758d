//! Page chrome: [`Scaffold`] stacks an app bar, a body and a bottom bar;
//! [`AppBar`] is the themed title strip.

use std::rc::Rc;

use crate::binding::{Element, Props};
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::widget::{BuildContext, Widget, WidgetRef};
use crate::widgets::text::Text;
use crate::widgets::theme::Theme;

/// A full-viewport page with optional app bar, body and bottom bar, mounted
/// in that order.
pub struct Scaffold {
    element: Element,
    app_bar: Option<WidgetRef>,
    body: Option<WidgetRef>,
    bottom_bar: Option<WidgetRef>,
}

impl Scaffold {
    pub fn new() -> Self {
        Self {
            element: Element::with_props(
                "div",
                Props::new()
                    .with_style("position", "absolute")
                    .with_style("top", "0")
                    .with_style("left", "0")
                    .with_style("width", "100vw")
                    .with_style("height", "100vh"),
            ),
            app_bar: None,
            body: None,
            bottom_bar: None,
        }
    }

    pub fn app_bar(mut self, app_bar: WidgetRef) -> Self {
        self.app_bar = Some(app_bar);
        self
    }

    pub fn body(mut self, body: WidgetRef) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bottom_bar(mut self, bottom_bar: WidgetRef) -> Self {
        self.bottom_bar = Some(bottom_bar);
        self
    }
}

impl Default for Scaffold {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Scaffold {
    fn widget_type(&self) -> &str {
        "Scaffold"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        for part in [&self.app_bar, &self.body, &self.bottom_bar].into_iter().flatten() {
            cx.append_child(Rc::clone(part))?;
        }
        Ok(Some(node))
    }
}

/// A bar in the theme's primary color with a bold title between optional
/// leading and trailing widgets. Requires a [`Theme`].
pub struct AppBar {
    element: Element,
    title: String,
    leading: Option<WidgetRef>,
    trailing: Option<WidgetRef>,
}

impl AppBar {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            element: Element::with_props(
                "header",
                Props::new()
                    .with_style("padding", "16px 24px")
                    .with_style("box-shadow", "0 2px 4px rgba(0, 0, 0, 0.1)")
                    .with_style("display", "flex")
                    .with_style("justify-content", "space-between")
                    .with_style("align-items", "center"),
            ),
            title: title.into(),
            leading: None,
            trailing: None,
        }
    }

    pub fn leading(mut self, widget: WidgetRef) -> Self {
        self.leading = Some(widget);
        self
    }

    pub fn trailing(mut self, widget: WidgetRef) -> Self {
        self.trailing = Some(widget);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Widget for AppBar {
    fn widget_type(&self) -> &str {
        "AppBar"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let theme = Theme::of(cx)?;
        let scheme = &theme.color_scheme;
        let node = self.element.reset(cx.document());
        self.element
            .set_style("background-color", scheme.primary.to_string());

        if let Some(leading) = &self.leading {
            cx.append_child(Rc::clone(leading))?;
        }
        let title = Text::new(self.title.as_str()).with_style(
            Style::new()
                .with("color", scheme.on_primary.to_string())
                .with("font-size", "20px")
                .with("font-weight", "bold"),
        );
        cx.append_child(Rc::new(title))?;
        if let Some(trailing) = &self.trailing {
            cx.append_child(Rc::clone(trailing))?;
        }
        Ok(Some(node))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::Document;
    use crate::error::Error;
    use crate::widget::WidgetExt;
    use crate::widgets::theme::ThemeData;

    #[test]
    fn scaffold_mounts_parts_in_order() {
        let doc = Document::new();
        let scaffold = Scaffold::new()
            .bottom_bar(Text::new("footer").into_ref())
            .body(Text::new("body").into_ref())
            .app_bar(Text::new("bar").into_ref())
            .into_ref();
        let cx = BuildContext::new(Rc::clone(&scaffold), doc.clone());
        let node = scaffold.build(&cx).unwrap().unwrap();
        assert_eq!(doc.text_content(node), "barbodyfooter");
        assert_eq!(doc.dom().style(node, "height"), Some("100vh"));
    }

    #[test]
    fn empty_scaffold_has_no_children() {
        let doc = Document::new();
        let scaffold = Scaffold::new().into_ref();
        let cx = BuildContext::new(Rc::clone(&scaffold), doc.clone());
        let node = scaffold.build(&cx).unwrap().unwrap();
        assert!(doc.dom().children(node).is_empty());
    }

    #[test]
    fn app_bar_needs_theme() {
        let doc = Document::new();
        let bar = AppBar::new("Rooms").into_ref();
        let cx = BuildContext::new(Rc::clone(&bar), doc);
        assert_eq!(bar.build(&cx).unwrap_err(), Error::MissingAncestor { kind: "Theme" });
    }

    #[test]
    fn app_bar_paints_primary_with_title() {
        let doc = Document::new();
        let bar = Rc::new(
            AppBar::new("Rooms")
                .leading(Text::new("<").into_ref())
                .trailing(Text::new("+").into_ref()),
        );
        let theme: WidgetRef = Theme::new(ThemeData::default(), bar.clone());
        let cx = BuildContext::new(Rc::clone(&theme), doc.clone());
        let root = theme.build(&cx).unwrap().unwrap();
        let body = doc.body();
        doc.dom_mut().append_child(body, root).unwrap();

        let node = bar.element().node_id().unwrap();
        let dom = doc.dom();
        assert_eq!(dom.text_content(node), "<Rooms+");
        assert_eq!(dom.style(node, "background-color"), Some("rgba(103, 80, 164, 1)"));
        let title = dom.query_by_text("Rooms").unwrap();
        assert_eq!(dom.style(title, "font-size"), Some("20px"));
        assert_eq!(dom.style(title, "color"), Some("rgba(255, 255, 255, 1)"));
    }
}
