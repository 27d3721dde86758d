//! Theme: color, text and box tokens published to the subtree.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::{Element, Props};
use crate::color::Color;
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::widget::{inherited_of, rebuild, BuildContext, InheritedState, InheritedWidget, Widget, WidgetRef};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Named colors, Material 3 baseline by default.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    pub primary: Color,
    pub on_primary: Color,
    pub secondary: Color,
    pub on_secondary: Color,
    pub tertiary: Color,
    pub on_tertiary: Color,
    pub error: Color,
    pub on_error: Color,
    pub surface: Color,
    pub on_surface: Color,
    pub background: Color,
    pub on_background: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            primary: Color::rgb(0x67, 0x50, 0xa4),
            on_primary: Color::WHITE,
            secondary: Color::rgb(0x62, 0x5b, 0x71),
            on_secondary: Color::WHITE,
            tertiary: Color::rgb(0x7d, 0x52, 0x60),
            on_tertiary: Color::WHITE,
            error: Color::rgb(0xb3, 0x26, 0x1e),
            on_error: Color::WHITE,
            surface: Color::rgb(0xff, 0xfb, 0xfe),
            on_surface: Color::rgb(0x1c, 0x1b, 0x1f),
            background: Color::rgb(0xff, 0xfb, 0xfe),
            on_background: Color::rgb(0x1c, 0x1b, 0x1f),
        }
    }
}

/// Text defaults: `font-size: 16px; font-weight: normal; color: inherit`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle(Style);

impl Default for TextStyle {
    fn default() -> Self {
        Self(
            Style::new()
                .with("font-size", "16px")
                .with("font-weight", "normal")
                .with("color", "inherit"),
        )
    }
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_size(self, value: impl Into<String>) -> Self {
        self.with("font-size", value)
    }

    pub fn font_weight(self, value: impl Into<String>) -> Self {
        self.with("font-weight", value)
    }

    pub fn color(self, value: impl Into<String>) -> Self {
        self.with("color", value)
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.set(property, value);
        self
    }

    pub fn style(&self) -> &Style {
        &self.0
    }
}

/// Box defaults applied under every themed container.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxDecoration(Style);

impl Default for BoxDecoration {
    fn default() -> Self {
        Self(
            Style::new()
                .with("padding", "0")
                .with("margin", "0")
                .with("border-radius", "0")
                .with("box-shadow", "none")
                .with("position", "static"),
        )
    }
}

impl BoxDecoration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn padding(self, value: impl Into<String>) -> Self {
        self.with("padding", value)
    }

    pub fn margin(self, value: impl Into<String>) -> Self {
        self.with("margin", value)
    }

    pub fn border_radius(self, value: impl Into<String>) -> Self {
        self.with("border-radius", value)
    }

    pub fn box_shadow(self, value: impl Into<String>) -> Self {
        self.with("box-shadow", value)
    }

    pub fn background_color(self, value: impl Into<String>) -> Self {
        self.with("background-color", value)
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.set(property, value);
        self
    }

    pub fn style(&self) -> &Style {
        &self.0
    }
}

/// Everything a [`Theme`] publishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeData {
    pub color_scheme: ColorScheme,
    pub text_style: TextStyle,
    pub box_decoration: BoxDecoration,
}

impl ThemeData {
    pub fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }

    pub fn with_text_style(mut self, text_style: TextStyle) -> Self {
        self.text_style = text_style;
        self
    }

    pub fn with_box_decoration(mut self, box_decoration: BoxDecoration) -> Self {
        self.box_decoration = box_decoration;
        self
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Publishes [`ThemeData`]. Every rebuild notifies dependents.
pub struct Theme {
    element: Element,
    inherited: InheritedState,
    data: RefCell<Rc<ThemeData>>,
    child: WidgetRef,
}

impl Theme {
    pub fn new(data: ThemeData, child: WidgetRef) -> Rc<Self> {
        Rc::new(Self {
            element: Element::with_props(
                "div",
                Props::new().with_style("width", "100%").with_style("height", "100%"),
            ),
            inherited: InheritedState::new(Self::KIND),
            data: RefCell::new(Rc::new(data)),
            child,
        })
    }

    /// The nearest theme's data; registers the caller as a dependent.
    pub fn of(cx: &BuildContext) -> Result<Rc<ThemeData>> {
        Ok(inherited_of::<Theme>(cx)?.data())
    }

    /// Like [`of`](Self::of), but `None` when no theme is in scope.
    pub fn maybe_of(cx: &BuildContext) -> Option<Rc<ThemeData>> {
        let theme = cx.find_parent::<Theme>()?;
        theme.inherited.add_dependent(cx.widget());
        Some(theme.data())
    }

    pub fn data(&self) -> Rc<ThemeData> {
        Rc::clone(&self.data.borrow())
    }

    /// Swap the tokens. A built theme rebuilds at once, which rebuilds its
    /// dependents before its subtree.
    pub fn set_data(&self, data: ThemeData) -> Result<()> {
        *self.data.borrow_mut() = Rc::new(data);
        match self.inherited.context() {
            Ok(cx) => rebuild(cx.widget(), cx.document()),
            Err(_) => Ok(()),
        }
    }

    /// Swap the tokens without rebuilding; they apply at the next build.
    pub fn replace_data(&self, data: ThemeData) -> Rc<ThemeData> {
        self.data.replace(Rc::new(data))
    }

    pub fn inherited_state(&self) -> &InheritedState {
        &self.inherited
    }
}

impl Widget for Theme {
    fn widget_type(&self) -> &str {
        "Theme"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        self.inherited.begin_build(cx, || self.update_should_notify());
        let node = self.element.reset(cx.document());
        cx.append_child(Rc::clone(&self.child))?;
        Ok(Some(node))
    }
}

impl InheritedWidget for Theme {
    const KIND: &'static str = "Theme";

    fn inherited(&self) -> &InheritedState {
        &self.inherited
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
    use crate::widgets::text::Text;

    fn mount(root: WidgetRef, doc: &Document) {
        let cx = BuildContext::new(Rc::clone(&root), doc.clone());
        let node = root.build(&cx).unwrap().unwrap();
        let body = doc.body();
        doc.dom_mut().append_child(body, node).unwrap();
    }

    #[test]
    fn default_scheme_matches_baseline() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.primary.to_hex(), "#6750a4");
        assert_eq!(scheme.on_surface.to_hex(), "#1c1b1f");
        assert_eq!(scheme.error.to_hex(), "#b3261e");
    }

    #[test]
    fn token_builders() {
        let text = TextStyle::new().font_size("20px").color("#333");
        assert_eq!(text.style().get("font-size"), Some("20px"));
        assert_eq!(text.style().get("font-weight"), Some("normal"));
        let decoration = BoxDecoration::new().padding("16px").background_color("#f8fafc");
        assert_eq!(decoration.style().get("padding"), Some("16px"));
        assert_eq!(decoration.style().get("position"), Some("static"));
    }

    #[test]
    fn text_picks_up_theme_tokens() {
        let doc = Document::new();
        let text = Rc::new(Text::new("hello"));
        let theme = Theme::new(
            ThemeData::default().with_text_style(TextStyle::new().color("#333")),
            text.clone(),
        );
        mount(theme.clone(), &doc);

        let node = text.element().node_id().unwrap();
        assert_eq!(doc.dom().style(node, "color"), Some("#333"));
        assert_eq!(theme.inherited_state().dependent_count(), 1);
    }

    #[test]
    fn set_data_rebuilds_dependents() {
        let doc = Document::new();
        let text = Rc::new(Text::new("hello"));
        let theme = Theme::new(ThemeData::default(), text.clone());
        mount(theme.clone(), &doc);

        theme
            .set_data(ThemeData::default().with_text_style(TextStyle::new().color("#ff0000")))
            .unwrap();
        let node = text.element().node_id().unwrap();
        assert_eq!(doc.dom().style(node, "color"), Some("#ff0000"));
        assert_eq!(theme.data().text_style.style().get("color"), Some("#ff0000"));
    }

    #[test]
    fn set_data_before_build_only_stores() {
        let theme = Theme::new(ThemeData::default(), Rc::new(Text::new("x")));
        theme
            .set_data(ThemeData::default().with_text_style(TextStyle::new().font_size("12px")))
            .unwrap();
        assert_eq!(theme.data().text_style.style().get("font-size"), Some("12px"));
    }

    #[test]
    fn of_without_theme_fails() {
        let doc = Document::new();
        let cx = BuildContext::new(Rc::new(Text::new("orphan")), doc);
        assert_eq!(Theme::of(&cx).unwrap_err(), Error::MissingAncestor { kind: "Theme" });
        assert!(Theme::maybe_of(&cx).is_none());
    }
}
