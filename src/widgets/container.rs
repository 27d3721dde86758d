//! Container family: a styled box of child widgets.
//!
//! `Row`, `Column` and `Card` are containers with different default styles,
//! built through [`Container::row`], [`Container::column`] and
//! [`Container::card`]. [`Center`] centers a single child and
//! [`Positioned`] offsets one from its normal place.

use std::cell::RefCell;

use crate::binding::{Element, Props};
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::event::{Event, EventType};
use crate::widget::{BuildContext, Widget, WidgetRef};
use crate::widgets::theme::{BoxDecoration, Theme};

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Container,
    Row,
    Column,
    Card,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Container => "Container",
            Kind::Row => "Row",
            Kind::Column => "Column",
            Kind::Card => "Card",
        }
    }
}

/// A `div` holding child widgets.
///
/// A plain container (and a row or column) layers its own style over the
/// theme's box decoration. A card uses the theme's surface colors and fails
/// with [`Error::MissingAncestor`](crate::Error::MissingAncestor) without a theme.
///
/// # Examples
///
/// ```ignore
/// let header = Container::row()
///     .main_alignment("space-between")
///     .gap("16px")
///     .with_child(Text::new("Rooms").into_ref())
///     .with_child(Button::new("New").into_ref());
/// ```
pub struct Container {
    kind: Kind,
    element: Element,
    style: Style,
    children: RefCell<Vec<WidgetRef>>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_kind(Kind::Container, Style::new())
    }

    /// Horizontal flex box, children centered on the cross axis.
    pub fn row() -> Self {
        Self::with_kind(
            Kind::Row,
            Style::new()
                .with("display", "flex")
                .with("flex-direction", "row")
                .with("justify-content", "flex-start")
                .with("align-items", "center")
                .with("gap", "0"),
        )
    }

    /// Vertical flex box, children stretched on the cross axis.
    pub fn column() -> Self {
        Self::with_kind(
            Kind::Column,
            Style::new()
                .with("display", "flex")
                .with("flex-direction", "column")
                .with("justify-content", "flex-start")
                .with("align-items", "stretch")
                .with("gap", "0"),
        )
    }

    /// Raised surface with padding and a soft shadow.
    pub fn card() -> Self {
        let decoration = BoxDecoration::new()
            .padding("16px")
            .margin("8px")
            .border_radius("4px")
            .box_shadow("0 2px 4px rgba(0, 0, 0, 0.1)");
        Self::with_kind(Kind::Card, decoration.style().clone())
    }

    fn with_kind(kind: Kind, style: Style) -> Self {
        Self {
            kind,
            element: Element::new("div"),
            style,
            children: RefCell::new(Vec::new()),
        }
    }

    /// Overlay style declarations (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style.merge(&style);
        self
    }

    /// `justify-content` (builder).
    pub fn main_alignment(mut self, value: &str) -> Self {
        self.style.set("justify-content", value);
        self
    }

    /// `align-items` (builder).
    pub fn cross_alignment(mut self, value: &str) -> Self {
        self.style.set("align-items", value);
        self
    }

    pub fn gap(mut self, value: &str) -> Self {
        self.style.set("gap", value);
        self
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        let props = self.element.props().with_id(id);
        self.element.set_props(props);
        self
    }

    /// Subscribe to an event on the container's node (builder).
    pub fn on(self, kind: EventType, handler: impl Fn(&mut Event) + 'static) -> Self {
        let props = self.element.props().on(kind, handler);
        self.element.set_props(props);
        self
    }

    pub fn with_child(self, child: WidgetRef) -> Self {
        self.children.borrow_mut().push(child);
        self
    }

    pub fn with_children(self, children: impl IntoIterator<Item = WidgetRef>) -> Self {
        self.children.borrow_mut().extend(children);
        self
    }

    /// Replace the children. Takes effect on the next build.
    pub fn set_children(&self, children: Vec<WidgetRef>) {
        *self.children.borrow_mut() = children;
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    fn resolved_style(&self, cx: &BuildContext) -> Result<Style> {
        if self.kind == Kind::Card {
            let theme = Theme::of(cx)?;
            let scheme = &theme.color_scheme;
            return Ok(self.style.merged(
                &Style::new()
                    .with("background-color", scheme.surface.to_string())
                    .with("color", scheme.on_surface.to_string()),
            ));
        }
        Ok(match Theme::maybe_of(cx) {
            Some(theme) => theme
                .box_decoration
                .style()
                .merged(&Style::new().with("color", theme.color_scheme.on_primary.to_string()))
                .merged(&self.style),
            None => self.style.clone(),
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
    fn widget_type(&self) -> &str {
        self.kind.name()
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        let style = self.resolved_style(cx)?;
        self.element.merge_style(&style);
        let children = self.children.borrow().clone();
        for child in children {
            cx.append_child(child)?;
        }
        Ok(Some(node))
    }
}

// ---------------------------------------------------------------------------
// Center
// ---------------------------------------------------------------------------

/// Fills its parent and centers one child.
pub struct Center {
    element: Element,
    child: WidgetRef,
}

impl Center {
    pub fn new(child: WidgetRef) -> Self {
        Self {
            element: Element::with_props(
                "div",
                Props::new()
                    .with_style("width", "100%")
                    .with_style("height", "100%")
                    .with_style("display", "flex")
                    .with_style("justify-content", "center")
                    .with_style("align-items", "center"),
            ),
            child,
        }
    }
}

impl Widget for Center {
    fn widget_type(&self) -> &str {
        "Center"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        cx.append_child(self.child.clone())?;
        Ok(Some(node))
    }
}

// ---------------------------------------------------------------------------
// Positioned
// ---------------------------------------------------------------------------

/// Offsets one child by its edge insets, stacked at `layer`.
///
/// The box is `position: relative`; each inset is in pixels and defaults
/// to zero.
///
/// # Examples
///
/// ```ignore
/// let input = Positioned::new(chat_input).bottom(0.0).left(0.0).layer(2);
/// ```
pub struct Positioned {
    element: Element,
    child: WidgetRef,
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
    layer: i32,
}

impl Positioned {
    pub fn new(child: WidgetRef) -> Self {
        Self {
            element: Element::new("div"),
            child,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
            layer: 0,
        }
    }

    pub fn top(mut self, px: f32) -> Self {
        self.top = px;
        self
    }

    pub fn right(mut self, px: f32) -> Self {
        self.right = px;
        self
    }

    pub fn bottom(mut self, px: f32) -> Self {
        self.bottom = px;
        self
    }

    pub fn left(mut self, px: f32) -> Self {
        self.left = px;
        self
    }

    /// Stacking order (`z-index`).
    pub fn layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    fn style(&self) -> Style {
        Style::new()
            .with("position", "relative")
            .with("z-index", self.layer.to_string())
            .with("top", format!("{}px", self.top))
            .with("right", format!("{}px", self.right))
            .with("bottom", format!("{}px", self.bottom))
            .with("left", format!("{}px", self.left))
    }
}

impl Widget for Positioned {
    fn widget_type(&self) -> &str {
        "Positioned"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        self.element.merge_style(&self.style());
        cx.append_child(self.child.clone())?;
        Ok(Some(node))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
