//! Pressable widgets: a themed label [`Button`] and the [`InkWell`] wrapper.
//!
//! Both darken their background while hovered (10%) and pressed (20%), and
//! restore it when the pointer leaves.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::Element;
use crate::color::Color;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::event::EventType;
use crate::widget::{BuildContext, Widget, WidgetRef};
use crate::widgets::gesture::{bind_gestures, Gestures};
use crate::widgets::theme::{BoxDecoration, ColorScheme, Theme};

/// A no-argument event callback.
pub type Callback = Rc<dyn Fn()>;

/// Hover and press shading for `node`, resting at `base`.
fn bind_press_feedback(element: &Element, document: &Document, node: NodeId, base: Color) {
    let shade = move |event: &crate::event::Event, color: Color| {
        event
            .document()
            .dom_mut()
            .set_style(node, "background-color", color.to_string());
    };
    element.listen(document, EventType::MouseEnter, move |e| shade(e, base.adjust(-10)));
    element.listen(document, EventType::MouseLeave, move |e| shade(e, base));
    element.listen(document, EventType::MouseDown, move |e| shade(e, base.adjust(-20)));
    element.listen(document, EventType::MouseUp, move |e| shade(e, base.adjust(-10)));
}

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A text button in the theme's primary color.
///
/// Building without a [`Theme`] above fails with
/// [`Error::MissingAncestor`](crate::Error::MissingAncestor).
///
/// # Examples
///
/// ```ignore
/// let send = Button::new("Send").on_pressed(move || send_message());
/// ```
pub struct Button {
    element: Element,
    label: RefCell<String>,
    style: Style,
    on_pressed: Option<Callback>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        let style = BoxDecoration::new()
            .padding("12px 24px")
            .border_radius("12px")
            .with("white-space", "nowrap")
            .with("transition", "all 0.2s ease-in-out");
        Self {
            element: Element::new("button"),
            label: RefCell::new(label.into()),
            style: style.style().clone(),
            on_pressed: None,
        }
    }

    /// Overlay style declarations (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style.merge(&style);
        self
    }

    pub fn on_pressed(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_pressed = Some(Rc::new(callback));
        self
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    /// Change the label. Takes effect on the next build.
    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }
}

impl Widget for Button {
    fn widget_type(&self) -> &str {
        "Button"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let theme = Theme::of(cx)?;
        let document = cx.document();
        let node = self.element.reset(document);

        let base = theme.color_scheme.primary;
        self.element.merge_style(
            &self.style.merged(
                &Style::new()
                    .with("background-color", base.to_string())
                    .with("color", theme.color_scheme.on_primary.to_string())
                    .with("cursor", "pointer")
                    .with("border", "none"),
            ),
        );
        cx.append_child(self.label())?;

        if let Some(callback) = &self.on_pressed {
            let callback = Rc::clone(callback);
            self.element.listen(document, EventType::Click, move |_| callback());
        }
        bind_press_feedback(&self.element, document, node, base);
        Ok(Some(node))
    }
}

// ---------------------------------------------------------------------------
// InkWell
// ---------------------------------------------------------------------------

/// Makes any widget pressable, with the same shading as [`Button`].
///
/// An ink well is a [`GestureDetector`](crate::widgets::GestureDetector)
/// with visuals: it recognizes the same taps and long presses. The resting
/// color is the style's `background-color` when it is a hex value, otherwise
/// the theme's primary color. `on_active` fires on mouse release and on the
/// Enter key.
pub struct InkWell {
    element: Element,
    child: WidgetRef,
    style: Style,
    gestures: Gestures,
    on_hover: Option<Callback>,
    on_leave: Option<Callback>,
    on_active: Option<Callback>,
}

impl InkWell {
    pub fn new(child: WidgetRef) -> Self {
        Self {
            element: Element::new("div"),
            child,
            style: BoxDecoration::new().style().clone(),
            gestures: Gestures::default(),
            on_hover: None,
            on_leave: None,
            on_active: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style.merge(&style);
        self
    }

    pub fn on_tap(mut self, callback: impl Fn() + 'static) -> Self {
        self.gestures.on_tap = Some(Rc::new(callback));
        self
    }

    pub fn on_long_press(mut self, callback: impl Fn() + 'static) -> Self {
        self.gestures.on_long_press = Some(Rc::new(callback));
        self
    }

    pub fn on_hover(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_hover = Some(Rc::new(callback));
        self
    }

    pub fn on_leave(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_leave = Some(Rc::new(callback));
        self
    }

    pub fn on_active(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_active = Some(Rc::new(callback));
        self
    }

    fn resting_color(&self, cx: &BuildContext) -> Color {
        self.style
            .get("background-color")
            .and_then(Color::from_hex)
            .unwrap_or_else(|| match Theme::maybe_of(cx) {
                Some(theme) => theme.color_scheme.primary,
                None => ColorScheme::default().primary,
            })
    }
}

impl Widget for InkWell {
    fn widget_type(&self) -> &str {
        "InkWell"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let document = cx.document();
        let node = self.element.reset(document);
        let base = self.resting_color(cx);

        self.element.merge_style(
            &Style::new()
                .with("cursor", "pointer")
                .with("transition", "all 0.2s ease-in-out")
                .merged(&self.style),
        );
        document.dom_mut().set_attribute(node, "tabindex", "0");

        bind_press_feedback(&self.element, document, node, base);
        bind_gestures(&self.element, document, &self.gestures);
        if let Some(callback) = self.on_hover.clone() {
            self.element.listen(document, EventType::MouseEnter, move |_| callback());
        }
        if let Some(callback) = self.on_leave.clone() {
            self.element.listen(document, EventType::MouseLeave, move |_| callback());
        }
        if let Some(callback) = self.on_active.clone() {
            let on_release = Rc::clone(&callback);
            self.element.listen(document, EventType::MouseUp, move |_| on_release());
            self.element.listen(document, EventType::KeyDown, move |e| {
                if e.key() == Some("Enter") {
                    callback();
                }
            });
        }

        cx.append_child(Rc::clone(&self.child))?;
        Ok(Some(node))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
