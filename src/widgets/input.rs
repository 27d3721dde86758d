//! TextField: a single-line text input with themed focus styling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::binding::{Element, Props};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::event::EventType;
use crate::schedule::CancelToken;
use crate::widget::{BuildContext, Widget};
use crate::widgets::theme::Theme;

const RESTING_BORDER: &str = "#e2e8f0";
const RESTING_BACKGROUND: &str = "#f8fafc";

type ValueCallback = Rc<dyn Fn(&str)>;

/// Colors applied while the field has focus.
#[derive(Debug, Clone, Default, PartialEq)]
struct FocusColors {
    border: String,
    background: String,
    shadow: String,
}

/// Paint the focused or resting look onto `node`.
fn paint_focus(document: &Document, node: NodeId, colors: &FocusColors, focused: bool) {
    let mut dom = document.dom_mut();
    if focused {
        dom.set_style(node, "border-color", colors.border.as_str());
        dom.set_style(node, "background-color", colors.background.as_str());
        dom.set_style(node, "box-shadow", format!("0 2px 4px {}", colors.shadow));
    } else {
        dom.set_style(node, "border-color", RESTING_BORDER);
        dom.set_style(node, "background-color", RESTING_BACKGROUND);
        dom.set_style(node, "box-shadow", "none");
    }
}

/// A text `input`.
///
/// `Input` events update the value and call `on_changed`; an Enter key
/// press calls `on_submitted` with the current value. Requires a [`Theme`].
///
/// # Examples
///
/// ```ignore
/// let name = TextField::new()
///     .placeholder("Room name")
///     .on_submitted(move |value| create_room(value));
/// ```
pub struct TextField {
    element: Element,
    value: Rc<RefCell<String>>,
    focused: Rc<Cell<bool>>,
    colors: Rc<RefCell<FocusColors>>,
    focus_color: Option<String>,
    focus_background: Option<String>,
    focus_shadow: Option<String>,
    on_changed: Option<ValueCallback>,
    on_submitted: Option<ValueCallback>,
    lifetime: CancelToken,
}

impl TextField {
    pub fn new() -> Self {
        Self {
            element: Element::with_props(
                "input",
                Props::new()
                    .with_attribute("type", "text")
                    .with_style("padding", "12px 16px")
                    .with_style("border", format!("2px solid {RESTING_BORDER}"))
                    .with_style("border-radius", "12px")
                    .with_style("font-size", "16px")
                    .with_style("width", "100%")
                    .with_style("outline", "none")
                    .with_style("transition", "all 0.2s ease-in-out"),
            ),
            value: Rc::new(RefCell::new(String::new())),
            focused: Rc::new(Cell::new(false)),
            colors: Rc::new(RefCell::new(FocusColors::default())),
            focus_color: None,
            focus_background: None,
            focus_shadow: None,
            on_changed: None,
            on_submitted: None,
            lifetime: CancelToken::new(),
        }
    }

    pub fn placeholder(self, text: impl Into<String>) -> Self {
        let props = self.element.props().with_attribute("placeholder", text);
        self.element.set_props(props);
        self
    }

    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    /// Overlay style declarations (builder).
    pub fn with_style(self, style: Style) -> Self {
        let props = self.element.props().with_styles(&style);
        self.element.set_props(props);
        self
    }

    /// Border color while focused. Defaults to the theme's primary color.
    pub fn focus_color(mut self, color: impl Into<String>) -> Self {
        self.focus_color = Some(color.into());
        self
    }

    pub fn focus_background(mut self, color: impl Into<String>) -> Self {
        self.focus_background = Some(color.into());
        self
    }

    pub fn focus_shadow(mut self, color: impl Into<String>) -> Self {
        self.focus_shadow = Some(color.into());
        self
    }

    pub fn on_changed(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_changed = Some(Rc::new(callback));
        self
    }

    pub fn on_submitted(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_submitted = Some(Rc::new(callback));
        self
    }

    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    /// Replace the value, updating a realized node's `value` attribute.
    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        if let (Some(node), Some(document)) = (self.element.node_id(), self.element.document()) {
            document.dom_mut().set_attribute(node, "value", value.as_str());
        }
        *self.value.borrow_mut() = value;
    }

    pub fn has_focus(&self) -> bool {
        self.focused.get()
    }

    /// Focus the field on the next idle pass.
    pub fn focus(&self) {
        self.schedule_focus_event(EventType::Focus);
    }

    /// Blur the field on the next idle pass.
    pub fn blur(&self) {
        self.schedule_focus_event(EventType::Blur);
    }

    /// Cancel pending focus changes.
    pub fn dispose(&self) {
        self.lifetime.cancel();
    }

    fn schedule_focus_event(&self, kind: EventType) {
        let (Some(node), Some(document)) = (self.element.node_id(), self.element.document()) else {
            debug!(?kind, "text field not built; focus change ignored");
            return;
        };
        document.request_idle_with(&self.lifetime, move |doc| {
            doc.dispatch(node, kind, None);
        });
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TextField {
    fn widget_type(&self) -> &str {
        "TextField"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let theme = Theme::of(cx)?;
        let scheme = &theme.color_scheme;
        let document = cx.document();
        let node = self.element.reset(document);

        let border = self.focus_color.clone().unwrap_or_else(|| scheme.primary.to_hex());
        let colors = FocusColors {
            shadow: self.focus_shadow.clone().unwrap_or_else(|| format!("{border}1a")),
            background: self
                .focus_background
                .clone()
                .unwrap_or_else(|| scheme.surface.to_string()),
            border,
        };
        *self.colors.borrow_mut() = colors;

        {
            let mut dom = document.dom_mut();
            dom.set_style(node, "background-color", scheme.surface.to_string());
            dom.set_style(node, "color", scheme.on_surface.to_string());
            dom.set_attribute(node, "value", self.value.borrow().as_str());
        }

        for (kind, focused) in [(EventType::Focus, true), (EventType::Blur, false)] {
            let flag = Rc::clone(&self.focused);
            let colors = Rc::clone(&self.colors);
            self.element.listen(document, kind, move |e| {
                flag.set(focused);
                paint_focus(e.document(), node, &colors.borrow(), focused);
            });
        }

        let value = Rc::clone(&self.value);
        let on_changed = self.on_changed.clone();
        self.element.listen(document, EventType::Input, move |e| {
            let Some(text) = e.value().map(str::to_owned) else {
                return;
            };
            e.document().dom_mut().set_attribute(node, "value", text.as_str());
            *value.borrow_mut() = text.clone();
            if let Some(callback) = &on_changed {
                callback(&text);
            }
        });

        if let Some(callback) = self.on_submitted.clone() {
            let value = Rc::clone(&self.value);
            self.element.listen(document, EventType::KeyDown, move |e| {
                if e.key() == Some("Enter") {
                    let text = value.borrow().clone();
                    callback(&text);
                }
            });
        }

        paint_focus(document, node, &self.colors.borrow(), self.focused.get());
        Ok(Some(node))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
