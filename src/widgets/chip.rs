//! Compact pill showing a label with optional leading and trailing widgets.

use std::rc::Rc;

use crate::binding::Element;
use crate::color::Color;
use crate::dom::node::NodeId;
use crate::dom::style::Style;
use crate::error::Result;
use crate::event::EventType;
use crate::widget::{BuildContext, Widget, WidgetRef};
use crate::widgets::button::Callback;
use crate::widgets::text::Text;
use crate::widgets::theme::{BoxDecoration, TextStyle, Theme};

enum Label {
    Text(String),
    Widget(WidgetRef),
}

/// A rounded label in a faint tint of the theme's tertiary color.
///
/// A hex `background-color` in the chip's style replaces the tint. With an
/// `on_click` handler the chip becomes focusable, shades on hover (5%) and
/// press (10%), and fires on mouse release and on the Enter key.
///
/// Building without a [`Theme`] above fails with
/// [`Error::MissingAncestor`](crate::Error::MissingAncestor).
///
/// # Examples
///
/// ```ignore
/// let user = Chip::new(format!("@{name}"))
///     .with_label_style(TextStyle::new().color("#64748b"))
///     .on_click(move || navigator.push("/login"));
/// ```
pub struct Chip {
    element: Element,
    label: Label,
    label_style: TextStyle,
    style: Style,
    leading: Option<WidgetRef>,
    trailing: Option<WidgetRef>,
    on_click: Option<Callback>,
}

impl Chip {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_label(Label::Text(label.into()))
    }

    /// A chip whose label is an arbitrary widget, rendered as-is.
    pub fn with_label_widget(label: WidgetRef) -> Self {
        Self::with_label(Label::Widget(label))
    }

    fn with_label(label: Label) -> Self {
        Self {
            element: Element::new("div"),
            label,
            label_style: TextStyle::new().font_size("14px").font_weight("600"),
            style: BoxDecoration::new()
                .padding("8px 16px")
                .border_radius("24px")
                .style()
                .clone(),
            leading: None,
            trailing: None,
            on_click: None,
        }
    }

    /// Overlay style declarations (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style.merge(&style);
        self
    }

    /// Replace the text label's style (builder). An inherited color falls
    /// back to the theme's `on_tertiary`.
    pub fn with_label_style(mut self, style: TextStyle) -> Self {
        self.label_style = style;
        self
    }

    pub fn leading(mut self, widget: WidgetRef) -> Self {
        self.leading = Some(widget);
        self
    }

    pub fn trailing(mut self, widget: WidgetRef) -> Self {
        self.trailing = Some(widget);
        self
    }

    pub fn on_click(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(callback));
        self
    }

    fn bind_click(&self, cx: &BuildContext, node: NodeId, base: Color, on_click: &Callback) {
        let document = cx.document();
        document.dom_mut().set_attribute(node, "tabindex", "0");
        self.element.merge_style(
            &Style::new()
                .with("cursor", "pointer")
                .with("transition", "all 0.2s ease-in-out"),
        );

        let shade = move |event: &crate::event::Event, color: Color| {
            event
                .document()
                .dom_mut()
                .set_style(node, "background-color", color.to_string());
        };
        self.element.listen(document, EventType::MouseEnter, move |e| shade(e, base.adjust(-5)));
        self.element.listen(document, EventType::MouseLeave, move |e| shade(e, base));
        self.element.listen(document, EventType::MouseDown, move |e| shade(e, base.adjust(-10)));
        let on_release = Rc::clone(on_click);
        self.element.listen(document, EventType::MouseUp, move |e| {
            shade(e, base.adjust(-5));
            on_release();
        });
        let on_enter = Rc::clone(on_click);
        self.element.listen(document, EventType::KeyDown, move |e| {
            if e.key() == Some("Enter") {
                on_enter();
            }
        });
    }
}

impl Widget for Chip {
    fn widget_type(&self) -> &str {
        "Chip"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let theme = Theme::of(cx)?;
        let node = self.element.reset(cx.document());
        let scheme = &theme.color_scheme;
        let base = self
            .style
            .get("background-color")
            .and_then(Color::from_hex)
            .unwrap_or_else(|| scheme.tertiary.with_opacity(0.1));

        self.element.merge_style(
            &Style::new()
                .with("background-color", base.to_string())
                .merged(&self.style),
        );
        if let Some(on_click) = &self.on_click {
            self.bind_click(cx, node, base, on_click);
        }

        if let Some(leading) = &self.leading {
            cx.append_child(Rc::clone(leading))?;
        }
        match &self.label {
            Label::Text(text) => {
                let mut style = self.label_style.style().clone();
                if matches!(style.get("color"), None | Some("inherit")) {
                    style.set("color", scheme.on_tertiary.to_string());
                }
                cx.append_child(Rc::new(Text::new(text.clone()).with_style(style)))?;
            }
            Label::Widget(widget) => cx.append_child(Rc::clone(widget))?,
        }
        if let Some(trailing) = &self.trailing {
            cx.append_child(Rc::clone(trailing))?;
        }
        Ok(Some(node))
    }
}
