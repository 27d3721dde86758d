//! ScaffoldMessenger: an overlay layer for snack bars and dialogs.
//!
//! The messenger is a stateful widget whose state owns a fixed, full-size
//! overlay node mounted before its child. Descendants reach it with
//! [`ScaffoldMessenger::of`] or the [`show_snack_bar`] / [`show_dialog`]
//! helpers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::binding::{Element, Props};
use crate::dom::document::{Document, WeakDocument};
use crate::dom::node::{NodeData, NodeId};
use crate::dom::style::Style;
use crate::error::{Error, Result};
use crate::event::EventType;
use crate::schedule::CancelToken;
use crate::widget::{BuildContext, Child, State, StateHandle, StatefulWidget, Widget, WidgetRef};
use crate::widgets::button::Callback;
use crate::widgets::container::Container;
use crate::widgets::text::Text;
use crate::widgets::theme::Theme;

/// Time a snack bar needs to slide out before it is removed.
const EXIT_DURATION: Duration = Duration::from_millis(200);

const SHOWN_TRANSFORM: &str = "translate(-50%, 0)";
const HIDDEN_TRANSFORM: &str = "translate(-50%, 100%)";

fn panel_style() -> Style {
    Style::new()
        .with("background-color", "white")
        .with("border-radius", "8px")
        .with("padding", "16px")
        .with("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.15)")
}

// ---------------------------------------------------------------------------
// ScaffoldMessenger
// ---------------------------------------------------------------------------

/// State of a [`ScaffoldMessenger`].
pub struct ScaffoldMessengerState {
    child: WidgetRef,
    overlay: Cell<Option<NodeId>>,
    document: RefCell<WeakDocument>,
    dialogs: RefCell<Vec<WidgetRef>>,
    lifetime: CancelToken,
}

/// The messenger widget.
pub type ScaffoldMessenger = StatefulWidget<ScaffoldMessengerState>;

impl ScaffoldMessenger {
    pub fn wrap(child: WidgetRef) -> Rc<Self> {
        StatefulWidget::with_element(
            "ScaffoldMessenger",
            Element::with_props(
                "div",
                Props::new().with_style("width", "100%").with_style("height", "100%"),
            ),
            ScaffoldMessengerState {
                child,
                overlay: Cell::new(None),
                document: RefCell::new(WeakDocument::default()),
                dialogs: RefCell::new(Vec::new()),
                lifetime: CancelToken::new(),
            },
        )
    }

    /// The nearest messenger above `cx`.
    pub fn of(cx: &BuildContext) -> Result<Rc<Self>> {
        cx.find_parent::<Self>().ok_or(Error::MissingAncestor {
            kind: "ScaffoldMessenger",
        })
    }
}

impl ScaffoldMessengerState {
    /// The overlay node, once built.
    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay.get()
    }

    /// Dialogs still attached to the overlay.
    pub fn open_dialogs(&self) -> usize {
        self.prune_dialogs();
        self.dialogs.borrow().len()
    }

    /// Build `snack_bar` against `cx` and play it: in on the second frame,
    /// out after `duration`, removed 200ms later.
    pub fn show_snack_bar(&self, cx: &BuildContext, snack_bar: SnackBar, duration: Duration) -> Result<()> {
        let overlay = self.overlay.get().ok_or(Error::ContextUnavailable {
            widget: "ScaffoldMessenger",
        })?;
        let document = cx.document();
        let snack: WidgetRef = Rc::new(snack_bar);
        let Some(node) = snack.build(&cx.for_child(&snack))? else {
            warn!("snack bar produced no node");
            return Ok(());
        };
        document.dom_mut().append_child(overlay, node)?;

        let token = self.lifetime.clone();
        document.request_frame_with(&self.lifetime, move |doc| {
            doc.request_frame_with(&token, move |doc| {
                let mut dom = doc.dom_mut();
                dom.set_style(node, "transform", SHOWN_TRANSFORM);
                dom.set_style(node, "opacity", "1");
            });
        });

        let token = self.lifetime.clone();
        document.set_timeout_with(&self.lifetime, duration, move |doc| {
            {
                let mut dom = doc.dom_mut();
                dom.set_style(node, "transform", HIDDEN_TRANSFORM);
                dom.set_style(node, "opacity", "0");
            }
            doc.set_timeout_with(&token, EXIT_DURATION, move |doc| {
                let attached = doc.dom().parent(node) == Some(overlay);
                if attached {
                    doc.dom_mut().detach(node);
                } else {
                    warn!("SnackBar has already been removed from the ScaffoldMessenger");
                }
                drop(snack);
            });
        });
        Ok(())
    }

    /// Build `dialog` against `cx` and put it on the overlay.
    pub fn show_dialog(&self, cx: &BuildContext, dialog: Dialog) -> Result<()> {
        let overlay = self.overlay.get().ok_or(Error::ContextUnavailable {
            widget: "ScaffoldMessenger",
        })?;
        self.prune_dialogs();
        let dialog: WidgetRef = Rc::new(dialog);
        let Some(node) = dialog.build(&cx.for_child(&dialog))? else {
            warn!("dialog produced no node");
            return Ok(());
        };
        cx.document().dom_mut().append_child(overlay, node)?;
        self.dialogs.borrow_mut().push(dialog);
        Ok(())
    }

    fn prune_dialogs(&self) {
        let Some(document) = self.document.borrow().upgrade() else {
            return;
        };
        let closed: Vec<WidgetRef> = {
            let dom = document.dom();
            let mut dialogs = self.dialogs.borrow_mut();
            let (open, closed) = dialogs.drain(..).partition(|d| {
                d.element().node_id().is_some_and(|n| dom.parent(n).is_some())
            });
            *dialogs = open;
            closed
        };
        drop(closed);
    }

    fn overlay_node(&self, document: &Document) -> NodeId {
        if let Some(node) = self.overlay.get() {
            if document.dom().contains(node) {
                return node;
            }
        }
        let node = document.dom_mut().insert(
            NodeData::element("div")
                .owned(true)
                .with_attribute("data-role", "overlay")
                .with_style("position", "fixed")
                .with_style("top", "0")
                .with_style("left", "0")
                .with_style("width", "100%")
                .with_style("height", "100%")
                .with_style("pointer-events", "none")
                .with_style("z-index", "9999"),
        );
        self.overlay.set(Some(node));
        *self.document.borrow_mut() = document.downgrade();
        node
    }
}

impl State for ScaffoldMessengerState {
    fn build(&self, cx: &BuildContext, _handle: &StateHandle<Self>) -> Result<Child> {
        let overlay = self.overlay_node(cx.document());
        cx.append_child(overlay)?;
        Ok(Child::Widget(Rc::clone(&self.child)))
    }

    fn dispose(&mut self) {
        self.lifetime.cancel();
        self.dialogs.borrow_mut().clear();
        if let (Some(node), Some(document)) = (self.overlay.take(), self.document.borrow().upgrade()) {
            document.dom_mut().discard(node);
        }
    }
}

/// Show `snack_bar` on the nearest messenger.
pub fn show_snack_bar(cx: &BuildContext, snack_bar: SnackBar, duration: Duration) -> Result<()> {
    let messenger = ScaffoldMessenger::of(cx)?;
    messenger.read(|state| state.show_snack_bar(cx, snack_bar, duration))
}

/// Show `dialog` on the nearest messenger.
pub fn show_dialog(cx: &BuildContext, dialog: impl Into<Dialog>) -> Result<()> {
    let messenger = ScaffoldMessenger::of(cx)?;
    messenger.read(|state| state.show_dialog(cx, dialog.into()))
}

// ---------------------------------------------------------------------------
// SnackBar
// ---------------------------------------------------------------------------

/// A transient message pinned to the bottom of the screen.
pub struct SnackBar {
    element: Element,
    text: String,
    text_style: Style,
    action: Option<(String, Callback)>,
}

impl SnackBar {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            element: Element::new("div"),
            text: text.into(),
            text_style: Style::new(),
            action: None,
        }
    }

    pub fn text_style(mut self, style: Style) -> Self {
        self.text_style = style;
        self
    }

    /// A trailing text button.
    pub fn action(mut self, label: impl Into<String>, on_pressed: impl Fn() + 'static) -> Self {
        self.action = Some((label.into(), Rc::new(on_pressed)));
        self
    }
}

impl Widget for SnackBar {
    fn widget_type(&self) -> &str {
        "SnackBar"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let theme = Theme::of(cx)?;
        let scheme = &theme.color_scheme;
        let document = cx.document();
        let first_build = self.element.node_id().is_none();
        let node = self.element.reset(document);

        self.element.merge_style(
            &Style::new()
                .with("background-color", scheme.surface.to_string())
                .with("color", scheme.on_surface.to_string())
                .with("position", "fixed")
                .with("bottom", "24px")
                .with("left", "50%")
                .with("padding", "14px 24px")
                .with("border-radius", "8px")
                .with("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.15)")
                .with("display", "flex")
                .with("align-items", "center")
                .with("justify-content", "space-between")
                .with("min-width", "320px")
                .with("max-width", "640px")
                .with("pointer-events", "auto")
                .with("transition", "transform 0.2s ease-out, opacity 0.2s ease-out")
                .with("font-size", "14px"),
        );
        // Later rebuilds (theme changes) must not undo the slide-in.
        if first_build {
            self.element.merge_style(
                &Style::new()
                    .with("transform", HIDDEN_TRANSFORM)
                    .with("opacity", "0"),
            );
        }

        let text_style = self
            .text_style
            .merged(&Style::new().with("color", scheme.on_surface.to_string()));
        cx.append_child(Rc::new(Text::new(self.text.as_str()).with_style(text_style)))?;

        if let Some((label, on_pressed)) = &self.action {
            let button = {
                let mut dom = document.dom_mut();
                let button = dom.insert(
                    NodeData::element("button")
                        .with_style("margin-left", "16px")
                        .with_style("padding", "8px 16px")
                        .with_style("background-color", "transparent")
                        .with_style("border", "none")
                        .with_style("color", scheme.on_surface.to_string())
                        .with_style("cursor", "pointer")
                        .with_style("font-size", "14px")
                        .with_style("font-weight", "600")
                        .with_style("text-transform", "uppercase")
                        .with_style("transition", "opacity 0.2s ease-in-out"),
                );
                let label = dom.create_text(label.as_str());
                dom.append_child(button, label)?;
                button
            };
            let on_pressed = Rc::clone(on_pressed);
            document.add_listener(button, EventType::Click, Rc::new(move |_| on_pressed()));
            for (kind, opacity) in [(EventType::MouseEnter, "0.8"), (EventType::MouseLeave, "1")] {
                document.add_listener(
                    button,
                    kind,
                    Rc::new(move |e| e.document().dom_mut().set_style(button, "opacity", opacity)),
                );
            }
            cx.append_child(button)?;
        }
        Ok(Some(node))
    }
}

// ---------------------------------------------------------------------------
// Dialog
// ---------------------------------------------------------------------------

/// A modal panel over a dimmed backdrop. Clicking the backdrop closes it.
pub struct Dialog {
    element: Element,
    child: WidgetRef,
    on_close: Option<Callback>,
}

impl Dialog {
    /// Show `content` inside a white panel.
    pub fn new(content: WidgetRef) -> Self {
        let panel = Container::new().with_style(panel_style()).with_child(content);
        Self::with_panel(Rc::new(panel))
    }

    fn with_panel(child: WidgetRef) -> Self {
        Self {
            element: Element::with_props(
                "div",
                Props::new()
                    .with_style("position", "fixed")
                    .with_style("top", "0")
                    .with_style("left", "0")
                    .with_style("width", "100%")
                    .with_style("height", "100%")
                    .with_style("background-color", "rgba(0, 0, 0, 0.5)")
                    .with_style("display", "flex")
                    .with_style("justify-content", "center")
                    .with_style("align-items", "center")
                    .with_style("pointer-events", "auto")
                    .with_style("z-index", "9999"),
            ),
            child,
            on_close: None,
        }
    }

    pub fn on_close(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(callback));
        self
    }
}

impl Widget for Dialog {
    fn widget_type(&self) -> &str {
        "Dialog"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let document = cx.document();
        let node = self.element.reset(document);
        cx.append_child(Rc::clone(&self.child))?;

        let on_close = self.on_close.clone();
        self.element.listen(document, EventType::Click, move |e| {
            if e.target != node {
                return;
            }
            debug!("dialog dismissed");
            e.document().dom_mut().detach(node);
            if let Some(callback) = &on_close {
                callback();
            }
        });
        Ok(Some(node))
    }
}

/// A dialog with a bold title above a line of text.
pub struct AlertDialog {
    title: String,
    content: String,
    on_close: Option<Callback>,
}

impl AlertDialog {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            on_close: None,
        }
    }

    pub fn on_close(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(callback));
        self
    }
}

impl From<AlertDialog> for Dialog {
    fn from(alert: AlertDialog) -> Self {
        let title = Text::new(alert.title).with_style(
            Style::new().with("font-size", "18px").with("font-weight", "bold"),
        );
        let content = Text::new(alert.content).with_style(Style::new().with("margin-top", "8px"));
        let panel = Container::column()
            .with_style(panel_style())
            .with_child(Rc::new(title))
            .with_child(Rc::new(content));
        let mut dialog = Dialog::with_panel(Rc::new(panel));
        dialog.on_close = alert.on_close;
        dialog
    }
}

// ===========================================================================
// Tests
// ===========================================================================
