//! Tap and long-press recognition around a child widget.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::binding::Element;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::event::EventType;
use crate::schedule::CancelToken;
use crate::widget::{BuildContext, Widget, WidgetRef};
use crate::widgets::button::Callback;

/// How long the pointer must stay down before a long press fires.
pub const LONG_PRESS: Duration = Duration::from_millis(500);

/// Handlers recognized by [`bind_gestures`].
#[derive(Clone, Default)]
pub(crate) struct Gestures {
    pub on_tap: Option<Callback>,
    pub on_long_press: Option<Callback>,
}

/// Bind tap and long-press recognition to `element`'s node.
///
/// A tap is a click. A long press is a mouse-down held for [`LONG_PRESS`];
/// releasing or leaving the node first cancels it.
pub(crate) fn bind_gestures(element: &Element, document: &Document, gestures: &Gestures) {
    if let Some(on_tap) = gestures.on_tap.clone() {
        element.listen(document, EventType::Click, move |_| on_tap());
    }
    let Some(on_long_press) = gestures.on_long_press.clone() else {
        return;
    };

    let pending: Rc<RefCell<Option<CancelToken>>> = Rc::default();
    let timer = Rc::clone(&pending);
    element.listen(document, EventType::MouseDown, move |event| {
        let on_long_press = Rc::clone(&on_long_press);
        let token = event.document().set_timeout(LONG_PRESS, move |_| {
            trace!("long press");
            on_long_press();
        });
        if let Some(previous) = timer.borrow_mut().replace(token) {
            previous.cancel();
        }
    });
    for kind in [EventType::MouseUp, EventType::MouseLeave] {
        let timer = Rc::clone(&pending);
        element.listen(document, kind, move |_| {
            if let Some(token) = timer.borrow_mut().take() {
                token.cancel();
            }
        });
    }
}

/// Recognizes taps and long presses on its child without any visuals.
///
/// # Examples
///
/// ```ignore
/// let row = GestureDetector::new(RoomTile::new(room).into_ref())
///     .on_tap(move || open(&id))
///     .on_long_press(move || show_menu(&id));
/// ```
pub struct GestureDetector {
    element: Element,
    child: WidgetRef,
    gestures: Gestures,
}

impl GestureDetector {
    pub fn new(child: WidgetRef) -> Self {
        Self {
            element: Element::new("div"),
            child,
            gestures: Gestures::default(),
        }
    }

    pub fn on_tap(mut self, callback: impl Fn() + 'static) -> Self {
        self.gestures.on_tap = Some(Rc::new(callback));
        self
    }

    pub fn on_long_press(mut self, callback: impl Fn() + 'static) -> Self {
        self.gestures.on_long_press = Some(Rc::new(callback));
        self
    }
}

impl Widget for GestureDetector {
    fn widget_type(&self) -> &str {
        "GestureDetector"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        bind_gestures(&self.element, cx.document(), &self.gestures);
        cx.append_child(Rc::clone(&self.child))?;
        Ok(Some(node))
    }
}
