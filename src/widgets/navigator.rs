//! Navigator: a stack of routes with slide transitions between pages.
//!
//! Each visible page lives in its own absolutely positioned container under
//! the navigator's node. A push slides the new container in from its
//! route's `enter` offset while the outgoing one slides to `exit`; a pop
//! plays the same animation mirrored. The outgoing container is discarded
//! when its transition ends.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::binding::{Element, Props};
use crate::dom::document::Document;
use crate::dom::node::{NodeData, NodeId};
use crate::error::Result;
use crate::event::EventType;
use crate::geometry::Transform;
use crate::schedule::{CancelToken, Curve};
use crate::widget::{inherited_of, BuildContext, InheritedState, InheritedWidget, Widget, WidgetRef};

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// How a route's page slides in and out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteAnimation {
    pub duration: Duration,
    pub curve: Curve,
    /// Where an incoming page starts on push (and where a popped page goes).
    pub enter: Transform,
    /// Where a covered page goes on push (and where a revealed page starts).
    pub exit: Transform,
}

impl Default for RouteAnimation {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            curve: Curve::Ease,
            enter: Transform::translate_x(100.0),
            exit: Transform::translate_x(-100.0),
        }
    }
}

type PageBuilder = Rc<dyn Fn(&BuildContext) -> Result<WidgetRef>>;

/// A page description: a builder plus its transition.
#[derive(Clone)]
pub struct Route {
    builder: PageBuilder,
    animation: RouteAnimation,
    name: Option<String>,
}

impl Route {
    pub fn new(builder: impl Fn(&BuildContext) -> Result<WidgetRef> + 'static) -> Self {
        Self {
            builder: Rc::new(builder),
            animation: RouteAnimation::default(),
            name: None,
        }
    }

    /// A route that always shows the same widget.
    pub fn to(page: WidgetRef) -> Self {
        Self::new(move |_| Ok(Rc::clone(&page)))
    }

    pub fn with_animation(mut self, animation: RouteAnimation) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.animation.duration = duration;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn animation(&self) -> &RouteAnimation {
        &self.animation
    }

    /// Produce the page widget. Runs against the navigator's context.
    pub fn build(&self, cx: &BuildContext) -> Result<WidgetRef> {
        (self.builder)(cx)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// The page currently on screen.
struct Visible {
    container: NodeId,
    page: WidgetRef,
}

/// Route stack widget. Find it from below with [`Navigator::push`] and friends.
pub struct Navigator {
    element: Element,
    inherited: InheritedState,
    initial: Option<WidgetRef>,
    stack: RefCell<Vec<Route>>,
    visible: RefCell<Option<Visible>>,
    lifetime: CancelToken,
}

impl Navigator {
    /// `initial` becomes the first route at the first build.
    pub fn new(initial: Option<WidgetRef>) -> Rc<Self> {
        Rc::new(Self {
            element: Element::with_props(
                "div",
                Props::new()
                    .with_style("position", "fixed")
                    .with_style("top", "0")
                    .with_style("left", "0")
                    .with_style("width", "100%")
                    .with_style("height", "100%")
                    .with_style("overflow", "hidden"),
            ),
            inherited: InheritedState::new(Self::KIND),
            initial,
            stack: RefCell::new(Vec::new()),
            visible: RefCell::new(None),
            lifetime: CancelToken::new(),
        })
    }

    /// The nearest navigator above `cx`.
    pub fn of(cx: &BuildContext) -> Result<Rc<Navigator>> {
        inherited_of::<Navigator>(cx)
    }

    pub fn push(cx: &BuildContext, route: Route) -> Result<()> {
        Self::of(cx)?.push_route(route)
    }

    pub fn pop(cx: &BuildContext) -> Result<()> {
        Self::of(cx)?.pop_route()
    }

    pub fn push_replacement(cx: &BuildContext, route: Route) -> Result<()> {
        Self::of(cx)?.push_replacement_route(route)
    }

    /// `false` when there is no navigator above `cx`.
    pub fn can_pop(cx: &BuildContext) -> bool {
        Self::of(cx).map(|nav| nav.can_pop_route()).unwrap_or(false)
    }

    /// Push `route` and slide its page in.
    pub fn push_route(&self, route: Route) -> Result<()> {
        let visible = self.show(&route, true)?;
        self.stack.borrow_mut().push(route);
        *self.visible.borrow_mut() = Some(visible);
        debug!(depth = self.depth(), "route pushed");
        Ok(())
    }

    /// Pop the top route and reveal the one below. A no-op on the last route.
    pub fn pop_route(&self) -> Result<()> {
        if !self.can_pop_route() {
            debug!("pop ignored on the last route");
            return Ok(());
        }
        let revealed = {
            let mut stack = self.stack.borrow_mut();
            stack.pop();
            stack.last().cloned()
        };
        if let Some(route) = revealed {
            let visible = self.show(&route, false)?;
            *self.visible.borrow_mut() = Some(visible);
        }
        debug!(depth = self.depth(), "route popped");
        Ok(())
    }

    /// Replace the top route: the old entry leaves the stack without an
    /// animation of its own and the new page slides in over it.
    pub fn push_replacement_route(&self, route: Route) -> Result<()> {
        self.stack.borrow_mut().pop();
        self.push_route(route)
    }

    pub fn can_pop_route(&self) -> bool {
        self.stack.borrow().len() > 1
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// The top route, if any.
    pub fn current(&self) -> Option<Route> {
        self.stack.borrow().last().cloned()
    }

    /// The widget on screen.
    pub fn current_page(&self) -> Option<WidgetRef> {
        self.visible.borrow().as_ref().map(|v| Rc::clone(&v.page))
    }

    pub fn inherited_state(&self) -> &InheritedState {
        &self.inherited
    }

    /// Cancel pending animation frames and drop the visible page.
    pub fn dispose(&self) {
        self.lifetime.cancel();
        self.stack.borrow_mut().clear();
        let visible = self.visible.borrow_mut().take();
        if let (Some(visible), Ok(cx)) = (visible, self.inherited.context()) {
            cx.document().dom_mut().discard(visible.container);
        }
        self.inherited.dispose();
    }

    /// Build `route` into a fresh container and schedule the slide.
    fn show(&self, route: &Route, forward: bool) -> Result<Visible> {
        let cx = self.inherited.context()?;
        let document = cx.document().clone();
        let animation = route.animation;

        let page = route.build(&cx)?;
        let page_cx = cx.for_child(&page);
        let page_node = page.build(&page_cx)?;

        let start = if forward { animation.enter } else { animation.exit };
        let container = {
            let mut dom = document.dom_mut();
            let container = dom.insert(
                NodeData::element("div")
                    .owned(true)
                    .with_attribute("data-route", route.name().unwrap_or("anonymous"))
                    .with_style("position", "absolute")
                    .with_style("top", "0")
                    .with_style("left", "0")
                    .with_style("width", "100%")
                    .with_style("height", "100%")
                    .with_style("transform", start.to_string()),
            );
            match page_node {
                Some(node) => dom.append_child(container, node)?,
                None => warn!(page = page.widget_type(), "route page produced no node"),
            }
            container
        };
        let nav_node = self.element.node(&document);
        document.dom_mut().append_child(nav_node, container)?;

        let outgoing = self.visible.borrow_mut().take();
        let leave = if forward { animation.exit } else { animation.enter };
        document.request_frame_with(&self.lifetime, move |doc| {
            doc.start_transition(container, start, Transform::IDENTITY, animation.duration, animation.curve);
            let Some(outgoing) = outgoing else {
                return;
            };
            let Visible { container: old, page } = outgoing;
            doc.start_transition(old, Transform::IDENTITY, leave, animation.duration, animation.curve);
            doc.add_listener_once(
                old,
                EventType::TransitionEnd,
                Rc::new(move |event| {
                    // The page stays alive until its container leaves.
                    let _page = &page;
                    event.document().dom_mut().discard(old);
                }),
            );
        });

        Ok(Visible { container, page })
    }
}

impl Widget for Navigator {
    fn widget_type(&self) -> &str {
        "Navigator"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    /// Route containers persist across rebuilds, so the node is not reset.
    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        self.inherited.begin_build(cx, || self.update_should_notify());
        let node = self.element.node(cx.document());
        if self.visible.borrow().is_none() {
            if let Some(initial) = &self.initial {
                self.push_route(Route::to(Rc::clone(initial)).named("/"))?;
            }
        }
        Ok(Some(node))
    }
}

impl InheritedWidget for Navigator {
    const KIND: &'static str = "Navigator";

    fn inherited(&self) -> &InheritedState {
        &self.inherited
    }

    fn update_should_notify(&self) -> bool {
        false
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("depth", &self.depth())
            .field("cancelled", &self.lifetime.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Convenience for tests and apps: mount `navigator` directly under `body`.
pub fn mount_navigator(navigator: &Rc<Navigator>, document: &Document) -> Result<BuildContext> {
    let widget: WidgetRef = Rc::clone(navigator) as WidgetRef;
    let cx = BuildContext::new(widget, document.clone());
    if let Some(node) = navigator.build(&cx)? {
        let body = document.body();
        document.dom_mut().append_child(body, node)?;
    }
    Ok(cx)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::widgets::builder::Builder;
    use crate::widgets::text::Text;

    fn settle(doc: &Document) {
        for _ in 0..100 {
            doc.tick(Duration::from_millis(16));
            if doc.is_settled() {
                return;
            }
        }
    }

    fn page(label: &'static str) -> Route {
        Route::new(move |_| Ok(Rc::new(Text::new(label))))
    }

    fn setup() -> (Document, Rc<Navigator>, BuildContext) {
        let doc = Document::new();
        let nav = Navigator::new(Some(Rc::new(Text::new("home"))));
        let cx = mount_navigator(&nav, &doc).unwrap();
        settle(&doc);
        (doc, nav, cx)
    }

    fn containers(doc: &Document, nav: &Navigator) -> usize {
        let node = nav.element().node_id().unwrap();
        doc.dom().children(node).len()
    }

    #[test]
    fn initial_route_pushed_once() {
        let (doc, nav, cx) = setup();
        assert_eq!(nav.depth(), 1);
        assert!(!nav.can_pop_route());
        nav.build(&cx).unwrap();
        assert_eq!(nav.depth(), 1);
        assert_eq!(containers(&doc, &nav), 1);
        assert_eq!(doc.text_content(doc.body()), "home");
    }

    #[test]
    fn push_slides_new_page_in() {
        let (doc, nav, _cx) = setup();
        nav.push_route(page("rooms")).unwrap();
        assert_eq!(nav.depth(), 2);
        assert_eq!(containers(&doc, &nav), 2);

        let node = nav.element().node_id().unwrap();
        let incoming = doc.dom().children(node)[1];
        assert_eq!(doc.dom().style(incoming, "transform"), Some("translateX(100%)"));

        settle(&doc);
        assert_eq!(doc.dom().style(incoming, "transform"), Some("translateX(0%)"));
        assert_eq!(containers(&doc, &nav), 1);
        assert_eq!(doc.text_content(node), "rooms");
    }

    #[test]
    fn push_n_then_pop_back_to_root() {
        let (doc, nav, _cx) = setup();
        for label in ["a", "b", "c"] {
            nav.push_route(page(label)).unwrap();
            settle(&doc);
        }
        assert_eq!(nav.depth(), 4);
        for _ in 0..3 {
            nav.pop_route().unwrap();
            settle(&doc);
        }
        assert_eq!(nav.depth(), 1);
        // Extra pops leave the last route in place.
        nav.pop_route().unwrap();
        nav.pop_route().unwrap();
        assert_eq!(nav.depth(), 1);
        assert_eq!(containers(&doc, &nav), 1);
        assert_eq!(doc.text_content(doc.body()), "home");
    }

    #[test]
    fn pop_mirrors_the_animation() {
        let (doc, nav, _cx) = setup();
        nav.push_route(page("detail")).unwrap();
        settle(&doc);
        nav.pop_route().unwrap();
        let node = nav.element().node_id().unwrap();
        let revealed = doc.dom().children(node)[1];
        assert_eq!(doc.dom().style(revealed, "transform"), Some("translateX(-100%)"));
        settle(&doc);
        assert_eq!(doc.text_content(node), "home");
    }

    #[test]
    fn push_replacement_keeps_depth() {
        let (doc, nav, _cx) = setup();
        nav.push_route(page("login")).unwrap();
        settle(&doc);
        nav.push_replacement_route(page("rooms")).unwrap();
        settle(&doc);
        assert_eq!(nav.depth(), 2);
        nav.pop_route().unwrap();
        settle(&doc);
        assert_eq!(doc.text_content(doc.body()), "home");
    }

    #[test]
    fn static_lookups_from_a_page() {
        let (doc, nav, _cx) = setup();
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        nav.push_route(Route::new(move |_| {
            let s = Rc::clone(&s);
            Ok(Rc::new(Builder::new(move |cx| {
                *s.borrow_mut() = Some(cx.downgrade());
                Ok(Rc::new(Text::new("detail")))
            })))
        }))
        .unwrap();
        settle(&doc);

        let cx = seen.borrow().as_ref().and_then(|w| w.upgrade()).unwrap();
        assert!(Navigator::can_pop(&cx));
        Navigator::pop(&cx).unwrap();
        settle(&doc);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn statics_without_navigator() {
        let doc = Document::new();
        let cx = BuildContext::new(Rc::new(Text::new("lonely")), doc);
        assert!(!Navigator::can_pop(&cx));
        assert_eq!(
            Navigator::push(&cx, page("x")).unwrap_err(),
            Error::MissingAncestor { kind: "Navigator" }
        );
    }

    #[test]
    fn push_before_build_fails() {
        let nav = Navigator::new(None);
        assert_eq!(
            nav.push_route(page("x")).unwrap_err(),
            Error::ContextUnavailable { widget: "Navigator" }
        );
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn dispose_cancels_pending_frames() {
        let (doc, nav, _cx) = setup();
        nav.push_route(page("rooms")).unwrap();
        nav.dispose();
        settle(&doc);
        assert_eq!(nav.depth(), 0);
        assert!(doc.is_settled());
    }
}
