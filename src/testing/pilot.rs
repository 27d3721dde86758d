//! Pilot: programmatic interaction with a headless App.
//!
//! The `Pilot` wraps a mounted [`App`](crate::app::App) and provides methods
//! to advance the frame clock, simulate user input (clicks, typing, keys) and
//! inspect the surface for snapshot testing.

use std::time::Duration;

use tracing::warn;

use crate::app::App;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::event::EventType;

/// Frames [`Pilot::settle`] runs before giving up.
const SETTLE_LIMIT: usize = 600;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// # Examples
///
/// ```ignore
/// use sapling::testing::Pilot;
///
/// let pilot = Pilot::new(App::new(AppConfig::new(), ThemeData::default(), home))?;
/// pilot.click_text("Join");
/// pilot.settle();
/// assert!(pilot.text().contains("general"));
/// ```
pub struct Pilot {
    app: App,
}

impl Pilot {
    /// Mount `app` and let its entry transitions finish.
    pub fn new(app: App) -> Result<Self> {
        app.mount()?;
        let pilot = Self { app };
        pilot.settle();
        Ok(pilot)
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn document(&self) -> &Document {
        self.app.document()
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Advance one frame interval.
    pub fn tick(&self) -> usize {
        self.app.tick(self.app.config().frame_interval())
    }

    /// Advance by at least `duration`, one frame at a time.
    pub fn advance(&self, duration: Duration) {
        let frame = self.app.config().frame_interval();
        let mut elapsed = Duration::ZERO;
        while elapsed < duration {
            self.app.tick(frame);
            elapsed += frame;
        }
    }

    /// Tick until nothing is queued or animating. Returns `false` if the
    /// surface was still busy after many frames (e.g. a repeating timer).
    pub fn settle(&self) -> bool {
        for _ in 0..SETTLE_LIMIT {
            if self.document().is_settled() {
                return true;
            }
            self.tick();
        }
        warn!(frames = SETTLE_LIMIT, "surface did not settle");
        false
    }

    /// Run queued idle callbacks without moving the clock.
    pub fn run_idle(&self) -> usize {
        self.document().run_idle()
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Dispatch a click on `node`.
    pub fn click(&self, node: NodeId) {
        self.document().dispatch(node, EventType::Click, None);
    }

    /// Click the first element showing exactly `text`. Returns whether one
    /// was found.
    pub fn click_text(&self, text: &str) -> bool {
        let found = self.find_text(text);
        if let Some(node) = found {
            self.click(node);
        }
        found.is_some()
    }

    /// Simulate typing `text` into `node`: one `Input` event per character,
    /// each carrying the value so far.
    pub fn type_text(&self, node: NodeId, text: &str) {
        let mut value = self
            .document()
            .dom()
            .attribute(node, "value")
            .unwrap_or_default()
            .to_owned();
        for ch in text.chars() {
            value.push(ch);
            self.document()
                .dispatch(node, EventType::Input, Some(value.clone()));
        }
    }

    /// Simulate a key press on `node`.
    pub fn press_key(&self, node: NodeId, key: &str) {
        self.document()
            .dispatch(node, EventType::KeyDown, Some(key.to_owned()));
    }

    pub fn press_enter(&self, node: NodeId) {
        self.press_key(node, "Enter");
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn find_text(&self, text: &str) -> Option<NodeId> {
        self.document().dom().query_by_text(text)
    }

    /// First attached element with the given tag.
    pub fn find_tag(&self, tag: &str) -> Option<NodeId> {
        self.document().dom().query_by_tag(tag).first().copied()
    }

    /// All text under `body`.
    pub fn text(&self) -> String {
        let doc = self.document();
        doc.text_content(doc.body())
    }

    /// Outline of the mounted tree.
    pub fn snapshot(&self) -> String {
        super::snapshot::body_to_string(self.document())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::widget::WidgetExt;
    use crate::widgets::{Button, Container, Route, Text, TextField, ThemeData};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pilot_with(home: crate::widget::WidgetRef) -> Pilot {
        Pilot::new(App::new(AppConfig::new(), ThemeData::default(), home)).unwrap()
    }

    #[test]
    fn new_mounts_and_settles() {
        let pilot = pilot_with(Text::new("Rooms").into_ref());
        assert_eq!(pilot.text(), "Rooms");
        assert!(pilot.document().is_settled());
    }

    #[test]
    fn click_text_reaches_button() {
        let clicks = Rc::new(RefCell::new(0));
        let c = Rc::clone(&clicks);
        let pilot = pilot_with(Button::new("Join").on_pressed(move || *c.borrow_mut() += 1).into_ref());
        assert!(pilot.click_text("Join"));
        assert!(!pilot.click_text("Leave"));
        assert_eq!(*clicks.borrow(), 1);
    }

    #[test]
    fn type_text_then_enter() {
        let submitted = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&submitted);
        let field = TextField::new().on_submitted(move |v| s.borrow_mut().push(v.to_owned()));
        let pilot = pilot_with(field.into_ref());
        let input = pilot.find_tag("input").unwrap();

        pilot.type_text(input, "hi");
        pilot.type_text(input, "!");
        pilot.press_enter(input);
        assert_eq!(*submitted.borrow(), vec!["hi!"]);
    }

    #[test]
    fn advance_runs_navigation() {
        let page = Container::column()
            .with_child(Text::new("lobby").into_ref())
            .into_ref();
        let pilot = pilot_with(page);
        pilot
            .app()
            .navigator()
            .push_route(Route::to(Text::new("chat").into_ref()))
            .unwrap();
        pilot.advance(Duration::from_millis(400));
        assert!(pilot.settle());
        assert_eq!(pilot.text(), "chat");
        assert!(pilot.app().navigator().can_pop_route());
    }

    #[test]
    fn snapshot_shows_route_container() {
        let pilot = pilot_with(Text::new("home").into_ref());
        let outline = pilot.snapshot();
        assert!(outline.contains(r#"[data-route="/"]"#));
        assert!(outline.contains(r#""home""#));
    }
}
