//! App: root composition, mounting, and the frame loop.
//!
//! [`App`] owns a [`Document`] and the root widget stack
//! `Theme > MediaQuery > ScaffoldMessenger > Navigator(home)`. It can be
//! mounted synchronously ([`App::mount`]), on the first idle pass
//! ([`App::run_app`]), or driven by a tokio interval ([`App::run`]).

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::LocalSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::binding::{Element, Props};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::schedule::CancelToken;
use crate::widget::{BuildContext, Widget, WidgetRef};
use crate::widgets::media::{MediaQuery, MediaQueryData};
use crate::widgets::messenger::ScaffoldMessenger;
use crate::widgets::navigator::Navigator;
use crate::widgets::theme::{Theme, ThemeData};

const LOADING: &str = "Loading...";
const APPLYING_THEME: &str = "Apply Theme...";

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Optional window/app title.
    pub title: Option<String>,
    /// Initial viewport published through [`MediaQuery`].
    pub viewport: Size,
    pub device_pixel_ratio: f32,
    /// Target frames per second for the run loop.
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            viewport: Size::new(1280.0, 720.0),
            device_pixel_ratio: 1.0,
            fps: 60,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Set the target FPS (builder).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Time between frames. A zero fps is treated as one.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

// ---------------------------------------------------------------------------
// Root widget
// ---------------------------------------------------------------------------

/// Viewport-filling `div` holding the theme.
struct AppRoot {
    element: Element,
    child: WidgetRef,
}

impl Widget for AppRoot {
    fn widget_type(&self) -> &str {
        "App"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        let node = self.element.reset(cx.document());
        cx.append_child(Rc::clone(&self.child))?;
        Ok(Some(node))
    }
}

/// Build `root` and make it the body's only child.
fn mount_root(root: &WidgetRef, document: &Document) -> Result<NodeId> {
    let cx = BuildContext::new(Rc::clone(root), document.clone());
    let node = root
        .build(&cx)?
        .ok_or(Error::ContextUnavailable { widget: "App" })?;
    let mut dom = document.dom_mut();
    let body = dom.body();
    dom.clear_children(body);
    dom.set_style(body, "overflow", "hidden");
    dom.append_child(body, node)?;
    Ok(node)
}

/// Replace the body's content with a status line.
fn show_placeholder(document: &Document, text: &str) -> Result<()> {
    let mut dom = document.dom_mut();
    let body = dom.body();
    dom.clear_children(body);
    let line = dom.create_text(text);
    dom.append_child(body, line)
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The application: a document plus the root widget stack.
///
/// # Examples
///
/// ```ignore
/// let app = App::new(AppConfig::new().with_title("Rooms"), ThemeData::default(), home);
/// app.run(async { let _ = shutdown_rx.await; }).await?;
/// ```
pub struct App {
    config: AppConfig,
    document: Document,
    root: WidgetRef,
    theme: Rc<Theme>,
    media: Rc<MediaQuery>,
    messenger: Rc<ScaffoldMessenger>,
    navigator: Rc<Navigator>,
    lifetime: CancelToken,
}

impl App {
    pub fn new(config: AppConfig, theme: ThemeData, home: WidgetRef) -> Self {
        Self::with_document(config, theme, home, Document::new())
    }

    /// Build into an existing document.
    pub fn with_document(config: AppConfig, theme: ThemeData, home: WidgetRef, document: Document) -> Self {
        let navigator = Navigator::new(Some(home));
        let messenger = ScaffoldMessenger::wrap(navigator.clone());
        let media = MediaQuery::new(
            MediaQueryData::new(config.viewport, config.device_pixel_ratio),
            messenger.clone(),
        );
        let theme = Theme::new(theme, media.clone());
        let root: WidgetRef = Rc::new(AppRoot {
            element: Element::with_props(
                "div",
                Props::new()
                    .with_style("width", "100vw")
                    .with_style("height", "100vh")
                    .with_style("margin", "0")
                    .with_style("padding", "0")
                    .with_style("overflow", "hidden"),
            ),
            child: theme.clone(),
        });
        Self {
            config,
            document,
            root,
            theme,
            media,
            messenger,
            navigator,
            lifetime: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn theme(&self) -> &Rc<Theme> {
        &self.theme
    }

    pub fn media(&self) -> &Rc<MediaQuery> {
        &self.media
    }

    pub fn messenger(&self) -> &Rc<ScaffoldMessenger> {
        &self.messenger
    }

    pub fn navigator(&self) -> &Rc<Navigator> {
        &self.navigator
    }

    /// The root node, once mounted.
    pub fn root_node(&self) -> Option<NodeId> {
        self.root.element().node_id()
    }

    /// Build now and attach to the body.
    pub fn mount(&self) -> Result<()> {
        let node = mount_root(&self.root, &self.document)?;
        info!(title = ?self.config.title, ?node, "app mounted");
        Ok(())
    }

    /// Show a loading line and mount on the next idle pass.
    pub fn run_app(&self) -> Result<()> {
        show_placeholder(&self.document, LOADING)?;
        let root = Rc::clone(&self.root);
        self.document.request_idle_with(&self.lifetime, move |doc| {
            if let Err(err) = mount_root(&root, doc) {
                warn!(%err, "app mount failed");
            }
        });
        Ok(())
    }

    /// Swap the theme tokens. The body shows a placeholder until the next
    /// idle pass rebuilds the whole tree.
    pub fn set_theme(&self, data: ThemeData) -> Result<()> {
        self.theme.replace_data(data);
        show_placeholder(&self.document, APPLYING_THEME)?;
        let root = Rc::clone(&self.root);
        self.document.request_idle_with(&self.lifetime, move |doc| {
            debug!("applying theme");
            if let Err(err) = mount_root(&root, doc) {
                warn!(%err, "theme rebuild failed");
            }
        });
        Ok(())
    }

    /// Publish a new viewport size; dependents rebuild at once.
    pub fn resize(&self, size: Size) -> Result<()> {
        let current = self.media.data();
        let data = MediaQueryData {
            size,
            ..MediaQueryData::clone(&current)
        };
        self.media.set_data(Rc::new(data))
    }

    /// Advance the document clock.
    pub fn tick(&self, dt: Duration) -> usize {
        self.document.tick(dt)
    }

    /// Mount on idle, then tick every frame interval until `shutdown`
    /// resolves. Futures spawned by widgets run on the loop's `LocalSet`.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let local = LocalSet::new();
        local
            .run_until(async {
                self.run_app()?;
                let mut interval = tokio::time::interval(self.config.frame_interval());
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                tokio::pin!(shutdown);
                let mut last = Instant::now();
                loop {
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = interval.tick() => {
                            let now = Instant::now();
                            self.document.tick(now - last);
                            last = now;
                        }
                    }
                }
                Ok::<(), Error>(())
            })
            .await?;
        info!("app stopped");
        Ok(())
    }

    /// Cancel pending work and tear down the root stack.
    pub fn dispose(&self) {
        self.lifetime.cancel();
        self.navigator.dispose();
        self.messenger.dispose();
        self.media.inherited_state().dispose();
        self.theme.inherited_state().dispose();
        let mut dom = self.document.dom_mut();
        let body = dom.body();
        dom.clear_children(body);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
