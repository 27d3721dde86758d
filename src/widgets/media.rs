//! MediaQuery: viewport metrics published to the subtree.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::binding::{Element, Props};
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::geometry::{EdgeInsets, Size};
use crate::widget::{inherited_of, rebuild, BuildContext, InheritedState, InheritedWidget, Widget, WidgetRef};

/// Viewport metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQueryData {
    pub size: Size,
    pub device_pixel_ratio: f32,
    pub padding: EdgeInsets,
    pub view_padding: EdgeInsets,
    pub view_insets: EdgeInsets,
}

impl MediaQueryData {
    pub fn new(size: Size, device_pixel_ratio: f32) -> Self {
        Self {
            size,
            device_pixel_ratio,
            padding: EdgeInsets::ZERO,
            view_padding: EdgeInsets::ZERO,
            view_insets: EdgeInsets::ZERO,
        }
    }

    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_view_padding(mut self, view_padding: EdgeInsets) -> Self {
        self.view_padding = view_padding;
        self
    }

    pub fn with_view_insets(mut self, view_insets: EdgeInsets) -> Self {
        self.view_insets = view_insets;
        self
    }
}

impl Default for MediaQueryData {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 720.0), 1.0)
    }
}

impl fmt::Display for MediaQueryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MediaQueryData(size: {}, devicePixelRatio: {}, padding: {}, viewPadding: {}, viewInsets: {})",
            self.size, self.device_pixel_ratio, self.padding, self.view_padding, self.view_insets
        )
    }
}

/// Publishes [`MediaQueryData`]. Dependents rebuild only when the published
/// data is a different allocation than at the previous build.
pub struct MediaQuery {
    element: Element,
    inherited: InheritedState,
    data: RefCell<Rc<MediaQueryData>>,
    published: RefCell<Option<Rc<MediaQueryData>>>,
    child: WidgetRef,
}

impl MediaQuery {
    pub fn new(data: MediaQueryData, child: WidgetRef) -> Rc<Self> {
        Self::shared(Rc::new(data), child)
    }

    /// Publish an existing allocation.
    pub fn shared(data: Rc<MediaQueryData>, child: WidgetRef) -> Rc<Self> {
        Rc::new(Self {
            element: Element::with_props(
                "div",
                Props::new().with_style("width", "100%").with_style("height", "100%"),
            ),
            inherited: InheritedState::new(Self::KIND),
            data: RefCell::new(data),
            published: RefCell::new(None),
            child,
        })
    }

    /// The nearest metrics; registers the caller as a dependent.
    pub fn of(cx: &BuildContext) -> Result<Rc<MediaQueryData>> {
        Ok(inherited_of::<MediaQuery>(cx)?.data())
    }

    pub fn data(&self) -> Rc<MediaQueryData> {
        Rc::clone(&self.data.borrow())
    }

    /// Publish new metrics and rebuild if already built.
    pub fn set_data(&self, data: Rc<MediaQueryData>) -> Result<()> {
        *self.data.borrow_mut() = data;
        match self.inherited.context() {
            Ok(cx) => rebuild(cx.widget(), cx.document()),
            Err(_) => Ok(()),
        }
    }

    pub fn inherited_state(&self) -> &InheritedState {
        &self.inherited
    }
}

impl Widget for MediaQuery {
    fn widget_type(&self) -> &str {
        "MediaQuery"
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn build(&self, cx: &BuildContext) -> Result<Option<NodeId>> {
        self.inherited.begin_build(cx, || self.update_should_notify());
        *self.published.borrow_mut() = Some(self.data());
        let node = self.element.reset(cx.document());
        cx.append_child(Rc::clone(&self.child))?;
        Ok(Some(node))
    }
}

impl InheritedWidget for MediaQuery {
    const KIND: &'static str = "MediaQuery";

    fn inherited(&self) -> &InheritedState {
        &self.inherited
    }

    fn update_should_notify(&self) -> bool {
        match self.published.borrow().as_ref() {
            Some(previous) => !Rc::ptr_eq(previous, &self.data.borrow()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::Document;
    use crate::widgets::builder::Builder;
    use crate::widgets::text::Text;
    use std::cell::Cell;

    fn width_reader(builds: Rc<Cell<u32>>) -> WidgetRef {
        Rc::new(Builder::new(move |cx| {
            builds.set(builds.get() + 1);
            let media = MediaQuery::of(cx)?;
            Ok(Rc::new(Text::new(format!("{}", media.size.width))))
        }))
    }

    fn mount(root: &Rc<MediaQuery>, doc: &Document) {
        let widget: WidgetRef = root.clone();
        let cx = BuildContext::new(widget, doc.clone());
        root.build(&cx).unwrap();
    }

    #[test]
    fn display_format() {
        let data = MediaQueryData::new(Size::new(390.0, 844.0), 3.0);
        assert_eq!(
            data.to_string(),
            "MediaQueryData(size: Size(390, 844), devicePixelRatio: 3, padding: EdgeInsets(0, 0, 0, 0), viewPadding: EdgeInsets(0, 0, 0, 0), viewInsets: EdgeInsets(0, 0, 0, 0))"
        );
    }

    #[test]
    fn of_returns_data() {
        let doc = Document::new();
        let builds = Rc::new(Cell::new(0));
        let media = MediaQuery::new(MediaQueryData::default(), width_reader(Rc::clone(&builds)));
        mount(&media, &doc);
        let node = media.element().node_id().unwrap();
        assert_eq!(doc.text_content(node), "1280");
        assert_eq!(media.inherited_state().dependent_count(), 1);
    }

    #[test]
    fn same_allocation_does_not_notify() {
        let doc = Document::new();
        let builds = Rc::new(Cell::new(0));
        let media = MediaQuery::new(MediaQueryData::default(), width_reader(Rc::clone(&builds)));
        mount(&media, &doc);
        media.set_data(media.data()).unwrap();
        // Initial build plus the subtree rebuild; no notify pass.
        assert_eq!(builds.get(), 2);
    }

    #[test]
    fn new_allocation_notifies() {
        let doc = Document::new();
        let builds = Rc::new(Cell::new(0));
        let media = MediaQuery::new(MediaQueryData::default(), width_reader(Rc::clone(&builds)));
        mount(&media, &doc);
        media
            .set_data(Rc::new(MediaQueryData::new(Size::new(390.0, 844.0), 3.0)))
            .unwrap();
        // Initial build, the notify pass, then the subtree rebuild.
        assert_eq!(builds.get(), 3);
        let node = media.element().node_id().unwrap();
        assert_eq!(doc.text_content(node), "390");
    }
}
