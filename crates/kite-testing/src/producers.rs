//! Ready-made producers for exercising the pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kite_core::{
    Capabilities, Children, Controller, Element, Key, Producer, RenderContext, StateBox,
    ViewAttribute, ViewClass, ViewConfiguration,
};
use kite_ui_layout::{
    ComponentSize, FlexItem, FlexboxSpec, FlexboxStyle, IntrinsicMeasure, LayoutPolicy,
};

use crate::recording::{EventLog, RecordingController};

/// Attribute carrying a label's text.
pub const TEXT: ViewAttribute = ViewAttribute::resettable("text");
/// Attribute that participates in the pool key.
pub const STYLE: ViewAttribute = ViewAttribute::persistent("style");

/// Stateless leaf with an optional view and a fixed or measured size.
#[derive(Clone)]
pub struct TestLeaf {
    pub label: &'static str,
    size: ComponentSize,
    view: Option<ViewConfiguration>,
    measure: Option<Arc<dyn IntrinsicMeasure>>,
}

impl TestLeaf {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            size: ComponentSize::auto(),
            view: None,
            measure: None,
        }
    }

    pub fn sized(label: &'static str, width: f32, height: f32) -> Self {
        Self::new(label).with_size(ComponentSize::fixed(width, height))
    }

    pub fn with_size(mut self, size: ComponentSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_view(mut self, view: ViewConfiguration) -> Self {
        self.view = Some(view);
        self
    }

    /// Shows `label` as the `text` attribute of a `class` view.
    pub fn with_text_view(self, class: ViewClass) -> Self {
        let text = self.label;
        self.with_view(ViewConfiguration::new(class).with(TEXT, text))
    }

    pub fn with_measure(
        mut self,
        measure: impl Fn(kite_ui_layout::SizeRange) -> kite_ui_graphics::Size + Send + Sync + 'static,
    ) -> Self {
        self.measure = Some(Arc::new(measure));
        self
    }

    pub fn element(self) -> Element {
        Arc::new(self)
    }
}

impl Producer for TestLeaf {
    fn view(&self) -> Option<ViewConfiguration> {
        self.view.clone()
    }

    fn size(&self) -> ComponentSize {
        self.size
    }

    fn layout_policy(&self) -> LayoutPolicy {
        match &self.measure {
            Some(measure) => LayoutPolicy::Measure(measure.clone()),
            None => LayoutPolicy::Leaf,
        }
    }
}

/// Reuse-aware flexbox container that counts its renders.
#[derive(Clone)]
pub struct TestStack {
    key: Option<Key>,
    spec: FlexboxSpec,
    children: Vec<Element>,
    view: Option<ViewConfiguration>,
    size: ComponentSize,
    renders: Arc<AtomicUsize>,
}

impl TestStack {
    pub fn new(style: FlexboxStyle, children: Vec<Element>) -> Self {
        Self {
            key: None,
            spec: FlexboxSpec::new(style),
            children,
            view: None,
            size: ComponentSize::auto(),
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn row(children: Vec<Element>) -> Self {
        Self::new(FlexboxStyle::row(), children)
    }

    pub fn column(children: Vec<Element>) -> Self {
        Self::new(FlexboxStyle::column(), children)
    }

    pub fn with_items(mut self, items: Vec<FlexItem>) -> Self {
        self.spec = self.spec.with_items(items);
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_view(mut self, view: ViewConfiguration) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_size(mut self, size: ComponentSize) -> Self {
        self.size = size;
        self
    }

    /// Shares a render counter across successive producers.
    pub fn with_render_counter(mut self, renders: Arc<AtomicUsize>) -> Self {
        self.renders = renders;
        self
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn element(self) -> Element {
        Arc::new(self)
    }
}

impl Producer for TestStack {
    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTI.reuse_aware()
    }

    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Children::Many(self.children.clone())
    }

    fn scope_key(&self) -> Option<Key> {
        self.key
    }

    fn view(&self) -> Option<ViewConfiguration> {
        self.view.clone()
    }

    fn size(&self) -> ComponentSize {
        self.size
    }

    fn layout_policy(&self) -> LayoutPolicy {
        LayoutPolicy::Flexbox(self.spec.clone())
    }
}

/// Stateful counter rendering a label whose text is the current count.
#[derive(Clone)]
pub struct CounterProducer {
    key: Option<Key>,
    start: i32,
    label_view: Option<ViewClass>,
    controller: Option<(String, EventLog)>,
}

impl CounterProducer {
    pub fn new(start: i32) -> Self {
        Self {
            key: None,
            start,
            label_view: None,
            controller: None,
        }
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_label_view(mut self, class: ViewClass) -> Self {
        self.label_view = Some(class);
        self
    }

    /// Attaches a [`RecordingController`] named `name` to every handle.
    pub fn with_controller(mut self, name: impl Into<String>, log: EventLog) -> Self {
        self.controller = Some((name.into(), log));
        self
    }

    pub fn element(self) -> Element {
        Arc::new(self)
    }
}

impl Producer for CounterProducer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE.stateful().reuse_aware()
    }

    fn initial_state(&self) -> Option<StateBox> {
        Some(Arc::new(self.start))
    }

    fn scope_key(&self) -> Option<Key> {
        self.key
    }

    fn render(&self, cx: &mut RenderContext<'_>) -> Children {
        let count = cx.state::<i32>().map_or(self.start, |count| *count);
        let mut label = TestLeaf::sized("count", 40.0, 20.0);
        if let Some(class) = &self.label_view {
            label = label.with_view(
                ViewConfiguration::new(class.clone()).with(TEXT, count.to_string().as_str()),
            );
        }
        Children::One(label.element())
    }

    fn make_controller(&self) -> Option<Arc<dyn Controller>> {
        self.controller.as_ref().map(|(name, log)| {
            Arc::new(RecordingController::new(name.clone(), log.clone())) as Arc<dyn Controller>
        })
    }
}
