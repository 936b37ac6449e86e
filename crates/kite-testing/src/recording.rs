//! Recording doubles for views, controllers and listeners.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kite_core::{
    AttributeValue, BuildListener, BuildTrigger, Controller, NativeView, NodeId, ProducerClass,
    ReuseReport, TreeNode, ViewClass,
};
use kite_ui_graphics::Rect;
use parking_lot::Mutex;

/// Shared, ordered log of events as strings.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Takes every entry out of `log`.
pub fn drain(log: &EventLog) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

/// Entries of `log` that start with `prefix`.
pub fn entries_with_prefix(log: &EventLog, prefix: &str) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|entry| entry.starts_with(prefix))
        .cloned()
        .collect()
}

static NEXT_VIEW_ID: AtomicUsize = AtomicUsize::new(1);

/// Headless view that records every call it receives.
pub struct RecordingView {
    id: usize,
    class: &'static str,
    frame: Rect,
    hidden: bool,
    attributes: BTreeMap<&'static str, AttributeValue>,
    subviews: Vec<usize>,
    log: EventLog,
}

impl RecordingView {
    pub fn new(class: &'static str, log: EventLog) -> Self {
        let id = NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed);
        log.lock().push(format!("{class}#{id} created"));
        Self {
            id,
            class,
            frame: Rect::default(),
            hidden: false,
            attributes: BTreeMap::new(),
            subviews: Vec::new(),
            log,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn subviews(&self) -> &[usize] {
        &self.subviews
    }

    fn record(&self, event: String) {
        self.log.lock().push(format!("{}#{} {event}", self.class, self.id));
    }
}

impl NativeView for RecordingView {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn set_hidden(&mut self, hidden: bool) {
        if self.hidden != hidden {
            self.record(format!("hidden={hidden}"));
        }
        self.hidden = hidden;
    }

    fn apply_attribute(&mut self, name: &'static str, value: &AttributeValue) {
        self.record(format!("apply {name}"));
        self.attributes.insert(name, value.clone());
    }

    fn reset_attribute(&mut self, name: &'static str) {
        self.record(format!("reset {name}"));
        self.attributes.remove(name);
    }

    fn add_subview(&mut self, child: &mut dyn NativeView) {
        if let Some(child) = child.as_any().downcast_ref::<RecordingView>() {
            self.subviews.push(child.id);
        }
    }

    fn did_enter_reuse_pool(&mut self) {
        self.record("enter pool".to_string());
    }

    fn will_leave_reuse_pool(&mut self) {
        self.record("leave pool".to_string());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// View class whose instances are [`RecordingView`]s writing to `log`.
pub fn recording_view_class(identifier: &'static str, log: EventLog) -> ViewClass {
    ViewClass::new(identifier, move || {
        Box::new(RecordingView::new(identifier, log.clone())) as Box<dyn NativeView>
    })
}

/// Controller that logs each lifecycle callback as `"<name> <callback>"`.
pub struct RecordingController {
    name: String,
    log: EventLog,
}

impl RecordingController {
    pub fn new(name: impl Into<String>, log: EventLog) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }

    fn record(&self, callback: &str) {
        self.log.lock().push(format!("{} {callback}", self.name));
    }
}

impl Controller for RecordingController {
    fn will_mount(&self) {
        self.record("will_mount");
    }

    fn did_mount(&self) {
        self.record("did_mount");
    }

    fn will_update(&self) {
        self.record("will_update");
    }

    fn did_update(&self) {
        self.record("did_update");
    }

    fn will_unmount(&self) {
        self.record("will_unmount");
    }

    fn did_unmount(&self) {
        self.record("did_unmount");
    }

    fn did_teardown(&self) {
        self.record("did_teardown");
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerEvent {
    WillBuild(BuildTrigger),
    DidBuild { root: NodeId, evaluated: usize },
    WillLayout(NodeId),
    DidLayout(NodeId),
    WillMount(NodeId),
    DidMount(NodeId),
    Reused(NodeId),
    NotReused(NodeId),
}

#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ListenerEvent>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn reused(&self) -> Vec<NodeId> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ListenerEvent::Reused(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ListenerEvent) {
        self.events.lock().push(event);
    }
}

impl BuildListener for RecordingListener {
    fn will_build(&self, trigger: BuildTrigger) {
        self.push(ListenerEvent::WillBuild(trigger));
    }

    fn did_build(&self, tree: &TreeNode, report: &ReuseReport) {
        self.push(ListenerEvent::DidBuild {
            root: tree.id(),
            evaluated: report.evaluated_count(),
        });
    }

    fn will_layout(&self, root: NodeId) {
        self.push(ListenerEvent::WillLayout(root));
    }

    fn did_layout(&self, root: NodeId) {
        self.push(ListenerEvent::DidLayout(root));
    }

    fn will_mount(&self, root: NodeId) {
        self.push(ListenerEvent::WillMount(root));
    }

    fn did_mount(&self, root: NodeId) {
        self.push(ListenerEvent::DidMount(root));
    }

    fn node_reused(&self, id: NodeId, _class: ProducerClass) {
        self.push(ListenerEvent::Reused(id));
    }

    fn node_not_reused(&self, id: NodeId, _class: ProducerClass) {
        self.push(ListenerEvent::NotReused(id));
    }
}
