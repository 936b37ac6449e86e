use std::sync::Arc;

use crate::{BuildTrigger, NodeId, ProducerClass, ReuseReport, TreeNode};

/// Advisory hooks around build, layout and mount.
///
/// Implementations must not influence the pass; every method defaults to a
/// no-op.
pub trait BuildListener: Send + Sync {
    fn will_build(&self, _trigger: BuildTrigger) {}
    fn did_build(&self, _tree: &TreeNode, _report: &ReuseReport) {}
    fn will_layout(&self, _root: NodeId) {}
    fn did_layout(&self, _root: NodeId) {}
    fn will_mount(&self, _root: NodeId) {}
    fn did_mount(&self, _root: NodeId) {}
    fn node_reused(&self, _id: NodeId, _class: ProducerClass) {}
    fn node_not_reused(&self, _id: NodeId, _class: ProducerClass) {}
}

#[derive(Default)]
pub struct NoopListener;

impl BuildListener for NoopListener {}

pub fn noop_listener() -> Arc<dyn BuildListener> {
    Arc::new(NoopListener)
}
