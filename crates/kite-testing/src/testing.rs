use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kite_core::{
    BuildError, BuildTrigger, CommitOutcome, ComponentRoot, Element, Generation, NodeId,
    ReconcilerConfig, RuntimeScheduler, TreeNode, UpdateMode,
};

/// Scheduler that only counts requests; tests pump passes explicitly.
#[derive(Default)]
pub struct TestScheduler {
    requests: AtomicUsize,
}

impl TestScheduler {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for TestScheduler {
    fn schedule_pass(&self, _mode: UpdateMode) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Headless harness for exercising reconciliation in tests.
///
/// Owns a [`ComponentRoot`] and the content function that produces a fresh
/// root producer for every pass.
pub struct TestRoot {
    root: ComponentRoot,
    scheduler: Arc<TestScheduler>,
    content: Option<Box<dyn FnMut() -> Element>>,
}

impl TestRoot {
    pub fn new() -> Self {
        Self::with_config(ReconcilerConfig::default())
    }

    pub fn with_config(config: ReconcilerConfig) -> Self {
        let scheduler = Arc::new(TestScheduler::default());
        Self {
            root: ComponentRoot::new(config, scheduler.clone()),
            scheduler,
            content: None,
        }
    }

    /// Installs `content` and performs a fresh build.
    pub fn set_content(
        &mut self,
        content: impl FnMut() -> Element + 'static,
    ) -> Result<CommitOutcome, BuildError> {
        self.content = Some(Box::new(content));
        self.rebuild(BuildTrigger::empty())
    }

    /// Runs a pass with the installed content.
    pub fn rebuild(&mut self, trigger: BuildTrigger) -> Result<CommitOutcome, BuildError> {
        let Some(content) = self.content.as_mut() else {
            return Ok(CommitOutcome::Stale {
                generation: 0,
                committed: self.root.committed_number(),
            });
        };
        let element = content();
        self.root.build(element, trigger)
    }

    /// Runs state-update passes until no updates are pending. Returns the
    /// number of passes run.
    pub fn pump_until_idle(&mut self) -> Result<usize, BuildError> {
        let mut passes = 0;
        while self.root.runtime().has_pending_updates() {
            self.rebuild(BuildTrigger::STATE_UPDATE)?;
            passes += 1;
        }
        Ok(passes)
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.root.committed()
    }

    pub fn tree(&self) -> Option<&TreeNode> {
        self.root.committed().map(|generation| generation.tree.as_ref())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.tree().map(TreeNode::id)
    }

    pub fn component_root(&mut self) -> &mut ComponentRoot {
        &mut self.root
    }

    pub fn scheduler(&self) -> &TestScheduler {
        &self.scheduler
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Every node id in depth-first pre-order.
pub fn collect_ids(tree: &TreeNode) -> Vec<NodeId> {
    let mut ids = Vec::new();
    tree.visit(&mut |node, _| ids.push(node.id()));
    ids
}

/// First node (pre-order) whose producer is a `T` and satisfies `predicate`.
pub fn find_node<T, F>(tree: &TreeNode, predicate: F) -> Option<&TreeNode>
where
    T: kite_core::Producer,
    F: Fn(&T) -> bool + Copy,
{
    if tree
        .producer()
        .downcast_ref::<T>()
        .is_some_and(|producer| predicate(producer))
    {
        return Some(tree);
    }
    tree.children()
        .iter()
        .find_map(|child| find_node::<T, F>(child, predicate))
}
