//! Build, layout and mount orchestration for one root view.

use std::sync::Arc;

use kite_core::{
    BuildListener, BuildOutput, BuildPass, BuildTrigger, CommitOutcome, ComponentRoot, Element,
    ReconcilerConfig, RuntimeScheduler,
};
use kite_ui_layout::SizeRange;

use crate::debug::log_layout;
use crate::layout::{compute_layout, Layout};
use crate::mount::{MountProjector, MountSummary};
use crate::pool::ViewHandle;
use crate::HostError;

/// A prepared build-and-layout pass. `Send`; run it on any queue and hand
/// the output back to [`HostingRoot::apply`].
pub struct LayoutPass {
    build: BuildPass,
    range: SizeRange,
    listener: Arc<dyn BuildListener>,
}

impl LayoutPass {
    pub fn number(&self) -> u64 {
        self.build.number()
    }

    pub fn is_superseded(&self) -> bool {
        self.build.is_superseded()
    }

    pub fn run(self) -> Result<LayoutOutput, HostError> {
        let build = self.build.run()?;
        let tree = Arc::clone(&build.result.generation.tree);
        self.listener.will_layout(tree.id());
        let layout = compute_layout(&tree, self.range)?;
        self.listener.did_layout(tree.id());
        Ok(LayoutOutput { build, layout })
    }
}

pub struct LayoutOutput {
    pub build: BuildOutput,
    pub layout: Layout,
}

impl LayoutOutput {
    pub fn number(&self) -> u64 {
        self.build.number
    }
}

/// Presentation-side owner of a root view.
///
/// Holds the [`ComponentRoot`] for generation bookkeeping and the
/// [`MountProjector`] that keeps the root view's subtree in sync with the
/// latest committed layout.
pub struct HostingRoot {
    root: ComponentRoot,
    projector: MountProjector,
    root_view: ViewHandle,
    content: Option<Element>,
    range: SizeRange,
    layout: Option<Layout>,
    last_mount: MountSummary,
}

impl HostingRoot {
    pub fn new(
        root_view: ViewHandle,
        config: ReconcilerConfig,
        scheduler: Arc<dyn RuntimeScheduler>,
    ) -> Self {
        Self {
            root: ComponentRoot::new(config, scheduler),
            projector: MountProjector::new(),
            root_view,
            content: None,
            range: SizeRange::unconstrained(),
            layout: None,
            last_mount: MountSummary::default(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn BuildListener>) -> Self {
        self.root = self.root.with_listener(Arc::clone(&listener));
        self.projector = self.projector.with_listener(listener);
        self
    }

    /// Builds, lays out, commits and mounts `content` on the calling thread.
    ///
    /// The first render is a fresh build; later ones are props updates, with
    /// any pending state updates folded in.
    pub fn render(&mut self, content: Element, range: SizeRange) -> Result<CommitOutcome, HostError> {
        let mut trigger = if self.root.committed().is_some() {
            BuildTrigger::PROPS_UPDATE
        } else {
            BuildTrigger::empty()
        };
        if !trigger.is_fresh() && self.root.runtime().has_pending_updates() {
            trigger |= BuildTrigger::STATE_UPDATE;
        }
        self.render_with(content, range, trigger)
    }

    pub fn render_with(
        &mut self,
        content: Element,
        range: SizeRange,
        trigger: BuildTrigger,
    ) -> Result<CommitOutcome, HostError> {
        let output = self.prepare(content, range, trigger).run().map_err(|err| {
            log::error!("pass aborted: {err}");
            err
        })?;
        Ok(self.apply(output))
    }

    /// Re-renders the current content if state updates are pending.
    pub fn process_state_updates(&mut self) -> Result<Option<CommitOutcome>, HostError> {
        if !self.root.runtime().has_pending_updates() {
            return Ok(None);
        }
        let Some(content) = self.content.clone() else {
            return Ok(None);
        };
        self.render_with(content, self.range, BuildTrigger::STATE_UPDATE)
            .map(Some)
    }

    /// Snapshots pending updates and returns a pass for background execution.
    pub fn prepare(&mut self, content: Element, range: SizeRange, trigger: BuildTrigger) -> LayoutPass {
        self.content = Some(Arc::clone(&content));
        self.range = range;
        LayoutPass {
            build: self.root.prepare(content, trigger),
            range,
            listener: Arc::clone(self.root.reconciler().listener()),
        }
    }

    /// Commits `output` and mounts its layout, unless a newer generation has
    /// already been applied.
    pub fn apply(&mut self, output: LayoutOutput) -> CommitOutcome {
        let LayoutOutput { build, layout } = output;
        let outcome = self.root.commit(build);
        if outcome.is_applied() {
            log_layout(&layout);
            self.last_mount = self.projector.mount(&layout, &self.root_view);
            self.layout = Some(layout);
        }
        outcome
    }

    /// Unmounts everything and tears down every scope handle.
    pub fn teardown(&mut self) {
        self.projector.unmount_all();
        self.root.teardown();
        self.layout = None;
        self.content = None;
    }

    pub fn component_root(&self) -> &ComponentRoot {
        &self.root
    }

    pub fn projector(&self) -> &MountProjector {
        &self.projector
    }

    pub fn projector_mut(&mut self) -> &mut MountProjector {
        &mut self.projector
    }

    pub fn root_view(&self) -> &ViewHandle {
        &self.root_view
    }

    /// Layout of the last applied generation.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn last_mount(&self) -> MountSummary {
        self.last_mount
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
