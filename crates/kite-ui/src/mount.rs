//! Projects a [`Layout`] onto live views.
//!
//! The projector owns the node/view side tables and every container's view
//! pools. It must only be driven from the thread that created it.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use indexmap::IndexMap;
use kite_core::collections::map::{HashMap, HashSet};
use kite_core::{noop_listener, BuildListener, Controller, NodeId, TreeNode, ViewConfiguration};
use kite_ui_layout::{Point, Rect};

use crate::layout::Layout;
use crate::pool::{PoolKey, ViewHandle, ViewId, ViewPoolMap};

struct MountRecord {
    node: Arc<TreeNode>,
    view: Option<(ViewHandle, ViewConfiguration)>,
}

/// Counts from one mount pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountSummary {
    pub mounted: usize,
    pub unmounted: usize,
}

#[derive(Default)]
struct MountPass {
    seen: HashSet<NodeId>,
    containers: HashSet<ViewId>,
    unmounted: usize,
}

pub struct MountProjector {
    thread: ThreadId,
    listener: Arc<dyn BuildListener>,
    pools: HashMap<ViewId, ViewPoolMap>,
    /// Post-order of the last pass.
    mounted: IndexMap<NodeId, MountRecord>,
    occupants: HashMap<ViewId, NodeId>,
}

impl MountProjector {
    /// Creates a projector bound to the calling thread.
    pub fn new() -> Self {
        Self {
            thread: thread::current().id(),
            listener: noop_listener(),
            pools: HashMap::default(),
            mounted: IndexMap::new(),
            occupants: HashMap::default(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn BuildListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Mounts `layout` into `root_view`.
    ///
    /// Nodes mounted by an earlier pass but absent from `layout` are
    /// unmounted, and every view nobody claimed is hidden.
    ///
    /// # Panics
    ///
    /// When called from a thread other than the one that created the
    /// projector.
    pub fn mount(&mut self, layout: &Layout, root_view: &ViewHandle) -> MountSummary {
        self.assert_presentation_thread("mount");
        let root = layout.node_id();
        self.listener.will_mount(root);

        let mut pass = MountPass::default();
        pass.containers.insert(root_view.id());
        self.mount_layout(layout, Point::ZERO, root_view, &mut pass);

        // Reverse post-order visits each vanished parent before its children.
        let vanished: Vec<NodeId> = self
            .mounted
            .keys()
            .rev()
            .filter(|id| !pass.seen.contains(*id))
            .copied()
            .collect();
        for id in vanished {
            self.unmount_node(id, &mut pass);
        }
        for (container, pools) in self.pools.iter_mut() {
            if pass.containers.contains(container) {
                pools.reset();
            } else {
                pools.hide_all();
            }
        }

        self.listener.did_mount(root);
        let summary = MountSummary {
            mounted: pass.seen.len(),
            unmounted: pass.unmounted,
        };
        log::debug!(
            "mounted #{root}: {} node(s), {} unmounted",
            summary.mounted,
            summary.unmounted
        );
        summary
    }

    /// Unmounts every node and hides every pooled view.
    pub fn unmount_all(&mut self) -> usize {
        self.assert_presentation_thread("unmount_all");
        let mut pass = MountPass::default();
        let ids: Vec<NodeId> = self.mounted.keys().rev().copied().collect();
        for id in ids {
            self.unmount_node(id, &mut pass);
        }
        for pools in self.pools.values_mut() {
            pools.hide_all();
        }
        pass.unmounted
    }

    pub fn is_mounted(&self, id: NodeId) -> bool {
        self.mounted.contains_key(&id)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    pub fn view_for_node(&self, id: NodeId) -> Option<&ViewHandle> {
        self.mounted
            .get(&id)
            .and_then(|record| record.view.as_ref())
            .map(|(view, _)| view)
    }

    pub fn node_for_view(&self, view: &ViewHandle) -> Option<NodeId> {
        self.occupants.get(&view.id()).copied()
    }

    /// Pools owned by `container`, if anything was ever mounted into it.
    pub fn pools_of(&self, container: &ViewHandle) -> Option<&ViewPoolMap> {
        self.pools.get(&container.id())
    }

    fn mount_layout(
        &mut self,
        layout: &Layout,
        offset: Point,
        container: &ViewHandle,
        pass: &mut MountPass,
    ) {
        let node = layout.node();
        let id = node.id();
        pass.seen.insert(id);
        let previous = self.mounted.shift_remove(&id);
        let updating = previous.is_some();
        let controller = node.scope().and_then(|scope| scope.controller().cloned());
        notify(&controller, |c| {
            if updating {
                c.will_update()
            } else {
                c.will_mount()
            }
        });

        let previous_view = previous.and_then(|record| record.view);
        let view = match node.producer().view() {
            Some(config) => {
                let key = PoolKey::new(node.class(), &config);
                let view = self
                    .pools
                    .entry(container.id())
                    .or_default()
                    .view_for(key, config.class(), container);

                let mut retained = None;
                if let Some((old_view, old_config)) = previous_view {
                    if old_view.ptr_eq(&view) {
                        retained = Some(old_config);
                    } else {
                        self.release_view(&old_view, &old_config, id);
                    }
                }
                if let Some(occupant) = self.occupants.get(&view.id()).copied() {
                    if occupant != id {
                        log::trace!("view {view:?} changes hands from #{occupant} to #{id}");
                        self.unmount_node(occupant, pass);
                    }
                }

                apply_attributes(&view, retained.as_ref(), &config);
                view.with_mut(|native| native.set_frame(Rect::new(offset, layout.size())));
                self.occupants.insert(view.id(), id);
                pass.containers.insert(view.id());

                for child in layout.children() {
                    self.mount_layout(&child.layout, child.position, &view, pass);
                }
                Some((view, config))
            }
            None => {
                if let Some((old_view, old_config)) = previous_view {
                    self.release_view(&old_view, &old_config, id);
                }
                for child in layout.children() {
                    self.mount_layout(&child.layout, offset + child.position, container, pass);
                }
                None
            }
        };

        notify(&controller, |c| {
            if updating {
                c.did_update()
            } else {
                c.did_mount()
            }
        });
        self.mounted.insert(
            id,
            MountRecord {
                node: Arc::clone(node),
                view,
            },
        );
    }

    /// Unmounts `id` together with its mounted descendants. The node's
    /// unmount notifications surround those of its descendants.
    fn unmount_node(&mut self, id: NodeId, pass: &mut MountPass) {
        let Some(record) = self.mounted.shift_remove(&id) else {
            return;
        };
        let controller = record.node.scope().and_then(|scope| scope.controller().cloned());
        notify(&controller, |c| c.will_unmount());
        for child in record.node.children() {
            self.unmount_descendants(child, pass);
        }
        if let Some((view, config)) = &record.view {
            self.release_view(view, config, id);
        }
        notify(&controller, |c| c.did_unmount());
        pass.unmounted += 1;
    }

    fn unmount_descendants(&mut self, node: &TreeNode, pass: &mut MountPass) {
        if pass.seen.contains(&node.id()) {
            return;
        }
        if self.mounted.contains_key(&node.id()) {
            self.unmount_node(node.id(), pass);
            return;
        }
        for child in node.children() {
            self.unmount_descendants(child, pass);
        }
    }

    /// Breaks the view's link to `id` and resets its resettable attributes.
    fn release_view(&mut self, view: &ViewHandle, config: &ViewConfiguration, id: NodeId) {
        if self.occupants.get(&view.id()) == Some(&id) {
            self.occupants.remove(&view.id());
        }
        view.with_mut(|native| {
            for (attribute, _) in config.attributes() {
                if attribute.resettable {
                    native.reset_attribute(attribute.name);
                }
            }
        });
    }

    fn assert_presentation_thread(&self, operation: &str) {
        let current = thread::current().id();
        assert!(
            current == self.thread,
            "MountProjector::{operation} called from {current:?}; views belong to {:?}",
            self.thread
        );
    }
}

impl Default for MountProjector {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(controller: &Option<Arc<dyn Controller>>, callback: impl FnOnce(&dyn Controller)) {
    if let Some(controller) = controller {
        callback(controller.as_ref());
    }
}

/// Applies only what changed since `previous`.
fn apply_attributes(
    view: &ViewHandle,
    previous: Option<&ViewConfiguration>,
    next: &ViewConfiguration,
) {
    view.with_mut(|native| {
        if let Some(previous) = previous {
            for (attribute, _) in previous.attributes() {
                if attribute.resettable && next.attribute(attribute.name).is_none() {
                    native.reset_attribute(attribute.name);
                }
            }
        }
        for (attribute, value) in next.attributes() {
            if previous.and_then(|p| p.attribute(attribute.name)) == Some(value) {
                continue;
            }
            native.apply_attribute(attribute.name, value);
        }
    });
}

#[cfg(test)]
#[path = "tests/mount_tests.rs"]
mod tests;
