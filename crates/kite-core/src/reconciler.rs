use std::sync::Arc;

use indexmap::IndexSet;

use crate::collections::map::{HashMap, HashSet};
use crate::context::{context_changed, ContextOverlay};
use crate::listener::{noop_listener, BuildListener};
use crate::runtime::{RuntimeHandle, StateUpdateMap};
use crate::scope::{ScopeHandle, ScopeRoot};
use crate::tree::{ComponentKey, Disambiguator, TreeNode};
use crate::{
    next_node_id, Arity, BuildError, BuildTrigger, Capabilities, Element, NodeId, ProducerClass,
    ReconcilerConfig, RenderContext,
};

/// A reconciled tree together with the scope table that routes state
/// updates into it.
#[derive(Clone)]
pub struct Generation {
    pub tree: Arc<TreeNode>,
    pub scope_root: Arc<ScopeRoot>,
}

impl Generation {
    pub fn root_id(&self) -> NodeId {
        self.tree.id()
    }

    /// Runs each handle's pending mutators in enqueue order and returns the
    /// ids of the handles that were updated.
    pub fn apply_state_updates(&self, updates: StateUpdateMap) -> Vec<NodeId> {
        let mut updated = Vec::with_capacity(updates.len());
        for (id, mutators) in updates {
            let Some(handle) = self.scope_root.handle(id) else {
                log::warn!(
                    "dropping {} state update(s) for node {id}: not in the previous generation",
                    mutators.len()
                );
                continue;
            };
            handle.apply_updates(mutators);
            updated.push(id);
        }
        updated
    }

    /// Every node on the path from an updated node to the root.
    fn dirty_paths(&self, updated: &[NodeId]) -> HashSet<NodeId> {
        let mut dirty = HashSet::new();
        for &id in updated {
            let mut current = Some(id);
            while let Some(node) = current {
                if !dirty.insert(node) {
                    break;
                }
                current = self.scope_root.parent_of(node);
            }
        }
        dirty
    }
}

/// Which nodes a pass reused and which it evaluated.
#[derive(Clone, Debug, Default)]
pub struct ReuseReport {
    /// Roots of reused subtrees, in visit order.
    pub reused: Vec<NodeId>,
    /// Nodes whose producer went through evaluation. Fast-path leaves are not
    /// counted.
    pub evaluated: IndexSet<NodeId>,
}

impl ReuseReport {
    pub fn was_reused(&self, id: NodeId) -> bool {
        self.reused.contains(&id)
    }

    pub fn was_evaluated(&self, id: NodeId) -> bool {
        self.evaluated.contains(&id)
    }

    pub fn evaluated_count(&self) -> usize {
        self.evaluated.len()
    }
}

pub struct BuildResult {
    pub generation: Generation,
    pub report: ReuseReport,
    /// Handles of the previous generation that failed to match.
    pub removed_handles: Vec<ScopeHandle>,
}

/// Turns a root producer into a reconciled [`Generation`].
///
/// `build` only reads the previous generation; all scratch state is local to
/// the call, so builds of different roots can run concurrently.
#[derive(Clone)]
pub struct Reconciler {
    config: ReconcilerConfig,
    runtime: RuntimeHandle,
    listener: Arc<dyn BuildListener>,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig, runtime: RuntimeHandle) -> Self {
        Self {
            config,
            runtime,
            listener: noop_listener(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn BuildListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn listener(&self) -> &Arc<dyn BuildListener> {
        &self.listener
    }

    /// Applies `updates` to the previous generation's handles, then builds
    /// `root` against it.
    pub fn build(
        &self,
        root: Element,
        previous: Option<&Generation>,
        updates: StateUpdateMap,
        trigger: BuildTrigger,
    ) -> Result<BuildResult, BuildError> {
        let updated = match previous {
            Some(previous) => previous.apply_state_updates(updates),
            None => {
                drop_without_generation(&updates);
                Vec::new()
            }
        };
        self.build_updated(root, previous, &updated, trigger)
    }

    /// Builds `root` against `previous`, treating the paths from each of
    /// `updated` to the root as dirty. The handles' state must already hold
    /// the updated values.
    pub fn build_updated(
        &self,
        root: Element,
        previous: Option<&Generation>,
        updated: &[NodeId],
        trigger: BuildTrigger,
    ) -> Result<BuildResult, BuildError> {
        self.listener.will_build(trigger);
        let dirty = previous
            .map(|generation| generation.dirty_paths(updated))
            .unwrap_or_default();

        let mut pass = Pass {
            reconciler: self,
            trigger,
            dirty,
            scope_root: ScopeRoot::default(),
            report: ReuseReport::default(),
        };
        let key = ComponentKey::root(&root);
        let previous_root = previous
            .map(|generation| &generation.tree)
            .filter(|tree| tree.key() == key);
        let tree = pass.build_node(root, key, previous_root, None, &ContextOverlay::new(), false)?;

        let Pass {
            scope_root, report, ..
        } = pass;
        let removed_handles = previous
            .map(|generation| generation.scope_root.removed_in(&scope_root))
            .unwrap_or_default();

        log::debug!(
            "built tree {} ({:?}): {} evaluated, {} subtrees reused, {} handles removed",
            tree.id(),
            trigger,
            report.evaluated_count(),
            report.reused.len(),
            removed_handles.len()
        );
        if self.config.debug_dump {
            log::debug!("tree:\n{}", tree.dump());
        }
        self.listener.did_build(&tree, &report);

        Ok(BuildResult {
            generation: Generation {
                tree,
                scope_root: Arc::new(scope_root),
            },
            report,
            removed_handles,
        })
    }
}

/// Logs updates that arrive before any generation exists.
pub(crate) fn drop_without_generation(updates: &StateUpdateMap) {
    if !updates.is_empty() {
        log::warn!(
            "dropping state updates for {} node(s): no previous generation",
            updates.len()
        );
    }
}

fn is_fast_path(capabilities: Capabilities) -> bool {
    capabilities.arity == Arity::Leaf && !capabilities.is_stateful()
}

/// Call-local state of one build.
struct Pass<'r> {
    reconciler: &'r Reconciler,
    trigger: BuildTrigger,
    dirty: HashSet<NodeId>,
    scope_root: ScopeRoot,
    report: ReuseReport,
}

impl Pass<'_> {
    fn build_node(
        &mut self,
        producer: Element,
        key: ComponentKey,
        previous: Option<&Arc<TreeNode>>,
        parent: Option<NodeId>,
        overlay: &ContextOverlay,
        context_dirty: bool,
    ) -> Result<Arc<TreeNode>, BuildError> {
        let capabilities = producer.capabilities();
        let class = key.class;

        if is_fast_path(capabilities) {
            let id = next_node_id();
            self.scope_root.set_parent(id, parent);
            return Ok(Arc::new(TreeNode::new(
                id,
                key,
                producer,
                None,
                None,
                Vec::new(),
                true,
            )));
        }

        if let Some(previous) = previous {
            if self.can_reuse(&producer, capabilities, previous, context_dirty) {
                log::trace!("reusing {class}#{}", previous.id());
                self.register_reused(previous, parent);
                self.report.reused.push(previous.id());
                self.reconciler.listener.node_reused(previous.id(), class);
                return Ok(Arc::clone(previous));
            }
        }

        let (id, scope) = self.resolve_identity(&producer, class, capabilities, previous);
        if let Some(scope) = &scope {
            self.scope_root.insert_handle(scope.clone());
        }
        self.scope_root.set_parent(id, parent);
        self.report.evaluated.insert(id);
        self.reconciler.listener.node_not_reused(id, class);
        log::trace!("evaluating {class}#{id}");

        let provided = producer.provided_context();
        let context_dirty = context_dirty
            || previous.is_some_and(|previous| {
                context_changed(previous.provided_context(), provided.as_ref())
            });

        let children = match capabilities.arity {
            Arity::Leaf => Vec::new(),
            arity => {
                let mut cx = RenderContext::new(id, scope.as_ref(), overlay);
                let produced = producer.render(&mut cx);
                if arity == Arity::Single && produced.len() > 1 {
                    return Err(BuildError::ProtocolViolation {
                        node: id,
                        class,
                        expected: arity,
                        found: produced.len(),
                    });
                }
                produced.into_vec()
            }
        };

        let child_overlay = match &provided {
            Some(value) => overlay.push(Arc::clone(value)),
            None => overlay.clone(),
        };
        let children = self.build_children(children, previous, id, &child_overlay, context_dirty)?;

        Ok(Arc::new(TreeNode::new(
            id, key, producer, scope, provided, children, false,
        )))
    }

    fn build_children(
        &mut self,
        children: Vec<Element>,
        previous: Option<&Arc<TreeNode>>,
        parent: NodeId,
        overlay: &ContextOverlay,
        context_dirty: bool,
    ) -> Result<Vec<Arc<TreeNode>>, BuildError> {
        let keys = self.assign_keys(&children, parent)?;
        let previous_children: HashMap<ComponentKey, &Arc<TreeNode>> = previous
            .map(|previous| {
                previous
                    .children()
                    .iter()
                    .filter(|child| !child.is_fast_path())
                    .map(|child| (child.key(), child))
                    .collect()
            })
            .unwrap_or_default();

        let mut built = Vec::with_capacity(children.len());
        for (child, key) in children.into_iter().zip(keys) {
            let matched = previous_children.get(&key).copied();
            built.push(self.build_node(child, key, matched, Some(parent), overlay, context_dirty)?);
        }
        Ok(built)
    }

    /// Keys each child by class plus explicit key, or by its ordinal among
    /// unkeyed siblings of the same class.
    fn assign_keys(
        &self,
        children: &[Element],
        parent: NodeId,
    ) -> Result<Vec<ComponentKey>, BuildError> {
        let mut ordinals: HashMap<ProducerClass, usize> = HashMap::new();
        let mut identified: HashMap<ProducerClass, usize> = HashMap::new();
        let mut explicit: HashSet<ComponentKey> = HashSet::new();
        let mut keys = Vec::with_capacity(children.len());

        for child in children {
            let class = child.class();
            let key = match child.scope_key() {
                Some(explicit_key) => {
                    let key = ComponentKey::new(class, Disambiguator::Key(explicit_key));
                    if !explicit.insert(key) {
                        return Err(BuildError::AmbiguousIdentity {
                            parent,
                            class,
                            key: explicit_key,
                        });
                    }
                    key
                }
                None => {
                    let ordinal = ordinals.entry(class).or_insert(0);
                    let key = ComponentKey::new(class, Disambiguator::Ordinal(*ordinal));
                    *ordinal += 1;
                    if !is_fast_path(child.capabilities()) {
                        *identified.entry(class).or_insert(0) += 1;
                    }
                    key
                }
            };
            keys.push(key);
        }

        if self.reconciler.config.strict_sibling_identity {
            let mut violations: Vec<(ProducerClass, usize)> = identified
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .collect();
            violations.sort_by_key(|(class, _)| class.type_name());
            if let Some((class, count)) = violations.into_iter().next() {
                return Err(BuildError::StrictIdentityViolation {
                    parent,
                    class,
                    count,
                });
            }
        }
        Ok(keys)
    }

    fn can_reuse(
        &self,
        producer: &Element,
        capabilities: Capabilities,
        previous: &TreeNode,
        context_dirty: bool,
    ) -> bool {
        let config = &self.reconciler.config;
        let trigger = self.trigger;
        if trigger.is_fresh() || trigger.contains(BuildTrigger::ENVIRONMENT_UPDATE) {
            return false;
        }
        let enabled = if trigger.contains(BuildTrigger::PROPS_UPDATE) {
            config.faster_props_updates
        } else {
            trigger.contains(BuildTrigger::STATE_UPDATE) && config.faster_state_updates
        };
        enabled
            && !context_dirty
            && capabilities.is_reuse_aware()
            && !previous.is_fast_path()
            && !self.dirty.contains(&previous.id())
            && previous.class() == producer.class()
            && producer.should_reuse(previous.producer().as_ref())
    }

    /// Node ids and handles of a stateful node, carried over from `previous`
    /// when it matched.
    fn resolve_identity(
        &self,
        producer: &Element,
        class: ProducerClass,
        capabilities: Capabilities,
        previous: Option<&Arc<TreeNode>>,
    ) -> (NodeId, Option<ScopeHandle>) {
        if !capabilities.is_stateful() {
            return match previous {
                Some(previous) if previous.scope().is_none() => (previous.id(), None),
                // A node that drops its scope drops its identity with it.
                _ => (next_node_id(), None),
            };
        }
        if let Some(scope) = previous.and_then(|previous| previous.scope()) {
            return (scope.id(), Some(scope.clone()));
        }
        let id = previous.map_or_else(next_node_id, |previous| previous.id());
        let scope = ScopeHandle::new(
            id,
            class,
            producer.scope_key(),
            producer.initial_state(),
            producer.make_controller(),
            self.reconciler.runtime.clone(),
        );
        (id, Some(scope))
    }

    fn register_reused(&mut self, node: &TreeNode, parent: Option<NodeId>) {
        let scope_root = &mut self.scope_root;
        scope_root.set_parent(node.id(), parent);
        node.visit(&mut |visited, visited_parent| {
            if let Some(scope) = visited.scope() {
                scope_root.insert_handle(scope.clone());
            }
            if visited.id() != node.id() {
                scope_root.set_parent(visited.id(), visited_parent);
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/reconciler_tests.rs"]
mod tests;
