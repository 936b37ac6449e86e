use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::collections::map::HashMap;
use crate::controller::Controller;
use crate::runtime::RuntimeHandle;
use crate::{Key, NodeId, ProducerClass, UpdateMode};

/// Component-local state. Replaced wholesale by updates, never mutated.
pub type StateBox = Arc<dyn Any + Send + Sync>;

/// Pending transform of a node's state, applied at the start of the next pass.
pub type StateMutator = Box<dyn FnOnce(Option<StateBox>) -> Option<StateBox> + Send>;

struct ScopeInner {
    id: NodeId,
    class: ProducerClass,
    key: Option<Key>,
    state: RwLock<Option<StateBox>>,
    controller: Option<Arc<dyn Controller>>,
    runtime: RuntimeHandle,
    torn_down: AtomicBool,
}

/// Identity and state carried across generations for a stateful node.
///
/// Matching generations hand the *same* handle forward; compare with
/// [`ScopeHandle::ptr_eq`].
#[derive(Clone)]
pub struct ScopeHandle {
    inner: Arc<ScopeInner>,
}

impl ScopeHandle {
    pub(crate) fn new(
        id: NodeId,
        class: ProducerClass,
        key: Option<Key>,
        state: Option<StateBox>,
        controller: Option<Arc<dyn Controller>>,
        runtime: RuntimeHandle,
    ) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id,
                class,
                key,
                state: RwLock::new(state),
                controller,
                runtime,
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn class(&self) -> ProducerClass {
        self.inner.class
    }

    pub fn key(&self) -> Option<Key> {
        self.inner.key
    }

    pub fn state(&self) -> Option<StateBox> {
        self.inner.state.read().clone()
    }

    pub fn state_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.state().and_then(|state| state.downcast::<T>().ok())
    }

    pub fn controller(&self) -> Option<&Arc<dyn Controller>> {
        self.inner.controller.as_ref()
    }

    pub fn ptr_eq(&self, other: &ScopeHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Enqueues `mutator` for the next pass and schedules one.
    pub fn request_state_update(&self, mutator: StateMutator, mode: UpdateMode) {
        self.inner
            .runtime
            .enqueue_state_update(self.inner.id, mutator, mode);
    }

    /// Typed form of [`ScopeHandle::request_state_update`]. If the state is
    /// missing or of another type when the update is applied, it is left
    /// untouched.
    pub fn update_state<T, F>(&self, update: F, mode: UpdateMode)
    where
        T: Any + Send + Sync,
        F: FnOnce(&T) -> T + Send + 'static,
    {
        let id = self.inner.id;
        self.request_state_update(
            Box::new(move |state| match state {
                Some(current) => match current.downcast::<T>() {
                    Ok(typed) => Some(Arc::new(update(&typed)) as StateBox),
                    Err(original) => {
                        log::warn!(
                            "state update for node {id} expected {}",
                            std::any::type_name::<T>()
                        );
                        Some(original)
                    }
                },
                None => {
                    log::warn!("state update for node {id} has no state to update");
                    None
                }
            }),
            mode,
        );
    }

    pub(crate) fn apply_updates(&self, mutators: Vec<StateMutator>) {
        let mut state = self.inner.state.write();
        let mut current = state.take();
        for mutator in mutators {
            current = mutator(current);
        }
        *state = current;
    }

    /// Notifies the controller once that this handle left the tree.
    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(controller) = &self.inner.controller {
            controller.did_teardown();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("id", &self.inner.id)
            .field("class", &self.inner.class)
            .field("key", &self.inner.key)
            .finish()
    }
}

/// Handles and parent links of one generation, used to route state updates
/// and compute the dirty set of the next pass.
#[derive(Default)]
pub struct ScopeRoot {
    handles: HashMap<NodeId, ScopeHandle>, // FUTURE(no_std): replace HashMap with arena-backed map.
    parents: HashMap<NodeId, NodeId>,
}

impl ScopeRoot {
    pub fn handle(&self, id: NodeId) -> Option<&ScopeHandle> {
        self.handles.get(&id)
    }

    pub fn contains(&self, handle: &ScopeHandle) -> bool {
        self.handles
            .get(&handle.id())
            .is_some_and(|current| current.ptr_eq(handle))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn handles(&self) -> impl Iterator<Item = &ScopeHandle> {
        self.handles.values()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// `id` followed by each ancestor up to the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Handles of `self` that `next` no longer holds.
    pub fn removed_in(&self, next: &ScopeRoot) -> Vec<ScopeHandle> {
        let mut removed: Vec<ScopeHandle> = self
            .handles
            .values()
            .filter(|handle| !next.contains(handle))
            .cloned()
            .collect();
        removed.sort_by_key(ScopeHandle::id);
        removed
    }

    pub(crate) fn insert_handle(&mut self, handle: ScopeHandle) {
        self.handles.insert(handle.id(), handle);
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(parent) = parent {
            self.parents.insert(id, parent);
        }
    }
}
