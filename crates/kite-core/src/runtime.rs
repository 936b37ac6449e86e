use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::platform::RuntimeScheduler;
use crate::{NodeId, StateMutator, UpdateMode};

/// Pending state updates keyed by the target node, in enqueue order.
pub type StateUpdateMap = IndexMap<NodeId, Vec<StateMutator>>;

#[derive(Default)]
struct PendingUpdates {
    updates: StateUpdateMap, // FUTURE(no_std): replace IndexMap with a sorted small vec.
    mode: Option<UpdateMode>,
}

pub(crate) struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    pending: Mutex<PendingUpdates>,
    needs_pass: AtomicBool,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            pending: Mutex::new(PendingUpdates::default()),
            needs_pass: AtomicBool::new(false),
        }
    }

    fn schedule(&self, mode: UpdateMode) {
        self.needs_pass.store(true, Ordering::SeqCst);
        self.scheduler.schedule_pass(mode);
    }

    fn enqueue_state_update(&self, id: NodeId, mutator: StateMutator, mode: UpdateMode) {
        {
            let mut pending = self.pending.lock();
            pending.updates.entry(id).or_default().push(mutator);
            pending.mode = Some(match (pending.mode, mode) {
                (Some(UpdateMode::Synchronous), _) | (_, UpdateMode::Synchronous) => {
                    UpdateMode::Synchronous
                }
                _ => UpdateMode::Asynchronous,
            });
        }
        self.schedule(mode);
    }

    fn take_state_updates(&self) -> (StateUpdateMap, Option<UpdateMode>) {
        let mut pending = self.pending.lock();
        let updates = std::mem::take(&mut pending.updates);
        let mode = pending.mode.take();
        self.needs_pass.store(false, Ordering::SeqCst);
        (updates, mode)
    }

    fn has_pending_updates(&self) -> bool {
        !self.pending.lock().updates.is_empty()
    }
}

/// Owns the pending state-update queue for one root.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Arc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Arc::downgrade(&self.inner))
    }

    /// Snapshots and clears the pending updates. Updates enqueued after this
    /// call belong to the next pass.
    pub fn take_state_updates(&self) -> (StateUpdateMap, Option<UpdateMode>) {
        self.inner.take_state_updates()
    }

    pub fn has_pending_updates(&self) -> bool {
        self.inner.has_pending_updates()
    }

    pub fn needs_pass(&self) -> bool {
        self.inner.needs_pass.load(Ordering::SeqCst)
    }

    pub fn set_needs_pass(&self, value: bool) {
        self.inner.needs_pass.store(value, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_pass(&self, _mode: UpdateMode) {}
}

/// Weak reference to a [`Runtime`]; scope handles hold one of these.
#[derive(Clone)]
pub struct RuntimeHandle(pub(crate) Weak<RuntimeInner>);

impl RuntimeHandle {
    /// A handle that is not attached to any runtime. Updates sent through it
    /// are dropped.
    pub fn detached() -> Self {
        RuntimeHandle(Weak::new())
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn schedule(&self, mode: UpdateMode) {
        if let Some(inner) = self.0.upgrade() {
            inner.schedule(mode);
        }
    }

    pub(crate) fn enqueue_state_update(&self, id: NodeId, mutator: StateMutator, mode: UpdateMode) {
        match self.0.upgrade() {
            Some(inner) => inner.enqueue_state_update(id, mutator, mode),
            None => log::warn!("state update for node {id} dropped: runtime is gone"),
        }
    }
}
