//! Generation bookkeeping for one root.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::deferred::{DeferredId, DeferredQueue};
use crate::listener::BuildListener;
use crate::platform::RuntimeScheduler;
use crate::reconciler::{drop_without_generation, BuildResult, Generation, Reconciler};
use crate::runtime::Runtime;
use crate::{BuildError, BuildTrigger, Element, NodeId, ReconcilerConfig};

/// A prepared reconciliation pass. `Send`, so it can run on any queue.
pub struct BuildPass {
    number: u64,
    root: Element,
    previous: Option<Generation>,
    updated: Vec<NodeId>,
    trigger: BuildTrigger,
    reconciler: Reconciler,
    latest: Arc<AtomicU64>,
}

impl BuildPass {
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn trigger(&self) -> BuildTrigger {
        self.trigger
    }

    /// A newer pass has been prepared for the same root. The pass can still
    /// run; its result will be discarded at commit.
    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) > self.number
    }

    pub fn run(self) -> Result<BuildOutput, BuildError> {
        let result = self.reconciler.build_updated(
            self.root,
            self.previous.as_ref(),
            &self.updated,
            self.trigger,
        )?;
        Ok(BuildOutput {
            number: self.number,
            result,
        })
    }
}

pub struct BuildOutput {
    pub number: u64,
    pub result: BuildResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied {
        generation: u64,
        torn_down: usize,
        flushed: usize,
    },
    /// An equal or newer generation was already committed.
    Stale { generation: u64, committed: u64 },
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }
}

/// Owns the runtime, the reconciler and the committed generation of a root.
pub struct ComponentRoot {
    runtime: Runtime,
    reconciler: Reconciler,
    committed: Option<Generation>,
    committed_number: u64,
    latest: Arc<AtomicU64>,
    /// Handles updated by passes that have been prepared but not committed,
    /// keyed by pass number.
    in_flight: Mutex<Vec<(u64, Vec<NodeId>)>>,
    deferred: DeferredQueue,
}

impl ComponentRoot {
    pub fn new(config: ReconcilerConfig, scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let runtime = Runtime::new(scheduler);
        let reconciler = Reconciler::new(config, runtime.handle());
        Self {
            runtime,
            reconciler,
            committed: None,
            committed_number: 0,
            latest: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(Vec::new()),
            deferred: DeferredQueue::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn BuildListener>) -> Self {
        self.reconciler = self.reconciler.with_listener(listener);
        self
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn committed(&self) -> Option<&Generation> {
        self.committed.as_ref()
    }

    pub fn committed_number(&self) -> u64 {
        self.committed_number
    }

    /// Takes pending state updates, applies them to the committed handles
    /// and assigns the next generation number. Updates enqueued afterwards
    /// go to a later pass.
    ///
    /// The pass also re-evaluates every handle updated by an earlier pass
    /// that has not been committed yet, so whichever pass commits last
    /// renders the latest state.
    pub fn prepare(&self, root: Element, trigger: BuildTrigger) -> BuildPass {
        let mut in_flight = self.in_flight.lock();
        let number = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let (updates, mode) = self.runtime.take_state_updates();
        let pending = updates.len();
        let own = match &self.committed {
            Some(committed) => committed.apply_state_updates(updates),
            None => {
                drop_without_generation(&updates);
                Vec::new()
            }
        };
        let mut updated: Vec<NodeId> = in_flight
            .iter()
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        updated.extend_from_slice(&own);
        if !own.is_empty() {
            in_flight.push((number, own));
        }
        log::debug!(
            "preparing pass {number} ({trigger:?}) with {pending} pending update(s), \
             {} updated handle(s) in flight, mode {mode:?}",
            updated.len()
        );
        BuildPass {
            number,
            root,
            previous: self.committed.clone(),
            updated,
            trigger,
            reconciler: self.reconciler.clone(),
            latest: Arc::clone(&self.latest),
        }
    }

    /// Applies `output` unless an equal or newer generation is already
    /// committed. Tears down handles that failed to match and flushes the
    /// deferred pairs registered before the pass was prepared.
    pub fn commit(&mut self, output: BuildOutput) -> CommitOutcome {
        let BuildOutput { number, result } = output;
        if number <= self.committed_number {
            log::warn!(
                "discarding stale pass {number}; generation {} is already committed",
                self.committed_number
            );
            return CommitOutcome::Stale {
                generation: number,
                committed: self.committed_number,
            };
        }

        let removed = match &self.committed {
            Some(committed) => committed
                .scope_root
                .removed_in(&result.generation.scope_root),
            None => Vec::new(),
        };
        for handle in &removed {
            handle.teardown();
        }
        self.committed = Some(result.generation);
        self.committed_number = number;
        self.in_flight
            .get_mut()
            .retain(|(prepared, _)| *prepared > number);
        let flushed = self.deferred.flush(number);
        log::debug!(
            "committed pass {number}: {} handle(s) torn down, {flushed} deferred flushed",
            removed.len()
        );
        CommitOutcome::Applied {
            generation: number,
            torn_down: removed.len(),
            flushed,
        }
    }

    /// Prepare, run and commit on the calling thread.
    pub fn build(
        &mut self,
        root: Element,
        trigger: BuildTrigger,
    ) -> Result<CommitOutcome, BuildError> {
        let output = self.prepare(root, trigger).run()?;
        Ok(self.commit(output))
    }

    pub fn is_superseded(&self, number: u64) -> bool {
        self.latest.load(Ordering::SeqCst) > number
    }

    pub fn defer(
        &self,
        operation: impl FnOnce() + Send + 'static,
        completion: impl FnOnce(bool) + Send + 'static,
    ) -> DeferredId {
        self.deferred
            .enqueue(self.latest.load(Ordering::SeqCst), operation, completion)
    }

    pub fn cancel_deferred(&self, id: DeferredId) -> bool {
        self.deferred.cancel(id)
    }

    /// Tears down every committed handle and forgets the generation.
    pub fn teardown(&mut self) {
        if let Some(committed) = self.committed.take() {
            for handle in committed.scope_root.handles() {
                handle.teardown();
            }
        }
        self.in_flight.get_mut().clear();
        self.deferred.cancel_all();
    }
}
