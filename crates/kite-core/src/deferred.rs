use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

pub type DeferredId = u64;

type Operation = Box<dyn FnOnce() + Send>;
type Completion = Box<dyn FnOnce(bool) + Send>;

struct Entry {
    id: DeferredId,
    generation: u64,
    operation: Operation,
    completion: Completion,
}

/// Explicit queue of (operation, completion) pairs waiting for a pass to be
/// applied.
///
/// `flush` runs the operation and then its completion with `true`; `cancel`
/// skips the operation and completes with `false`. Dropping the queue
/// cancels whatever is left.
#[derive(Default)]
pub struct DeferredQueue {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pair tagged with `generation`, the newest pass prepared at
    /// registration time.
    pub fn enqueue(
        &self,
        generation: u64,
        operation: impl FnOnce() + Send + 'static,
        completion: impl FnOnce(bool) + Send + 'static,
    ) -> DeferredId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.lock().push(Entry {
            id,
            generation,
            operation: Box::new(operation),
            completion: Box::new(completion),
        });
        id
    }

    /// Runs every pair registered before pass `generation` was prepared.
    pub fn flush(&self, generation: u64) -> usize {
        let ready: Vec<Entry> = {
            let mut entries = self.entries.lock();
            let (ready, pending): (Vec<Entry>, Vec<Entry>) = entries
                .drain(..)
                .partition(|entry| entry.generation < generation);
            *entries = pending;
            ready
        };
        let count = ready.len();
        for entry in ready {
            (entry.operation)();
            (entry.completion)(true);
        }
        count
    }

    pub fn cancel(&self, id: DeferredId) -> bool {
        let entry = {
            let mut entries = self.entries.lock();
            entries
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| entries.remove(index))
        };
        match entry {
            Some(entry) => {
                (entry.completion)(false);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let entries: Vec<Entry> = self.entries.lock().drain(..).collect();
        let count = entries.len();
        for entry in entries {
            (entry.completion)(false);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for DeferredQueue {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
