//! Standard runtime services backed by Rust's `std` library.
//!
//! [`StdScheduler`] implements the scheduling hook defined in `kite-core`.
//! [`BackgroundQueue`] runs reconciliation and layout passes on worker
//! threads, and [`PresentationQueue`] carries their results back to the
//! thread that owns the views.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use kite_core::{RuntimeScheduler, UpdateMode};
use parking_lot::RwLock;

type PassWaker = Arc<dyn Fn(UpdateMode) + Send + Sync + 'static>;

/// Scheduler that records pass requests and optionally wakes an event loop.
pub struct StdScheduler {
    pass_requested: AtomicBool,
    synchronous_requested: AtomicBool,
    pass_waker: RwLock<Option<PassWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            pass_requested: AtomicBool::new(false),
            synchronous_requested: AtomicBool::new(false),
            pass_waker: RwLock::new(None),
        }
    }

    /// Returns the strongest mode requested since the last call, if any.
    pub fn take_pass_request(&self) -> Option<UpdateMode> {
        let requested = self.pass_requested.swap(false, Ordering::SeqCst);
        let synchronous = self.synchronous_requested.swap(false, Ordering::SeqCst);
        match (requested, synchronous) {
            (_, true) => Some(UpdateMode::Synchronous),
            (true, false) => Some(UpdateMode::Asynchronous),
            (false, false) => None,
        }
    }

    /// Registers a waker that will be invoked whenever a pass is scheduled.
    pub fn set_pass_waker(&self, waker: impl Fn(UpdateMode) + Send + Sync + 'static) {
        *self.pass_waker.write() = Some(Arc::new(waker));
    }

    pub fn clear_pass_waker(&self) {
        *self.pass_waker.write() = None;
    }

    fn wake(&self, mode: UpdateMode) {
        let waker = self.pass_waker.read().clone();
        if let Some(waker) = waker {
            waker(mode);
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field("pass_requested", &self.pass_requested.load(Ordering::SeqCst))
            .field(
                "synchronous_requested",
                &self.synchronous_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_pass(&self, mode: UpdateMode) {
        self.pass_requested.store(true, Ordering::SeqCst);
        if mode == UpdateMode::Synchronous {
            self.synchronous_requested.store(true, Ordering::SeqCst);
        }
        self.wake(mode);
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed pool of worker threads fed through a channel.
pub struct BackgroundQueue {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl BackgroundQueue {
    /// Spawns `threads` workers (at least one) named `name-<index>`.
    pub fn new(name: &str, threads: usize) -> io::Result<Self> {
        let (sender, receiver) = channel::unbounded::<Job>();
        let workers = (0..threads.max(1))
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("{name}-{index}"))
                    .spawn(move || {
                        for job in receiver.iter() {
                            job();
                        }
                    })
            })
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Queues `job`. Returns `false` once the queue has shut down.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> bool {
        match &self.sender {
            Some(sender) => sender.send(Box::new(job)).is_ok(),
            None => false,
        }
    }

    /// Runs `job` on a worker and posts its result to `results`.
    pub fn submit_to<T: Send + 'static>(
        &self,
        job: impl FnOnce() -> T + Send + 'static,
        results: PresentationSender<T>,
    ) -> bool {
        self.submit(move || {
            if !results.post(job()) {
                log::warn!("presentation queue closed; dropping background result");
            }
        })
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Stops accepting work, finishes queued jobs and joins every worker.
    pub fn shutdown(&mut self) {
        self.sender = None;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("background worker panicked");
            }
        }
    }
}

impl Drop for BackgroundQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sending half of a [`PresentationQueue`]; cheap to clone and `Send`.
pub struct PresentationSender<T>(Sender<T>);

impl<T> Clone for PresentationSender<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PresentationSender<T> {
    /// Returns `false` if the queue has been dropped.
    pub fn post(&self, message: T) -> bool {
        self.0.send(message).is_ok()
    }
}

/// Messages delivered to the presentation thread.
///
/// Only the thread that created the queue may receive from it.
pub struct PresentationQueue<T> {
    owner: ThreadId,
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> PresentationQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            owner: thread::current().id(),
            sender,
            receiver,
        }
    }

    pub fn sender(&self) -> PresentationSender<T> {
        PresentationSender(self.sender.clone())
    }

    pub fn is_presentation_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Hands every queued message to `handle` and returns how many there were.
    ///
    /// # Panics
    ///
    /// When called from any thread but the one that created the queue.
    pub fn drain(&self, mut handle: impl FnMut(T)) -> usize {
        self.assert_presentation_thread();
        let mut delivered = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    handle(message);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Blocks up to `timeout` for the first message, then drains the rest.
    pub fn wait(&self, timeout: Duration, mut handle: impl FnMut(T)) -> usize {
        self.assert_presentation_thread();
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => {
                handle(message);
                1 + self.drain(handle)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn assert_presentation_thread(&self) {
        let current = thread::current().id();
        assert!(
            current == self.owner,
            "presentation queue drained from {current:?}; it belongs to {:?}",
            self.owner
        );
    }
}

impl<T> Default for PresentationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use kite_core::{ComponentRoot, ReconcilerConfig};
    use kite_testing::{find_node, CounterProducer};

    use super::*;

    #[test]
    fn synchronous_request_wins() {
        let scheduler = StdScheduler::new();
        assert_eq!(scheduler.take_pass_request(), None);

        scheduler.schedule_pass(UpdateMode::Asynchronous);
        scheduler.schedule_pass(UpdateMode::Synchronous);

        assert_eq!(scheduler.take_pass_request(), Some(UpdateMode::Synchronous));
        assert_eq!(scheduler.take_pass_request(), None);
    }

    #[test]
    fn waker_runs_on_every_request() {
        let scheduler = StdScheduler::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        scheduler.set_pass_waker(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.schedule_pass(UpdateMode::Asynchronous);
        scheduler.schedule_pass(UpdateMode::Asynchronous);
        scheduler.clear_pass_waker();
        scheduler.schedule_pass(UpdateMode::Asynchronous);

        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn state_update_requests_a_pass() {
        let scheduler = Arc::new(StdScheduler::new());
        let mut root = ComponentRoot::new(ReconcilerConfig::default(), scheduler.clone());
        root.build(CounterProducer::new(0).element(), kite_core::BuildTrigger::empty())
            .expect("initial build");
        let tree = Arc::clone(&root.committed().expect("generation").tree);
        let counter = find_node::<CounterProducer, _>(&tree, |_| true).expect("counter");

        counter
            .scope()
            .expect("scope")
            .update_state::<i32, _>(|count| count + 1, UpdateMode::Synchronous);

        assert_eq!(scheduler.take_pass_request(), Some(UpdateMode::Synchronous));
        assert!(root.runtime().has_pending_updates());
    }

    #[test]
    fn background_results_arrive_on_the_presentation_queue() {
        let queue = PresentationQueue::new();
        let mut workers = BackgroundQueue::new("kite-test", 2).expect("spawn workers");
        for value in 0..4 {
            assert!(workers.submit_to(move || value * 10, queue.sender()));
        }
        workers.shutdown();

        let mut received = Vec::new();
        let delivered = queue.drain(|value| received.push(value));

        received.sort_unstable();
        assert_eq!(delivered, 4);
        assert_eq!(received, vec![0, 10, 20, 30]);
        assert!(!workers.submit(|| {}));
    }

    #[test]
    fn wait_returns_after_timeout_when_empty() {
        let queue: PresentationQueue<()> = PresentationQueue::new();
        assert_eq!(queue.wait(Duration::from_millis(5), |_| {}), 0);
    }

    #[test]
    fn draining_off_thread_panics() {
        let queue: PresentationQueue<u32> = PresentationQueue::new();
        queue.sender().post(1);

        let result = thread::spawn(move || queue.drain(|_| {})).join();

        assert!(result.is_err());
    }
}
