//! Platform abstraction traits for Kite runtime services.
//!
//! These traits let the runtime delegate pass scheduling to the host,
//! so the reconciler can be driven from any event loop or queue
//! implementation without depending on one directly.

use crate::UpdateMode;

/// Schedules reconciliation passes for the runtime.
///
/// Implementations must be safe to use from multiple threads; state updates
/// may be requested from whichever thread currently holds a scope handle.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host run a pass. `Synchronous` asks for the pass to
    /// land before the next paint; `Asynchronous` allows batching.
    fn schedule_pass(&self, mode: UpdateMode);
}
