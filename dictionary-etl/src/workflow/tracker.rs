//! Completion tracker
//!
//! Counts groups that were enqueued but not yet finished. Every queued group
//! carries a [`CompletionGuard`]; the count drops when the guard does, whether
//! the group materialized, failed, panicked or was discarded unprocessed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: AtomicUsize,
    finished: AtomicUsize,
    idle: Notify,
}

impl CompletionTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register one group; the returned guard finishes it on drop
    pub fn begin(self: &Arc<Self>) -> CompletionGuard {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        CompletionGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Groups enqueued but not yet finished
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Groups finished so far
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::Acquire)
    }

    /// Wait until no group is outstanding
    ///
    /// Call after the producer has stopped registering groups; the tracker
    /// cannot tell "idle for now" from "done".
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent finish is not missed
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::AcqRel);
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Marks one group as finished when dropped
#[derive(Debug)]
pub struct CompletionGuard {
    tracker: Arc<CompletionTracker>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
