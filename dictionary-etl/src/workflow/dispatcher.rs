//! Dispatch watcher
//!
//! Long-lived task pulling groups off the work queue and running each on a
//! semaphore-bounded worker pool.

use super::accumulator::QueuedGroup;
use super::tracker::CompletionTracker;
use super::worker::GroupProcessor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Spawn the dispatcher
///
/// Stops on `stop` or when the queue closes, then waits for in-flight
/// groups. Groups still queued at that point are dropped, which finishes them
/// in the tracker.
pub fn spawn_dispatcher(
    mut queue: mpsc::Receiver<QueuedGroup>,
    processor: Arc<GroupProcessor>,
    workers: usize,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        debug!(workers, "Dispatcher started");

        loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => {
                    debug!("Dispatcher received stop signal");
                    break;
                }

                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    log_task_result(result);
                }

                queued = queue.recv() => {
                    let Some(queued) = queued else {
                        debug!("Work queue closed");
                        break;
                    };
                    if queued.group.is_empty() {
                        continue;
                    }

                    let permit = match Arc::clone(&permits).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };
                    let processor = Arc::clone(&processor);
                    tasks.spawn(async move {
                        let _permit = permit;
                        processor.process(queued).await;
                    });
                }
            }
        }

        queue.close();
        while let Some(result) = tasks.join_next().await {
            log_task_result(result);
        }
        debug!("Dispatcher stopped");
    })
}

fn log_task_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Group worker task failed");
    }
}

/// Spawn the periodic progress logger
pub fn spawn_progress_reporter(
    tracker: Arc<CompletionTracker>,
    processor: Arc<GroupProcessor>,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = interval.tick() => {
                    info!(
                        completed = processor.materialized(),
                        failed = processor.failed(),
                        outstanding = tracker.outstanding(),
                        "Ingest progress"
                    );
                }
            }
        }
    })
}
