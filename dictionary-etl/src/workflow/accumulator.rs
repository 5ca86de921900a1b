//! Group accumulator
//!
//! Sequential reader side of the pipeline. Groups contiguous same-path rows
//! and hands each completed group to the work queue together with its
//! completion guard.

use super::tracker::{CompletionGuard, CompletionTracker};
use crate::error::{IngestError, IngestResult};
use crate::models::{ConceptGroup, RawColumnRow};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// A group on the work queue
///
/// Dropping it, processed or not, finishes the group in the tracker.
#[derive(Debug)]
pub struct QueuedGroup {
    pub group: ConceptGroup,
    guard: CompletionGuard,
}

impl QueuedGroup {
    pub fn into_parts(self) -> (ConceptGroup, CompletionGuard) {
        (self.group, self.guard)
    }
}

/// Groups a path-contiguous row stream
///
/// Rows of one path are expected to be adjacent. Interleaved rows produce
/// one group per run of the path; they are not re-sorted.
pub struct GroupAccumulator {
    tracker: Arc<CompletionTracker>,
    buffer: Vec<RawColumnRow>,
    current_path: Option<String>,
    groups_sealed: usize,
}

impl GroupAccumulator {
    pub fn new(tracker: Arc<CompletionTracker>) -> Self {
        Self {
            tracker,
            buffer: Vec::new(),
            current_path: None,
            groups_sealed: 0,
        }
    }

    /// Add a row; returns the previous group when the row starts a new path
    pub fn push(&mut self, row: RawColumnRow) -> Option<QueuedGroup> {
        let boundary = self.current_path.as_deref() != Some(row.path.as_str());
        let completed = if boundary && !self.buffer.is_empty() {
            Some(self.seal())
        } else {
            None
        };

        if boundary {
            self.current_path = Some(row.path.clone());
        }
        self.buffer.push(row);
        completed
    }

    /// Seal the final buffer at end of stream
    pub fn finish(&mut self) -> Option<QueuedGroup> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.seal())
        }
    }

    /// Groups handed out so far
    pub fn groups_sealed(&self) -> usize {
        self.groups_sealed
    }

    fn seal(&mut self) -> QueuedGroup {
        let rows = std::mem::take(&mut self.buffer);
        let path = self.current_path.clone().unwrap_or_default();
        trace!(path = %path, rows = rows.len(), "Group sealed");

        self.groups_sealed += 1;
        QueuedGroup {
            group: ConceptGroup::new(path, rows),
            guard: self.tracker.begin(),
        }
    }
}

/// Reader-side counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub records_read: usize,
    pub records_dropped: usize,
    pub groups_enqueued: usize,
}

/// Drain a decoded row stream into the work queue
///
/// Runs on a blocking thread; suspends while the queue is full.
pub fn enqueue_groups<I>(
    rows: I,
    mut accumulator: GroupAccumulator,
    queue: &mpsc::Sender<QueuedGroup>,
) -> IngestResult<usize>
where
    I: IntoIterator<Item = RawColumnRow>,
{
    for row in rows {
        if let Some(queued) = accumulator.push(row) {
            send(queue, queued)?;
        }
    }
    if let Some(queued) = accumulator.finish() {
        send(queue, queued)?;
    }

    debug!(groups = accumulator.groups_sealed(), "Extract fully enqueued");
    Ok(accumulator.groups_sealed())
}

fn send(queue: &mpsc::Sender<QueuedGroup>, queued: QueuedGroup) -> IngestResult<()> {
    queue.blocking_send(queued).map_err(|_| {
        IngestError::Common(dictionary_common::Error::Internal(
            "work queue closed before the extract was fully read".to_string(),
        ))
    })
}
