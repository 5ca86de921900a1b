//! Ingest pipeline
//!
//! Wires the reader, dispatcher and worker pool together for one run and
//! turns the outcome into an [`IngestSummary`].
//!
//! # Shutdown
//! The reader finishes the extract, the run waits for the outstanding-group
//! count to reach zero, then stops the dispatcher. Only this graceful
//! end-of-stream shutdown exists.

use super::accumulator::{enqueue_groups, GroupAccumulator, QueuedGroup, ReadStats};
use super::decoder::ColumnMetaReader;
use super::dispatcher::{spawn_dispatcher, spawn_progress_reporter};
use super::materializer::Materializer;
use super::quarantine::ErrorQuarantine;
use super::report::write_error_report;
use super::tracker::CompletionTracker;
use super::worker::GroupProcessor;
use crate::config::{validate_report_path, IngestConfig};
use crate::error::{IngestError, IngestResult};
use crate::models::{IngestStatus, IngestSummary};
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Parameters of one ingest call
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Column-metadata extract
    pub input_path: PathBuf,
    /// Where quarantined rows are written; must end in `.csv`
    pub report_path: PathBuf,
    /// Attach every concept to this dataset instead of the path's first segment
    pub dataset_override: Option<String>,
}

/// Concept-metadata ingest over one dictionary store
pub struct IngestPipeline {
    db: SqlitePool,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(db: SqlitePool, config: IngestConfig) -> Self {
        Self { db, config }
    }

    /// Run one ingest to completion
    ///
    /// Group failures end up in the error report and a
    /// [`IngestStatus::CompletedWithErrors`] status; only run-level failures
    /// return `Err`.
    pub async fn run(&self, request: IngestRequest) -> IngestResult<IngestSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("ingest", run_id = %run_id);
        self.run_inner(run_id, request).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, request: IngestRequest) -> IngestResult<IngestSummary> {
        let started_at = Utc::now();

        validate_report_path(&request.report_path)?;
        let workers = self.config.worker_count()?;
        let reader = ColumnMetaReader::open(&request.input_path)?;

        info!(
            input = %request.input_path.display(),
            report = %request.report_path.display(),
            dataset_override = request.dataset_override.as_deref().unwrap_or("-"),
            workers,
            queue_capacity = self.config.queue_capacity,
            "Ingest started"
        );

        let tracker = CompletionTracker::new();
        let quarantine = Arc::new(ErrorQuarantine::default());
        let materializer = Arc::new(Materializer::new(
            self.db.clone(),
            request.dataset_override.clone(),
            self.config.max_lock_wait_ms,
        ));
        let processor = Arc::new(GroupProcessor::new(
            Arc::clone(&materializer),
            Arc::clone(&quarantine),
        ));

        let stop = CancellationToken::new();
        let (queue_tx, queue_rx) = mpsc::channel::<QueuedGroup>(self.config.queue_capacity);
        let dispatcher = spawn_dispatcher(queue_rx, Arc::clone(&processor), workers, stop.clone());
        let progress = spawn_progress_reporter(
            Arc::clone(&tracker),
            Arc::clone(&processor),
            stop.clone(),
        );

        let accumulator = GroupAccumulator::new(Arc::clone(&tracker));
        let reader_span = tracing::Span::current();
        let reader_task = tokio::task::spawn_blocking(move || {
            let _entered = reader_span.enter();
            read_extract(reader, accumulator, queue_tx)
        });

        let read_stats = match reader_task.await {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                stop.cancel();
                let _ = dispatcher.await;
                let _ = progress.await;
                return Err(e);
            }
            Err(e) => {
                stop.cancel();
                let _ = dispatcher.await;
                let _ = progress.await;
                return Err(IngestError::Common(dictionary_common::Error::Internal(format!(
                    "extract reader task failed: {}",
                    e
                ))));
            }
        };

        tracker.wait_idle().await;
        stop.cancel();
        if let Err(e) = dispatcher.await {
            error!(error = %e, "Dispatcher task failed; continuing with collected results");
        }
        if let Err(e) = progress.await {
            error!(error = %e, "Progress task failed");
        }

        let entries = quarantine.drain().await;
        let groups_quarantined = entries.len();
        let status = if entries.is_empty() {
            IngestStatus::Success
        } else {
            write_error_report(&request.report_path, &entries)?;
            IngestStatus::CompletedWithErrors {
                report_path: request.report_path.clone(),
            }
        };

        let summary = IngestSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            records_read: read_stats.records_read,
            records_dropped: read_stats.records_dropped,
            groups_enqueued: read_stats.groups_enqueued,
            groups_materialized: processor.materialized(),
            groups_quarantined,
            concepts_created: materializer.concepts_created(),
            datasets_created: materializer.datasets_created(),
            status,
        };

        info!(
            records_read = summary.records_read,
            records_dropped = summary.records_dropped,
            groups = summary.groups_enqueued,
            materialized = summary.groups_materialized,
            quarantined = summary.groups_quarantined,
            concepts_created = summary.concepts_created,
            datasets_created = summary.datasets_created,
            duration_s = summary.duration_seconds(),
            status = %summary.status,
            "Ingest finished"
        );

        Ok(summary)
    }
}

/// Reader thread body; an extract that stops being readable fails the run
fn read_extract(
    mut reader: ColumnMetaReader<std::fs::File>,
    accumulator: GroupAccumulator,
    queue: mpsc::Sender<QueuedGroup>,
) -> IngestResult<ReadStats> {
    let groups_enqueued = enqueue_groups(reader.by_ref(), accumulator, &queue)?;
    if let Some(e) = reader.take_error() {
        return Err(IngestError::Csv(e));
    }
    Ok(ReadStats {
        records_read: reader.records_read(),
        records_dropped: reader.records_dropped(),
        groups_enqueued,
    })
}
