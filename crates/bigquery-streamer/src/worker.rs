//! Batching worker task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bigquery_client::{InsertAll, InsertAllRequest, InsertAllRow};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::config::InsertAllClientConfig;
use crate::error::StreamerError;

/// Rows and requests sent by one or more workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub rows_sent: u64,
    pub batches_sent: u64,
}

impl std::ops::AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_sent += other.rows_sent;
        self.batches_sent += other.batches_sent;
    }
}

/// First insert failure seen by any worker.
///
/// Holds at most one error; later failures are dropped until it is taken.
#[derive(Debug, Default)]
pub(crate) struct FirstFailure(Mutex<Option<StreamerError>>);

impl FirstFailure {
    pub(crate) fn record(&self, error: StreamerError) {
        let mut slot = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub(crate) fn take(&self) -> Option<StreamerError> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

pub(crate) struct Worker<C> {
    pub(crate) id: usize,
    pub(crate) client: Arc<C>,
    pub(crate) dataset_id: Arc<str>,
    pub(crate) table_id: Arc<str>,
    pub(crate) config: InsertAllClientConfig,
    pub(crate) max_batch_delay: Duration,
    pub(crate) failure: Arc<FirstFailure>,
}

impl<C: InsertAll + 'static> Worker<C> {
    /// Collect rows into batches until the queue is closed or an insert fails.
    ///
    /// A batch is sent when it reaches `batch_size` rows or when its oldest
    /// row has waited `max_batch_delay`. Remaining rows are sent on close.
    pub(crate) async fn run(self, mut rows: mpsc::Receiver<InsertAllRow>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        let mut batch: Vec<InsertAllRow> = Vec::with_capacity(self.config.batch_size);
        let deadline = time::sleep(self.max_batch_delay);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                row = rows.recv() => {
                    let Some(row) = row else {
                        break;
                    };
                    if batch.is_empty() {
                        deadline.as_mut().reset(Instant::now() + self.max_batch_delay);
                    }
                    batch.push(row);
                    if batch.len() >= self.config.batch_size {
                        if let Err(e) = self.flush(&mut batch, &mut stats).await {
                            self.failure.record(e);
                            return stats;
                        }
                    }
                }
                () = &mut deadline, if !batch.is_empty() => {
                    debug!(worker = self.id, rows = batch.len(), "Max batch delay reached");
                    if let Err(e) = self.flush(&mut batch, &mut stats).await {
                        self.failure.record(e);
                        return stats;
                    }
                }
            }
        }

        if !batch.is_empty() {
            if let Err(e) = self.flush(&mut batch, &mut stats).await {
                self.failure.record(e);
            }
        }
        debug!(
            worker = self.id,
            rows = stats.rows_sent,
            batches = stats.batches_sent,
            "Worker finished"
        );
        stats
    }

    async fn flush(
        &self,
        batch: &mut Vec<InsertAllRow>,
        stats: &mut WorkerStats,
    ) -> Result<(), StreamerError> {
        let rows = std::mem::replace(batch, Vec::with_capacity(self.config.batch_size));
        let row_count = rows.len();
        let request = InsertAllRequest {
            skip_invalid_rows: !self.config.fail_on_invalid_rows,
            ignore_unknown_values: !self.config.fail_for_unknown_values,
            rows,
        };

        let response = self
            .client
            .insert_all(&self.dataset_id, &self.table_id, &request)
            .await?;

        if response.has_errors() {
            let first_error = response
                .insert_errors
                .iter()
                .find_map(|row| {
                    row.errors
                        .first()
                        .map(|e| format!("row {}: {}", row.index, e))
                })
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(StreamerError::RowsRejected {
                failed_rows: response.insert_errors.len(),
                first_error,
            });
        }

        stats.rows_sent += row_count as u64;
        stats.batches_sent += 1;
        debug!(worker = self.id, rows = row_count, "Batch sent");
        Ok(())
    }
}
