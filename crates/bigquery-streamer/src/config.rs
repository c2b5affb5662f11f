//! Streamer configuration.

use std::time::Duration;

use crate::error::StreamerError;

/// Default number of worker tasks.
pub const DEFAULT_WORKER_COUNT: usize = 5;
/// Default number of rows per insertAll request.
pub const DEFAULT_BATCH_SIZE: usize = 1;
/// Default maximum time a partially filled batch waits before it is sent.
pub const DEFAULT_MAX_BATCH_DELAY: Duration = Duration::from_secs(5);

/// Configuration of a [`Streamer`](crate::Streamer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerConfig {
    /// Number of worker tasks sending insertAll requests in parallel.
    pub worker_count: usize,
    /// Capacity of each worker's row queue.
    pub worker_queue_size: usize,
    /// Flush a non-empty batch after this long even if it is not full.
    pub max_batch_delay: Duration,
    pub insert_all: InsertAllClientConfig,
}

/// Per-request settings of the insertAll client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertAllClientConfig {
    /// Maximum rows per insertAll request.
    pub batch_size: usize,
    /// Reject the whole request if any row is invalid (`skipInvalidRows=false`).
    pub fail_on_invalid_rows: bool,
    /// Reject rows with values not in the schema (`ignoreUnknownValues=false`).
    pub fail_for_unknown_values: bool,
}

impl Default for InsertAllClientConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            fail_on_invalid_rows: true,
            fail_for_unknown_values: true,
        }
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            worker_queue_size: DEFAULT_BATCH_SIZE,
            max_batch_delay: DEFAULT_MAX_BATCH_DELAY,
            insert_all: InsertAllClientConfig::default(),
        }
    }
}

impl StreamerConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the batch size. The worker queue is sized to hold one batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.insert_all.batch_size = batch_size;
        self.worker_queue_size = batch_size;
        self
    }

    pub fn with_max_batch_delay(mut self, delay: Duration) -> Self {
        self.max_batch_delay = delay;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), StreamerError> {
        if self.worker_count == 0 {
            return Err(StreamerError::Config(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.worker_queue_size == 0 {
            return Err(StreamerError::Config(
                "worker_queue_size must be at least 1".to_string(),
            ));
        }
        if self.insert_all.batch_size == 0 {
            return Err(StreamerError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_batch_delay.is_zero() {
            return Err(StreamerError::Config(
                "max_batch_delay must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
