//! Error types for the streamer.

use bigquery_client::BigQueryError;
use thiserror::Error;

/// Errors reported by [`Streamer`](crate::Streamer).
#[derive(Error, Debug)]
pub enum StreamerError {
    /// Invalid streamer configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An insertAll request failed as a whole.
    #[error("insertAll request failed: {0}")]
    Insert(#[from] BigQueryError),

    /// An insertAll request was accepted but some rows were rejected.
    #[error("{failed_rows} row(s) rejected by insertAll, first error: {first_error}")]
    RowsRejected {
        failed_rows: usize,
        first_error: String,
    },

    /// The streamer no longer accepts rows.
    #[error("Streamer is closed")]
    Closed,

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
