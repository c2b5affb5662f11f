//! Batching, multi-worker streaming insert writer for BigQuery.
//!
//! # Architecture
//!
//! ```text
//!  write(row) ──round robin──┬──► queue 0 ──► worker 0 ──► insertAll
//!                            ├──► queue 1 ──► worker 1 ──► insertAll
//!                            └──► queue N ──► worker N ──► insertAll
//! ```
//!
//! Each worker groups rows into requests of up to `batch_size` rows and
//! sends a partial batch once it has waited `max_batch_delay`. Requests are
//! not retried; the first failure is surfaced to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bigquery_client::BigQueryClient;
//! use bigquery_streamer::{Streamer, StreamerConfig};
//!
//! let client = Arc::new(BigQueryClient::new("my-project").await?);
//! let config = StreamerConfig::default().with_worker_count(5).with_batch_size(500);
//! let mut streamer = Streamer::new(client, "my_dataset", "events", config)?;
//! streamer.write(&row).await?;
//! let stats = streamer.close().await?;
//! ```

pub mod config;
pub mod error;
pub mod streamer;
mod worker;

pub use config::{InsertAllClientConfig, StreamerConfig};
pub use error::StreamerError;
pub use streamer::{Streamer, StreamerStats};
pub use worker::WorkerStats;
