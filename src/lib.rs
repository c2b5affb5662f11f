//! bqwrite-test library
//!
//! A throughput benchmark for the BigQuery streaming insert API. It
//! provisions a destination table, generates synthetic records on a
//! background task and streams them through a batching, multi-worker writer,
//! reporting how many records were sent and how long it took.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐  mpsc(1)  ┌──────────────┐  write()  ┌──────────────┐
//! │  generator  │──────────►│    driver    │──────────►│   Streamer   │──► insertAll
//! │ (own task)  │           │ (count, log) │           │ (N workers)  │
//! └─────────────┘           └──────────────┘           └──────────────┘
//!        ▲                          │
//!        └──── CancellationToken ◄──┘ (on write error)
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! bqwrite-test -p PROJECT_ID -d DATASET -t TABLENAME -w WORKERS -i RECORDS -b BATCH_SIZE
//! ```

pub mod args;
pub mod driver;
pub mod generator;
pub mod logging;
pub mod provision;
pub mod record;

pub use args::Args;
pub use driver::{run, run_with, stream_records, RecordSink, StreamMetrics};
pub use provision::{ensure_table, ProvisionOutcome, SETTLE_INTERVAL};
pub use record::{Record, TABLE_SCHEMA};
