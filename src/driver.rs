//! End-to-end benchmark run: provision, generate, stream, report.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bigquery_client::{BigQueryClient, InsertAll, TableAdmin};
use bigquery_streamer::{Streamer, StreamerConfig};
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::args::Args;
use crate::generator::generate;
use crate::provision::ensure_table;
use crate::record::{Record, TABLE_SCHEMA};

/// Records between two progress lines in verbose mode.
pub const PROGRESS_INTERVAL: u64 = 2000;

/// Whether `sent` records completes a progress step of `interval`.
pub fn is_progress_point(sent: u64, interval: Option<u64>) -> bool {
    match interval {
        Some(interval) if interval > 0 => sent > 0 && sent % interval == 0,
        _ => false,
    }
}

/// Destination for generated records.
#[async_trait::async_trait]
pub trait RecordSink: Send {
    /// Hand one record to the sink.
    async fn write(&mut self, record: &Record) -> anyhow::Result<()>;

    /// Flush and release the sink.
    async fn close(self) -> anyhow::Result<()>
    where
        Self: Sized;
}

#[async_trait::async_trait]
impl RecordSink for Streamer {
    async fn write(&mut self, record: &Record) -> anyhow::Result<()> {
        Streamer::write(self, record).await?;
        Ok(())
    }

    async fn close(self) -> anyhow::Result<()> {
        let stats = Streamer::close(self).await?;
        debug!(
            rows = stats.rows_sent,
            batches = stats.batches_sent,
            "Streaming client released"
        );
        Ok(())
    }
}

/// Result of a completed streaming run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamMetrics {
    /// Number of records accepted by the sink.
    pub records_sent: u64,
    /// Time from the first record requested to the last record accepted.
    pub elapsed: Duration,
}

impl StreamMetrics {
    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.records_sent as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Generate `count` records and write each one to `sink`.
///
/// The sink is closed on every path. A write error cancels `cancel` so the
/// generator stops, and is returned without forwarding any further record.
/// If `cancel` fires from outside before all records were sent, the run
/// fails as interrupted.
pub async fn stream_records<S: RecordSink>(
    mut sink: S,
    count: u64,
    progress_interval: Option<u64>,
    cancel: CancellationToken,
) -> anyhow::Result<StreamMetrics> {
    info!("Start Streaming Data");
    let start = Instant::now();
    let mut records = generate(cancel.clone(), count, Record::new);
    let mut sent = 0u64;

    while let Some(record) = records.next().await {
        if let Err(e) = sink.write(&record).await {
            cancel.cancel();
            error!("Streaming failed at record {}: {:#}", record.to_json(), e);
            if let Err(close_err) = sink.close().await {
                warn!("Failed to close streaming client: {:#}", close_err);
            }
            return Err(e).context("Failed to write record to the streaming client");
        }
        sent += 1;

        if is_progress_point(sent, progress_interval) {
            info!("  Records Sent: {:>8}", sent);
        }
    }
    let elapsed = start.elapsed();

    sink.close()
        .await
        .context("Failed to close the streaming client")?;

    if sent < count {
        anyhow::bail!("Streaming interrupted after {sent} of {count} records");
    }

    let metrics = StreamMetrics {
        records_sent: sent,
        elapsed,
    };
    info!(
        "  {} Records Streamed in {:?} ({:.2} records/sec)",
        metrics.records_sent,
        metrics.elapsed,
        metrics.records_per_second()
    );
    info!("End Streaming Data");
    Ok(metrics)
}

/// Run the whole benchmark described by `args` against BigQuery.
pub async fn run(args: &Args, cancel: CancellationToken) -> anyhow::Result<StreamMetrics> {
    info!("Establish BigQuery Client Connection");
    let client = match &args.api_endpoint {
        Some(endpoint) => BigQueryClient::with_endpoint(&args.project_id, endpoint),
        None => tokio::select! {
            biased;
            _ = cancel.cancelled() => anyhow::bail!("Interrupted while creating BigQuery client"),
            client = BigQueryClient::new(&args.project_id) => client,
        },
    }
    .context("Failed to create BigQuery client")?;

    run_with(Arc::new(client), args, cancel).await
}

/// Streaming parameters derived from the command line.
pub fn streamer_config(args: &Args) -> StreamerConfig {
    StreamerConfig::default()
        .with_worker_count(args.workers as usize)
        .with_batch_size(args.batch_size as usize)
}

/// Provision the table and stream `args.records` records through `client`.
///
/// A provisioning failure ends the run before any streamer is opened.
pub async fn run_with<C>(
    client: Arc<C>,
    args: &Args,
    cancel: CancellationToken,
) -> anyhow::Result<StreamMetrics>
where
    C: TableAdmin + InsertAll + 'static,
{
    ensure_table(
        client.as_ref(),
        &args.dataset,
        &args.table,
        &TABLE_SCHEMA,
        args.overwrite,
        &cancel,
    )
    .await
    .context("Failed to provision BigQuery table")?;

    info!("Establish BigQuery Streaming Client");
    let streamer = Streamer::new(client, &args.dataset, &args.table, streamer_config(args))
        .context("Failed to create BigQuery streaming client")?;

    let progress_interval = args.verbose.then_some(PROGRESS_INTERVAL);
    stream_records(streamer, args.records, progress_interval, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_per_second() {
        let metrics = StreamMetrics {
            records_sent: 1000,
            elapsed: Duration::from_secs(4),
        };
        assert_eq!(metrics.records_per_second(), 250.0);
        assert_eq!(StreamMetrics::default().records_per_second(), 0.0);
    }

    #[test]
    fn test_progress_every_interval() {
        let interval = Some(PROGRESS_INTERVAL);
        assert!(!is_progress_point(0, interval));
        assert!(!is_progress_point(1999, interval));
        assert!(is_progress_point(2000, interval));
        assert!(!is_progress_point(2001, interval));
        assert!(is_progress_point(4000, interval));
        assert!(!is_progress_point(2000, None));
        assert!(!is_progress_point(2000, Some(0)));

        let points = (1..=10_000u64).filter(|&n| is_progress_point(n, interval)).count();
        assert_eq!(points, 5);
    }

    #[test]
    fn test_streamer_config_from_args() {
        use clap::Parser;

        let args = Args::try_parse_from([
            "bqwrite-test", "-p", "p", "-d", "ds", "-w", "7", "-b", "250",
        ])
        .unwrap();
        let config = streamer_config(&args);

        assert_eq!(config.worker_count, 7);
        assert_eq!(config.insert_all.batch_size, 250);
        assert_eq!(config.worker_queue_size, 250);
    }
}
