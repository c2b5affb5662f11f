//! Thread-safe front end that fans rows out to the worker pool.

use std::sync::Arc;

use bigquery_client::{InsertAll, InsertAllRow, ValueSaver};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::StreamerConfig;
use crate::error::StreamerError;
use crate::worker::{FirstFailure, Worker, WorkerStats};

/// Totals reported by [`Streamer::close`].
pub type StreamerStats = WorkerStats;

/// Batching streaming-insert writer for one table.
///
/// Rows passed to [`write`](Streamer::write) are distributed round-robin
/// over `worker_count` worker tasks, each with a bounded queue of
/// `worker_queue_size` rows. `write` waits when the target queue is full.
///
/// Insert failures happen asynchronously inside the workers. The first one
/// is returned by the next `write` call or, if none follows, by
/// [`close`](Streamer::close).
pub struct Streamer {
    senders: Vec<mpsc::Sender<InsertAllRow>>,
    workers: Vec<JoinHandle<WorkerStats>>,
    next_worker: usize,
    failure: Arc<FirstFailure>,
}

impl Streamer {
    /// Spawn the worker pool. Must be called from within a tokio runtime.
    pub fn new<C: InsertAll + 'static>(
        client: Arc<C>,
        dataset_id: &str,
        table_id: &str,
        config: StreamerConfig,
    ) -> Result<Self, StreamerError> {
        config.validate()?;

        let dataset_id: Arc<str> = Arc::from(dataset_id);
        let table_id: Arc<str> = Arc::from(table_id);
        let failure = Arc::new(FirstFailure::default());

        let mut senders = Vec::with_capacity(config.worker_count);
        let mut workers = Vec::with_capacity(config.worker_count);
        for id in 0..config.worker_count {
            let (tx, rx) = mpsc::channel(config.worker_queue_size);
            let worker = Worker {
                id,
                client: Arc::clone(&client),
                dataset_id: Arc::clone(&dataset_id),
                table_id: Arc::clone(&table_id),
                config: config.insert_all.clone(),
                max_batch_delay: config.max_batch_delay,
                failure: Arc::clone(&failure),
            };
            senders.push(tx);
            workers.push(tokio::spawn(worker.run(rx)));
        }

        debug!(
            workers = config.worker_count,
            queue_size = config.worker_queue_size,
            batch_size = config.insert_all.batch_size,
            "Streamer started for {}.{}",
            dataset_id,
            table_id
        );

        Ok(Self {
            senders,
            workers,
            next_worker: 0,
            failure,
        })
    }

    /// Queue one row for insertion.
    pub async fn write<T: ValueSaver + ?Sized>(&mut self, data: &T) -> Result<(), StreamerError> {
        if let Some(error) = self.failure.take() {
            return Err(error);
        }

        let row = InsertAllRow::from_saver(data);
        let index = self.next_worker;
        self.next_worker = (index + 1) % self.senders.len();

        if self.senders[index].send(row).await.is_err() {
            // The worker only exits early after recording a failure.
            return Err(self.failure.take().unwrap_or(StreamerError::Closed));
        }
        Ok(())
    }

    /// Flush all queued rows, stop the workers and report totals.
    pub async fn close(self) -> Result<StreamerStats, StreamerError> {
        let Streamer {
            senders,
            workers,
            failure,
            ..
        } = self;
        drop(senders);

        let mut stats = StreamerStats::default();
        for handle in workers {
            stats += handle.await?;
        }

        if let Some(error) = failure.take() {
            return Err(error);
        }

        info!(
            "Streamer closed: {} rows in {} insertAll requests",
            stats.rows_sent, stats.batches_sent
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigquery_client::{
        BigQueryError, ErrorProto, InsertAllRequest, InsertAllResponse, InsertId, Row,
        RowInsertErrors,
    };
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    struct TestRow(i64);

    impl ValueSaver for TestRow {
        fn save(&self) -> (Row, InsertId) {
            let mut row = Row::new();
            row.insert("n".to_string(), json!(self.0));
            (row, InsertId::NoDedupe)
        }
    }

    enum Behaviour {
        Accept,
        Fail,
        RejectFirstRow,
    }

    struct FakeInsertAll {
        behaviour: Behaviour,
        requests: Mutex<Vec<InsertAllRequest>>,
    }

    impl FakeInsertAll {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<InsertAllRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn sent_values(&self) -> Vec<i64> {
            let mut values: Vec<i64> = self
                .requests()
                .iter()
                .flat_map(|r| r.rows.iter())
                .map(|row| row.json["n"].as_i64().unwrap())
                .collect();
            values.sort_unstable();
            values
        }
    }

    #[async_trait::async_trait]
    impl InsertAll for FakeInsertAll {
        async fn insert_all(
            &self,
            dataset_id: &str,
            table_id: &str,
            request: &InsertAllRequest,
        ) -> Result<InsertAllResponse, BigQueryError> {
            assert_eq!(dataset_id, "ds");
            assert_eq!(table_id, "t");
            self.requests.lock().unwrap().push(request.clone());
            match self.behaviour {
                Behaviour::Accept => Ok(InsertAllResponse::default()),
                Behaviour::Fail => Err(BigQueryError::Api {
                    status: 500,
                    message: "backend error".to_string(),
                }),
                Behaviour::RejectFirstRow => Ok(InsertAllResponse {
                    insert_errors: vec![RowInsertErrors {
                        index: 0,
                        errors: vec![ErrorProto {
                            reason: Some("invalid".to_string()),
                            location: Some("n".to_string()),
                            message: Some("no such field".to_string()),
                        }],
                    }],
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_rows_are_batched_across_workers() {
        let client = FakeInsertAll::new(Behaviour::Accept);
        let config = StreamerConfig::default()
            .with_worker_count(2)
            .with_batch_size(3);
        let mut streamer = Streamer::new(Arc::clone(&client), "ds", "t", config).unwrap();

        for n in 0..10 {
            streamer.write(&TestRow(n)).await.unwrap();
        }
        let stats = streamer.close().await.unwrap();

        assert_eq!(stats.rows_sent, 10);
        // Each worker receives 5 rows: one full batch of 3 and a final batch of 2.
        assert_eq!(stats.batches_sent, 4);
        assert_eq!(client.sent_values(), (0..10).collect::<Vec<_>>());
        assert!(client.requests().iter().all(|r| r.len() <= 3));
    }

    #[tokio::test]
    async fn test_strict_flags_sent() {
        let client = FakeInsertAll::new(Behaviour::Accept);
        let mut streamer =
            Streamer::new(Arc::clone(&client), "ds", "t", StreamerConfig::default()).unwrap();
        streamer.write(&TestRow(1)).await.unwrap();
        streamer.close().await.unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].skip_invalid_rows);
        assert!(!requests[0].ignore_unknown_values);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_batch_flushed_after_delay() {
        let client = FakeInsertAll::new(Behaviour::Accept);
        let config = StreamerConfig::default()
            .with_worker_count(1)
            .with_batch_size(100)
            .with_max_batch_delay(Duration::from_secs(5));
        let mut streamer = Streamer::new(Arc::clone(&client), "ds", "t", config).unwrap();

        streamer.write(&TestRow(1)).await.unwrap();
        streamer.write(&TestRow(2)).await.unwrap();
        assert!(client.requests().is_empty());

        tokio::time::sleep(Duration::from_secs(6)).await;
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 2);

        let stats = streamer.close().await.unwrap();
        assert_eq!(stats.batches_sent, 1);
    }

    #[tokio::test]
    async fn test_insert_failure_reported_on_close() {
        let client = FakeInsertAll::new(Behaviour::Fail);
        let config = StreamerConfig::default().with_worker_count(1);
        let mut streamer = Streamer::new(Arc::clone(&client), "ds", "t", config).unwrap();

        streamer.write(&TestRow(1)).await.unwrap();
        let err = streamer.close().await.unwrap_err();
        assert!(matches!(err, StreamerError::Insert(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_failure_reported_on_next_write() {
        let client = FakeInsertAll::new(Behaviour::Fail);
        let config = StreamerConfig::default().with_worker_count(1);
        let mut streamer = Streamer::new(Arc::clone(&client), "ds", "t", config).unwrap();

        streamer.write(&TestRow(1)).await.unwrap();
        // Let the worker send the first batch.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = streamer.write(&TestRow(2)).await.unwrap_err();
        assert!(matches!(err, StreamerError::Insert(_)));
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_rows_are_an_error() {
        let client = FakeInsertAll::new(Behaviour::RejectFirstRow);
        let config = StreamerConfig::default().with_worker_count(1);
        let mut streamer = Streamer::new(Arc::clone(&client), "ds", "t", config).unwrap();

        streamer.write(&TestRow(1)).await.unwrap();
        match streamer.close().await.unwrap_err() {
            StreamerError::RowsRejected {
                failed_rows,
                first_error,
            } => {
                assert_eq!(failed_rows, 1);
                assert_eq!(first_error, "row 0: invalid at 'n': no such field");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let client = FakeInsertAll::new(Behaviour::Accept);
        let result = Streamer::new(
            client,
            "ds",
            "t",
            StreamerConfig::default().with_worker_count(0),
        );
        assert!(matches!(result, Err(StreamerError::Config(_))));
    }
}
