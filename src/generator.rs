//! Background record generation.
//!
//! Records are produced on their own task and handed over through a channel
//! of capacity 1, so generation overlaps with sending while holding at most
//! one record ahead of the consumer.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// Sample names, assigned to records in rotation.
pub const NAMES: [&str; 12] = [
    "Louis Green",
    "Skyla Morrison",
    "Annalise Rosario",
    "Francisco Cole",
    "Aron Downs",
    "Alvin Buck",
    "Fletcher Clarke",
    "Sophie Salazar",
    "Kaleigh Hughes",
    "Winston Mason",
    "Braelyn Ho",
    "Finley Gibson",
];

/// Multiplier turning a record's position into its id.
pub const ID_MULTIPLIER: i64 = 42;

/// Name assigned to the record at `index`.
pub fn name_for_index(index: u64) -> &'static str {
    NAMES[(index % NAMES.len() as u64) as usize]
}

/// Id assigned to the record at `index`.
///
/// Unique within a run only; a second run produces the same ids again.
pub fn id_for_index(index: u64) -> i64 {
    index as i64 * ID_MULTIPLIER
}

/// Start generating `count` values built by `factory`.
///
/// The returned stream yields values for indices `0..count` in order and
/// ends after the last one. Cancelling `cancel`, or dropping the stream,
/// stops the producer at its next emission.
///
/// Must be called from within a tokio runtime.
pub fn generate<T, F>(cancel: CancellationToken, count: u64, factory: F) -> ReceiverStream<T>
where
    T: Send + 'static,
    F: Fn(&'static str, i64, DateTime<Utc>) -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        for index in 0..count {
            let value = factory(name_for_index(index), id_for_index(index), Utc::now());

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!("Record generation cancelled at index {index}");
                    return;
                }
                sent = tx.send(value) => {
                    if sent.is_err() {
                        tracing::debug!("Record consumer went away at index {index}");
                        return;
                    }
                }
            }
        }
    });

    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    type Emitted = (u64, &'static str, i64);

    fn index_factory() -> impl Fn(&'static str, i64, DateTime<Utc>) -> Emitted + Send + 'static
    {
        |name, id, _| ((id / ID_MULTIPLIER) as u64, name, id)
    }

    #[tokio::test]
    async fn test_generates_exact_count_in_order() {
        let values: Vec<Emitted> = generate(CancellationToken::new(), 30, index_factory())
            .collect()
            .await;

        assert_eq!(values.len(), 30);
        for (position, (index, name, id)) in values.iter().enumerate() {
            assert_eq!(*index, position as u64);
            assert_eq!(*id, position as i64 * 42);
            assert_eq!(*name, NAMES[position % 12]);
        }
    }

    #[tokio::test]
    async fn test_zero_count_closes_immediately() {
        let values: Vec<Emitted> = generate(CancellationToken::new(), 0, index_factory())
            .collect()
            .await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_before_start_emits_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let values: Vec<Emitted> = generate(cancel, 100, index_factory()).collect().await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_stops_within_one_emission() {
        let cancel = CancellationToken::new();
        let mut stream = generate(cancel.clone(), 1_000, index_factory());

        let mut received = Vec::new();
        while let Some((index, _, _)) = stream.next().await {
            received.push(index);
            if index == 9 {
                cancel.cancel();
            }
        }

        // At most the single value already sitting in the channel slot
        // arrives after cancellation.
        assert!(received.len() == 10 || received.len() == 11);
        let expected: Vec<u64> = (0..received.len() as u64).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn test_name_rotation_and_ids() {
        assert_eq!(name_for_index(0), "Louis Green");
        assert_eq!(name_for_index(11), "Finley Gibson");
        assert_eq!(name_for_index(12), "Louis Green");
        assert_eq!(id_for_index(0), 0);
        assert_eq!(id_for_index(4), 168);
    }
}
