//! Destination table provisioning.

use std::time::Duration;

use anyhow::Context;
use bigquery_client::{TableAdmin, TableSchema};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Fixed wait after deleting or creating a table, so that table metadata
/// has propagated before anything else touches it.
pub const SETTLE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// What [`ensure_table`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The table existed and was left untouched.
    Existing,
    /// The table did not exist and was created.
    Created,
    /// The table existed and was deleted and created again.
    Recreated,
}

/// Make sure `dataset_id.table_id` exists with `schema`.
///
/// - Missing table: create it, then wait [`SETTLE_INTERVAL`].
/// - Existing table with `overwrite`: delete it, wait, create it, wait.
/// - Existing table without `overwrite`: return at once.
///
/// Any API failure other than "not found" on the initial lookup is fatal.
/// Nothing is retried. Cancelling `cancel` ends a settle wait early and the
/// call fails as interrupted without issuing any further request.
pub async fn ensure_table<A: TableAdmin + ?Sized>(
    admin: &A,
    dataset_id: &str,
    table_id: &str,
    schema: &TableSchema,
    overwrite: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<ProvisionOutcome> {
    let exists = match admin.get_table(dataset_id, table_id).await {
        Ok(_) => true,
        Err(e) if e.is_not_found() => false,
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to fetch metadata for table '{dataset_id}.{table_id}'")
            })
        }
    };

    if exists && !overwrite {
        info!("Using existing BigQuery table: {}", table_id);
        return Ok(ProvisionOutcome::Existing);
    }

    if exists {
        info!("Deleting existing BigQuery table: {}", table_id);
        admin
            .delete_table(dataset_id, table_id)
            .await
            .with_context(|| format!("Failed to delete table '{dataset_id}.{table_id}'"))?;
        settle(cancel).await?;
    }

    info!("Creating BigQuery table: {}", table_id);
    admin
        .create_table(dataset_id, table_id, schema)
        .await
        .with_context(|| format!("Failed to create table '{dataset_id}.{table_id}'"))?;
    settle(cancel).await?;

    Ok(if exists {
        ProvisionOutcome::Recreated
    } else {
        ProvisionOutcome::Created
    })
}

async fn settle(cancel: &CancellationToken) -> anyhow::Result<()> {
    info!(
        "  Sleeping for {} minutes to allow for eventual consistency to propagate",
        SETTLE_INTERVAL.as_secs() / 60
    );
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Provisioning interrupted while waiting for the table to settle");
            anyhow::bail!("Provisioning interrupted");
        }
        _ = tokio::time::sleep(SETTLE_INTERVAL) => Ok(()),
    }
}
