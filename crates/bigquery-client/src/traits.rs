//! Trait seams over the BigQuery API.
//!
//! Callers are generic over these traits so that provisioning and streaming
//! logic can run against an in-memory fake in tests.

use crate::error::BigQueryError;
use crate::insert::{InsertAllRequest, InsertAllResponse};
use crate::table::{Table, TableSchema};

/// Table metadata operations.
#[async_trait::async_trait]
pub trait TableAdmin: Send + Sync {
    /// Fetch table metadata. A missing table yields an error for which
    /// [`BigQueryError::is_not_found`] is true.
    async fn get_table(&self, dataset_id: &str, table_id: &str) -> Result<Table, BigQueryError>;

    /// Delete a table.
    async fn delete_table(&self, dataset_id: &str, table_id: &str) -> Result<(), BigQueryError>;

    /// Create a table with the given schema.
    async fn create_table(
        &self,
        dataset_id: &str,
        table_id: &str,
        schema: &TableSchema,
    ) -> Result<Table, BigQueryError>;
}

/// Streaming inserts.
#[async_trait::async_trait]
pub trait InsertAll: Send + Sync {
    /// Send one `tabledata.insertAll` request.
    async fn insert_all(
        &self,
        dataset_id: &str,
        table_id: &str,
        request: &InsertAllRequest,
    ) -> Result<InsertAllResponse, BigQueryError>;
}
