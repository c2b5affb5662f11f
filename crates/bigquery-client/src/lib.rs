//! Minimal BigQuery REST client.
//!
//! Covers the handful of API calls a streaming-insert benchmark needs:
//!
//! - `tables.get`, `tables.delete`, `tables.insert` through [`TableAdmin`]
//! - `tabledata.insertAll` through [`InsertAll`]
//!
//! [`BigQueryClient`] implements both over HTTPS with `reqwest`, using
//! Application Default Credentials from `gcp_auth` for the bearer token.
//!
//! # Example
//!
//! ```rust,ignore
//! use bigquery_client::{BigQueryClient, FieldSchema, TableAdmin, TableSchema};
//!
//! let client = BigQueryClient::new("my-project").await?;
//! let schema = TableSchema::new(vec![FieldSchema::string("name")]);
//! match client.get_table("my_dataset", "events").await {
//!     Err(e) if e.is_not_found() => {
//!         client.create_table("my_dataset", "events", &schema).await?;
//!     }
//!     other => {
//!         other?;
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod insert;
pub mod table;
pub mod traits;

pub use client::{BigQueryClient, DEFAULT_ENDPOINT};
pub use error::BigQueryError;
pub use insert::{
    ErrorProto, InsertAllRequest, InsertAllResponse, InsertAllRow, InsertId, Row,
    RowInsertErrors, ValueSaver,
};
pub use table::{FieldMode, FieldSchema, FieldType, Table, TableReference, TableSchema};
pub use traits::{InsertAll, TableAdmin};
