//! HTTP implementation of the BigQuery API traits.

use std::sync::Arc;
use std::time::Duration;

use gcp_auth::TokenProvider;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::BigQueryError;
use crate::insert::{InsertAllRequest, InsertAllResponse};
use crate::table::{Table, TableReference, TableSchema};
use crate::traits::{InsertAll, TableAdmin};

/// Production BigQuery REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// BigQuery client bound to a single project.
#[derive(Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    auth: Option<Arc<dyn TokenProvider>>,
}

impl std::fmt::Debug for BigQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryClient")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("authenticated", &self.auth.is_some())
            .finish()
    }
}

impl BigQueryClient {
    /// Create a client for the production endpoint, authenticated with
    /// Google Application Default Credentials.
    pub async fn new(project_id: impl Into<String>) -> Result<Self, BigQueryError> {
        let auth = gcp_auth::provider().await?;
        let mut client = Self::with_endpoint(project_id, DEFAULT_ENDPOINT)?;
        client.auth = Some(auth);
        Ok(client)
    }

    /// Create an unauthenticated client for a custom endpoint such as a
    /// local BigQuery emulator.
    pub fn with_endpoint(
        project_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, BigQueryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            auth: None,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn tables_url(&self, dataset_id: &str) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables",
            self.endpoint, self.project_id, dataset_id
        )
    }

    fn table_url(&self, dataset_id: &str, table_id: &str) -> String {
        format!("{}/{}", self.tables_url(dataset_id), table_id)
    }

    fn insert_all_url(&self, dataset_id: &str, table_id: &str) -> String {
        format!("{}/insertAll", self.table_url(dataset_id, table_id))
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, BigQueryError> {
        match &self.auth {
            Some(auth) => {
                let token = auth.token(&[BIGQUERY_SCOPE]).await?;
                Ok(request.bearer_auth(token.as_str()))
            }
            None => Ok(request),
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, BigQueryError> {
        let response = self.authorize(request).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BigQueryError::from_response_body(status.as_u16(), &body))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BigQueryError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BigQueryError::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl TableAdmin for BigQueryClient {
    async fn get_table(&self, dataset_id: &str, table_id: &str) -> Result<Table, BigQueryError> {
        let url = self.table_url(dataset_id, table_id);
        tracing::debug!("GET {url}");
        self.execute_json(self.http.get(&url)).await
    }

    async fn delete_table(&self, dataset_id: &str, table_id: &str) -> Result<(), BigQueryError> {
        let url = self.table_url(dataset_id, table_id);
        tracing::debug!("DELETE {url}");
        self.execute(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn create_table(
        &self,
        dataset_id: &str,
        table_id: &str,
        schema: &TableSchema,
    ) -> Result<Table, BigQueryError> {
        let url = self.tables_url(dataset_id);
        let body = Table::new(
            TableReference {
                project_id: self.project_id.clone(),
                dataset_id: dataset_id.to_string(),
                table_id: table_id.to_string(),
            },
            schema.clone(),
        );
        tracing::debug!("POST {url}");
        self.execute_json(self.http.post(&url).json(&body)).await
    }
}

#[async_trait::async_trait]
impl InsertAll for BigQueryClient {
    async fn insert_all(
        &self,
        dataset_id: &str,
        table_id: &str,
        request: &InsertAllRequest,
    ) -> Result<InsertAllResponse, BigQueryError> {
        let url = self.insert_all_url(dataset_id, table_id);
        self.execute_json(self.http.post(&url).json(request)).await
    }
}
