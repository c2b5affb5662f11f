//! CLI argument definitions.

use clap::Parser;

/// Test the BigQuery streaming insert API and report the throughput
/// available from this host.
#[derive(Parser, Clone, Debug)]
#[command(name = "bqwrite-test", version)]
#[command(
    about = "Measure sustained BigQuery streaming insert throughput",
    long_about = None
)]
#[command(
    after_help = "Credentials are read from Google Application Default Credentials \
                  (GOOGLE_APPLICATION_CREDENTIALS, gcloud, or the metadata server)."
)]
pub struct Args {
    /// Google Cloud Project ID
    #[arg(short = 'p', value_name = "PROJECT_ID", env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    /// BigQuery Dataset
    #[arg(short = 'd', value_name = "DATASET")]
    pub dataset: String,

    /// BigQuery Table
    #[arg(short = 't', value_name = "TABLENAME", default_value = "bqwrite_test")]
    pub table: String,

    /// Number of Parallel Workers, 1 to 100
    #[arg(
        short = 'w',
        value_name = "WORKERS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub workers: u32,

    /// Number of Records, 1 to 100000000
    #[arg(
        short = 'i',
        value_name = "RECORDS",
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..=100_000_000)
    )]
    pub records: u64,

    /// Batch Size, 1 to 50000
    #[arg(
        short = 'b',
        value_name = "BATCH_SIZE",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=50_000)
    )]
    pub batch_size: u32,

    /// Delete and recreate the BigQuery Table before streaming
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Output Verbose Detail
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Override the BigQuery API endpoint (e.g. a local emulator); requests are then sent without credentials
    #[arg(long, value_name = "URL", env = "BIGQUERY_API_ENDPOINT")]
    pub api_endpoint: Option<String>,
}
