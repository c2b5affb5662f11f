//! Command-line interface for bqwrite-test
//!
//! # Usage Examples
//!
//! ```bash
//! # Stream 100000 records with 20 workers in batches of 500
//! bqwrite-test -p my-project -d my_dataset -w 20 -i 100000 -b 500
//!
//! # Recreate the table first and log progress every 2000 records
//! bqwrite-test -p my-project -d my_dataset -o -v
//! ```

use bqwrite_test::logging::{init_tracing, log_parameters};
use bqwrite_test::Args;
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    log_parameters(&args);

    let cancel = CancellationToken::new();
    tokio::spawn(watch_interrupts(cancel.clone()));

    bqwrite_test::run(&args, cancel).await?;
    Ok(())
}

/// First Ctrl-C cancels the run so provisioning or streaming stops cleanly.
/// A second one exits at once.
async fn watch_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::warn!("Interrupt received, stopping the run (press Ctrl-C again to exit now)");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("Error: interrupted");
        std::process::exit(1);
    }
}
