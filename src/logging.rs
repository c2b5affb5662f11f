//! Logging setup and run banner.

use tracing_subscriber::EnvFilter;

use crate::args::Args;

/// Default filter when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Log the application banner and the run parameters.
pub fn log_parameters(args: &Args) {
    tracing::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("Parameters");
    tracing::info!("  Project ID:     {}", args.project_id);
    tracing::info!("  Dataset:        {}", args.dataset);
    tracing::info!("  Table:          {}", args.table);
    tracing::info!("  Number Workers: {}", args.workers);
    tracing::info!("  Number Records: {}", args.records);
    tracing::info!("  Batch Size:     {}", args.batch_size);
    if let Some(endpoint) = &args.api_endpoint {
        tracing::info!("  API Endpoint:   {}", endpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "debug");
    }
}
