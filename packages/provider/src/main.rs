//! CLI entry point for the provider.

use oaipmh_provider::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Request rejections log at info, so only source faults show by default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
