// spud - main.rs
// Headless host: parse arguments, install diagnostics, hand over to the CLI dispatcher

use clap::Parser;
use spudlog::cli::{dispatch, Cli};
use std::process::exit;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Diagnostics of the pipeline itself go to stderr, separate from the binary log.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("❌ {e:#}");
        exit(1);
    }
}
