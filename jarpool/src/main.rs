//! Jarpool - pool externally launched JAR processes behind integer keys.
//!
//! Architecture:
//! - `process` owns the pool: a concurrency-safe identifier -> child-process
//!   registry with launch, stream-access, stop, and shutdown-all operations
//! - `cli` is a thin driver that exercises the pool: construct, launch,
//!   stream stdout lines, shut down

mod cli;
mod process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

fn initialize_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(cli.debug);
    execute(cli).await
}
