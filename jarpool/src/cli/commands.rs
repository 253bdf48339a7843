//! CLI command execution.
//!
//! The CLI is a thin driver over the pool: construct, launch, stream lines,
//! shut down. Errors print and abort the operation without corrupting the
//! pool's registry.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::process::ProcessPool;

use super::args::{Cli, Commands};

/// Identifier used for the single process driven by `run`.
const RUN_ID: u32 = 1;

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let pool = ProcessPool::new(cli.jre_path);

    match cli.command {
        Commands::Run { jar, arguments } => run(&pool, &jar, &arguments.join(" ")).await,
    }
}

/// Launch a JAR and relay its stdout line by line until end-of-stream.
async fn run(pool: &ProcessPool, jar: &str, arguments: &str) -> Result<()> {
    pool.launch(RUN_ID, jar, arguments)?;

    let stdout = pool.stdout(RUN_ID)?;
    {
        let mut guard = stdout.lock().await;
        let mut lines = BufReader::new(&mut *guard).lines();
        while let Some(line) = lines.next_line().await? {
            println!("OUT> {line}");
        }
    }

    let summary = pool.shutdown_all();
    for (identifier, error) in &summary.failures {
        warn!(identifier, %error, "failed to terminate process");
    }

    Ok(())
}
