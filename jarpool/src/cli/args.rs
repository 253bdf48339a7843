//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Jarpool - launch and manage a pool of JAR processes
#[derive(Parser, Debug)]
#[command(name = "jarpool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path prefix locating the JRE (prepended to the `java` binary name,
    /// include the trailing separator)
    #[arg(long)]
    pub jre_path: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch a JAR, stream its stdout until it exits, then shut the pool down
    Run {
        /// Path of the target JAR file
        jar: String,

        /// Program arguments passed to the JAR
        #[arg(trailing_var_arg = true)]
        arguments: Vec<String>,
    },
}
