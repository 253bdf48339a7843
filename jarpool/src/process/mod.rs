//! Pool of externally launched JAR processes.
//!
//! This module provides the core registry: a concurrency-safe map from
//! integer identifier to a live child process, with launch, stream-access,
//! stop, and shutdown-all operations.

mod error;
mod pool;
mod spawn;

pub use error::{PoolError, Result};
pub use pool::{ProcessId, ProcessPool, ShutdownSummary};
pub use spawn::{LaunchOptions, SharedStdin, SharedStdout};
