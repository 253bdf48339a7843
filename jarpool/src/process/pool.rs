//! Process pool: a concurrency-safe registry of launched JAR processes.
//!
//! The pool is a passive registry, not a scheduler: it maps caller-chosen
//! integer identifiers to live child-process handles and mediates stream
//! access and termination. Launched processes run concurrently with the
//! caller; the pool itself performs no background work.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::error::{PoolError, Result};
use super::spawn::{describe_invocation, spawn_jar, LaunchOptions, SharedStdin, SharedStdout};
use tokio::process::Child;

/// Caller-chosen identifier naming one pool entry.
pub type ProcessId = u32;

/// A registered child process and its shared stream handles.
#[derive(Debug)]
struct PoolEntry {
    child: Child,
    stdout: SharedStdout,
    stdin: SharedStdin,
}

/// Outcome of a pool-wide shutdown sweep.
///
/// Shutdown is best-effort: per-identifier termination failures are collected
/// here rather than aborting the sweep.
#[derive(Debug, Default)]
pub struct ShutdownSummary {
    /// Identifiers whose processes were told to terminate.
    pub stopped: Vec<ProcessId>,

    /// Identifiers whose termination request failed at the OS level.
    pub failures: Vec<(ProcessId, std::io::Error)>,
}

impl ShutdownSummary {
    /// True when every termination request succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A pool of externally launched JAR processes keyed by integer identifier.
///
/// The registry only tracks "registered" vs "absent": a process that exits on
/// its own stays registered until an explicit [`Self::stop`] or
/// [`Self::shutdown_all`] removes it, and its streams are handed out as-is
/// with the stream's own EOF semantics.
///
/// # Example
///
/// ```rust,no_run
/// use jarpool::process::ProcessPool;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pool = ProcessPool::new(None);
///     pool.launch(1, "program1.jar", "Hey 100 3.14")?;
///
///     let stdout = pool.stdout(1)?;
///     // ... read lines from the shared stdout handle ...
///
///     pool.shutdown_all();
///     Ok(())
/// }
/// ```
pub struct ProcessPool {
    /// Prefix locating the `java` launcher binary; empty means search path.
    base_path: String,

    /// Registry of running processes. The lock is held only for map
    /// mutation/lookup, never across a spawn or kill syscall.
    entries: Mutex<HashMap<ProcessId, PoolEntry>>,
}

impl ProcessPool {
    /// Create an empty pool.
    ///
    /// `base_path` is prepended verbatim to the `java` launcher binary name,
    /// so a directory prefix must carry its trailing separator. `None` means
    /// "use the launcher found on the default search path".
    pub fn new(base_path: Option<String>) -> Self {
        Self {
            base_path: base_path.unwrap_or_default(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Launch a JAR and register it under `identifier`.
    ///
    /// The argument string is split naively on whitespace; see
    /// [`LaunchOptions::args_line`]. Use [`Self::launch_with`] for arguments
    /// containing spaces, a working directory, or environment variables.
    ///
    /// Launching with an identifier that is already registered overwrites the
    /// mapping. The prior process is *not* terminated by this call: it keeps
    /// running unowned, which is a documented quirk rather than a guarantee
    /// worth relying on. A warning is logged when it happens.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Launch`] when the OS cannot create the process;
    /// no entry is registered in that case.
    pub fn launch(&self, identifier: ProcessId, jar_path: &str, arguments: &str) -> Result<()> {
        self.launch_with(identifier, LaunchOptions::new(jar_path).args_line(arguments))
    }

    /// Launch a JAR described by [`LaunchOptions`] and register it.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Launch`] when the OS cannot create the process.
    pub fn launch_with(&self, identifier: ProcessId, options: LaunchOptions) -> Result<()> {
        // The spawn syscall happens outside the registry lock; only the
        // insert is serialized.
        let launched = spawn_jar(&self.base_path, &options)
            .map_err(|e| PoolError::launch(describe_invocation(&self.base_path, &options), e))?;

        debug!(
            identifier,
            jar = %options.jar_path,
            pid = ?launched.child.id(),
            "launched jar process"
        );

        let entry = PoolEntry {
            child: launched.child,
            stdout: launched.stdout,
            stdin: launched.stdin,
        };

        if self.lock().insert(identifier, entry).is_some() {
            warn!(
                identifier,
                "identifier reused; previous process handle dropped without termination"
            );
        }

        Ok(())
    }

    /// Get a shared handle to the process' standard output.
    ///
    /// Repeated calls return handles referring to the same underlying stream.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] when `identifier` is not registered.
    pub fn stdout(&self, identifier: ProcessId) -> Result<SharedStdout> {
        self.lock()
            .get(&identifier)
            .map(|entry| entry.stdout.clone())
            .ok_or(PoolError::not_found(identifier))
    }

    /// Get a shared handle to the process' standard input.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] when `identifier` is not registered.
    pub fn stdin(&self, identifier: ProcessId) -> Result<SharedStdin> {
        self.lock()
            .get(&identifier)
            .map(|entry| entry.stdin.clone())
            .ok_or(PoolError::not_found(identifier))
    }

    /// Forcibly terminate a process and remove it from the registry.
    ///
    /// Termination is requested, not awaited: the call returns once the kill
    /// has been issued, without waiting for the OS to reap the process. A
    /// failed kill (e.g. the process already exited) is logged, not returned;
    /// the entry is removed either way.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] when `identifier` is not registered.
    pub fn stop(&self, identifier: ProcessId) -> Result<()> {
        let mut entry = self
            .lock()
            .remove(&identifier)
            .ok_or(PoolError::not_found(identifier))?;

        if let Err(e) = entry.child.start_kill() {
            warn!(identifier, error = %e, "termination request failed");
        } else {
            debug!(identifier, "stopped jar process");
        }

        Ok(())
    }

    /// Terminate and remove every registered process.
    ///
    /// The identifier set is snapshotted before the sweep, so processes
    /// launched concurrently with the shutdown are not guaranteed to be
    /// included. Never fails outright; per-identifier kill failures are
    /// collected into the returned summary.
    pub fn shutdown_all(&self) -> ShutdownSummary {
        let identifiers = self.ids();
        let mut summary = ShutdownSummary::default();

        for identifier in identifiers {
            // A racing `stop` may have removed the entry already.
            let Some(mut entry) = self.lock().remove(&identifier) else {
                continue;
            };

            match entry.child.start_kill() {
                Ok(()) => summary.stopped.push(identifier),
                Err(e) => {
                    warn!(identifier, error = %e, "termination request failed during shutdown");
                    summary.failures.push((identifier, e));
                }
            }
        }

        debug!(
            stopped = summary.stopped.len(),
            failed = summary.failures.len(),
            "pool shutdown complete"
        );
        summary
    }

    /// Snapshot of the currently registered identifiers.
    pub fn ids(&self) -> Vec<ProcessId> {
        self.lock().keys().copied().collect()
    }

    /// Whether `identifier` is currently registered.
    pub fn contains(&self, identifier: ProcessId) -> bool {
        self.lock().contains_key(&identifier)
    }

    /// Number of registered processes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no process is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A poisoned lock only means another thread panicked mid-mutation of a
    /// HashMap we are about to overwrite or read whole; recover the guard.
    fn lock(&self) -> MutexGuard<'_, HashMap<ProcessId, PoolEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::fake_jre;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    const SLEEP_SCRIPT: &str = "#!/bin/sh\nsleep 30\n";

    /// Prints each program argument on its own line, then exits.
    const ECHO_ARGS_SCRIPT: &str = "#!/bin/sh\nshift 2\nfor a in \"$@\"; do echo \"$a\"; done\n";

    #[tokio::test]
    async fn test_not_found_symmetry() {
        let pool = ProcessPool::new(None);

        assert!(matches!(
            pool.stdout(9),
            Err(PoolError::NotFound { identifier: 9 })
        ));
        assert!(matches!(
            pool.stdin(9),
            Err(PoolError::NotFound { identifier: 9 })
        ));
        assert!(matches!(
            pool.stop(9),
            Err(PoolError::NotFound { identifier: 9 })
        ));
    }

    #[tokio::test]
    async fn test_launch_overwrite_keeps_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, ECHO_ARGS_SCRIPT);
        let pool = ProcessPool::new(Some(base));

        pool.launch(5, "program1.jar", "first").unwrap();
        pool.launch(5, "program1.jar", "second").unwrap();

        assert_eq!(pool.len(), 1);

        // The surviving entry is the second process.
        let stdout = pool.stdout(5).unwrap();
        let mut guard = stdout.lock().await;
        let mut lines = BufReader::new(&mut *guard).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_stop_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, SLEEP_SCRIPT);
        let pool = ProcessPool::new(Some(base));

        pool.launch(1, "program1.jar", "").unwrap();
        assert!(pool.contains(1));

        pool.stop(1).unwrap();
        assert!(!pool.contains(1));
        assert!(matches!(
            pool.stdout(1),
            Err(PoolError::NotFound { identifier: 1 })
        ));
    }

    #[tokio::test]
    async fn test_shutdown_clears_all() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, SLEEP_SCRIPT);
        let pool = ProcessPool::new(Some(base));

        for identifier in [1, 2, 3] {
            pool.launch(identifier, "program1.jar", "").unwrap();
        }
        assert_eq!(pool.len(), 3);

        let summary = pool.shutdown_all();
        assert!(summary.is_clean());
        assert_eq!(summary.stopped.len(), 3);
        assert!(pool.is_empty());

        for identifier in [1, 2, 3] {
            assert!(matches!(
                pool.stdout(identifier),
                Err(PoolError::NotFound { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_stream_identity() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, SLEEP_SCRIPT);
        let pool = ProcessPool::new(Some(base));

        pool.launch(1, "program1.jar", "").unwrap();

        let first = pool.stdout(1).unwrap();
        let second = pool.stdout(1).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let in_first = pool.stdin(1).unwrap();
        let in_second = pool.stdin(1).unwrap();
        assert!(Arc::ptr_eq(&in_first, &in_second));
    }

    #[tokio::test]
    async fn test_run_and_read_lines() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, ECHO_ARGS_SCRIPT);
        let pool = ProcessPool::new(Some(base));

        pool.launch(1, "program1.jar", "Hey 100 3.14").unwrap();

        let stdout = pool.stdout(1).unwrap();
        {
            let mut guard = stdout.lock().await;
            let mut lines = BufReader::new(&mut *guard).lines();
            let mut collected = Vec::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                collected.push(line);
            }
            assert_eq!(collected, vec!["Hey", "100", "3.14"]);
        }

        pool.shutdown_all();
        assert!(matches!(
            pool.stdout(1),
            Err(PoolError::NotFound { identifier: 1 })
        ));
    }

    #[tokio::test]
    async fn test_bad_launch_leaves_no_entry() {
        let pool = ProcessPool::new(Some("/nonexistent/path/".to_string()));

        let result = pool.launch(2, "does-not-exist.jar", "");
        assert!(matches!(result, Err(PoolError::Launch { .. })));
        assert!(!pool.contains(2));
    }

    #[tokio::test]
    async fn test_stdin_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, "#!/bin/sh\ncat\n");
        let pool = ProcessPool::new(Some(base));

        pool.launch(1, "program1.jar", "").unwrap();

        let stdin = pool.stdin(1).unwrap();
        {
            let mut guard = stdin.lock().await;
            guard.write_all(b"ping\n").await.unwrap();
            guard.flush().await.unwrap();
        }

        let stdout = pool.stdout(1).unwrap();
        let mut guard = stdout.lock().await;
        let mut lines = BufReader::new(&mut *guard).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("ping"));

        drop(lines);
        drop(guard);
        pool.stop(1).unwrap();
    }

    #[tokio::test]
    async fn test_launch_with_options() {
        let dir = tempfile::tempdir().unwrap();
        let base = fake_jre(&dir, ECHO_ARGS_SCRIPT);
        let pool = ProcessPool::new(Some(base));

        pool.launch_with(7, LaunchOptions::new("x.jar").arg("one arg with spaces"))
            .unwrap();

        let stdout = pool.stdout(7).unwrap();
        let mut guard = stdout.lock().await;
        let mut lines = BufReader::new(&mut *guard).lines();
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("one arg with spaces")
        );
    }
}
