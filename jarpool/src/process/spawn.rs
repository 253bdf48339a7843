//! JAR launch invocation construction and spawning.
//!
//! Builds the `<base_path>java -jar <jar> <args...>` invocation as a discrete
//! argument vector (no shell involved, no quoting applied) and spawns it with
//! piped stdin/stdout.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// Shared handle to a pooled process' standard output.
///
/// Clones refer to the same underlying OS stream; callers serialize their own
/// reads through the lock.
pub type SharedStdout = Arc<Mutex<ChildStdout>>;

/// Shared handle to a pooled process' standard input.
pub type SharedStdin = Arc<Mutex<ChildStdin>>;

/// Options for launching a JAR under the pool.
///
/// # Example
///
/// ```rust,no_run
/// use jarpool::process::LaunchOptions;
///
/// let options = LaunchOptions::new("worker.jar")
///     .arg("--port")
///     .arg("9000")
///     .working_dir("/srv/worker")
///     .env("WORKER_MODE", "batch");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Relative or absolute path of the target JAR file.
    pub jar_path: String,

    /// Program arguments passed to the JAR.
    pub arguments: Vec<String>,

    /// Working directory for the process.
    pub working_dir: Option<PathBuf>,

    /// Environment variables to set (merged with current env).
    pub env: HashMap<String, String>,
}

impl LaunchOptions {
    /// Create new options for the given JAR file.
    pub fn new(jar_path: impl Into<String>) -> Self {
        Self {
            jar_path: jar_path.into(),
            arguments: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add arguments from a single string, split naively on whitespace.
    ///
    /// No quoting is honored: `"a b"` becomes two arguments. Callers that need
    /// arguments containing spaces must use [`Self::arg`] instead.
    pub fn args_line(mut self, line: &str) -> Self {
        self.arguments
            .extend(line.split_whitespace().map(str::to_owned));
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// A freshly spawned JAR process with its stream handles taken.
pub(crate) struct LaunchedJar {
    pub child: Child,
    pub stdout: SharedStdout,
    pub stdin: SharedStdin,
}

/// Human-readable form of the invocation, used in error messages.
pub(crate) fn describe_invocation(base_path: &str, options: &LaunchOptions) -> String {
    format!("{base_path}java -jar {}", options.jar_path)
}

/// Spawn a JAR under the launcher located by `base_path`.
///
/// stdin and stdout are piped; stderr is inherited rather than captured, so
/// diagnostics from the child land on the caller's stderr instead of filling
/// an unread pipe.
pub(crate) fn spawn_jar(base_path: &str, options: &LaunchOptions) -> io::Result<LaunchedJar> {
    let launcher = format!("{base_path}java");

    let mut cmd = Command::new(&launcher);
    cmd.arg("-jar").arg(&options.jar_path);
    cmd.args(&options.arguments);

    if let Some(ref dir) = options.working_dir {
        cmd.current_dir(dir);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped());
    cmd.stdin(Stdio::piped());
    cmd.stderr(Stdio::inherit());

    let mut child = cmd.spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("child stdin was not captured"))?;

    Ok(LaunchedJar {
        child,
        stdout: Arc::new(Mutex::new(stdout)),
        stdin: Arc::new(Mutex::new(stdin)),
    })
}
