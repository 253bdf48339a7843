//! Error types for the process pool.

use thiserror::Error;

use super::pool::ProcessId;

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors surfaced by [`super::ProcessPool`] operations.
///
/// Absence of an identifier is a distinct, matchable condition rather than an
/// `Option`, so callers can tell "never registered" apart from a valid handle.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No process is registered under the given identifier.
    #[error("identifier {{{identifier}}} not found in pool")]
    NotFound {
        /// The identifier the caller asked for.
        identifier: ProcessId,
    },

    /// The operating system could not create the child process.
    #[error("failed to launch `{program}`")]
    Launch {
        /// The launcher invocation that failed.
        program: String,
        /// The underlying OS error, preserved for callers.
        #[source]
        source: std::io::Error,
    },
}

impl PoolError {
    pub(crate) const fn not_found(identifier: ProcessId) -> Self {
        Self::NotFound { identifier }
    }

    pub(crate) fn launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = PoolError::not_found(5);
        assert_eq!(err.to_string(), "identifier {5} not found in pool");
    }

    #[test]
    fn test_launch_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = PoolError::launch("java -jar missing.jar", io);
        assert!(err.to_string().contains("missing.jar"));

        let source = std::error::Error::source(&err).expect("source should be preserved");
        assert!(source.to_string().contains("no such file"));
    }
}
