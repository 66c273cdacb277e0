//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running lifecycle scripts.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {shell}: {source}")]
    SpawnFailed {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Script execution failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
