//! Script runner trait and types.

use chrono::{DateTime, Utc};

use crate::error::RunnerResult;

/// A resolved shell script ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript {
    /// Short name used for temporary file names and logging, e.g. "before".
    pub name: String,
    /// Script text, already resolved against the build's symbols.
    pub content: String,
}

impl ShellScript {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// File name of the script, e.g. "before.sh".
    pub fn file_name(&self) -> String {
        format!("{}.sh", self.name)
    }
}

/// Result of a script execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code of the shell, -1 if it was terminated by a signal
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Script runner trait.
///
/// Implementations execute a script synchronously and report its outcome.
/// A non-zero exit code is not an error at this level; callers decide what it
/// means for their build.
pub trait ScriptRunner: Send + Sync {
    /// Run a script to completion.
    fn run_script(&self, script: &ShellScript) -> RunnerResult<ExecutionResult>;
}
