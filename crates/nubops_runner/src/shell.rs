//! Shell based script runner.
//!
//! Each script is written to its own temporary file, executed with the
//! configured shell and removed again once the run is over, whether it
//! succeeded or not.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ExecutionResult, ScriptRunner, ShellScript};

/// Default shell used to execute scripts.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Shell runner options.
#[derive(Debug, Clone)]
pub struct ShellRunnerOptions {
    /// Shell executable the script file is passed to
    pub shell: String,
    /// Log script output line by line as it is collected
    pub stream_logs: bool,
}

impl Default for ShellRunnerOptions {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            stream_logs: true,
        }
    }
}

impl ShellRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn stream_logs(mut self, enabled: bool) -> Self {
        self.stream_logs = enabled;
        self
    }
}

/// Runs scripts through a shell from a scoped temporary file.
pub struct ShellRunner {
    options: ShellRunnerOptions,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(ShellRunnerOptions::default())
    }
}

impl ShellRunner {
    pub fn new(options: ShellRunnerOptions) -> Self {
        Self { options }
    }

    /// Get the configured shell.
    pub fn shell(&self) -> &str {
        &self.options.shell
    }

    fn log_output(&self, script: &ShellScript, stdout: &str, stderr: &str) {
        if !self.options.stream_logs {
            return;
        }
        let file_name = script.file_name();
        for line in stdout.lines() {
            info!("[{}] {}", file_name, line);
        }
        for line in stderr.lines() {
            warn!("[{}] {}", file_name, line);
        }
    }
}

impl ScriptRunner for ShellRunner {
    fn run_script(&self, script: &ShellScript) -> RunnerResult<ExecutionResult> {
        // Dropping the file at the end of this scope removes it.
        let mut script_file = tempfile::Builder::new()
            .prefix(&format!("nubops_{}_", script.name))
            .suffix(".sh")
            .tempfile()?;
        script_file.write_all(script.content.as_bytes())?;
        script_file.flush()?;

        debug!(
            "Executing {}: {} {}",
            script.file_name(),
            self.options.shell,
            script_file.path().display()
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let output = Command::new(&self.options.shell)
            .arg(script_file.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::SpawnFailed {
                shell: self.options.shell.clone(),
                source,
            })?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        self.log_output(script, &stdout, &stderr);

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(
            "{} finished with exit code {} after {} ms",
            script.file_name(),
            exit_code,
            duration_ms
        );

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ShellRunnerOptions::new().shell("/bin/bash").stream_logs(false);
        assert_eq!(options.shell, "/bin/bash");
        assert!(!options.stream_logs);
    }

    #[test]
    fn test_default_shell() {
        let runner = ShellRunner::default();
        assert_eq!(runner.shell(), DEFAULT_SHELL);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_script_captures_output() {
        let runner = ShellRunner::default();
        let script = ShellScript::new("before", "echo hello\necho oops >&2\n");

        let result = runner.run_script(&script).unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_script_reports_exit_code() {
        let runner = ShellRunner::new(ShellRunnerOptions::new().stream_logs(false));
        let script = ShellScript::new("after", "exit 3\n");

        let result = runner.run_script(&script).unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
    }

    #[test]
    fn test_missing_shell_fails_to_spawn() {
        let runner = ShellRunner::new(ShellRunnerOptions::new().shell("/nonexistent/nubops-shell"));
        let script = ShellScript::new("install", "true\n");

        let error = runner.run_script(&script).unwrap_err();
        assert!(matches!(error, RunnerError::SpawnFailed { .. }));
    }
}
