//! # nubops_runner
//!
//! Lifecycle script execution for nubops.
//!
//! Template families may ship `install`, `before` and `after` shell scripts.
//! This crate runs them once they have been resolved against the build's
//! symbols.
//!
//! # Features
//!
//! - **Shell Runner**: writes the script to a scoped temporary file and runs it
//!   with `/bin/sh` (or another configured shell)
//! - **Mock Runner**: for testing without executing anything
//!
//! # Example
//!
//! ```rust,no_run
//! use nubops_runner::{ScriptRunner, ShellRunner, ShellRunnerOptions, ShellScript};
//!
//! let runner = ShellRunner::new(ShellRunnerOptions::default());
//! let script = ShellScript::new("after", "systemctl reload nginx\n");
//!
//! let result = runner.run_script(&script).unwrap();
//! println!("Exit code: {}", result.exit_code);
//! ```

pub mod error;
pub mod mock;
pub mod runner;
pub mod shell;

pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{ExecutionResult, ScriptRunner, ShellScript};
pub use shell::{ShellRunner, ShellRunnerOptions};
