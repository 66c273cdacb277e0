//! Error types for templates.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::symbols::SubstitutionError;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while resolving, parsing or building templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("cannot resolve {name}: {source}")]
    Resolution {
        name: String,
        #[source]
        source: SubstitutionError,
    },

    #[error("{}:{}: {}", file_name(.path), .line_number + 1, .message)]
    Parse {
        path: PathBuf,
        /// 0-based line the problem was found at.
        line_number: usize,
        message: String,
    },

    #[error("{0}")]
    Build(String),

    #[error("cannot read template {}: {}", .path.display(), .source)]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read command template {}: {}", .path.display(), .source)]
    ScriptTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runner error: {0}")]
    Runner(#[from] nubops_runner::RunnerError),
}

impl TemplateError {
    pub(crate) fn parse(path: &Path, line_number: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            line_number,
            message: message.into(),
        }
    }

    /// Whether the error stems from template or argument content rather than
    /// from the environment the build runs in.
    pub fn is_template_error(&self) -> bool {
        matches!(self, Self::Resolution { .. } | Self::Parse { .. })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
