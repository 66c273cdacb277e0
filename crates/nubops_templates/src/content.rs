//! Build contents: a parsed template ready to be resolved and written.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::action::{BuildAction, BuildMode};
use crate::error::{TemplateError, TemplateResult};
use crate::sink::BuildSink;
use crate::symbols::Symbols;

/// A parsed template with a resolved target path and unresolved content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContent {
    template_path: PathBuf,
    target_path: PathBuf,
    content_template: String,
    first_content_line_number: usize,
}

impl BuildContent {
    pub(crate) fn new(
        template_path: PathBuf,
        target_path: PathBuf,
        content_template: String,
        first_content_line_number: usize,
    ) -> Self {
        Self {
            template_path,
            target_path,
            content_template,
            first_content_line_number,
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn content_template(&self) -> &str {
        &self.content_template
    }

    /// 0-based line of the template the content starts at.
    pub fn first_content_line_number(&self) -> usize {
        self.first_content_line_number
    }

    /// Resolve the content template against `symbols`.
    pub fn resolved_content(&self, symbols: &Symbols) -> TemplateResult<String> {
        symbols.substitute(&self.content_template).map_err(|error| {
            TemplateError::parse(
                &self.template_path,
                self.first_content_line_number,
                format!("cannot resolve content: {}", error),
            )
        })
    }

    /// Resolve the content and write it to the target path as `mode` demands.
    pub fn write(&self, mode: BuildMode, symbols: &Symbols, sink: &dyn BuildSink) -> TemplateResult<()> {
        let content = self.resolved_content(symbols)?;
        let action = BuildAction::WriteFile {
            mode,
            target_path: self.target_path.clone(),
            content: content.clone(),
        };

        if !mode.writes() {
            sink.planned(&action);
            return Ok(());
        }

        if let Some(parent) = self.target_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("creating folder {}", parent.display());
                fs::create_dir_all(parent)?;
            }
        }

        // create_new checks for an existing target and creates it in one step.
        let mut file = match OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .create_new(mode == BuildMode::Write)
            .open(&self.target_path)
        {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                return Err(TemplateError::Build(format!(
                    "cannot write existing target file, use --mode=overwrite to overwrite: {}",
                    self.target_path.display()
                )));
            }
            Err(error) => return Err(error.into()),
        };
        sink.executed(&action);
        file.write_all(content.as_bytes())?;

        Ok(())
    }
}
