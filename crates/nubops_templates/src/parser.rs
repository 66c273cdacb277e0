//! Template file parser.
//!
//! A template starts with a header of comments and blank lines that ends with
//! a single `target: <path>` directive. The first non-blank line after it
//! starts the content, which is kept verbatim up to the end of the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::content::BuildContent;
use crate::error::{TemplateError, TemplateResult};
use crate::symbols::{SubstitutionError, Symbols};

/// Directive naming the file a template builds.
pub const TARGET_KEY: &str = "target";

/// All directive keys a header may contain.
pub const VALID_KEYS: &[&str] = &[TARGET_KEY];

fn key_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?P<key>[a-z][a-z0-9_]*)\s*:\s*(?P<value>.+)$")
            .expect("key line pattern must be a valid regex")
    })
}

/// Where the parser currently is inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    AtHeader,
    AfterTarget,
    AtContent,
}

/// Parse result under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDraft {
    pub target_path: Option<PathBuf>,
    pub content_template: String,
    pub first_content_line_number: Option<usize>,
}

/// Parses template files against a symbol mapping and target folder.
pub struct TemplateParser<'a> {
    symbols: &'a Symbols,
    target_folder: &'a Path,
}

impl<'a> TemplateParser<'a> {
    pub fn new(symbols: &'a Symbols, target_folder: &'a Path) -> Self {
        Self {
            symbols,
            target_folder,
        }
    }

    /// Read and parse a template file.
    pub fn parse_file(&self, template_path: &Path) -> TemplateResult<BuildContent> {
        info!("reading {}", template_path.display());
        let text = fs::read_to_string(template_path).map_err(|source| TemplateError::TemplateRead {
            path: template_path.to_path_buf(),
            source,
        })?;
        self.parse_str(template_path, &text)
    }

    /// Parse template text; `template_path` is only used for diagnostics.
    pub fn parse_str(&self, template_path: &Path, text: &str) -> TemplateResult<BuildContent> {
        let mut state = ParserState::AtHeader;
        let mut draft = TemplateDraft::default();
        let mut last_line_number = 0;

        for (line_number, line_with_newline) in text.split_inclusive('\n').enumerate() {
            state = self.advance(template_path, state, &mut draft, line_number, line_with_newline)?;
            last_line_number = line_number;
        }

        finish(template_path, state, draft, last_line_number)
    }

    /// Process a single line and return the state for the next one.
    pub fn advance(
        &self,
        template_path: &Path,
        state: ParserState,
        draft: &mut TemplateDraft,
        line_number: usize,
        line_with_newline: &str,
    ) -> TemplateResult<ParserState> {
        let line = line_with_newline.trim_end_matches('\n');
        let is_empty_line = line.trim().is_empty();

        match state {
            ParserState::AtHeader => {
                let is_comment_line = line.trim_start().starts_with('#');
                if is_empty_line || is_comment_line {
                    return Ok(ParserState::AtHeader);
                }
                let caps = key_line_pattern().captures(line).ok_or_else(|| {
                    TemplateError::parse(
                        template_path,
                        line_number,
                        format!("line must match 'key: value' but is: {}", line),
                    )
                })?;
                let key = &caps["key"];
                if !VALID_KEYS.contains(&key) {
                    return Err(TemplateError::parse(
                        template_path,
                        line_number,
                        format!("key is {:?} but must be one of: {}", key, VALID_KEYS.join(", ")),
                    ));
                }
                let target_path = self.target_path_from(caps["value"].trim_end()).map_err(|error| {
                    TemplateError::parse(
                        template_path,
                        0,
                        format!("cannot resolve target path: {}", error),
                    )
                })?;
                if target_path.as_os_str().is_empty() {
                    return Err(TemplateError::parse(template_path, 0, "target must be set"));
                }
                draft.target_path = Some(target_path);
                Ok(ParserState::AfterTarget)
            }
            ParserState::AfterTarget => {
                if is_empty_line {
                    return Ok(ParserState::AfterTarget);
                }
                draft.content_template = line_with_newline.to_string();
                draft.first_content_line_number = Some(line_number);
                Ok(ParserState::AtContent)
            }
            ParserState::AtContent => {
                draft.content_template.push_str(line_with_newline);
                Ok(ParserState::AtContent)
            }
        }
    }

    /// Resolve a target path template and rebase absolute results under the
    /// target folder.
    fn target_path_from(&self, value: &str) -> Result<PathBuf, SubstitutionError> {
        let resolved = self.symbols.substitute(value)?;
        if resolved.starts_with('/') {
            Ok(self.target_folder.join(resolved.trim_start_matches('/')))
        } else {
            Ok(PathBuf::from(resolved))
        }
    }
}

/// Freeze a draft once all lines have been consumed.
pub fn finish(
    template_path: &Path,
    state: ParserState,
    draft: TemplateDraft,
    last_line_number: usize,
) -> TemplateResult<BuildContent> {
    match (state, draft.target_path, draft.first_content_line_number) {
        (ParserState::AtHeader, None, _) => Err(TemplateError::parse(
            template_path,
            0,
            "target must be set",
        )),
        (ParserState::AfterTarget, Some(_), None) => Err(TemplateError::parse(
            template_path,
            last_line_number,
            "content template must be set",
        )),
        (ParserState::AtContent, Some(target_path), Some(first_content_line_number)) => {
            Ok(BuildContent::new(
                template_path.to_path_buf(),
                target_path,
                draft.content_template,
                first_content_line_number,
            ))
        }
        (state, target_path, first_content_line_number) => unreachable!(
            "inconsistent parser result for {}: state={:?}, target_path={:?}, first_content_line_number={:?}",
            template_path.display(),
            state,
            target_path,
            first_content_line_number
        ),
    }
}
