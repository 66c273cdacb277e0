//! Symbol mapping and shell-like `$name` / `${name}` substitution.
//!
//! Substitution is single pass: text produced by a substitution is never
//! scanned again. `$$` yields a literal `$`, and any other `$` that does not
//! start a valid reference is an error.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// Why a substitution failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("missing symbol: '{0}'")]
    MissingSymbol(String),

    #[error("invalid placeholder in string: line {line}, col {column}")]
    InvalidPlaceholder { line: usize, column: usize },
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$(?:(?P<escaped>\$)|(?P<named>[_A-Za-z][_A-Za-z0-9]*)|\{(?P<braced>[_A-Za-z][_A-Za-z0-9]*)\}|(?P<invalid>))",
        )
        .expect("placeholder pattern must be a valid regex")
    })
}

/// Substitute all references in `text` using `lookup`.
pub fn substitute<'a, F>(text: &str, lookup: F) -> Result<String, SubstitutionError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for caps in placeholder_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        result.push_str(&text[last_end..whole.start()]);

        if caps.name("escaped").is_some() {
            result.push('$');
        } else if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
            let value = lookup(name.as_str())
                .ok_or_else(|| SubstitutionError::MissingSymbol(name.as_str().to_string()))?;
            result.push_str(value);
        } else {
            let (line, column) = line_and_column(text, whole.start());
            return Err(SubstitutionError::InvalidPlaceholder { line, column });
        }
        last_end = whole.end();
    }
    result.push_str(&text[last_end..]);

    Ok(result)
}

/// 1-based line and column of the byte at `offset`.
fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
    let line = before.matches('\n').count() + 1;
    let column = text[line_start..offset].chars().count() + 1;
    (line, column)
}

/// Turn a command line argument name into a symbol name.
pub fn symbol_name_from(argument_name: &str) -> String {
    argument_name.replace('-', "_")
}

/// Immutable mapping from symbol name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    values: BTreeMap<String, String>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Substitute references in `text` with the values of this mapping.
    pub fn substitute(&self, text: &str) -> Result<String, SubstitutionError> {
        substitute(text, |name| self.get(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Symbols
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Build the symbol mapping for a build from raw argument values.
///
/// Argument names are normalized with [`symbol_name_from`]. Every symbol in
/// `symbols_to_resolve` is then substituted once, in order, against the
/// mapping as it stands at that point.
pub fn resolve_symbols<I, K, V>(arguments: I, symbols_to_resolve: &[&str]) -> TemplateResult<Symbols>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut values: BTreeMap<String, String> = arguments
        .into_iter()
        .map(|(name, value)| (symbol_name_from(name.as_ref()), value.into()))
        .collect();

    for &symbol in symbols_to_resolve {
        let raw_value = values.get(symbol).ok_or_else(|| {
            TemplateError::Build(format!(
                "symbol {:?} must be part of arguments: {:?}",
                symbol,
                values.keys().collect::<Vec<_>>()
            ))
        })?;
        let resolved = substitute(raw_value, |name| values.get(name).map(String::as_str)).map_err(
            |source| TemplateError::Resolution {
                name: format!("argument {}", symbol),
                source,
            },
        )?;
        debug!("resolved symbol {} to {:?}", symbol, resolved);
        values.insert(symbol.to_string(), resolved);
    }

    Ok(Symbols { values })
}
