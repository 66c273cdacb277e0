//! # nubops_templates
//!
//! Template parsing, symbol resolution and build orchestration for nubops.
//!
//! A template family is a folder of template files plus optional lifecycle
//! scripts. Each template file names its target path in a header directive
//! and carries the content to write below it:
//!
//! ```text
//! # Virtual host for the project.
//! target: /etc/nginx/sites-available/${project}
//!
//! server {
//!     server_name ${domain};
//! }
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use nubops_runner::ShellRunner;
//! use nubops_templates::{resolve_symbols, BuildMode, FamilyBuilder, TracingSink};
//!
//! let symbols = resolve_symbols(
//!     [("timezone", "Europe/Vienna")],
//!     &[],
//! ).unwrap();
//!
//! let builder = FamilyBuilder::new(
//!     Path::new("templates"),
//!     "set-timezone",
//!     symbols,
//!     BuildMode::Show,
//!     "/",
//! ).unwrap();
//!
//! builder.build(&ShellRunner::default(), &TracingSink).unwrap();
//! ```

pub mod action;
pub mod builder;
pub mod content;
pub mod error;
pub mod parser;
pub mod sink;
pub mod symbols;

pub use action::{BuildAction, BuildMode, ScriptKind};
pub use builder::{FamilyBuilder, COMMANDS_FOLDER};
pub use content::BuildContent;
pub use error::{TemplateError, TemplateResult};
pub use parser::{ParserState, TemplateDraft, TemplateParser, TARGET_KEY, VALID_KEYS};
pub use sink::{BuildSink, Record, RecordingSink, TracingSink};
pub use symbols::{resolve_symbols, substitute, symbol_name_from, SubstitutionError, Symbols};
