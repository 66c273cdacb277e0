//! Build orchestration for a template family.
//!
//! A family is a folder below the templates root holding template files and
//! an optional `commands` folder with `install.sh`, `before.sh` and
//! `after.sh`. Everything is read and resolved when the builder is created,
//! so a broken family fails before anything is written or run.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use nubops_runner::{ScriptRunner, ShellScript};
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::action::{BuildAction, BuildMode, ScriptKind};
use crate::content::BuildContent;
use crate::error::{TemplateError, TemplateResult};
use crate::parser::TemplateParser;
use crate::sink::BuildSink;
use crate::symbols::{symbol_name_from, Symbols};

/// Folder inside a family that holds lifecycle scripts.
pub const COMMANDS_FOLDER: &str = "commands";

fn family_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]*$").expect("family name pattern must be a valid regex")
    })
}

/// Builds all templates and runs all lifecycle scripts of one family.
#[derive(Debug)]
pub struct FamilyBuilder {
    name: String,
    symbols: Symbols,
    mode: BuildMode,
    build_contents: Vec<BuildContent>,
    scripts: BTreeMap<ScriptKind, String>,
    runs_scripts: bool,
}

impl FamilyBuilder {
    /// Read and resolve the family `family` below `templates_root`.
    pub fn new(
        templates_root: &Path,
        family: &str,
        symbols: Symbols,
        mode: BuildMode,
        target_folder: impl Into<PathBuf>,
    ) -> TemplateResult<Self> {
        if !family_name_pattern().is_match(family) {
            return Err(TemplateError::Build(format!(
                "template family name {:?} must match {}",
                family,
                family_name_pattern().as_str()
            )));
        }

        let name = symbol_name_from(family);
        let templates_folder = templates_root.join(&name);
        let target_folder = target_folder.into();
        info!("reading templates from {}", templates_folder.display());

        if !templates_folder.is_dir() {
            return Err(TemplateError::Build(format!(
                "cannot find template family {:?} in {}",
                family,
                templates_root.display()
            )));
        }

        let build_contents = create_build_contents(&templates_folder, &symbols, &target_folder)?;
        let scripts = create_scripts(&templates_folder, &symbols)?;
        if build_contents.is_empty() && scripts.is_empty() {
            return Err(TemplateError::Build(format!(
                "template family {:?} must contain at least one template or command script: {}",
                family,
                templates_folder.display()
            )));
        }

        let runs_scripts = mode.writes() && target_folder == Path::new("/");
        debug!(
            "family {} has {} template(s) and {} script(s), runs scripts: {}",
            name,
            build_contents.len(),
            scripts.len(),
            runs_scripts
        );

        Ok(Self {
            name,
            symbols,
            mode,
            build_contents,
            scripts,
            runs_scripts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_contents(&self) -> &[BuildContent] {
        &self.build_contents
    }

    /// Resolved script of the given kind, if the family has one.
    pub fn script(&self, kind: ScriptKind) -> Option<&str> {
        self.scripts.get(&kind).map(String::as_str)
    }

    /// Scripts only run for writing builds into the real system root.
    pub fn runs_scripts(&self) -> bool {
        self.runs_scripts
    }

    /// Run `install` and `before`, write all contents, then run `after`.
    pub fn build(&self, runner: &dyn ScriptRunner, sink: &dyn BuildSink) -> TemplateResult<()> {
        self.run_script(ScriptKind::Install, runner, sink)?;
        self.run_script(ScriptKind::Before, runner, sink)?;
        self.write_contents(sink)?;
        self.run_script(ScriptKind::After, runner, sink)?;
        Ok(())
    }

    fn run_script(
        &self,
        kind: ScriptKind,
        runner: &dyn ScriptRunner,
        sink: &dyn BuildSink,
    ) -> TemplateResult<()> {
        let Some(content) = self.scripts.get(&kind) else {
            return Ok(());
        };
        let action = BuildAction::RunScript {
            kind,
            content: content.clone(),
        };

        if !self.runs_scripts {
            sink.planned(&action);
            return Ok(());
        }

        sink.executed(&action);
        let result = runner.run_script(&ShellScript::new(kind.as_str(), content.clone()))?;
        if !result.success() {
            return Err(TemplateError::Build(format!(
                "{} of template family {} failed with exit code {}: {}",
                kind.sh_name(),
                self.name,
                result.exit_code,
                result.combined_output().trim()
            )));
        }
        Ok(())
    }

    fn write_contents(&self, sink: &dyn BuildSink) -> TemplateResult<()> {
        for build_content in &self.build_contents {
            build_content.write(self.mode, &self.symbols, sink)?;
        }
        Ok(())
    }
}

fn create_build_contents(
    templates_folder: &Path,
    symbols: &Symbols,
    target_folder: &Path,
) -> TemplateResult<Vec<BuildContent>> {
    let parser = TemplateParser::new(symbols, target_folder);
    let mut result = Vec::new();

    for entry in WalkDir::new(templates_folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.path().is_file() {
            result.push(parser.parse_file(entry.path())?);
        }
    }

    Ok(result)
}

fn create_scripts(
    templates_folder: &Path,
    symbols: &Symbols,
) -> TemplateResult<BTreeMap<ScriptKind, String>> {
    let commands_folder = templates_folder.join(COMMANDS_FOLDER);
    let mut result = BTreeMap::new();

    for kind in ScriptKind::ALL {
        let script_path = commands_folder.join(kind.sh_name());
        let script_template = match fs::read_to_string(&script_path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(TemplateError::ScriptTemplate {
                    path: script_path,
                    source,
                })
            }
        };
        let script = symbols.substitute(&script_template).map_err(|error| {
            TemplateError::parse(
                &script_path,
                0,
                format!("cannot resolve script {}: {}", kind.sh_name(), error),
            )
        })?;
        debug!("found {}", script_path.display());
        result.insert(kind, script);
    }

    Ok(result)
}
