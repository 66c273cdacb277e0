//! CLI command definitions.
//!
//! Every subcommand is a template family. Its arguments become the symbols the
//! family's templates and scripts are resolved with.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::info;

use nubops_runner::{ShellRunner, ShellRunnerOptions};
use nubops_templates::{resolve_symbols, BuildMode, FamilyBuilder, Symbols, TemplateError, TracingSink};

use crate::config::{NubopsConfig, Settings};

pub mod docker_daemon;
pub mod fail2ban;
pub mod nginx_django;
pub mod set_timezone;

/// nubops - generate system configuration files from templates
#[derive(Parser, Debug)]
#[command(name = "nubops")]
#[command(version, about = "Generate system configuration files from templates")]
#[command(long_about = r#"
nubops builds configuration files for common server setups from templates and
runs the shell commands needed to activate them.

MODES:
  show        → Only show what would be written and run (default)
  write       → Write new files, fail if a target already exists
  overwrite   → Write files, replacing existing ones

Commands only run in write and overwrite mode when the target folder is "/".

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Template error
  4 - Build error
  5 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// What to do with the generated files
    #[arg(short, long, global = true, value_enum, env = "NUBOPS_MODE")]
    pub mode: Option<ModeArg>,

    /// Folder absolute target paths are placed in
    #[arg(short, long, global = true, env = "NUBOPS_TARGET_FOLDER")]
    pub target_folder: Option<PathBuf>,

    /// Folder holding the template families
    #[arg(long, global = true, env = "NUBOPS_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./nubops.toml if present)
    #[arg(long, global = true, env = "NUBOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Build mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Show,
    Write,
    Overwrite,
}

impl From<ModeArg> for BuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Show => BuildMode::Show,
            ModeArg::Write => BuildMode::Write,
            ModeArg::Overwrite => BuildMode::Overwrite,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Nginx site and gunicorn service for a Django project
    #[command(name = "nginx-django")]
    NginxDjango(nginx_django::NginxDjangoArgs),

    /// Intrusion prevention for ssh with fail2ban
    Fail2ban(fail2ban::Fail2banArgs),

    /// Set the system timezone
    #[command(name = "set-timezone")]
    SetTimezone(set_timezone::SetTimezoneArgs),

    /// Docker daemon settings
    #[command(name = "docker-daemon")]
    DockerDaemon(docker_daemon::DockerDaemonArgs),
}

impl Commands {
    pub fn family(&self) -> &dyn TemplateFamily {
        match self {
            Commands::NginxDjango(args) => args,
            Commands::Fail2ban(args) => args,
            Commands::SetTimezone(args) => args,
            Commands::DockerDaemon(args) => args,
        }
    }
}

/// Arguments of a subcommand that builds a template family.
pub trait TemplateFamily {
    /// Family name, identical to the subcommand name.
    fn name(&self) -> &'static str;

    /// Argument names (as on the command line) and their values.
    fn arguments(&self) -> Vec<(&'static str, String)>;

    /// Symbols whose values may refer to other arguments.
    fn symbols_to_resolve(&self) -> &'static [&'static str] {
        &[]
    }

    /// Symbol mapping for this invocation.
    fn symbols(&self) -> Result<Symbols, TemplateError> {
        resolve_symbols(self.arguments(), self.symbols_to_resolve())
    }
}

/// An argument value that cannot be used; reported like a usage error.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ArgumentError(pub String);

/// Load configuration and build the family chosen on the command line.
pub fn run(cli: &Cli) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let config = NubopsConfig::discover(cli.config.as_deref(), &current_dir)?;
    let settings = Settings::resolve(cli, config, &current_dir);
    execute(cli.command.family(), &settings)
}

/// Build `family` with the given settings.
pub fn execute(family: &dyn TemplateFamily, settings: &Settings) -> Result<()> {
    let symbols = family.symbols().map_err(|error| match error {
        TemplateError::Resolution { .. } => anyhow::Error::new(ArgumentError(error.to_string())),
        other => anyhow::Error::new(other),
    })?;

    info!(
        "building {} in {} mode into {}",
        family.name(),
        settings.mode,
        settings.target_folder.display()
    );
    let builder = FamilyBuilder::new(
        &settings.templates_dir,
        family.name(),
        symbols,
        settings.mode,
        &settings.target_folder,
    )
    .with_context(|| format!("cannot read template family {}", family.name()))?;

    let runner = ShellRunner::new(ShellRunnerOptions::new().shell(&settings.shell));
    builder
        .build(&runner, &TracingSink)
        .with_context(|| format!("cannot build template family {}", family.name()))?;

    if !settings.mode.writes() {
        info!("nothing was written, use --mode=write or --mode=overwrite to apply");
    }
    Ok(())
}
