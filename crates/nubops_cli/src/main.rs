//! nubops CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Template error
//! - 4: Build error
//! - 5: Configuration error

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{ArgumentError, Cli};
use config::ConfigError;
use nubops_templates::TemplateError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 3;
    pub const BUILD_ERROR: u8 = 4;
    pub const CONFIG_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match commands::run(&cli) {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            if let Some(argument_error) = e.downcast_ref::<ArgumentError>() {
                // Reported like any other usage error.
                let usage_error = Cli::command().error(ErrorKind::ValueValidation, argument_error);
                let _ = usage_error.print();
                return ExitCode::from(ExitCodes::INVALID_ARGS);
            }
            let exit_code = categorize_error(&e);
            if exit_code == ExitCodes::GENERAL_ERROR {
                error!("unexpected error: {:?}", e);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Log to stdout; `RUST_LOG` overrides the level picked from the flags.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,nubops={level},nubops_templates={level},nubops_runner={level}"
        ))
    });

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(template_error) = e.downcast_ref::<TemplateError>() {
        if template_error.is_template_error() {
            ExitCodes::TEMPLATE_ERROR
        } else if matches!(template_error, TemplateError::Build(_)) {
            ExitCodes::BUILD_ERROR
        } else {
            ExitCodes::GENERAL_ERROR
        }
    } else if e.downcast_ref::<ConfigError>().is_some() {
        ExitCodes::CONFIG_ERROR
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
