//! mdcite CLI - validate and extract cross-document markdown citations.
//!
//! This is the main entry point for the mdcite command-line interface.
//! Command implementations are organized in separate modules for better
//! maintainability and single responsibility.

use anyhow::Result;
use clap::Parser;
use mdcite_core::Config;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands, ExtractCommands};
use output::OutputFormat;
use utils::initialize_logging;

/// Execute the mdcite CLI with the currently configured environment.
///
/// # Errors
///
/// Returns an error on system-level failures (bad arguments, unreadable
/// source, config problems); the binary maps these to exit code 2.
/// Validation failures and empty extractions exit with code 1 from inside
/// the command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let config = Config::load(cli.config.as_deref(), cli.config_dir.as_deref())?;
    let format = OutputFormat::resolve(
        cli.command.explicit_format(),
        config.format.as_deref(),
        cli.command.default_format(),
    );

    match cli.command {
        Commands::Validate {
            source,
            scope,
            lines,
            fix,
            ..
        } => commands::validate::execute(
            &source,
            scope.or_else(|| config.scope.clone()),
            format,
            lines.as_deref(),
            fix,
        ),
        Commands::Extract { command } => match command {
            ExtractCommands::Links {
                source,
                scope,
                full_files,
                session,
                ..
            } => commands::extract::links(
                &source,
                scope.or_else(|| config.scope.clone()),
                format,
                full_files || config.full_files,
                session.as_deref(),
            ),
            ExtractCommands::Header {
                target,
                header,
                scope,
                ..
            } => commands::extract::header(
                &target,
                &header,
                scope.or_else(|| config.scope.clone()),
                format,
            ),
            ExtractCommands::File { target, scope, .. } => {
                commands::extract::file(&target, scope.or_else(|| config.scope.clone()), format)
            },
        },
        Commands::Completions { shell } => {
            commands::completions::execute(shell);
            Ok(())
        },
    }
}
