//! Command line front end: clap parsing, CLI overrides on top of the file
//! configuration, and dispatch to `serve` / `migrate`.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Backend, Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::Settings;
use crate::logger::init_logger;

/// Load file configuration and merge CLI overrides into it.
///
/// Returns the validated settings together with the environment they
/// were loaded for.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<(Settings, crate::config::Environment)> {
    let merger = ConfigurationMerger::from_cli(cli).context("Configuration error")?;
    let settings = merger
        .merge_cli_args(cli)
        .context("Configuration merge error")?;
    Ok((settings, merger.environment()))
}

/// Installs the global subscriber described by `[logger]`.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    init_logger(settings.logger.clone()).context("Logger initialization error")
}
