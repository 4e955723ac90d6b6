//! conduit-e2e CLI library
//!
//! Argument parsing, config resolution and result output for the
//! `conduit-e2e` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ListArgs, LogFormatArg, OutputFormatArg, RunArgs,
    ScreenshotArg, SettingsArgs,
};
pub use config::{resolve_run_config, CliConfig, ColorChoice};
pub use error::{CliError, CliResult};
pub use output::{render_scenario_list, Reporter};
pub use runner::{execute, select_scenarios};
