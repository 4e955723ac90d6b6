//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use conduit_e2e::ScreenshotPolicy;
use std::path::PathBuf;

/// conduit-e2e: run the Conduit login and article journeys in Chromium
#[derive(Parser, Debug)]
#[command(name = "conduit-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available scenarios
    List(ListArgs),

    /// Run scenarios against a Conduit deployment
    Run(RunArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Settings shared by `run` and `config`
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SettingsArgs {
    /// YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the app under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch Chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long)]
    pub chromium: Option<PathBuf>,

    /// Extra attempts per failed scenario
    #[arg(long)]
    pub retries: Option<u32>,

    /// Pause between journey steps, in milliseconds
    #[arg(long)]
    pub step_pause_ms: Option<u64>,

    /// Per-scenario time limit, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// When to capture end-of-test screenshots
    #[arg(long)]
    pub screenshots: Option<ScreenshotArg>,

    /// Directory for screenshots
    #[arg(long)]
    pub screenshots_dir: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenarios to run (default: all)
    pub scenarios: Vec<String>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Run settings
    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Run settings
    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Plain text lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl From<LogFormatArg> for conduit_e2e::telemetry::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Screenshot policy argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenshotArg {
    /// Never capture
    Off,
    /// Capture failed scenarios
    OnlyOnFailure,
    /// Capture every scenario
    Always,
}

impl From<ScreenshotArg> for ScreenshotPolicy {
    fn from(arg: ScreenshotArg) -> Self {
        match arg {
            ScreenshotArg::Off => Self::Off,
            ScreenshotArg::OnlyOnFailure => Self::OnlyOnFailure,
            ScreenshotArg::Always => Self::Always,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}
