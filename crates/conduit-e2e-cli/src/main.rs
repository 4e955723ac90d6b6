//! conduit-e2e: run the Conduit journeys from the command line
//!
//! ## Usage
//!
//! ```bash
//! conduit-e2e list                                  # Show scenarios
//! conduit-e2e run                                   # Run every scenario
//! conduit-e2e run login-valid --headed              # One scenario, visible browser
//! conduit-e2e run --base-url http://localhost:4100  # Another deployment
//! conduit-e2e config -c e2e.yaml                    # Print the effective config
//! ```

use clap::Parser;
use conduit_e2e::telemetry::{init_tracing, Verbosity};
use conduit_e2e_cli::{
    render_scenario_list, resolve_run_config, Cli, CliConfig, CliError, CliResult, ColorChoice,
    Commands, ConfigArgs, RunArgs,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let _ = init_tracing(config.verbosity, cli.log_format.into());

    match cli.command {
        Commands::List(args) => {
            println!("{}", render_scenario_list(args.format)?);
            Ok(())
        }
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::Config(args) => show_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };
    let color: ColorChoice = cli.color.into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn show_config(args: &ConfigArgs) -> CliResult<()> {
    let e2e = resolve_run_config(&args.settings)?;
    print!("{}", serde_yaml_ng::to_string(&e2e)?);
    Ok(())
}

#[cfg(feature = "browser")]
fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    use conduit_e2e::BrowserSessions;
    use conduit_e2e_cli::{execute, select_scenarios, Reporter};
    use std::time::Instant;

    let kinds = select_scenarios(&args.scenarios)?;
    let e2e = resolve_run_config(&args.settings)?;
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    reporter.info(&format!("running {} scenario(s) against {}", kinds.len(), e2e.base_url));
    let started = Instant::now();

    let rt = tokio::runtime::Runtime::new()?;
    let reports = rt.block_on(execute(&kinds, &BrowserSessions, &e2e, args.fail_fast, |report| {
        reporter.report(report);
    }));

    let failed = reports.iter().filter(|r| !r.passed).count();
    reporter.summary(reports.len() - failed, failed, started.elapsed());

    if failed > 0 {
        return Err(CliError::ScenariosFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

#[cfg(not(feature = "browser"))]
fn run_scenarios(_config: CliConfig, _args: &RunArgs) -> CliResult<()> {
    Err(CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}
