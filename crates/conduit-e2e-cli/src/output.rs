//! Output formatting and result reporting

use crate::commands::OutputFormatArg;
use crate::error::CliResult;
use conduit_e2e::{ScenarioKind, ScenarioReport};
use console::{style, Style, Term};
use serde::Serialize;
use std::time::Duration;

/// Prints scenario progress and results to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a passed scenario
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failed scenario
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print one scenario result
    pub fn report(&self, report: &ScenarioReport) {
        let timing = format!(
            "{} ({:.2}s, {} attempt{})",
            report.name,
            report.duration.as_secs_f64(),
            report.attempts,
            if report.attempts == 1 { "" } else { "s" }
        );
        if report.passed {
            self.success(&timing);
        } else {
            self.failure(&timing);
            if let Some(error) = &report.error {
                let _ = self.term.write_line(&format!("    {error}"));
            }
        }
        if let Some(path) = &report.screenshot {
            self.info(&format!("screenshot: {}", path.display()));
        }
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }
        let _ = self.term.write_line("");
        let total = passed + failed;
        let secs = duration.as_secs_f64();
        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({} passed, {} failed)",
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}

#[derive(Debug, Serialize)]
struct ScenarioEntry {
    name: &'static str,
    description: &'static str,
}

/// Render the scenario catalogue
pub fn render_scenario_list(format: OutputFormatArg) -> CliResult<String> {
    let entries: Vec<ScenarioEntry> = ScenarioKind::all()
        .into_iter()
        .map(|kind| ScenarioEntry {
            name: kind.name(),
            description: kind.description(),
        })
        .collect();
    match format {
        OutputFormatArg::Json => Ok(serde_json::to_string_pretty(&entries)?),
        OutputFormatArg::Text => {
            let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
            Ok(entries
                .iter()
                .map(|e| format!("{:width$}  {}", e.name, e.description))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
