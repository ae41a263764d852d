//! Report rendering

use crate::config::{CliConfig, Verbosity};
use console::{style, Term};
use shopprobe::{RowResult, ScenarioReport, SuiteReport};

/// Writes suite reports to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    use_color: bool,
    verbosity: Verbosity,
}

impl Reporter {
    /// Create a reporter for `config`
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            term: Term::stdout(),
            use_color: config.color.should_color(),
            verbosity: config.verbosity,
        }
    }

    /// Render `report` as text
    pub fn text(&self, report: &SuiteReport) -> std::io::Result<()> {
        for scenario in &report.scenarios {
            self.scenario(scenario)?;
        }
        for error in &report.errors {
            self.term.write_line(&format!(
                "{} {} could not run: {}",
                self.fail_mark(),
                error.scenario,
                error.message
            ))?;
        }
        let summary = format!(
            "{} scenarios, {} rows, {} failed",
            report.scenarios.len() + report.errors.len(),
            report.total_rows(),
            report.failed_rows()
        );
        let summary = if !self.use_color {
            summary
        } else if report.all_passed() {
            style(summary).green().bold().to_string()
        } else {
            style(summary).red().bold().to_string()
        };
        self.term.write_line(&summary)
    }

    /// Render `report` as pretty JSON
    pub fn json(&self, report: &SuiteReport) -> shopprobe::ProbeResult<()> {
        self.term.write_line(&report.to_json()?)?;
        Ok(())
    }

    fn scenario(&self, scenario: &ScenarioReport) -> std::io::Result<()> {
        if self.verbosity.is_quiet() && scenario.all_passed() {
            return Ok(());
        }
        let heading = format!(
            "{} ({}/{})",
            scenario.scenario,
            scenario.passed(),
            scenario.total()
        );
        let heading = if self.use_color {
            style(heading).bold().to_string()
        } else {
            heading
        };
        self.term.write_line(&heading)?;
        for row in &scenario.rows {
            self.row(row)?;
        }
        Ok(())
    }

    fn row(&self, row: &RowResult) -> std::io::Result<()> {
        match &row.error {
            None => {
                if !self.verbosity.is_quiet() {
                    self.term.write_line(&format!(
                        "  {} {} ({}ms)",
                        self.pass_mark(),
                        row.label,
                        row.duration_ms
                    ))?;
                }
            }
            Some(error) => {
                self.term.write_line(&format!(
                    "  {} {} [{}] {}",
                    self.fail_mark(),
                    row.label,
                    error.kind,
                    error.message
                ))?;
                if let Some(step) = &error.step {
                    self.term.write_line(&format!("      at: {step}"))?;
                }
            }
        }
        if self.verbosity.is_verbose() {
            for step in &row.steps {
                self.term.write_line(&format!(
                    "      {}{} ({}ms)",
                    "  ".repeat(step.depth),
                    step.title,
                    step.duration_ms
                ))?;
            }
        }
        Ok(())
    }

    fn pass_mark(&self) -> String {
        if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        }
    }

    fn fail_mark(&self) -> String {
        if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        }
    }
}
