//! Per-row, per-scenario and per-suite results.

use crate::result::{ErrorKind, ProbeError, ProbeResult};
use crate::scenario::{RowState, ScenarioRow};
use crate::screenplay::{failed_step, StepRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Why a row failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// Error classification
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
    /// Innermost step that was running or failed, if any
    pub step: Option<String>,
}

/// Outcome of one scenario row
#[derive(Debug, Clone, Serialize)]
pub struct RowResult {
    /// Position in the table
    pub index: usize,
    /// Display name
    pub label: String,
    /// Row parameters
    pub parameters: ScenarioRow,
    /// Final state, `Passed` or `Failed`
    pub state: RowState,
    /// Failure details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RowError>,
    /// Steps the actor attempted
    pub steps: Vec<StepRecord>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl RowResult {
    /// Build the result of a finished row
    #[must_use]
    pub fn finished(
        index: usize,
        label: String,
        parameters: ScenarioRow,
        outcome: ProbeResult<()>,
        steps: Vec<StepRecord>,
        duration_ms: u64,
    ) -> Self {
        let error = outcome.err().map(|e| RowError {
            kind: e.kind(),
            message: e.to_string(),
            step: failed_step(&steps).map(|record| record.title.clone()),
        });
        Self {
            index,
            label,
            parameters,
            state: if error.is_some() {
                RowState::Failed
            } else {
                RowState::Passed
            },
            error,
            steps,
            duration_ms,
        }
    }

    /// Whether the row passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == RowState::Passed
    }
}

/// All rows of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Row results in table order
    pub rows: Vec<RowResult>,
}

impl ScenarioReport {
    /// Create a report
    #[must_use]
    pub fn new(
        scenario: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        rows: Vec<RowResult>,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            started_at,
            duration_ms,
            rows,
        }
    }

    /// Number of rows
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Number of passing rows
    #[must_use]
    pub fn passed(&self) -> usize {
        self.rows.iter().filter(|row| row.passed()).count()
    }

    /// Number of failing rows
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Whether every row passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.rows.iter().all(RowResult::passed)
    }

    /// Failing rows in table order
    pub fn failures(&self) -> impl Iterator<Item = &RowResult> {
        self.rows.iter().filter(|row| !row.passed())
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}/{} rows passed, {}ms)",
            self.scenario,
            self.passed(),
            self.total(),
            self.duration_ms
        )?;
        for row in &self.rows {
            match &row.error {
                None => writeln!(f, "  PASS {}", row.label)?,
                Some(error) => {
                    writeln!(f, "  FAIL {} [{}] {}", row.label, error.kind, error.message)?;
                    if let Some(step) = &error.step {
                        writeln!(f, "       at: {step}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A scenario that could not be run at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioError {
    /// Scenario name
    pub scenario: String,
    /// Error classification
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
}

impl ScenarioError {
    /// Record `error` against `scenario`
    #[must_use]
    pub fn new(scenario: impl Into<String>, error: &ProbeError) -> Self {
        Self {
            scenario: scenario.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Results of a whole suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite: String,
    /// Scenario reports in definition order
    pub scenarios: Vec<ScenarioReport>,
    /// Scenarios that could not run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ScenarioError>,
}

impl SuiteReport {
    /// Create an empty report
    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            scenarios: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Append a scenario report
    pub fn push(&mut self, report: ScenarioReport) {
        self.scenarios.push(report);
    }

    /// Append a configuration error
    pub fn push_error(&mut self, error: ScenarioError) {
        self.errors.push(error);
    }

    /// Append every scenario and error of `other`
    pub fn merge(&mut self, other: Self) {
        self.scenarios.extend(other.scenarios);
        self.errors.extend(other.errors);
    }

    /// Rows across all scenarios
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.scenarios.iter().map(ScenarioReport::total).sum()
    }

    /// Failing rows across all scenarios
    #[must_use]
    pub fn failed_rows(&self) -> usize {
        self.scenarios.iter().map(ScenarioReport::failed).sum()
    }

    /// True when every scenario ran and every row passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.errors.is_empty() && self.scenarios.iter().all(ScenarioReport::all_passed)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scenario in &self.scenarios {
            write!(f, "{scenario}")?;
        }
        for error in &self.errors {
            writeln!(f, "{} could not run [{}] {}", error.scenario, error.kind, error.message)?;
        }
        write!(
            f,
            "{}: {} scenarios, {} rows, {} failed",
            self.suite,
            self.scenarios.len() + self.errors.len(),
            self.total_rows(),
            self.failed_rows()
        )
    }
}
