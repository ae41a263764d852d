//! Data-table scenarios and their executor.
//!
//! A [`Scenario`] is a body run once per [`ScenarioRow`]. The
//! [`ScenarioExecutor`] gives every row its own page session and actor, so a
//! failing row never affects the next one. Rows run one after another by
//! default, or concurrently when [`ExecutorConfig::parallel`] is set.
//!
//! ```ignore
//! let scenario = Scenario::new("invalid login", |actor, row| async move {
//!     let credentials = Credentials::new(row.require("username")?, row.require("password")?);
//!     actor.attempts_to(&Login::with_credentials(credentials)).await?;
//!     let message = actor.asks_for(&Login::error_message()).await?;
//!     Assertion::contains(&message, row.require("expected")?).into_result()
//! })
//! .with_rows(DataTable::parse(["username", "password", "expected"], TABLE)?)
//! .named_rows("{username} / {password}");
//! ```

use crate::config::AppConfig;
use crate::driver::SessionFactory;
use crate::report::{RowResult, ScenarioError, ScenarioReport, SuiteReport};
use crate::result::{ProbeError, ProbeResult};
use crate::screenplay::Actor;
use crate::session::{PageSession, SessionGuard};
use chrono::Utc;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use regex::{Captures, Regex};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Ordered named parameters for one execution of a scenario body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioRow {
    values: Vec<(String, String)>,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*|[0-9]+)\}").expect("placeholder pattern is valid")
    })
}

impl ScenarioRow {
    /// Create an empty row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing an existing one with the same name in place
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    /// Value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value by name, or a configuration error naming the missing parameter
    pub fn require(&self, name: &str) -> ProbeResult<&str> {
        self.get(name)
            .ok_or_else(|| ProbeError::config(format!("row has no parameter '{name}'")))
    }

    /// Value by position
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|(_, value)| value.as_str())
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a row without parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace `{name}` and `{0}` placeholders; unknown placeholders are kept
    #[must_use]
    pub fn substitute(&self, template: &str) -> String {
        placeholder_pattern()
            .replace_all(template, |caps: &Captures<'_>| {
                let key = &caps[1];
                let value = match key.parse::<usize>() {
                    Ok(index) => self.at(index),
                    Err(_) => self.get(key),
                };
                value.map_or_else(|| caps[0].to_string(), str::to_string)
            })
            .into_owned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ScenarioRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |row, (name, value)| row.with(name, value))
    }
}

impl fmt::Display for ScenarioRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        Ok(())
    }
}

impl Serialize for ScenarioRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Source of scenario rows
pub trait RowSource: Send + Sync {
    /// Produce every row, validating shape
    fn rows(&self) -> ProbeResult<Vec<ScenarioRow>>;
}

impl RowSource for Vec<ScenarioRow> {
    fn rows(&self) -> ProbeResult<Vec<ScenarioRow>> {
        Ok(self.clone())
    }
}

/// In-memory table of named columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a table with the given column names and no rows
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// One row without parameters, for scenarios that are not parameterized
    #[must_use]
    pub fn single() -> Self {
        Self {
            columns: Vec::new(),
            rows: vec![Vec::new()],
        }
    }

    /// Append a row of cells in column order
    #[must_use]
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Parse pipe-delimited lines, one row per line.
    ///
    /// Cells are trimmed, `''` denotes an empty string, blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse<I, S>(columns: I, text: &str) -> ProbeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cells: Vec<String> = line
                .split('|')
                .map(|cell| match cell.trim() {
                    "''" => String::new(),
                    other => other.to_string(),
                })
                .collect();
            if cells.len() != table.columns.len() {
                return Err(ProbeError::config(format!(
                    "line {}: expected {} cells, found {}",
                    number + 1,
                    table.columns.len(),
                    cells.len()
                )));
            }
            table.rows.push(cells);
        }
        Ok(table)
    }

    /// Column names
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl RowSource for DataTable {
    fn rows(&self) -> ProbeResult<Vec<ScenarioRow>> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(column) {
                return Err(ProbeError::config(format!("duplicate column '{column}'")));
            }
        }
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| {
                if cells.len() != self.columns.len() {
                    return Err(ProbeError::config(format!(
                        "row {index}: expected {} cells, found {}",
                        self.columns.len(),
                        cells.len()
                    )));
                }
                Ok(self.columns.iter().cloned().zip(cells.iter().cloned()).collect())
            })
            .collect()
    }
}

/// Execution state of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    /// Not picked up yet
    NotStarted,
    /// Body in flight
    Running,
    /// Body returned `Ok`
    Passed,
    /// Body returned an error, panicked or timed out
    Failed,
}

impl RowState {
    /// Whether the row has finished
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

type BodyFn = Arc<dyn Fn(Arc<Actor>, ScenarioRow) -> BoxFuture<'static, ProbeResult<()>> + Send + Sync>;
type HookFn = Arc<dyn Fn(Arc<Actor>) -> BoxFuture<'static, ProbeResult<()>> + Send + Sync>;

/// A named test body with its data rows
#[derive(Clone)]
pub struct Scenario {
    name: String,
    body: BodyFn,
    before_each: Option<HookFn>,
    rows: Arc<dyn RowSource>,
    row_name: Option<String>,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("row_name", &self.row_name)
            .field("before_each", &self.before_each.is_some())
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a scenario that runs `body` once, with an empty row
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arc<Actor>, ScenarioRow) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProbeResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(move |actor, row| body(actor, row).boxed()),
            before_each: None,
            rows: Arc::new(DataTable::single()),
            row_name: None,
        }
    }

    /// Run the body once per row of `rows`
    #[must_use]
    pub fn with_rows(mut self, rows: impl RowSource + 'static) -> Self {
        self.rows = Arc::new(rows);
        self
    }

    /// Display-name template for rows, e.g. `"{username} / {password}"`
    #[must_use]
    pub fn named_rows(mut self, template: impl Into<String>) -> Self {
        self.row_name = Some(template.into());
        self
    }

    /// Run `hook` inside every row before the body, with the row's actor
    #[must_use]
    pub fn before_each<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<Actor>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProbeResult<()>> + Send + 'static,
    {
        self.before_each = Some(Arc::new(move |actor| hook(actor).boxed()));
        self
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows from the configured source
    pub fn rows(&self) -> ProbeResult<Vec<ScenarioRow>> {
        self.rows.rows()
    }

    /// Display name of a row
    #[must_use]
    pub fn row_label(&self, index: usize, row: &ScenarioRow) -> String {
        match &self.row_name {
            Some(template) => row.substitute(template),
            None if row.is_empty() => self.name.clone(),
            None => format!("#{index} {row}"),
        }
    }

    async fn run_body(&self, actor: Arc<Actor>, row: ScenarioRow) -> ProbeResult<()> {
        if let Some(hook) = &self.before_each {
            hook(Arc::clone(&actor)).await?;
        }
        (self.body)(actor, row).await
    }
}

/// A named group of scenarios
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    scenarios: Vec<Scenario>,
}

impl Suite {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    /// Append a scenario
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenarios in definition order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Run rows of a scenario concurrently
    pub parallel: bool,
    /// Per-row time budget
    pub row_timeout: Option<Duration>,
    /// Name given to each row's actor
    pub actor_name: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            row_timeout: None,
            actor_name: "Tracy".to_string(),
        }
    }
}

impl ExecutorConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run rows concurrently
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fail a row that runs longer than `timeout`
    #[must_use]
    pub const fn row_timeout(mut self, timeout: Duration) -> Self {
        self.row_timeout = Some(timeout);
        self
    }

    /// Name of the actor performing each row
    #[must_use]
    pub fn actor_name(mut self, name: impl Into<String>) -> Self {
        self.actor_name = name.into();
        self
    }
}

type RowStates = Arc<Mutex<HashMap<String, Vec<RowState>>>>;

/// Runs scenarios row by row against fresh sessions.
///
/// Row states of the latest run of each scenario are kept on the executor
/// and shared between clones.
#[derive(Debug, Clone)]
pub struct ScenarioExecutor {
    sessions: Arc<dyn SessionFactory>,
    app: Arc<AppConfig>,
    config: ExecutorConfig,
    states: RowStates,
}

impl ScenarioExecutor {
    /// Create an executor opening sessions from `sessions`
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionFactory>, app: Arc<AppConfig>) -> Self {
        Self {
            sessions,
            app,
            config: ExecutorConfig::default(),
            states: RowStates::default(),
        }
    }

    /// Replace the executor settings
    #[must_use]
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Executor settings
    #[must_use]
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// State of row `index` in the latest run of the scenario named `scenario`
    #[must_use]
    pub fn row_state(&self, scenario: &str, index: usize) -> Option<RowState> {
        self.lock_states()
            .get(scenario)
            .and_then(|rows| rows.get(index).copied())
    }

    /// States of every row in the latest run of `scenario`, in table order
    #[must_use]
    pub fn row_states(&self, scenario: &str) -> Vec<RowState> {
        self.lock_states()
            .get(scenario)
            .cloned()
            .unwrap_or_default()
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<String, Vec<RowState>>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, scenario: &Scenario, index: usize, state: RowState) {
        if let Some(slot) = self
            .lock_states()
            .get_mut(scenario.name())
            .and_then(|rows| rows.get_mut(index))
        {
            *slot = state;
        }
    }

    /// Run every row of `scenario`.
    ///
    /// A scenario without rows is `EmptyTable`; a bad row source is `Config`.
    /// Row failures never make this return an error.
    pub async fn run(&self, scenario: &Scenario) -> ProbeResult<ScenarioReport> {
        let rows = scenario.rows()?;
        if rows.is_empty() {
            return Err(ProbeError::EmptyTable {
                scenario: scenario.name().to_string(),
            });
        }
        info!(
            scenario = scenario.name(),
            rows = rows.len(),
            parallel = self.config.parallel,
            "scenario started"
        );
        self.lock_states().insert(
            scenario.name().to_string(),
            vec![RowState::NotStarted; rows.len()],
        );

        let started_at = Utc::now();
        let started = Instant::now();
        let results = if self.config.parallel {
            join_all(
                rows.into_iter()
                    .enumerate()
                    .map(|(index, row)| self.run_row(scenario, index, row)),
            )
            .await
        } else {
            let mut results = Vec::with_capacity(rows.len());
            for (index, row) in rows.into_iter().enumerate() {
                results.push(self.run_row(scenario, index, row).await);
            }
            results
        };

        let report = ScenarioReport::new(
            scenario.name(),
            started_at,
            started.elapsed().as_millis() as u64,
            results,
        );
        info!(
            scenario = scenario.name(),
            passed = report.passed(),
            failed = report.failed(),
            "scenario finished"
        );
        Ok(report)
    }

    /// Run every scenario of `suite`; scenarios that cannot start are
    /// reported as configuration errors
    pub async fn run_suite(&self, suite: &Suite) -> SuiteReport {
        let mut report = SuiteReport::new(suite.name());
        for scenario in suite.scenarios() {
            match self.run(scenario).await {
                Ok(scenario_report) => report.push(scenario_report),
                Err(e) => {
                    warn!(scenario = scenario.name(), error = %e, "scenario could not run");
                    report.push_error(ScenarioError::new(scenario.name(), &e));
                }
            }
        }
        report
    }

    async fn run_row(&self, scenario: &Scenario, index: usize, row: ScenarioRow) -> RowResult {
        let label = scenario.row_label(index, &row);
        let started = Instant::now();
        self.set_state(scenario, index, RowState::Running);
        info!(scenario = scenario.name(), row = %label, state = %RowState::Running, "row running");

        let driver = match self.sessions.open().await {
            Ok(driver) => driver,
            Err(e) => {
                let error = ProbeError::interaction("session", format!("could not open page: {e}"));
                let result = RowResult::finished(index, label, row, Err(error), Vec::new(), 0);
                self.set_state(scenario, index, result.state);
                return result;
            }
        };
        let session = Arc::new(PageSession::new(driver));
        let guard = SessionGuard::new(Arc::clone(&session));
        let actor = Arc::new(Actor::named(
            self.config.actor_name.as_str(),
            session,
            Arc::clone(&self.app),
        ));

        let body = AssertUnwindSafe(scenario.run_body(Arc::clone(&actor), row.clone()))
            .catch_unwind()
            .map(|caught| {
                caught.unwrap_or_else(|payload| {
                    Err(ProbeError::assertion(format!(
                        "row panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                })
            });
        let outcome = match self.config.row_timeout {
            Some(limit) => match tokio::time::timeout(limit, body).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProbeError::Timeout {
                    ms: limit.as_millis() as u64,
                }),
            },
            None => body.await,
        };

        if let Err(e) = guard.release().await {
            warn!(scenario = scenario.name(), row = %label, error = %e, "closing page failed");
        }

        let result = RowResult::finished(
            index,
            label,
            row,
            outcome,
            actor.take_trace(),
            started.elapsed().as_millis() as u64,
        );
        self.set_state(scenario, index, result.state);
        match &result.error {
            None => info!(
                scenario = scenario.name(),
                row = %result.label,
                state = %result.state,
                "row passed"
            ),
            Some(error) => warn!(
                scenario = scenario.name(),
                row = %result.label,
                state = %result.state,
                kind = %error.kind,
                error = %error.message,
                "row failed"
            ),
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockSessions};
    use crate::result::ErrorKind;
    use crate::swaglabs::{Login, PageHeader};
    use proptest::prelude::*;

    mod row_tests {
        use super::*;

        fn row() -> ScenarioRow {
            ScenarioRow::new()
                .with("username", "standard_user")
                .with("password", "")
                .with("expected", "Password is required")
        }

        #[test]
        fn test_lookup_by_name_and_position() {
            let row = row();
            assert_eq!(row.get("username"), Some("standard_user"));
            assert_eq!(row.at(2), Some("Password is required"));
            assert_eq!(row.get("missing"), None);
            assert_eq!(row.len(), 3);
        }

        #[test]
        fn test_with_replaces_in_place() {
            let row = row().with("username", "problem_user");
            assert_eq!(row.at(0), Some("problem_user"));
            assert_eq!(row.len(), 3);
        }

        #[test]
        fn test_require_missing_is_config_error() {
            let err = row().require("email").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(err.to_string().contains("'email'"));
        }

        #[test]
        fn test_substitute_by_name_and_position() {
            let row = row();
            assert_eq!(
                row.substitute("{username} expects {2}"),
                "standard_user expects Password is required"
            );
            assert_eq!(row.substitute("[{password}]"), "[]");
        }

        #[test]
        fn test_substitute_keeps_unknown_placeholders() {
            assert_eq!(row().substitute("{nope} {9} {}"), "{nope} {9} {}");
        }

        #[test]
        fn test_serializes_as_ordered_map() {
            let json = serde_json::to_string(&row()).unwrap();
            assert_eq!(
                json,
                r#"{"username":"standard_user","password":"","expected":"Password is required"}"#
            );
        }

        #[test]
        fn test_display() {
            let row = ScenarioRow::from_iter([("n", "1"), ("m", "x")]);
            assert_eq!(row.to_string(), "n=\"1\", m=\"x\"");
        }

        proptest! {
            #[test]
            fn prop_templates_without_braces_are_unchanged(template in "[^{}]{0,40}") {
                prop_assert_eq!(row().substitute(&template), template);
            }

            #[test]
            fn prop_positional_matches_named(value in "[a-z_ ]{0,20}") {
                let row = ScenarioRow::new().with("v", value.clone());
                prop_assert_eq!(row.substitute("{0}"), row.substitute("{v}"));
            }
        }
    }

    mod table_tests {
        use super::*;

        #[test]
        fn test_parse_pipe_table() {
            let table = DataTable::parse(
                ["username", "password", "expected"],
                "
                # invalid logins
                standard_user | wrong_password | Username and password do not match
                ''            | secret_sauce   | Username is required
                ",
            )
            .unwrap();
            let rows = table.rows().unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1].get("username"), Some(""));
            assert_eq!(rows[0].get("expected"), Some("Username and password do not match"));
        }

        #[test]
        fn test_parse_rejects_wrong_cell_count() {
            let err = DataTable::parse(["a", "b"], "1 | 2\n3").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(err.to_string().contains("line 2"));
        }

        #[test]
        fn test_built_table_validates_rows() {
            let table = DataTable::new(["a", "b"]).with_row(["1"]);
            assert_eq!(table.rows().unwrap_err().kind(), ErrorKind::Config);

            let table = DataTable::new(["a", "a"]).with_row(["1", "2"]);
            assert!(table.rows().unwrap_err().to_string().contains("duplicate"));
        }

        #[test]
        fn test_single_and_empty() {
            assert_eq!(DataTable::single().rows().unwrap(), vec![ScenarioRow::new()]);
            assert!(DataTable::new(["a"]).rows().unwrap().is_empty());
        }
    }

    mod executor_tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        fn executor(sessions: &MockSessions) -> ScenarioExecutor {
            ScenarioExecutor::new(Arc::new(sessions.clone()), Arc::new(AppConfig::default()))
        }

        fn numbered(n: usize) -> DataTable {
            (0..n).fold(DataTable::new(["n"]), |table, i| table.with_row([i.to_string()]))
        }

        #[tokio::test]
        async fn test_empty_table_is_error_without_sessions() {
            let sessions = MockSessions::new();
            let scenario =
                Scenario::new("empty", |_, _| async { Ok(()) }).with_rows(DataTable::new(["a"]));
            let err = executor(&sessions).run(&scenario).await.unwrap_err();
            assert!(matches!(err, ProbeError::EmptyTable { ref scenario } if scenario == "empty"));
            assert_eq!(sessions.opened(), 0);
        }

        #[tokio::test]
        async fn test_failed_row_does_not_abort_later_rows() {
            let sessions = MockSessions::new();
            let scenario = Scenario::new("odd rows fail", |_, row| async move {
                let n: usize = row.require("n")?.parse().map_err(|_| ProbeError::config("n"))?;
                if n % 2 == 1 {
                    return Err(ProbeError::assertion(format!("{n} is odd")));
                }
                Ok(())
            })
            .with_rows(numbered(4))
            .named_rows("n = {n}");

            let report = executor(&sessions).run(&scenario).await.unwrap();
            assert_eq!(report.total(), 4);
            assert_eq!(report.passed(), 2);
            assert_eq!(report.rows[1].state, RowState::Failed);
            assert_eq!(report.rows[1].label, "n = 1");
            assert_eq!(report.rows[2].state, RowState::Passed);
            assert_eq!(sessions.opened(), 4);
            assert_eq!(sessions.closed(), 4);
        }

        #[tokio::test]
        async fn test_rows_get_isolated_sessions() {
            let sessions = MockSessions::new();
            let scenario = Scenario::new("login per row", |actor, _| async move {
                actor.attempts_to(&Login::as_a_standard_user()).await
            })
            .with_rows(numbered(3));

            let report = executor(&sessions).run(&scenario).await.unwrap();
            assert!(report.all_passed());
            let stores = sessions.storefronts();
            assert_eq!(stores.len(), 3);
            assert!(stores.iter().all(|s| s.history().iter().filter(|c| c.starts_with("navigate")).count() == 1));
        }

        #[tokio::test]
        async fn test_failure_reports_innermost_step_and_kind() {
            let sessions = MockSessions::new();
            let scenario = Scenario::new("title without login", |actor, _| async move {
                actor
                    .attempts_to(&crate::action::Action::navigate("https://www.saucedemo.com/"))
                    .await?;
                actor.asks_for(&PageHeader::title()).await.map(|_| ())
            });

            let report = executor(&sessions).run(&scenario).await.unwrap();
            let row = &report.rows[0];
            let error = row.error.as_ref().unwrap();
            assert_eq!(error.kind, ErrorKind::NotFound);
            assert_eq!(error.step, None, "questions are not steps");
            assert_eq!(row.steps.len(), 1);
            assert_eq!(row.label, "title without login");
        }

        #[tokio::test]
        async fn test_before_each_runs_inside_every_row() {
            let sessions = MockSessions::new();
            let hooks = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&hooks);
            let scenario = Scenario::new("after login", |actor, _| async move {
                let title = actor.asks_for(&PageHeader::title()).await?;
                crate::assertion::Assertion::equals(&title, &"Products".to_string()).into_result()
            })
            .before_each(move |actor| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { actor.attempts_to(&Login::as_a_standard_user()).await }
            })
            .with_rows(numbered(2));

            let report = executor(&sessions).run(&scenario).await.unwrap();
            assert!(report.all_passed(), "{report}");
            assert_eq!(hooks.load(Ordering::SeqCst), 2);
            assert_eq!(report.rows[0].steps[0].title, "Log in as a standard user");
        }

        #[tokio::test]
        async fn test_timeout_fails_row_and_still_closes_session() {
            let sessions = MockSessions::new().with_latency(Duration::from_millis(50));
            let scenario = Scenario::new("slow", |actor, _| async move {
                actor.attempts_to(&Login::as_a_standard_user()).await
            })
            .with_rows(numbered(2));

            let report = executor(&sessions)
                .with_config(ExecutorConfig::new().row_timeout(Duration::from_millis(20)))
                .run(&scenario)
                .await
                .unwrap();

            assert_eq!(report.failed(), 2);
            let error = report.rows[0].error.as_ref().unwrap();
            assert_eq!(error.kind, ErrorKind::Timeout);
            assert_eq!(error.step.as_deref(), Some("navigate to https://www.saucedemo.com/"));
            assert_eq!(sessions.closed(), 2);
        }

        #[tokio::test]
        async fn test_parallel_rows_keep_row_order() {
            let sessions = MockSessions::new().with_latency(Duration::from_millis(5));
            let scenario = Scenario::new("parallel", |actor, row| async move {
                actor.attempts_to(&Login::as_a_standard_user()).await?;
                if row.require("n")? == "2" {
                    return Err(ProbeError::assertion("row two fails"));
                }
                Ok(())
            })
            .with_rows(numbered(4));

            let report = executor(&sessions)
                .with_config(ExecutorConfig::new().parallel(true))
                .run(&scenario)
                .await
                .unwrap();

            let indexes: Vec<usize> = report.rows.iter().map(|r| r.index).collect();
            assert_eq!(indexes, vec![0, 1, 2, 3]);
            assert_eq!(report.failed(), 1);
            assert_eq!(report.rows[2].state, RowState::Failed);
            assert_eq!(sessions.opened(), 4);
            assert_eq!(sessions.closed(), 4);
        }

        #[tokio::test]
        async fn test_session_open_failure_fails_row() {
            let sessions = MockSessions::new().failing_with("browser unavailable");
            let scenario = Scenario::new("no browser", |_, _| async { Ok(()) });
            let report = executor(&sessions).run(&scenario).await.unwrap();
            let error = report.rows[0].error.as_ref().unwrap();
            assert_eq!(error.kind, ErrorKind::Interaction);
            assert!(error.message.contains("browser unavailable"));
        }

        #[tokio::test]
        async fn test_suite_collects_configuration_errors() {
            let sessions = MockSessions::new();
            let suite = Suite::new("mixed")
                .with_scenario(Scenario::new("ok", |_, _| async { Ok(()) }))
                .with_scenario(
                    Scenario::new("empty", |_, _| async { Ok(()) }).with_rows(Vec::new()),
                );
            let report = executor(&sessions).run_suite(&suite).await;
            assert_eq!(report.scenarios.len(), 1);
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].kind, ErrorKind::EmptyTable);
            assert!(!report.all_passed());
        }

        #[tokio::test]
        async fn test_panicking_row_fails_without_aborting_later_rows() {
            let sessions = MockSessions::new();
            let scenario = Scenario::new("first row panics", |actor, row| async move {
                actor.attempts_to(&Login::as_a_standard_user()).await?;
                if row.require("n")? == "0" {
                    let empty: Vec<usize> = Vec::new();
                    let _ = empty[3];
                }
                Ok(())
            })
            .with_rows(numbered(3));

            let report = executor(&sessions).run(&scenario).await.unwrap();
            assert_eq!(report.total(), 3);
            assert_eq!(report.failed(), 1);
            assert_eq!(report.rows[0].state, RowState::Failed);
            let error = report.rows[0].error.as_ref().unwrap();
            assert_eq!(error.kind, ErrorKind::AssertionFailed);
            assert!(error.message.contains("index out of bounds"), "{}", error.message);
            assert!(report.rows[1].passed());
            assert!(report.rows[2].passed());
            assert_eq!(sessions.opened(), 3);
            assert_eq!(sessions.closed(), 3);
        }

        #[tokio::test]
        async fn test_panic_with_owned_message_is_reported() {
            let sessions = MockSessions::new();
            let scenario = Scenario::new("formatted panic", |_, _| async move {
                let code = 7;
                if code > 0 {
                    panic!("unexpected code {code}");
                }
                Ok(())
            });

            let report = executor(&sessions).run(&scenario).await.unwrap();
            let error = report.rows[0].error.as_ref().unwrap();
            assert_eq!(error.message, "row panicked: unexpected code 7");
            assert_eq!(sessions.closed(), 1);
        }

        #[tokio::test]
        async fn test_row_states_move_from_not_started_to_finished() {
            let sessions = MockSessions::new();
            let executor = Arc::new(executor(&sessions));
            let seen = Arc::new(Mutex::new(Vec::new()));

            let observer = Arc::clone(&executor);
            let observed = Arc::clone(&seen);
            let scenario = Scenario::new("observed", move |_, row| {
                let states = observer.row_states("observed");
                let observed = Arc::clone(&observed);
                async move {
                    observed.lock().unwrap().push(states);
                    if row.require("n")? == "1" {
                        return Err(ProbeError::assertion("second row fails"));
                    }
                    Ok(())
                }
            })
            .with_rows(numbered(3));

            assert_eq!(executor.row_state("observed", 0), None);
            let report = executor.run(&scenario).await.unwrap();
            assert_eq!(report.failed(), 1);

            let seen = seen.lock().unwrap();
            assert_eq!(
                seen[0],
                vec![RowState::Running, RowState::NotStarted, RowState::NotStarted]
            );
            assert_eq!(
                seen[2],
                vec![RowState::Passed, RowState::Failed, RowState::Running]
            );
            assert_eq!(
                executor.row_states("observed"),
                vec![RowState::Passed, RowState::Failed, RowState::Passed]
            );
            assert!(executor.row_states("observed").iter().all(|s| s.is_finished()));
            assert_eq!(RowState::NotStarted.to_string(), "not started");
        }

        #[tokio::test]
        async fn test_cancelled_run_still_closes_session() {
            let sessions = MockSessions::new().with_latency(Duration::from_millis(50));
            let scenario = Scenario::new("cancelled", |actor, _| async move {
                actor.attempts_to(&Login::as_a_standard_user()).await
            });

            let executor = executor(&sessions);
            let cancelled =
                tokio::time::timeout(Duration::from_millis(20), executor.run(&scenario)).await;
            assert!(cancelled.is_err());
            assert_eq!(executor.row_state("cancelled", 0), Some(RowState::Running));

            tokio::time::sleep(Duration::from_millis(200)).await;
            assert_eq!(sessions.opened(), 1);
            assert_eq!(sessions.closed(), 1);
        }

        #[tokio::test]
        async fn test_helper_login_matches_actor_login() {
            let sessions = MockSessions::new();
            let driver = sessions.open().await.unwrap();
            let session = PageSession::new(driver);
            mock::login_as_standard_user(&session).await.unwrap();
            assert_eq!(
                sessions.storefronts()[0].logged_in_user().as_deref(),
                Some("standard_user")
            );
        }
    }
}
