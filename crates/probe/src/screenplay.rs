//! Actors, performables and questions.
//!
//! An [`Actor`] owns one page session. It *attempts* [`Performable`] steps,
//! which are logged, timed and recorded in its trace, and *asks*
//! [`Question`]s, which only read the page.

use crate::action::Action;
use crate::config::AppConfig;
use crate::result::{ErrorKind, ProbeResult};
use crate::session::PageSession;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// An imperative, reportable step
#[async_trait]
pub trait Performable: Send + Sync {
    /// Title shown in logs and reports
    fn title(&self) -> String;

    /// Perform the step on behalf of `actor`
    async fn perform_as(&self, actor: &Actor) -> ProbeResult<()>;
}

/// A pure query against the current page
#[async_trait]
pub trait Question: Send + Sync {
    /// Answer type
    type Answer: Send;

    /// What is being asked, for logs
    fn subject(&self) -> String;

    /// Answer using the actor's session
    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Self::Answer>;
}

/// Outcome of one recorded step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Started but never finished (cancelled by a timeout)
    Running,
    /// Completed
    Passed,
    /// Returned an error
    Failed {
        /// Error classification
        kind: ErrorKind,
        /// Error message
        message: String,
    },
}

/// One entry in an actor's step trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step title
    pub title: String,
    /// Nesting depth; 0 for steps attempted directly by the scenario
    pub depth: usize,
    /// Outcome
    pub outcome: StepOutcome,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl StepRecord {
    /// Whether the step did not pass
    #[must_use]
    pub const fn is_unsuccessful(&self) -> bool {
        !matches!(self.outcome, StepOutcome::Passed)
    }
}

/// The user persona performing a scenario row
#[derive(Debug)]
pub struct Actor {
    name: String,
    session: Arc<PageSession>,
    config: Arc<AppConfig>,
    depth: AtomicUsize,
    trace: Mutex<Vec<StepRecord>>,
}

impl Actor {
    /// Create an actor driving `session`
    #[must_use]
    pub fn named(name: impl Into<String>, session: Arc<PageSession>, config: Arc<AppConfig>) -> Self {
        Self {
            name: name.into(),
            session,
            config,
            depth: AtomicUsize::new(0),
            trace: Mutex::new(Vec::new()),
        }
    }

    /// Actor name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The page this actor drives
    #[must_use]
    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// Configuration of the application under test
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Perform a step, recording it in the trace.
    ///
    /// The step's error is returned unchanged.
    pub async fn attempts_to<P>(&self, step: &P) -> ProbeResult<()>
    where
        P: Performable + ?Sized,
    {
        let title = step.title();
        let depth = self.depth.fetch_add(1, Ordering::SeqCst);
        let index = {
            let mut trace = self.lock_trace();
            trace.push(StepRecord {
                title: title.clone(),
                depth,
                outcome: StepOutcome::Running,
                duration_ms: 0,
            });
            trace.len() - 1
        };
        info!(actor = %self.name, depth, step = %title, "attempting");

        let started = Instant::now();
        let result = step.perform_as(self).await;
        let elapsed = started.elapsed().as_millis() as u64;
        self.depth.fetch_sub(1, Ordering::SeqCst);

        let outcome = match &result {
            Ok(()) => StepOutcome::Passed,
            Err(e) => {
                warn!(actor = %self.name, step = %title, error = %e, "step failed");
                StepOutcome::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };
        if let Some(record) = self.lock_trace().get_mut(index) {
            record.outcome = outcome;
            record.duration_ms = elapsed;
        }
        result
    }

    /// Ask a question about the current page
    pub async fn asks_for<Q>(&self, question: &Q) -> ProbeResult<Q::Answer>
    where
        Q: Question + ?Sized,
    {
        debug!(actor = %self.name, question = %question.subject(), "asking");
        question.answered_by(self).await
    }

    /// Snapshot of the step trace
    #[must_use]
    pub fn trace(&self) -> Vec<StepRecord> {
        self.lock_trace().clone()
    }

    /// Drain the step trace
    #[must_use]
    pub fn take_trace(&self) -> Vec<StepRecord> {
        std::mem::take(&mut *self.lock_trace())
    }

    fn lock_trace(&self) -> MutexGuard<'_, Vec<StepRecord>> {
        self.trace.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Innermost step that did not pass: the last unsuccessful record
#[must_use]
pub fn failed_step(trace: &[StepRecord]) -> Option<&StepRecord> {
    trace.iter().rev().find(|record| record.is_unsuccessful())
}

#[async_trait]
impl Performable for Action {
    fn title(&self) -> String {
        self.describe()
    }

    async fn perform_as(&self, actor: &Actor) -> ProbeResult<()> {
        self.perform(actor.session()).await
    }
}

/// A titled, fixed sequence of actions; the first failure aborts the rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    title: String,
    actions: Vec<Action>,
}

impl Task {
    /// Create an empty task
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            actions: Vec::new(),
        }
    }

    /// Append an action
    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Actions in execution order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[async_trait]
impl Performable for Task {
    fn title(&self) -> String {
        self.title.clone()
    }

    async fn perform_as(&self, actor: &Actor) -> ProbeResult<()> {
        for action in &self.actions {
            actor.attempts_to(action).await?;
        }
        Ok(())
    }
}
