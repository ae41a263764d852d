//! Result and error types for shopprobe.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for shopprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or asserting on the storefront
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A required single element was absent
    #[error("No element matches {locator}")]
    NotFound {
        /// Locator that matched nothing
        locator: String,
    },

    /// A query that assumed uniqueness matched several elements
    #[error("{count} elements match {locator}, expected exactly one")]
    AmbiguousMatch {
        /// Locator that matched too much
        locator: String,
        /// Number of matches
        count: usize,
    },

    /// Action attempted on a stale, hidden, disabled or timed-out element
    #[error("Interaction with {target} failed: {message}")]
    Interaction {
        /// Element or URL the action targeted
        target: String,
        /// Error message
        message: String,
    },

    /// Malformed numeric or text field during extraction
    #[error("Could not parse {field} from {input:?}: {message}")]
    Parse {
        /// Field being extracted
        field: String,
        /// Raw text that failed to parse
        input: String,
        /// Error message
        message: String,
    },

    /// Scenario defined with zero data rows
    #[error("Scenario '{scenario}' has no data rows")]
    EmptyTable {
        /// Scenario name
        scenario: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Row exceeded its time budget
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Configuration error (bad table, missing parameter, invalid config file)
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create a not-found error for a locator description
    #[must_use]
    pub fn not_found(locator: impl fmt::Display) -> Self {
        Self::NotFound {
            locator: locator.to_string(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(target: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Interaction {
            target: target.to_string(),
            message: message.into(),
        }
    }

    /// Create a parse error
    #[must_use]
    pub fn parse(
        field: impl Into<String>,
        input: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            field: field.into(),
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify the error for reporting
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
            Self::Interaction { .. } => ErrorKind::Interaction,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::EmptyTable { .. } => ErrorKind::EmptyTable,
            Self::AssertionFailed { .. } => ErrorKind::AssertionFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Config { .. } | Self::Yaml(_) | Self::Json(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Error classification carried into reports so that triage can tell a
/// parse or ambiguity problem apart from a plain missing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required element absent
    NotFound,
    /// Uniqueness violated
    AmbiguousMatch,
    /// Action could not be performed
    Interaction,
    /// Extraction could not parse a field
    Parse,
    /// Scenario without rows
    EmptyTable,
    /// Expectation not met
    AssertionFailed,
    /// Row time budget exceeded
    Timeout,
    /// Bad configuration
    Config,
    /// File system error
    Io,
}

impl ErrorKind {
    /// Short label used in text reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::AmbiguousMatch => "ambiguous match",
            Self::Interaction => "interaction",
            Self::Parse => "parse",
            Self::EmptyTable => "empty table",
            Self::AssertionFailed => "assertion",
            Self::Timeout => "timeout",
            Self::Config => "configuration",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
