//! Assertions for scenario bodies.
//!
//! Each helper returns an [`AssertionResult`]; `into_result` turns a failure
//! into [`ProbeError::AssertionFailed`] so bodies can use `?`.

use crate::result::{ProbeError, ProbeResult};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// `Ok` when passed, `AssertionFailed` otherwise
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert two strings are equal ignoring ASCII case
    #[must_use]
    pub fn equals_ignore_case(expected: &str, actual: &str) -> AssertionResult {
        if expected.eq_ignore_ascii_case(actual) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?} ignoring case, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert every expected item occurs in a collection
    #[must_use]
    pub fn contains_all<T, U>(collection: &[T], expected: &[U]) -> AssertionResult
    where
        T: PartialEq<U> + Debug,
        U: Debug,
    {
        let missing: Vec<&U> = expected
            .iter()
            .filter(|wanted| !collection.iter().any(|item| item == *wanted))
            .collect();
        if missing.is_empty() {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("{collection:?} is missing {missing:?}"))
        }
    }

    /// Assert every item satisfies a predicate
    #[must_use]
    pub fn all_match<T: Debug>(
        collection: &[T],
        description: &str,
        predicate: impl Fn(&T) -> bool,
    ) -> AssertionResult {
        match collection.iter().find(|item| !predicate(item)) {
            None => AssertionResult::pass(),
            Some(item) => AssertionResult::fail(format!("expected every item to {description}, but {item:?} does not")),
        }
    }

    /// Assert a collection has no repeated items
    #[must_use]
    pub fn no_duplicates<T: Eq + Hash + Debug>(collection: &[T]) -> AssertionResult {
        let mut seen = HashSet::with_capacity(collection.len());
        match collection.iter().find(|item| !seen.insert(*item)) {
            None => AssertionResult::pass(),
            Some(item) => AssertionResult::fail(format!("{item:?} occurs more than once")),
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert an Option is None
    #[must_use]
    pub fn is_none<T: Debug>(opt: &Option<T>) -> AssertionResult {
        match opt {
            None => AssertionResult::pass(),
            Some(value) => AssertionResult::fail(format!("expected None, got Some({value:?})")),
        }
    }

    /// Assert a collection has expected length
    #[must_use]
    pub fn has_length<T>(collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected length {expected}, got {}",
                collection.len()
            ))
        }
    }
}
