//! Driver seam between the harness and whatever automates the browser.
//!
//! The harness never talks to a browser directly. Everything goes through
//! [`Driver`], a capability of six page operations plus `close`. Retry and
//! bounded-wait policy belongs to the implementation, not to the harness.
//!
//! # Implementations
//!
//! - `MockStorefront` - in-memory Swag Labs simulator for tests
//! - `ChromiumDriver` - chromiumoxide over CDP (feature `browser`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Reference to a live element, valid only for the page state that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
    generation: u64,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, generation: u64) -> Self {
        Self {
            id: id.into(),
            generation,
        }
    }

    /// Driver-specific element identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Page generation the handle belongs to
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {}@{}", self.id, self.generation)
    }
}

/// Errors raised by a driver implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// Bounded wait expired
    #[error("timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Handle outlived the page state it was resolved against
    #[error("{id} is stale")]
    Stale {
        /// Element identifier
        id: String,
    },

    /// Element is hidden or disabled
    #[error("{id} is not interactable: {reason}")]
    NotInteractable {
        /// Element identifier
        id: String,
        /// Why the element rejected the action
        reason: String,
    },

    /// Selector could not be parsed
    #[error("invalid selector {selector:?}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
    },

    /// Anything else the automation backend reported
    #[error("{message}")]
    Protocol {
        /// Error message
        message: String,
    },
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Page capability consumed by the harness.
///
/// All methods take `&self`; implementations serialise access internally.
/// A single driver instance backs exactly one page session.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Query all elements matching a CSS selector, optionally inside `scope`,
    /// in document order
    async fn query(
        &self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Vec<ElementHandle>>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Type text into element
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// Rendered text of element
    async fn text(&self, element: &ElementHandle) -> DriverResult<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> DriverResult<Option<String>>;

    /// Get current URL
    async fn current_url(&self) -> DriverResult<String>;

    /// Release the page
    async fn close(&self) -> DriverResult<()>;
}

/// Source of fresh, isolated page sessions
#[async_trait]
pub trait SessionFactory: Send + Sync + fmt::Debug {
    /// Open a new page backed by its own driver
    async fn open(&self) -> DriverResult<Box<dyn Driver>>;
}

/// Browser configuration for drivers that launch a real browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Timeout for element operations
    pub element_timeout: Duration,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Executable path override
    pub executable_path: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(5),
            sandbox: true,
            executable_path: None,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set element timeout
    #[must_use]
    pub const fn element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the browser executable
    #[must_use]
    pub fn executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_handle_accessors() {
            let handle = ElementHandle::new("42", 3);
            assert_eq!(handle.id(), "42");
            assert_eq!(handle.generation(), 3);
            assert_eq!(handle.to_string(), "element 42@3");
        }

        #[test]
        fn test_handles_from_different_generations_differ() {
            assert_ne!(ElementHandle::new("1", 1), ElementHandle::new("1", 2));
        }
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert_eq!(config.element_timeout, Duration::from_secs(5));
        }

        #[test]
        fn test_builder_chain() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(800, 600)
                .element_timeout(Duration::from_millis(250))
                .no_sandbox()
                .executable("/usr/bin/chromium");

            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.element_timeout, Duration::from_millis(250));
            assert_eq!(config.executable_path.as_deref(), Some("/usr/bin/chromium"));
        }
    }

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::NotInteractable {
            id: "7".into(),
            reason: "disabled".into(),
        };
        assert_eq!(err.to_string(), "7 is not interactable: disabled");
    }
}
