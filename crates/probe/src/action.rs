//! Action primitives: navigate, click and type.
//!
//! Each primitive either succeeds once or fails with `Interaction`; retries
//! are the driver's business.

use crate::driver::{DriverError, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;
use tracing::debug;

impl PageSession {
    /// Load `url` in this page
    pub async fn navigate(&self, url: &str) -> ProbeResult<()> {
        debug!(session = %self.id(), url, "navigate");
        self.driver()
            .navigate(url)
            .await
            .map_err(|e| action_error(e, url))
    }

    /// Click a resolved element
    pub async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        debug!(session = %self.id(), %element, "click");
        self.driver()
            .click(element)
            .await
            .map_err(|e| action_error(e, element))
    }

    /// Type `value` into a resolved element
    pub async fn type_text(&self, element: &ElementHandle, value: &str) -> ProbeResult<()> {
        debug!(session = %self.id(), %element, chars = value.chars().count(), "type text");
        self.driver()
            .send_keys(element, value)
            .await
            .map_err(|e| action_error(e, element))
    }
}

/// A single UI operation described declaratively, resolved at perform time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load a URL
    Navigate {
        /// Target URL
        url: String,
    },
    /// Click the element matched by a locator
    Click {
        /// Element to click
        target: Locator,
    },
    /// Type text into the element matched by a locator
    Enter {
        /// Text to type
        text: String,
        /// Element receiving the text
        into: Locator,
    },
}

impl Action {
    /// Navigate to `url`
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    /// Click `target`
    #[must_use]
    pub fn click(target: impl Into<Locator>) -> Self {
        Self::Click {
            target: target.into(),
        }
    }

    /// Type `text` into `into`
    #[must_use]
    pub fn enter(text: impl Into<String>, into: impl Into<Locator>) -> Self {
        Self::Enter {
            text: text.into(),
            into: into.into(),
        }
    }

    /// One-line description for logs
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Navigate { url } => format!("navigate to {url}"),
            Self::Click { target } => format!("click {target}"),
            Self::Enter { text, into } => {
                format!("enter {} characters into {into}", text.chars().count())
            }
        }
    }

    /// Resolve the target (if any) and perform the operation
    pub async fn perform(&self, session: &PageSession) -> ProbeResult<()> {
        match self {
            Self::Navigate { url } => session.navigate(url).await,
            Self::Click { target } => {
                let element = session.find(target).await?;
                session.click(&element).await
            }
            Self::Enter { text, into } => {
                let element = session.find(into).await?;
                session.type_text(&element, text).await
            }
        }
    }
}

fn action_error(err: DriverError, target: impl std::fmt::Display) -> ProbeError {
    ProbeError::interaction(target, err.to_string())
}
