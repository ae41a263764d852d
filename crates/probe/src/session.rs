//! Page sessions and element queries.
//!
//! A [`PageSession`] owns exactly one driver for the lifetime of one scenario
//! row. Every query and action takes the session explicitly; there is no
//! ambient "current page".

use crate::driver::{Driver, DriverError, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Ordered set of matched elements, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Elements {
    handles: Vec<ElementHandle>,
}

impl Elements {
    /// Wrap handles returned by a driver query
    #[must_use]
    pub fn new(handles: Vec<ElementHandle>) -> Self {
        Self { handles }
    }

    /// Number of matches
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when nothing matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// First match in document order
    #[must_use]
    pub fn first(&self) -> Option<&ElementHandle> {
        self.handles.first()
    }

    /// Iterate matches in document order
    pub fn iter(&self) -> std::slice::Iter<'_, ElementHandle> {
        self.handles.iter()
    }
}

impl IntoIterator for Elements {
    type Item = ElementHandle;
    type IntoIter = std::vec::IntoIter<ElementHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a ElementHandle;
    type IntoIter = std::slice::Iter<'a, ElementHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

/// One isolated page, driven by one driver.
#[derive(Debug)]
pub struct PageSession {
    id: Uuid,
    driver: Box<dyn Driver>,
    closed: AtomicBool,
}

impl PageSession {
    /// Wrap a freshly opened driver
    #[must_use]
    pub fn new(driver: Box<dyn Driver>) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, "page session opened");
        Self {
            id,
            driver,
            closed: AtomicBool::new(false),
        }
    }

    /// Session identifier used for log correlation
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Whether `close` has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolve a locator to exactly one element.
    ///
    /// Zero matches is `NotFound`; several matches is `AmbiguousMatch` for
    /// strict locators and the first match otherwise.
    pub async fn find(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        self.resolve_one(locator, None).await
    }

    /// Resolve a locator to every match; an empty result is not an error.
    ///
    /// A scope parent that matches nothing also yields an empty result, while
    /// an ambiguous strict parent is still `AmbiguousMatch`.
    pub async fn find_all(&self, locator: &Locator) -> ProbeResult<Elements> {
        self.candidates(locator, None, false)
            .await
            .map(Elements::new)
    }

    /// Resolve exactly one element inside an already resolved container
    pub async fn find_in(
        &self,
        container: &ElementHandle,
        locator: &Locator,
    ) -> ProbeResult<ElementHandle> {
        self.resolve_one(locator, Some(container)).await
    }

    /// Resolve every match inside an already resolved container
    pub async fn find_all_in(
        &self,
        container: &ElementHandle,
        locator: &Locator,
    ) -> ProbeResult<Elements> {
        self.candidates(locator, Some(container), false)
            .await
            .map(Elements::new)
    }

    /// Rendered text of an element
    pub async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.driver
            .text(element)
            .await
            .map_err(|e| read_error(e, element))
    }

    /// Attribute of an element, `None` when absent
    pub async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> ProbeResult<Option<String>> {
        self.driver
            .attribute(element, name)
            .await
            .map_err(|e| read_error(e, element))
    }

    /// Texts of every match, in document order
    pub async fn texts(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        let elements = self.find_all(locator).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            texts.push(self.text(element).await?);
        }
        Ok(texts)
    }

    /// Current page URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver
            .current_url()
            .await
            .map_err(|e| ProbeError::interaction("page", e.to_string()))
    }

    /// Release the page. Safe to call more than once.
    pub async fn close(&self) -> ProbeResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!(session = %self.id, "closing page session");
        self.driver
            .close()
            .await
            .map_err(|e| ProbeError::interaction("page", e.to_string()))
    }

    async fn resolve_one(
        &self,
        locator: &Locator,
        scope: Option<&ElementHandle>,
    ) -> ProbeResult<ElementHandle> {
        let mut found = self.candidates(locator, scope, true).await?;
        match found.len() {
            0 => Err(ProbeError::not_found(locator)),
            1 => Ok(found.remove(0)),
            count if locator.is_strict() => Err(ProbeError::AmbiguousMatch {
                locator: locator.to_string(),
                count,
            }),
            count => {
                debug!(%locator, count, "lenient locator matched several elements, using first");
                Ok(found.remove(0))
            }
        }
    }

    fn candidates<'a>(
        &'a self,
        locator: &'a Locator,
        scope: Option<&'a ElementHandle>,
        parent_required: bool,
    ) -> BoxFuture<'a, ProbeResult<Vec<ElementHandle>>> {
        async move {
            let parent = match locator.scope() {
                Some(parent) => match self.resolve_one(parent, scope).await {
                    Ok(found) => Some(found),
                    Err(ProbeError::NotFound { .. }) if !parent_required => {
                        debug!(%locator, "scope parent absent, no matches");
                        return Ok(Vec::new());
                    }
                    Err(e) => return Err(e),
                },
                None => None,
            };
            let scope = parent.as_ref().or(scope);

            let matched = self
                .driver
                .query(locator.selector().css_part(), scope)
                .await
                .map_err(|e| query_error(e, locator))?;

            let Some(needle) = locator.selector().text_filter() else {
                return Ok(matched);
            };

            let mut filtered = Vec::new();
            for element in matched {
                let text = self
                    .driver
                    .text(&element)
                    .await
                    .map_err(|e| query_error(e, locator))?;
                if text.contains(needle) {
                    filtered.push(element);
                }
            }
            Ok(filtered)
        }
        .boxed()
    }
}

/// Scoped ownership of a session: `release` closes it, and dropping an
/// unreleased guard schedules the close on the current runtime.
#[derive(Debug)]
pub struct SessionGuard {
    session: Option<Arc<PageSession>>,
}

impl SessionGuard {
    /// Take responsibility for closing `session`
    #[must_use]
    pub fn new(session: Arc<PageSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The guarded session
    #[must_use]
    pub fn session(&self) -> Option<&Arc<PageSession>> {
        self.session.as_ref()
    }

    /// Close the session now
    pub async fn release(mut self) -> ProbeResult<()> {
        match self.session.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if session.is_closed() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let _ = handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!(session = %session.id(), error = %e, "deferred close failed");
                    }
                });
            }
            Err(_) => {
                warn!(session = %session.id(), "session dropped outside a runtime, page left open");
            }
        }
    }
}

fn query_error(err: DriverError, locator: &Locator) -> ProbeError {
    match err {
        DriverError::Timeout { .. } => ProbeError::not_found(locator),
        DriverError::InvalidSelector { selector } => {
            ProbeError::config(format!("invalid selector {selector:?} in {locator}"))
        }
        other => ProbeError::interaction(locator, other.to_string()),
    }
}

fn read_error(err: DriverError, element: &ElementHandle) -> ProbeError {
    match err {
        DriverError::Timeout { .. } => ProbeError::not_found(element),
        other => ProbeError::interaction(element, other.to_string()),
    }
}
