//! Chromium over CDP.
//!
//! [`ChromiumSessions`] launches one browser and hands out a fresh page per
//! session. Element handles are indices into a per-page table that is cleared
//! whenever the page may have changed (navigation or click), which is what
//! makes older handles stale.

use crate::driver::{Driver, DriverConfig, DriverError, DriverResult, ElementHandle, SessionFactory};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

fn protocol(err: impl fmt::Display) -> DriverError {
    DriverError::Protocol {
        message: err.to_string(),
    }
}

async fn bounded<T, E, F>(limit: std::time::Duration, op: F) -> DriverResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result.map_err(protocol),
        Err(_) => Err(DriverError::Timeout {
            ms: limit.as_millis() as u64,
        }),
    }
}

/// Browser launched once and shared by every session it opens
#[derive(Debug, Clone)]
pub struct ChromiumSessions {
    config: DriverConfig,
    browser: Arc<Mutex<CdpBrowser>>,
    handler: Arc<tokio::task::JoinHandle<()>>,
}

impl ChromiumSessions {
    /// Launch chromium with `config`
    pub async fn launch(config: DriverConfig) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &config.executable_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(ProbeError::config)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| ProbeError::config(format!("could not launch chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        info!(headless = config.headless, "chromium launched");

        Ok(Self {
            config,
            browser: Arc::new(Mutex::new(browser)),
            handler: Arc::new(handler),
        })
    }

    /// Close the browser and stop its event handler
    pub async fn shutdown(&self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ProbeError::interaction("browser", e.to_string()))?;
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessions {
    async fn open(&self) -> DriverResult<Box<dyn Driver>> {
        let page = {
            let browser = self.browser.lock().await;
            bounded(self.config.navigation_timeout, browser.new_page("about:blank")).await?
        };
        debug!("chromium page opened");
        Ok(Box::new(ChromiumDriver::new(page, self.config.clone())))
    }
}

/// One chromium tab behind the [`Driver`] seam
pub struct ChromiumDriver {
    page: Mutex<Option<CdpPage>>,
    elements: Mutex<HashMap<String, Element>>,
    generation: AtomicU64,
    next_id: AtomicU64,
    config: DriverConfig,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Wrap an open page
    #[must_use]
    pub fn new(page: CdpPage, config: DriverConfig) -> Self {
        Self {
            page: Mutex::new(Some(page)),
            elements: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            next_id: AtomicU64::new(0),
            config,
        }
    }

    async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.elements.lock().await.clear();
    }

    async fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut elements = self.elements.lock().await;
        found
            .into_iter()
            .map(|element| {
                let id = format!("e{}", self.next_id.fetch_add(1, Ordering::SeqCst));
                elements.insert(id.clone(), element);
                ElementHandle::new(id, generation)
            })
            .collect()
    }

    fn check_generation(&self, handle: &ElementHandle) -> DriverResult<()> {
        if handle.generation() == self.generation.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DriverError::Stale {
                id: handle.id().to_string(),
            })
        }
    }
}

fn closed() -> DriverError {
    protocol("page is closed")
}

fn stale(handle: &ElementHandle) -> DriverError {
    DriverError::Stale {
        id: handle.id().to_string(),
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        {
            let page = self.page.lock().await;
            let page = page.as_ref().ok_or_else(closed)?;
            bounded(self.config.navigation_timeout, page.goto(url)).await?;
        }
        self.invalidate().await;
        Ok(())
    }

    async fn query(
        &self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Vec<ElementHandle>> {
        let found = match scope {
            Some(handle) => {
                self.check_generation(handle)?;
                let elements = self.elements.lock().await;
                let parent = elements.get(handle.id()).ok_or_else(|| stale(handle))?;
                bounded(self.config.element_timeout, parent.find_elements(selector)).await?
            }
            None => {
                let page = self.page.lock().await;
                let page = page.as_ref().ok_or_else(closed)?;
                bounded(self.config.element_timeout, page.find_elements(selector)).await?
            }
        };
        Ok(self.register(found).await)
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.check_generation(element)?;
        {
            let elements = self.elements.lock().await;
            let target = elements.get(element.id()).ok_or_else(|| stale(element))?;
            bounded(self.config.element_timeout, target.click()).await?;
        }
        self.invalidate().await;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.check_generation(element)?;
        let elements = self.elements.lock().await;
        let target = elements.get(element.id()).ok_or_else(|| stale(element))?;
        bounded(self.config.element_timeout, target.type_str(text)).await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        self.check_generation(element)?;
        let elements = self.elements.lock().await;
        let target = elements.get(element.id()).ok_or_else(|| stale(element))?;
        let text = bounded(self.config.element_timeout, target.inner_text()).await?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.check_generation(element)?;
        let elements = self.elements.lock().await;
        let target = elements.get(element.id()).ok_or_else(|| stale(element))?;
        bounded(self.config.element_timeout, target.attribute(name)).await
    }

    async fn current_url(&self) -> DriverResult<String> {
        let page = self.page.lock().await;
        let page = page.as_ref().ok_or_else(closed)?;
        let url = bounded(self.config.element_timeout, page.url()).await?;
        Ok(url.unwrap_or_default())
    }

    async fn close(&self) -> DriverResult<()> {
        self.elements.lock().await.clear();
        let page = self.page.lock().await.take();
        match page {
            Some(page) => bounded(self.config.navigation_timeout, page.close()).await,
            None => Ok(()),
        }
    }
}
