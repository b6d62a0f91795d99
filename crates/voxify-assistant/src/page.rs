//! The page seam between the session and the browser.
//!
//! [`SitePage`] is the narrow set of page operations the session needs.
//! Production code uses [`CdpPage`] over the CDP driver; tests script a mock
//! implementation to exercise the session without a browser.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use voxify_browser::launch::LaunchConfig;
use voxify_browser::{BrowserError, Chrome, PageDriver};

/// Errors surfaced through the page seam.
#[derive(Debug, Error)]
pub enum PageError {
    /// Navigation was rejected or did not complete in time.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Any other driver-level failure.
    #[error("page driver error: {0}")]
    Driver(String),
}

/// Page operations the session sequences.
///
/// All waits are bounded by the timeout the caller passes; `wait_*` methods
/// report a missed bound as `Ok(false)` rather than an error so callers can
/// decide whether it is tolerable.
#[async_trait]
pub trait SitePage: Send {
    /// Navigate to `url` and wait up to `timeout` for the page to load.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), PageError>;

    /// Wait for the first element matching `xpath` to become visible.
    async fn wait_visible(&mut self, xpath: &str, timeout: Duration) -> Result<bool, PageError>;

    /// Fill the first element matching `xpath` with `text`.
    async fn fill(&mut self, xpath: &str, text: &str) -> Result<(), PageError>;

    /// Click the first element matching `xpath`.
    async fn click(&mut self, xpath: &str) -> Result<(), PageError>;

    /// Wait for the network to go idle.
    async fn wait_network_idle(&mut self, timeout: Duration) -> Result<bool, PageError>;

    /// Whether the first element matching `xpath` exists and is visible.
    async fn is_visible(&mut self, xpath: &str) -> Result<bool, PageError>;

    /// Inner text of the first element matching `xpath`, if present.
    async fn inner_text(&mut self, xpath: &str) -> Result<Option<String>, PageError>;

    /// Release the page and any owned browser resources. Idempotent.
    async fn close(&mut self);
}

// ---------------------------------------------------------------------------
// CDP-backed implementation
// ---------------------------------------------------------------------------

/// A [`SitePage`] backed by a launched Chrome and the CDP driver.
pub struct CdpPage {
    driver: PageDriver,
    chrome: Option<Chrome>,
    closed: bool,
}

impl CdpPage {
    /// Launch a browser and bind to its first page target.
    pub async fn launch(config: &LaunchConfig) -> Result<Self, BrowserError> {
        let chrome = Chrome::launch(config).await?;
        let driver = PageDriver::connect(&chrome.ws_url).await?;
        Ok(Self {
            driver,
            chrome: Some(chrome),
            closed: false,
        })
    }

    /// Bind to an already-running browser's page target (the browser's
    /// lifetime stays with whoever started it).
    pub async fn connect(ws_url: &str) -> Result<Self, BrowserError> {
        let driver = PageDriver::connect(ws_url).await?;
        Ok(Self {
            driver,
            chrome: None,
            closed: false,
        })
    }
}

fn map_goto_error(e: BrowserError) -> PageError {
    match e {
        BrowserError::NavigationFailed { .. } | BrowserError::PageLoadTimeout { .. } => {
            PageError::Navigation(e.to_string())
        }
        other => PageError::Driver(other.to_string()),
    }
}

#[async_trait]
impl SitePage for CdpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        self.driver.goto(url, timeout).await.map_err(map_goto_error)
    }

    async fn wait_visible(&mut self, xpath: &str, timeout: Duration) -> Result<bool, PageError> {
        self.driver
            .wait_for_visible(xpath, timeout)
            .await
            .map_err(|e| PageError::Driver(e.to_string()))
    }

    async fn fill(&mut self, xpath: &str, text: &str) -> Result<(), PageError> {
        let found = self
            .driver
            .fill_xpath(xpath, text)
            .await
            .map_err(|e| PageError::Driver(e.to_string()))?;
        if !found {
            return Err(PageError::Driver(format!("no element matches {xpath}")));
        }
        Ok(())
    }

    async fn click(&mut self, xpath: &str) -> Result<(), PageError> {
        let found = self
            .driver
            .click_xpath(xpath)
            .await
            .map_err(|e| PageError::Driver(e.to_string()))?;
        if !found {
            return Err(PageError::Driver(format!("no element matches {xpath}")));
        }
        Ok(())
    }

    async fn wait_network_idle(&mut self, timeout: Duration) -> Result<bool, PageError> {
        self.driver
            .wait_for_network_idle(timeout)
            .await
            .map_err(|e| PageError::Driver(e.to_string()))
    }

    async fn is_visible(&mut self, xpath: &str) -> Result<bool, PageError> {
        self.driver
            .is_visible(xpath)
            .await
            .map_err(|e| PageError::Driver(e.to_string()))
    }

    async fn inner_text(&mut self, xpath: &str) -> Result<Option<String>, PageError> {
        self.driver
            .inner_text(xpath)
            .await
            .map_err(|e| PageError::Driver(e.to_string()))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.driver.close_browser().await;
        if let Some(chrome) = self.chrome.take() {
            chrome.shutdown().await;
        }
    }
}
