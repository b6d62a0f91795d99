//! The automation session against the target site.
//!
//! [`TurbifySession`] owns one [`SitePage`] bound to the site origin and
//! sequences the page actions behind each assistant operation: domain
//! search, section navigation, and plan selection.
//!
//! Lifecycle: `Uninitialized --open--> Ready --close--> Closed`. Operations
//! require `Ready`; `Closed` is terminal. Exactly one operation runs at a
//! time, enforced by the exclusive `&mut self` borrow. Per-operation page
//! failures are converted into outcome values here; nothing page-related
//! escapes as an error.

use crate::config::SiteConfig;
use crate::domain::Domain;
use crate::error::SessionError;
use crate::outcome::{NavigationOutcome, SearchOutcome, Section};
use crate::page::SitePage;

/// Fixed description of the hosting plan tiers, spoken after selecting one.
pub const HOSTING_PLANS_MESSAGE: &str =
    "Turbify Web Hosting Plans: We have Essentials, Professional, and Advanced.";

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet opened.
    Uninitialized,
    /// Open and accepting operations.
    Ready,
    /// Closed; rejects all further operations.
    Closed,
}

/// One browser session bound to the target site.
pub struct TurbifySession {
    page: Box<dyn SitePage>,
    config: SiteConfig,
    state: SessionState,
}

impl TurbifySession {
    /// Create a session over a page handle. No page traffic happens until
    /// [`open`](Self::open).
    pub fn new(page: Box<dyn SitePage>, config: SiteConfig) -> Self {
        Self {
            page,
            config,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Navigate to the site root. Failure is fatal: the session stays
    /// `Uninitialized` and the caller should abort startup.
    pub async fn open(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => return Err(SessionError::SessionClosed),
            SessionState::Ready => return Ok(()),
            SessionState::Uninitialized => {}
        }

        let url = self.config.root_url();
        let timeout = self.config.navigation_timeout();
        self.page
            .goto(&url, timeout)
            .await
            .map_err(|e| SessionError::Navigation {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        self.state = SessionState::Ready;
        tracing::info!(url = %url, "session opened");
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Uninitialized => Err(SessionError::NotOpen),
            SessionState::Closed => Err(SessionError::SessionClosed),
        }
    }

    /// Search the site for a domain and classify the result.
    ///
    /// Page-level failures come back as [`SearchOutcome::Error`]; the only
    /// `Err` cases are lifecycle misuse.
    pub async fn search_domain(&mut self, domain: &Domain) -> Result<SearchOutcome, SessionError> {
        self.ensure_ready()?;
        tracing::info!(domain = %domain, "searching domain");

        let url = self.config.domains_url();
        if let Err(e) = self.page.goto(&url, self.config.navigation_timeout()).await {
            return Ok(SearchOutcome::Error(e.to_string()));
        }

        let input = self.config.search_input_xpath.clone();
        match self
            .page
            .wait_visible(&input, self.config.visibility_timeout())
            .await
        {
            Ok(true) => {}
            Ok(false) => return Ok(SearchOutcome::Error("input not found".to_string())),
            Err(e) => return Ok(SearchOutcome::Error(e.to_string())),
        }
        if let Err(e) = self.page.fill(&input, domain.as_str()).await {
            return Ok(SearchOutcome::Error(e.to_string()));
        }

        let trigger = self.config.search_trigger_xpath.clone();
        if let Err(e) = self.page.click(&trigger).await {
            return Ok(SearchOutcome::Error(e.to_string()));
        }

        // Results may arrive over background requests without a full page
        // transition, so a missed idle bound is tolerated.
        match self
            .page
            .wait_network_idle(self.config.network_idle_timeout())
            .await
        {
            Ok(true) => {}
            Ok(false) => tracing::debug!("network idle bound elapsed, inspecting results anyway"),
            Err(e) => tracing::debug!(error = %e, "network idle wait failed, inspecting results anyway"),
        }

        Ok(self.inspect_results().await)
    }

    /// Walk the result probes in priority order; the first visible marker
    /// determines the outcome, so a visible "available" marker means the
    /// "unavailable" one is never inspected.
    async fn inspect_results(&mut self) -> SearchOutcome {
        let probes = self.config.result_probes();
        for probe in probes {
            match self.page.is_visible(probe.xpath).await {
                Ok(true) => {
                    return match self.page.inner_text(probe.xpath).await {
                        Ok(Some(text)) => (probe.build)(text.trim().to_string()),
                        Ok(None) => (probe.build)(String::new()),
                        Err(e) => SearchOutcome::Error(e.to_string()),
                    };
                }
                Ok(false) => {}
                Err(e) => return SearchOutcome::Error(e.to_string()),
            }
        }
        SearchOutcome::NotFound
    }

    /// Navigate to a fixed site section. Hosting navigations go on to select
    /// a plan and attach its message.
    pub async fn navigate_to(&mut self, section: Section) -> Result<NavigationOutcome, SessionError> {
        self.ensure_ready()?;
        tracing::info!(section = %section, "navigating");

        let (url, with_plan) = match section {
            Section::Hosting => (self.config.hosting_url(), true),
            Section::Domains => (self.config.domains_url(), false),
        };

        self.page
            .goto(&url, self.config.navigation_timeout())
            .await
            .map_err(|e| SessionError::Navigation {
                url,
                reason: e.to_string(),
            })?;

        let note = if with_plan {
            Some(self.choose_plan_message().await)
        } else {
            None
        };

        Ok(NavigationOutcome::Navigated { section, note })
    }

    /// Navigate by raw section name, as captured from speech. Names that
    /// mention neither hosting nor domains come back `Unrecognized`.
    pub async fn navigate_to_named(&mut self, name: &str) -> Result<NavigationOutcome, SessionError> {
        match Section::from_keyword(name) {
            Some(section) => self.navigate_to(section).await,
            None => {
                self.ensure_ready()?;
                Ok(NavigationOutcome::Unrecognized)
            }
        }
    }

    /// Click the plan-selection element on the current page and describe the
    /// plan tiers. Timeouts and click failures come back as an error-tagged
    /// message, never as `Err`.
    pub async fn choose_plan(&mut self) -> Result<String, SessionError> {
        self.ensure_ready()?;
        Ok(self.choose_plan_message().await)
    }

    async fn choose_plan_message(&mut self) -> String {
        let xpath = self.config.plan_button_xpath.clone();
        match self
            .page
            .wait_visible(&xpath, self.config.visibility_timeout())
            .await
        {
            Ok(true) => match self.page.click(&xpath).await {
                Ok(()) => HOSTING_PLANS_MESSAGE.to_string(),
                Err(e) => format!("Could not perform action: {e}"),
            },
            Ok(false) => "Could not perform action: plan selection never became visible".to_string(),
            Err(e) => format!("Could not perform action: {e}"),
        }
    }

    /// Release the page and browser resources. Idempotent: extra calls and
    /// calls on an unopened session are no-ops beyond entering `Closed`.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.page.close().await;
        self.state = SessionState::Closed;
        tracing::info!("session closed");
    }
}
