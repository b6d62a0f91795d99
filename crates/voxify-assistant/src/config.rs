//! Site-facing configuration: origin, sub-paths, selectors, and timeouts.
//!
//! The XPath selectors are coupled to the target site's markup and will need
//! maintenance as the site changes; keeping them in one config struct makes
//! that coupling explicit and overridable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::outcome::{ResultProbe, SearchOutcome};

/// Configuration for the target site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site origin, without a trailing slash.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Sub-path of the domain-search section.
    #[serde(default = "default_domains_path")]
    pub domains_path: String,

    /// Sub-path of the hosting section.
    #[serde(default = "default_hosting_path")]
    pub hosting_path: String,

    /// First text input on the domain-search page.
    #[serde(default = "default_search_input_xpath")]
    pub search_input_xpath: String,

    /// The visible "Search" trigger element.
    #[serde(default = "default_search_trigger_xpath")]
    pub search_trigger_xpath: String,

    /// Result marker shown when the domain is available.
    #[serde(default = "default_available_result_xpath")]
    pub available_result_xpath: String,

    /// Result marker shown when the domain is taken.
    #[serde(default = "default_unavailable_result_xpath")]
    pub unavailable_result_xpath: String,

    /// The plan-selection element on the hosting page.
    #[serde(default = "default_plan_button_xpath")]
    pub plan_button_xpath: String,

    /// Bound on page navigations, in seconds.
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Bound on waiting for an element to become visible, in seconds.
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,

    /// Bound on waiting for the network to go idle, in seconds.
    #[serde(default = "default_network_idle_timeout_secs")]
    pub network_idle_timeout_secs: u64,
}

fn default_origin() -> String {
    "https://www.turbify.com".to_string()
}

fn default_domains_path() -> String {
    "/domains".to_string()
}

fn default_hosting_path() -> String {
    "/hosting".to_string()
}

fn default_search_input_xpath() -> String {
    "(//input)[1]".to_string()
}

fn default_search_trigger_xpath() -> String {
    "(//div[normalize-space()='Search'])[1]".to_string()
}

fn default_available_result_xpath() -> String {
    "(//div[@class='DomainSearchStep-result-available'])[1]".to_string()
}

fn default_unavailable_result_xpath() -> String {
    "(//p[@class='unavailableText'])[1]".to_string()
}

fn default_plan_button_xpath() -> String {
    "(//div[@class='WebHosting-Premiercontainer'])[1]".to_string()
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_visibility_timeout_secs() -> u64 {
    10
}

fn default_network_idle_timeout_secs() -> u64 {
    15
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            domains_path: default_domains_path(),
            hosting_path: default_hosting_path(),
            search_input_xpath: default_search_input_xpath(),
            search_trigger_xpath: default_search_trigger_xpath(),
            available_result_xpath: default_available_result_xpath(),
            unavailable_result_xpath: default_unavailable_result_xpath(),
            plan_button_xpath: default_plan_button_xpath(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            visibility_timeout_secs: default_visibility_timeout_secs(),
            network_idle_timeout_secs: default_network_idle_timeout_secs(),
        }
    }
}

impl SiteConfig {
    pub fn root_url(&self) -> String {
        self.origin.clone()
    }

    pub fn domains_url(&self) -> String {
        format!("{}{}", self.origin, self.domains_path)
    }

    pub fn hosting_url(&self) -> String {
        format!("{}{}", self.origin, self.hosting_path)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.network_idle_timeout_secs)
    }

    /// The result probes in priority order: available is always inspected
    /// before unavailable. The order here is a policy decision, not an
    /// implementation detail.
    pub fn result_probes(&self) -> [ResultProbe<'_>; 2] {
        [
            ResultProbe {
                xpath: &self.available_result_xpath,
                build: SearchOutcome::Available,
            },
            ResultProbe {
                xpath: &self.unavailable_result_xpath,
                build: SearchOutcome::Unavailable,
            },
        ]
    }
}
