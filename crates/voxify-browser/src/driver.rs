//! High-level page driver over the CDP client.
//!
//! Provides the operations the assistant needs against a live page:
//! navigation with a bounded load wait, JavaScript evaluation, XPath-based
//! element probes (visibility, text, click, fill), and a network-idle wait
//! driven by Page lifecycle events.
//!
//! Elements are addressed by XPath rather than CSS selectors because the
//! target site is scripted with text-matching expressions such as
//! `(//div[normalize-space()='Search'])[1]`, which CSS cannot express. All
//! probes run through `Runtime.evaluate` with `document.evaluate`.

use std::time::Duration;

use serde_json::Value;

use crate::cdp::CdpClient;
use crate::error::BrowserError;

/// How often the visibility wait re-probes the page.
const VISIBILITY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of probing a single XPath expression on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementProbe {
    /// Whether the element is currently rendered and visible.
    pub visible: bool,
    /// The element's inner text (empty when not applicable).
    pub text: String,
}

/// High-level driver for one page target.
pub struct PageDriver {
    client: CdpClient,
}

impl PageDriver {
    /// Connect to a DevTools page target and enable the domains the driver
    /// relies on. Lifecycle events are switched on so that network-idle
    /// waits can observe them.
    pub async fn connect(ws_url: &str) -> Result<Self, BrowserError> {
        let client = CdpClient::connect(ws_url).await?;

        client.enable_domain("Page").await?;
        client.enable_domain("Runtime").await?;
        client
            .send_command(
                "Page.setLifecycleEventsEnabled",
                serde_json::json!({ "enabled": true }),
            )
            .await?;

        Ok(Self { client })
    }

    /// Create a driver from an existing CDP client (for tests or advanced use).
    pub fn from_client(client: CdpClient) -> Self {
        Self { client }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Navigate to `url` and wait up to `timeout` for the load event.
    ///
    /// Pending events are drained first so that a load event left over from
    /// an earlier navigation cannot satisfy this wait.
    pub async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.client.drain_events();

        let result = self
            .client
            .send_command("Page.navigate", serde_json::json!({ "url": url }))
            .await?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            if !error_text.is_empty() {
                return Err(BrowserError::NavigationFailed {
                    reason: error_text.to_string(),
                });
            }
        }

        self.wait_for_event("Page.loadEventFired", timeout)
            .await?
            .then_some(())
            .ok_or(BrowserError::PageLoadTimeout { duration: timeout })
    }

    /// Wait up to `timeout` for the page's network to go idle.
    ///
    /// Observes the `networkIdle` lifecycle event. Returns `Ok(false)` when
    /// the bound elapses first; callers decide whether that is tolerable.
    pub async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<bool, BrowserError> {
        self.wait_for_lifecycle("networkIdle", timeout).await
    }

    /// Wait for a named event, returning whether it arrived in time.
    async fn wait_for_event(&mut self, method: &str, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            match tokio::time::timeout(remaining, self.client.recv_event()).await {
                Ok(Some(event)) if event.method == method => return Ok(true),
                Ok(Some(_)) => continue,
                Ok(None) => {
                    return Err(BrowserError::Protocol {
                        detail: format!("WebSocket closed while waiting for {method}"),
                    })
                }
                Err(_) => return Ok(false),
            }
        }
    }

    /// Wait for a `Page.lifecycleEvent` with the given name.
    async fn wait_for_lifecycle(&mut self, name: &str, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            match tokio::time::timeout(remaining, self.client.recv_event()).await {
                Ok(Some(event)) => {
                    if event.method == "Page.lifecycleEvent"
                        && event.params.get("name").and_then(|n| n.as_str()) == Some(name)
                    {
                        return Ok(true);
                    }
                }
                Ok(None) => {
                    return Err(BrowserError::Protocol {
                        detail: format!("WebSocket closed while waiting for lifecycle {name}"),
                    })
                }
                Err(_) => return Ok(false),
            }
        }
    }

    // -----------------------------------------------------------------------
    // JavaScript evaluation
    // -----------------------------------------------------------------------

    /// Evaluate a JavaScript expression in the page context and return its
    /// value. Page-side exceptions come back as `BrowserError::JsException`.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
        let result = self
            .client
            .send_command(
                "Runtime.evaluate",
                serde_json::json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let message = exception
                .get("exception")
                .and_then(|e| e.get("description"))
                .and_then(|d| d.as_str())
                .or_else(|| exception.get("text").and_then(|t| t.as_str()))
                .unwrap_or("unknown exception")
                .to_string();
            return Err(BrowserError::JsException { message });
        }

        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    // -----------------------------------------------------------------------
    // XPath probes
    // -----------------------------------------------------------------------

    /// Probe the first element matching `xpath`.
    ///
    /// Returns `Ok(None)` when nothing matches; otherwise reports the
    /// element's visibility and inner text.
    pub async fn probe_xpath(&self, xpath: &str) -> Result<Option<ElementProbe>, BrowserError> {
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return null; {} \
             return {{ visible: visible, text: el.innerText || '' }}; }})()",
            xpath_lookup_js(xpath),
            VISIBILITY_CHECK_JS,
        );
        let value = self.evaluate(&expr).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(ElementProbe {
            visible: value
                .get("visible")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            text: value
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .to_string(),
        }))
    }

    /// Whether the first element matching `xpath` exists and is visible.
    pub async fn is_visible(&self, xpath: &str) -> Result<bool, BrowserError> {
        Ok(self
            .probe_xpath(xpath)
            .await?
            .map(|p| p.visible)
            .unwrap_or(false))
    }

    /// Inner text of the first element matching `xpath`, if it exists.
    pub async fn inner_text(&self, xpath: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.probe_xpath(xpath).await?.map(|p| p.text))
    }

    /// Poll until the first element matching `xpath` is visible or `timeout`
    /// elapses. Returns whether it became visible in time.
    pub async fn wait_for_visible(&self, xpath: &str, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_visible(xpath).await? {
                return Ok(true);
            }
            if tokio::time::Instant::now() + VISIBILITY_POLL_INTERVAL > deadline {
                return Ok(false);
            }
            tokio::time::sleep(VISIBILITY_POLL_INTERVAL).await;
        }
    }

    /// Click the first element matching `xpath`.
    ///
    /// Returns whether an element was found to click.
    pub async fn click_xpath(&self, xpath: &str) -> Result<bool, BrowserError> {
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
            xpath_lookup_js(xpath),
        );
        let value = self.evaluate(&expr).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Fill the first element matching `xpath` with `text`, replacing any
    /// existing value and dispatching `input`/`change` events so the page's
    /// scripts observe the edit.
    ///
    /// Returns whether an element was found to fill.
    pub async fn fill_xpath(&self, xpath: &str, text: &str) -> Result<bool, BrowserError> {
        let text_json = serde_json::to_string(text).map_err(|e| BrowserError::Protocol {
            detail: format!("failed to encode fill text: {e}"),
        })?;
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return false; el.focus(); \
             el.value = {text_json}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            xpath_lookup_js(xpath),
        );
        let value = self.evaluate(&expr).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    // -----------------------------------------------------------------------
    // Page metadata and teardown
    // -----------------------------------------------------------------------

    /// Current page URL (`window.location.href`).
    pub async fn current_url(&self) -> Result<String, BrowserError> {
        let value = self.evaluate("window.location.href").await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| BrowserError::Protocol {
                detail: "location.href did not return a string".to_string(),
            })
    }

    /// Ask the browser to shut down. Best-effort: the WebSocket usually drops
    /// before the response arrives, which is not an error worth surfacing.
    pub async fn close_browser(&self) {
        if let Err(e) = self
            .client
            .send_command_with_timeout("Browser.close", serde_json::json!({}), Duration::from_secs(5))
            .await
        {
            tracing::debug!(error = %e, "Browser.close did not acknowledge");
        }
    }
}

/// JavaScript fragment that resolves an XPath to its first matching element.
fn xpath_lookup_js(xpath: &str) -> String {
    // serde_json gives us correct string escaping for the embedded XPath.
    let xpath_json = serde_json::to_string(xpath).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "document.evaluate({xpath_json}, document, null, \
         XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
    )
}

/// JavaScript fragment computing `visible` for the element bound to `el`.
const VISIBILITY_CHECK_JS: &str = "const rect = el.getBoundingClientRect(); \
     const style = window.getComputedStyle(el); \
     const visible = rect.width > 0 && rect.height > 0 && \
         style.visibility !== 'hidden' && style.display !== 'none';";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_lookup_escapes_quotes() {
        let js = xpath_lookup_js("(//div[normalize-space()='Search'])[1]");
        assert!(js.contains("document.evaluate"));
        assert!(js.contains("\"(//div[normalize-space()='Search'])[1]\""));
    }

    #[test]
    fn test_xpath_lookup_escapes_double_quotes() {
        let js = xpath_lookup_js(r#"//div[@data-x="a"]"#);
        assert!(js.contains(r#"\"a\""#));
    }

    #[test]
    fn test_element_probe_equality() {
        let a = ElementProbe {
            visible: true,
            text: "CONGRATS, YOUR DOMAIN IS AVAILABLE!".to_string(),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
