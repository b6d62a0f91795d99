//! Error types for the voxify-browser crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving a browser over CDP.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No Chrome or Chromium binary could be located.
    #[error("no Chrome or Chromium binary found on this system")]
    NoChromeFound,

    /// The browser process could not be started.
    #[error("failed to launch browser `{binary}`: {reason}")]
    LaunchFailed { binary: String, reason: String },

    /// The DevTools endpoint never produced a usable page target.
    #[error("no DevTools page target appeared on port {port} within {duration:?}")]
    NoPageTarget { port: u16, duration: Duration },

    /// Failed to establish a WebSocket connection to the DevTools endpoint.
    #[error("failed to connect to DevTools at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// A CDP command returned an error response.
    #[error("CDP error {code}: {message}")]
    Cdp {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// A CDP command timed out waiting for its response.
    #[error("CDP command '{method}' timed out after {duration:?}")]
    CommandTimeout { method: String, duration: Duration },

    /// A protocol-level error (serialization, unexpected message shape).
    #[error("CDP protocol error: {detail}")]
    Protocol { detail: String },

    /// Navigation was rejected by the browser (bad URL, DNS failure, ...).
    #[error("navigation failed: {reason}")]
    NavigationFailed { reason: String },

    /// The page did not finish loading within the expected bound.
    #[error("page load timed out after {duration:?}")]
    PageLoadTimeout { duration: Duration },

    /// JavaScript evaluation threw in the page context.
    #[error("JavaScript exception: {message}")]
    JsException { message: String },
}
