//! Chrome/Chromium discovery and launch with DevTools enabled.
//!
//! Finds an installed Chrome-family binary on well-known platform paths,
//! starts it with `--remote-debugging-port` and a throwaway profile, then
//! polls the DevTools `/json` endpoint until a page target appears and
//! yields its WebSocket URL.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tempfile::TempDir;
use tokio::process::{Child, Command};

use crate::error::BrowserError;

/// How long to wait for the DevTools endpoint to come up after spawn.
const TARGET_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);
/// Poll interval against the `/json` endpoint.
const TARGET_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Options for launching the browser.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Run without a visible window.
    pub headless: bool,
    /// DevTools debugging port.
    pub debug_port: u16,
    /// Explicit binary path; discovered automatically when `None`.
    pub binary: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: false,
            debug_port: 9222,
            binary: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Binary discovery
// ---------------------------------------------------------------------------

/// Well-known Chrome/Chromium binary locations for the current platform.
pub fn platform_candidate_paths() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    }

    #[cfg(target_os = "linux")]
    {
        &[
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
            "/snap/bin/chromium",
            "/usr/lib/chromium/chromium",
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        &[]
    }
}

/// Names to try on `PATH` when no well-known path matches.
const PATH_FALLBACK_NAMES: &[&str] = &["google-chrome", "chromium", "chromium-browser"];

/// Locate a Chrome-family binary, preferring well-known install paths and
/// falling back to a `PATH` lookup.
pub fn find_chrome() -> Result<PathBuf, BrowserError> {
    for candidate in platform_candidate_paths() {
        let path = Path::new(candidate);
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
    }

    for name in PATH_FALLBACK_NAMES {
        if let Some(path) = lookup_on_path(name) {
            return Ok(path);
        }
    }

    Err(BrowserError::NoChromeFound)
}

/// Resolve a binary name via `which`.
fn lookup_on_path(name: &str) -> Option<PathBuf> {
    let output = std::process::Command::new("which").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

// ---------------------------------------------------------------------------
// DevTools target discovery
// ---------------------------------------------------------------------------

/// One entry from the DevTools `/json` target list.
#[derive(Debug, Deserialize)]
struct DevToolsTarget {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_url: Option<String>,
}

/// Pick the first page target's WebSocket URL from a `/json` response body.
fn first_page_ws_url(targets: &[DevToolsTarget]) -> Option<String> {
    targets
        .iter()
        .find(|t| t.kind == "page" && t.ws_url.is_some())
        .and_then(|t| t.ws_url.clone())
}

// ---------------------------------------------------------------------------
// Chrome process handle
// ---------------------------------------------------------------------------

/// A launched Chrome process with DevTools enabled.
///
/// Holds the child process and its throwaway profile directory; both are
/// cleaned up by [`Chrome::shutdown`].
pub struct Chrome {
    child: Child,
    /// WebSocket URL of the initial page target.
    pub ws_url: String,
    // Dropped (and deleted) together with the handle.
    _user_data_dir: TempDir,
}

impl Chrome {
    /// Launch the browser and wait for its first page target.
    pub async fn launch(config: &LaunchConfig) -> Result<Self, BrowserError> {
        let binary = match &config.binary {
            Some(path) => path.clone(),
            None => find_chrome()?,
        };

        let user_data_dir = TempDir::new().map_err(|e| BrowserError::LaunchFailed {
            binary: binary.display().to_string(),
            reason: format!("failed to create profile directory: {e}"),
        })?;

        let mut command = Command::new(&binary);
        command
            .arg(format!("--remote-debugging-port={}", config.debug_port))
            .arg(format!("--user-data-dir={}", user_data_dir.path().display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("about:blank")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        if config.headless {
            command.arg("--headless=new").arg("--disable-gpu");
        }

        tracing::info!(
            binary = %binary.display(),
            port = config.debug_port,
            headless = config.headless,
            "launching browser"
        );

        let child = command.spawn().map_err(|e| BrowserError::LaunchFailed {
            binary: binary.display().to_string(),
            reason: e.to_string(),
        })?;

        let ws_url = wait_for_page_target(config.debug_port).await?;
        tracing::debug!(ws_url = %ws_url, "page target discovered");

        Ok(Self {
            child,
            ws_url,
            _user_data_dir: user_data_dir,
        })
    }

    /// Kill the browser process and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(error = %e, "browser process already gone");
            return;
        }
        if let Err(e) = self.child.wait().await {
            tracing::warn!(error = %e, "failed to reap browser process");
        }
    }
}

/// Poll the DevTools `/json` endpoint until a page target shows up.
async fn wait_for_page_target(port: u16) -> Result<String, BrowserError> {
    let endpoint = format!("http://127.0.0.1:{port}/json");
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + TARGET_DISCOVERY_TIMEOUT;

    loop {
        if let Ok(response) = client.get(&endpoint).send().await {
            if let Ok(targets) = response.json::<Vec<DevToolsTarget>>().await {
                if let Some(ws_url) = first_page_ws_url(&targets) {
                    return Ok(ws_url);
                }
            }
        }

        if tokio::time::Instant::now() + TARGET_POLL_INTERVAL > deadline {
            return Err(BrowserError::NoPageTarget {
                port,
                duration: TARGET_DISCOVERY_TIMEOUT,
            });
        }
        tokio::time::sleep(TARGET_POLL_INTERVAL).await;
    }
}
