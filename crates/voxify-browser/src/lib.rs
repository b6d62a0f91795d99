//! CDP browser automation layer for voxify.
//!
//! Launches a local Chrome/Chromium with DevTools enabled, connects to its
//! first page target over WebSocket, and exposes the page operations the
//! assistant core needs: bounded navigation, XPath element probes, clicking,
//! filling, and a network-idle wait.
//!
//! The crate is split into three layers:
//!
//! - [`launch`]: binary discovery, process launch, page-target discovery.
//! - [`cdp`]: low-level WebSocket client with JSON-RPC command/response
//!   correlation and event dispatch.
//! - [`driver`]: high-level [`PageDriver`] built on the CDP client.

pub mod cdp;
pub mod driver;
pub mod error;
pub mod launch;

pub use cdp::{CdpClient, CdpEvent};
pub use driver::{ElementProbe, PageDriver};
pub use error::BrowserError;
pub use launch::{Chrome, LaunchConfig};
