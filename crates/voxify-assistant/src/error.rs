//! Error types for the assistant core.

use thiserror::Error;

/// Errors a session operation can surface to its caller.
///
/// Recoverable page-level failures (element waits timing out, result
/// inspection breaking) never appear here; they are folded into
/// [`crate::outcome::SearchOutcome::Error`] values at the session boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required navigation failed or timed out. Fatal when it happens
    /// during `open`; the caller should abort startup.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// An operation was attempted before `open` succeeded.
    #[error("session has not been opened")]
    NotOpen,

    /// An operation was attempted after `close`. Correct callers never hit
    /// this; treat it as a programming error.
    #[error("session is closed")]
    SessionClosed,
}
