//! Blocking speech synthesis via subprocess backends.
//!
//! Uses whatever offline synthesizer the system provides:
//!
//! - macOS: `say` (built-in)
//! - Linux: `espeak-ng` or `espeak`
//!
//! [`Speaker::say`] blocks until the utterance completes; failures are
//! logged rather than propagated.

use std::process::Stdio;

use tokio::process::Command;

use crate::{command_exists, VoiceError, VoiceResult};

/// Available synthesis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechBackend {
    /// macOS `say` command.
    Say,
    /// `espeak-ng` command.
    EspeakNg,
    /// Classic `espeak` command.
    Espeak,
}

impl SpeechBackend {
    fn command_name(self) -> &'static str {
        match self {
            SpeechBackend::Say => "say",
            SpeechBackend::EspeakNg => "espeak-ng",
            SpeechBackend::Espeak => "espeak",
        }
    }
}

impl std::fmt::Display for SpeechBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_name())
    }
}

/// Detect which synthesis backend is available.
pub async fn detect_backend() -> Option<SpeechBackend> {
    if command_exists("say").await {
        return Some(SpeechBackend::Say);
    }
    if command_exists("espeak-ng").await {
        return Some(SpeechBackend::EspeakNg);
    }
    if command_exists("espeak").await {
        return Some(SpeechBackend::Espeak);
    }
    None
}

/// Speaks text through a subprocess synthesizer.
pub struct Speaker {
    backend: Option<SpeechBackend>,
}

impl Speaker {
    /// Build a speaker over the detected backend.
    ///
    /// When no synthesizer is installed the speaker is silent; responses are
    /// still printed by the shell, so this is a degraded mode, not an error.
    pub async fn detect() -> Self {
        let backend = detect_backend().await;
        match backend {
            Some(b) => tracing::info!(backend = %b, "speech synthesis backend detected"),
            None => tracing::warn!("no speech synthesis backend found; running silent"),
        }
        Self { backend }
    }

    /// Build a speaker over an explicit backend (for tests).
    pub fn with_backend(backend: Option<SpeechBackend>) -> Self {
        Self { backend }
    }

    /// Whether a synthesizer is available.
    pub fn is_audible(&self) -> bool {
        self.backend.is_some()
    }

    /// Speak `text`, blocking until the utterance completes.
    ///
    /// Failures are logged and swallowed; speaking is best-effort.
    pub async fn say(&self, text: &str) {
        let Some(backend) = self.backend else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }
        if let Err(e) = run_synthesis(backend, text).await {
            tracing::warn!(backend = %backend, error = %e, "speech synthesis failed");
        }
    }
}

async fn run_synthesis(backend: SpeechBackend, text: &str) -> VoiceResult<()> {
    let status = Command::new(backend.command_name())
        .arg(text)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| VoiceError::Synthesis(format!("failed to run {backend}: {e}")))?;

    if !status.success() {
        return Err(VoiceError::Synthesis(format!(
            "{backend} exited with status: {status}"
        )));
    }
    Ok(())
}
