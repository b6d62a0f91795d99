//! Speech collaborators for voxify.
//!
//! The assistant core treats audio as an external capability: capture an
//! utterance as text, speak a response as audio. Both sides are implemented
//! here with subprocess backends so no native audio dependencies are needed.
//!
//! # Modules
//!
//! - [`capture`]: microphone capture (SoX `rec`, ALSA `arecord`) plus a
//!   pluggable [`capture::SttProvider`] for transcription.
//! - [`speak`]: blocking speech synthesis (`say`, `espeak-ng`, `espeak`).
//!
//! Capture never raises to the caller (it returns an empty string on
//! timeout or recognition failure) and synthesis failures are logged rather
//! than propagated, so the command loop keeps running on flaky audio.

pub mod capture;
pub mod speak;

/// Errors internal to the voice collaborators.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// Audio capture failed.
    #[error("audio capture error: {0}")]
    Capture(String),

    /// Speech-to-text transcription failed.
    #[error("STT error: {0}")]
    Stt(String),

    /// Speech synthesis failed.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias for voice results.
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Check whether a command exists on the system `PATH`.
pub(crate) async fn command_exists(cmd: &str) -> bool {
    tokio::process::Command::new("which")
        .arg(cmd)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
