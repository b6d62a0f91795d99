//! Microphone capture and speech-to-text.
//!
//! Recording goes through subprocess backends (SoX `rec` preferred, ALSA
//! `arecord` as fallback) producing 16-bit PCM WAV, which a pluggable
//! [`SttProvider`] turns into text. [`UtteranceCapture`] composes the two
//! and honors the collaborator contract: it blocks for at most the
//! configured window and returns an empty string on any failure.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::{command_exists, VoiceError, VoiceResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for capturing one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Audio sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono).
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Maximum length of one recorded utterance, in seconds.
    #[serde(default = "default_utterance_secs")]
    pub utterance_secs: u64,
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

fn default_utterance_secs() -> u64 {
    8
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            utterance_secs: default_utterance_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recording backends
// ---------------------------------------------------------------------------

/// Available audio recording backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureBackend {
    /// SoX `rec` command.
    Sox,
    /// Linux ALSA `arecord` command.
    Arecord,
}

impl std::fmt::Display for CaptureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureBackend::Sox => write!(f, "sox"),
            CaptureBackend::Arecord => write!(f, "arecord"),
        }
    }
}

/// Detect which recording backend is available, preferring SoX.
pub async fn detect_backend() -> Option<CaptureBackend> {
    if command_exists("rec").await {
        return Some(CaptureBackend::Sox);
    }
    if command_exists("arecord").await {
        return Some(CaptureBackend::Arecord);
    }
    None
}

/// Build the recording command line for a backend.
fn build_record_args(backend: CaptureBackend, config: &CaptureConfig, out: &str) -> (String, Vec<String>) {
    match backend {
        CaptureBackend::Sox => (
            "rec".to_string(),
            vec![
                "-q".to_string(),
                "-r".to_string(),
                config.sample_rate.to_string(),
                "-c".to_string(),
                config.channels.to_string(),
                "-b".to_string(),
                "16".to_string(),
                out.to_string(),
                "trim".to_string(),
                "0".to_string(),
                config.utterance_secs.to_string(),
            ],
        ),
        CaptureBackend::Arecord => (
            "arecord".to_string(),
            vec![
                "-q".to_string(),
                "-f".to_string(),
                "S16_LE".to_string(),
                "-r".to_string(),
                config.sample_rate.to_string(),
                "-c".to_string(),
                config.channels.to_string(),
                "-d".to_string(),
                config.utterance_secs.to_string(),
                out.to_string(),
            ],
        ),
    }
}

/// Record one bounded utterance to WAV bytes.
pub async fn record_utterance(backend: CaptureBackend, config: &CaptureConfig) -> VoiceResult<Vec<u8>> {
    let out_path = std::env::temp_dir().join(format!("voxify_capture_{}.wav", std::process::id()));
    let out_str = out_path.to_string_lossy().to_string();
    let (cmd, args) = build_record_args(backend, config, &out_str);

    tracing::debug!(backend = %backend, secs = config.utterance_secs, "recording utterance");

    // The backend bounds its own duration; the outer timeout is a safety net
    // in case the recorder wedges.
    let run = Command::new(&cmd)
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    let grace = Duration::from_secs(config.utterance_secs + 5);
    let status = tokio::time::timeout(grace, run)
        .await
        .map_err(|_| VoiceError::Capture(format!("{cmd} did not exit within {grace:?}")))?
        .map_err(|e| VoiceError::Capture(format!("failed to run {cmd}: {e}")))?;

    if !status.success() {
        let _ = tokio::fs::remove_file(&out_path).await;
        return Err(VoiceError::Capture(format!("{cmd} exited with status: {status}")));
    }

    let bytes = tokio::fs::read(&out_path).await?;
    let _ = tokio::fs::remove_file(&out_path).await;
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Speech-to-text providers
// ---------------------------------------------------------------------------

/// Configuration for speech-to-text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// Which STT provider to use.
    #[serde(default)]
    pub provider: SttProviderKind,

    /// Environment variable holding the API key for the cloud provider.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Language hint (BCP-47 tag).
    #[serde(default = "default_language")]
    pub language: String,

    /// Path to a local whisper.cpp binary (for [`SttProviderKind::Local`]).
    pub whisper_bin: Option<String>,

    /// Path to a local whisper model file (for [`SttProviderKind::Local`]).
    pub whisper_model: Option<String>,
}

/// Available STT provider types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SttProviderKind {
    /// OpenAI Whisper API.
    #[default]
    Whisper,
    /// Local whisper.cpp binary.
    Local,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: SttProviderKind::default(),
            api_key_env: default_api_key_env(),
            language: default_language(),
            whisper_bin: None,
            whisper_model: None,
        }
    }
}

impl SttConfig {
    /// Resolve the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> VoiceResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(VoiceError::Config(format!(
                "missing API key: environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}

/// A speech-to-text backend.
#[async_trait]
pub trait SttProvider: Send + Sync {
    /// Transcribe WAV audio to text.
    async fn transcribe(&self, wav: &[u8]) -> VoiceResult<String>;

    /// Short provider name for logging.
    fn name(&self) -> &'static str;
}

/// OpenAI Whisper API transcription.
pub struct WhisperStt {
    client: reqwest::Client,
    api_key: String,
    language: String,
}

impl WhisperStt {
    pub fn new(config: &SttConfig) -> VoiceResult<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.resolve_api_key()?,
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl SttProvider for WhisperStt {
    async fn transcribe(&self, wav: &[u8]) -> VoiceResult<String> {
        let part = reqwest::multipart::Part::bytes(wav.to_vec())
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Stt(format!("failed to build multipart: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", "whisper-1")
            .text("language", self.language.clone());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("whisper API returned {status}: {body}")));
        }

        let json: serde_json::Value = response.json().await?;
        Ok(json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string())
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

/// Local whisper.cpp transcription via subprocess.
pub struct LocalWhisperStt {
    binary: PathBuf,
    model: PathBuf,
    language: String,
}

impl LocalWhisperStt {
    pub fn new(config: &SttConfig) -> VoiceResult<Self> {
        let binary = config
            .whisper_bin
            .as_ref()
            .ok_or_else(|| VoiceError::Config("whisper_bin is required for local STT".to_string()))?;
        let model = config
            .whisper_model
            .as_ref()
            .ok_or_else(|| VoiceError::Config("whisper_model is required for local STT".to_string()))?;
        Ok(Self {
            binary: PathBuf::from(binary),
            model: PathBuf::from(model),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl SttProvider for LocalWhisperStt {
    async fn transcribe(&self, wav: &[u8]) -> VoiceResult<String> {
        let wav_path = std::env::temp_dir().join(format!("voxify_stt_{}.wav", std::process::id()));
        tokio::fs::write(&wav_path, wav).await?;

        let output = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(&wav_path)
            .arg("-l")
            .arg(&self.language)
            .arg("--no-timestamps")
            .stderr(Stdio::null())
            .output()
            .await;

        let _ = tokio::fs::remove_file(&wav_path).await;

        let output = output.map_err(|e| VoiceError::Stt(format!("failed to run whisper.cpp: {e}")))?;
        if !output.status.success() {
            return Err(VoiceError::Stt(format!(
                "whisper.cpp exited with status: {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Create the configured STT provider.
pub fn create_provider(config: &SttConfig) -> VoiceResult<Box<dyn SttProvider>> {
    match config.provider {
        SttProviderKind::Whisper => Ok(Box::new(WhisperStt::new(config)?)),
        SttProviderKind::Local => Ok(Box::new(LocalWhisperStt::new(config)?)),
    }
}

// ---------------------------------------------------------------------------
// Utterance capture
// ---------------------------------------------------------------------------

/// Records one utterance and transcribes it.
pub struct UtteranceCapture {
    backend: CaptureBackend,
    provider: Box<dyn SttProvider>,
    config: CaptureConfig,
}

impl UtteranceCapture {
    pub fn new(backend: CaptureBackend, provider: Box<dyn SttProvider>, config: CaptureConfig) -> Self {
        Self {
            backend,
            provider,
            config,
        }
    }

    /// Capture one utterance as text.
    ///
    /// Blocks for at most the configured recording window plus transcription
    /// time. Returns an empty string on timeout or any recognition failure,
    /// never an error.
    pub async fn capture_utterance(&self) -> String {
        let wav = match record_utterance(self.backend, &self.config).await {
            Ok(wav) => wav,
            Err(e) => {
                tracing::warn!(error = %e, "utterance recording failed");
                return String::new();
            }
        };

        match self.provider.transcribe(&wav).await {
            Ok(text) => {
                if !text.is_empty() {
                    tracing::info!(provider = self.provider.name(), text = %text, "recognized utterance");
                }
                text
            }
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "transcription failed");
                String::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
