//! Voxify: voice-driven domain search against Turbify.
//!
//! Owns the read-dispatch-speak cycle: capture one utterance (microphone or
//! stdin in `--text` mode), hand it to the dispatcher, print and speak the
//! response, and stop when the dispatcher says so or input ends. The
//! automation session is opened once at startup and closed exactly once on
//! every exit path.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use voxify_assistant::{dispatch, CdpPage, SiteConfig, TurbifySession};
use voxify_browser::LaunchConfig;
use voxify_voice::capture::{
    self, CaptureConfig, SttConfig, SttProviderKind, UtteranceCapture,
};
use voxify_voice::speak::Speaker;

/// Voice-driven domain search assistant for Turbify.
#[derive(Parser, Debug)]
#[command(name = "voxify", version, about)]
struct Cli {
    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Type commands on stdin instead of using the microphone
    #[arg(long)]
    text: bool,

    /// DevTools debugging port for the launched browser
    #[arg(long, default_value_t = 9222)]
    port: u16,

    /// Explicit path to a Chrome/Chromium binary
    #[arg(long)]
    browser: Option<PathBuf>,

    /// Transcribe locally with this whisper.cpp binary instead of the
    /// Whisper API (requires --whisper-model)
    #[arg(long)]
    whisper_bin: Option<String>,

    /// Model file for --whisper-bin
    #[arg(long)]
    whisper_model: Option<String>,
}

const WELCOME: &str = "Welcome to the Turbify Voice Assistant!\n\
Here's what I can do for you:\n\
  - Search a domain: say something like 'search example.com'\n\
  - Spell out a domain: say 'spell e x a m p l e dot com'\n\
  - Go to a section: say 'go to hosting' or 'open domains'\n\
  - Leave: say 'exit now'";

const SPOKEN_WELCOME: &str = "Welcome to the Turbify Voice Assistant. You can ask me to \
search for domain names, spell them out, or navigate to the hosting page.";

/// Where commands come from.
enum InputSource {
    Voice(UtteranceCapture),
    Text(Lines<BufReader<Stdin>>),
}

impl InputSource {
    /// Next raw command. `None` means input is exhausted (stdin EOF).
    async fn next_command(&mut self) -> Option<String> {
        match self {
            InputSource::Voice(capture) => Some(capture.capture_utterance().await),
            InputSource::Text(lines) => lines.next_line().await.ok().flatten(),
        }
    }
}

fn build_stt_config(cli: &Cli) -> SttConfig {
    if cli.whisper_bin.is_some() {
        SttConfig {
            provider: SttProviderKind::Local,
            whisper_bin: cli.whisper_bin.clone(),
            whisper_model: cli.whisper_model.clone(),
            ..SttConfig::default()
        }
    } else {
        SttConfig::default()
    }
}

async fn build_input_source(cli: &Cli) -> anyhow::Result<InputSource> {
    if cli.text {
        return Ok(InputSource::Text(BufReader::new(tokio::io::stdin()).lines()));
    }

    let backend = capture::detect_backend().await.ok_or_else(|| {
        anyhow::anyhow!("no microphone backend found (install SoX or alsa-utils), or use --text")
    })?;
    let provider = capture::create_provider(&build_stt_config(cli))?;
    Ok(InputSource::Voice(UtteranceCapture::new(
        backend,
        provider,
        CaptureConfig::default(),
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut input = build_input_source(&cli).await?;
    let speaker = Speaker::detect().await;

    let launch = LaunchConfig {
        headless: cli.headless,
        debug_port: cli.port,
        binary: cli.browser.clone(),
    };
    let page = CdpPage::launch(&launch).await?;
    let mut session = TurbifySession::new(Box::new(page), SiteConfig::default());

    // A failed open is fatal, but the browser still needs tearing down.
    if let Err(e) = session.open().await {
        session.close().await;
        return Err(e.into());
    }

    println!("{WELCOME}\n");
    speaker.say(SPOKEN_WELCOME).await;

    loop {
        let Some(command) = input.next_command().await else {
            break;
        };
        let command = command.trim().to_string();
        if command.is_empty() {
            continue;
        }

        println!("You: {command}");
        let outcome = dispatch(&command, &mut session).await;
        if let Some(announce) = &outcome.announce {
            println!("{announce}");
            speaker.say(announce).await;
        }
        println!("Assistant: {}", outcome.reply);
        speaker.say(&outcome.reply).await;

        if !outcome.continue_loop {
            break;
        }
    }

    session.close().await;
    Ok(())
}
