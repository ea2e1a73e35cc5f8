//! CalmConnect CLI — entry point.
//!
//! # Commands
//!
//! - `calmconnect chat [-m MESSAGE]` — talk to Nia (single-shot or REPL)
//! - `calmconnect prompt <affirmation|meditation>` — one-off wellbeing prompt
//! - `calmconnect onboard` — initialize config + data directories
//! - `calmconnect status` — show configuration and voice status

mod console;
mod helpers;
mod onboard;
mod prompt_cmd;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use calmconnect_core::config::{load_config, Config};
use calmconnect_core::memory::FileStore;
use calmconnect_core::utils::get_data_path;
use calmconnect_providers::listen::InboxListener;
use calmconnect_providers::ollama::OllamaClient;
use calmconnect_providers::voice::ElevenLabsSpeaker;
use calmconnect_session::{ConversationSession, SessionSettings};

use console::ConsoleSurface;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🌿 CalmConnect — a local AI companion for calm conversations
#[derive(Parser)]
#[command(name = "calmconnect", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the companion (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Speak replies aloud (overrides the config toggle)
        #[arg(long, default_value_t = false)]
        voice: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Get a one-off wellbeing prompt (not saved to chat history)
    Prompt {
        #[arg(value_enum)]
        kind: prompt_cmd::PromptKind,
    },

    /// Initialize configuration and data directories
    Onboard,

    /// Show configuration, memory, and voice status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            voice,
            logs,
        } => {
            init_logging(logs);
            run_chat(message, voice).await
        }
        Commands::Prompt { kind } => {
            init_logging(false);
            let config = load_config(None);
            let model = OllamaClient::new(&config.chat.api_base, &config.chat.model);
            prompt_cmd::run(&model, kind).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(message: Option<String>, force_voice: bool) -> Result<()> {
    let config = load_config(None);
    let single_shot = message.is_some();

    let surface = Arc::new(ConsoleSurface::new(!single_shot));
    let session = Arc::new(build_session(&config, Arc::clone(&surface), force_voice)?);

    match message {
        Some(text) => {
            info!("processing single message");
            match session.submit(&text).await {
                Some(reply) if surface.streamed_len() == 0 => {
                    helpers::print_response(&reply.text)
                }
                Some(_) => {
                    println!();
                    println!();
                }
                None => {}
            }
        }
        None => {
            repl::run(session, surface, config.voice.listen_timeout_secs).await?;
        }
    }

    Ok(())
}

/// Wire a `ConversationSession` from the loaded configuration.
fn build_session(
    config: &Config,
    surface: Arc<ConsoleSurface>,
    force_voice: bool,
) -> Result<ConversationSession> {
    let model = Arc::new(OllamaClient::new(&config.chat.api_base, &config.chat.model));
    let store = Arc::new(FileStore::new(None).context("failed to open memory store")?);

    let settings = SessionSettings {
        voice_enabled: force_voice || config.voice.enabled,
        voice_gender: config.voice.gender,
        voice_input_enabled: config.voice.input_enabled,
    };

    let mut session = ConversationSession::new(
        model,
        store,
        surface,
        config.chat.persona.clone(),
        config.chat.context_window,
        settings,
    );

    if !config.voice.elevenlabs_api_key.is_empty() || settings.voice_enabled {
        let speaker = ElevenLabsSpeaker::new(&config.voice.elevenlabs_api_key, None);
        session = session.with_voice(Arc::new(speaker));
    }

    let inbox = if config.voice.audio_inbox.is_empty() {
        get_data_path().join("inbox")
    } else {
        helpers::expand_tilde(&config.voice.audio_inbox)
    };
    let listener = InboxListener::new(inbox, &config.voice.groq_api_key);
    Ok(session.with_voice_input(Arc::new(listener)))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("calmconnect=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
