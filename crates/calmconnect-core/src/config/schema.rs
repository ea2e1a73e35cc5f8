//! Configuration schema.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use crate::types::VoiceGender;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.calmconnect/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub chat: ChatConfig,
    pub voice: VoiceConfig,
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Model and prompt settings for the conversation session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Model identifier passed to the local backend.
    pub model: String,
    /// Base URL of the Ollama-compatible API.
    pub api_base: String,
    /// How many trailing transcript messages go into each prompt.
    pub context_window: usize,
    /// Persona/style preamble prepended to every prompt.
    pub persona: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "mistral:latest".to_string(),
            api_base: "http://localhost:11434".to_string(),
            context_window: 8,
            persona: "You are Nia, an AI companion with a warm, supportive, \
                      and human-like tone. Keep responses short but meaningful."
                .to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Voice
// ─────────────────────────────────────────────

/// Voice output/input settings. Everything defaults to off; voice is
/// opt-in per deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceConfig {
    /// Speak assistant replies aloud.
    pub enabled: bool,
    /// Voice selector for synthesis.
    pub gender: VoiceGender,
    /// Take user input from the audio inbox instead of the keyboard.
    pub input_enabled: bool,
    /// How long `listen` waits for speech before giving up, in seconds.
    pub listen_timeout_secs: u64,
    /// Directory watched for dropped-in audio files when listening.
    /// Empty means `~/.calmconnect/inbox/`.
    pub audio_inbox: String,
    /// ElevenLabs API key for speech synthesis.
    pub elevenlabs_api_key: String,
    /// Groq API key for Whisper transcription of voice input.
    pub groq_api_key: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gender: VoiceGender::Female,
            input_enabled: false,
            listen_timeout_secs: 4,
            audio_inbox: String::new(),
            elevenlabs_api_key: String::new(),
            groq_api_key: String::new(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
