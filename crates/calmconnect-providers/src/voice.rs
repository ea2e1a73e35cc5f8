//! Voice output — ElevenLabs speech synthesis.
//!
//! Synthesizes reply text to an mp3 in the data directory. Actually playing
//! the file is a presentation concern and lives outside this crate.
//! Failures here are the caller's to catch; they never affect the
//! transcript.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, warn};

use calmconnect_core::types::VoiceGender;

// ─────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────

/// Speaks final reply text aloud. Fire-and-forget with respect to the
/// transcript: a failed call is reported, never propagated as a turn
/// failure.
#[async_trait]
pub trait VoiceOutput: Send + Sync {
    /// Synthesize `text` with the voice selected by `gender`.
    async fn speak(&self, text: &str, gender: VoiceGender) -> anyhow::Result<()>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

// ─────────────────────────────────────────────
// ElevenLabs
// ─────────────────────────────────────────────

/// Bella — the default female voice.
const VOICE_ID_FEMALE: &str = "EXAVITQu4vr4xnSDxMaL";
/// Josh — the male voice.
const VOICE_ID_MALE: &str = "TxGEqnHWrfWFTfGW9XjX";

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsSpeaker {
    api_key: String,
    api_base: String,
    /// Where synthesized audio lands (e.g. `~/.calmconnect/audio/`).
    output_dir: PathBuf,
    client: reqwest::Client,
}

impl ElevenLabsSpeaker {
    /// Create a new speaker. `output_dir` defaults to the data audio dir.
    pub fn new(api_key: &str, output_dir: Option<PathBuf>) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: "https://api.elevenlabs.io".into(),
            output_dir: output_dir.unwrap_or_else(calmconnect_core::utils::get_audio_path),
            client: reqwest::Client::new(),
        }
    }

    /// Create with a custom API base (for tests / proxies).
    pub fn with_api_base(api_key: &str, api_base: &str, output_dir: Option<PathBuf>) -> Self {
        let mut speaker = Self::new(api_key, output_dir);
        speaker.api_base = api_base.trim_end_matches('/').to_string();
        speaker
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Where the last synthesized reply is written.
    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join("reply.mp3")
    }

    fn voice_id(gender: VoiceGender) -> &'static str {
        match gender {
            VoiceGender::Female => VOICE_ID_FEMALE,
            VoiceGender::Male => VOICE_ID_MALE,
        }
    }
}

#[async_trait]
impl VoiceOutput for ElevenLabsSpeaker {
    async fn speak(&self, text: &str, gender: VoiceGender) -> anyhow::Result<()> {
        if !self.is_configured() {
            warn!("elevenlabs: no API key configured");
            anyhow::bail!("voice synthesis is not configured (missing API key)");
        }

        let voice_id = Self::voice_id(gender);
        let url = format!("{}/v1/text-to-speech/{voice_id}", self.api_base);

        debug!(voice = %gender, chars = text.len(), "synthesizing speech");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&json!({
                "text": text,
                "voice_settings": {
                    "stability": 0.5,
                    "similarity_boost": 0.8
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "elevenlabs API error");
            anyhow::bail!("speech API returned {status}: {body}");
        }

        let audio = response.bytes().await?;

        std::fs::create_dir_all(&self.output_dir)?;
        let out = self.output_file();
        std::fs::write(&out, &audio)?;

        debug!(bytes = audio.len(), path = %out.display(), "speech written");
        Ok(())
    }

    fn display_name(&self) -> &str {
        "ElevenLabs"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
