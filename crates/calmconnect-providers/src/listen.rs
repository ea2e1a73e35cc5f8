//! Voice input — audio-inbox capture with Whisper transcription.
//!
//! There is no microphone stack here: the listener watches a drop-in
//! directory for an audio file (any recorder can produce one) and
//! transcribes it via Groq's Whisper API, the same OpenAI-compatible
//! `/audio/transcriptions` shape any Whisper endpoint serves.
//!
//! Three failure kinds are distinguished for the user, but all of them mean
//! the same thing to the session: no text was submitted, nothing mutates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

// ─────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────

/// Result of one listen attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Speech recognized; the text is ready to submit.
    Heard(String),
    /// Audio arrived but produced no usable transcript.
    Unintelligible,
    /// The transcription service could not be reached.
    ServiceUnavailable,
    /// No speech arrived before the timeout.
    NoSpeech,
}

// ─────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────

/// Captures one utterance of user speech as text.
#[async_trait]
pub trait VoiceInput: Send + Sync {
    /// Wait up to `timeout_secs` for speech and transcribe it.
    async fn listen(&self, timeout_secs: u64) -> ListenOutcome;
}

// ─────────────────────────────────────────────
// InboxListener
// ─────────────────────────────────────────────

/// How often the inbox is re-scanned while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Watches an inbox directory and transcribes the first audio file dropped
/// into it. The file is consumed (deleted) once picked up.
pub struct InboxListener {
    inbox: PathBuf,
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

impl InboxListener {
    /// Create a listener over `inbox`.
    ///
    /// Falls back to the `GROQ_API_KEY` env var if `api_key` is empty.
    pub fn new(inbox: impl Into<PathBuf>, api_key: &str) -> Self {
        let key = if api_key.is_empty() {
            std::env::var("GROQ_API_KEY").unwrap_or_default()
        } else {
            api_key.to_string()
        };

        Self {
            inbox: inbox.into(),
            api_key: key,
            api_url: "https://api.groq.com/openai/v1/audio/transcriptions".into(),
            model: "whisper-large-v3".into(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a custom transcription endpoint (for tests / self-hosted Whisper).
    pub fn with_url(inbox: impl Into<PathBuf>, api_key: &str, api_url: &str) -> Self {
        let mut listener = Self::new(inbox, api_key);
        listener.api_url = api_url.to_string();
        listener
    }

    /// First audio file in the inbox, if any.
    fn next_audio_file(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.inbox).ok()?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_audio_file(&p.to_string_lossy()))
            .collect();
        files.sort();
        files.into_iter().next()
    }

    /// Upload one file to the transcription API.
    async fn transcribe(&self, file_path: &Path) -> anyhow::Result<String> {
        let file_name = file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        debug!(path = %file_path.display(), model = %self.model, "transcribing audio");

        let file_bytes = tokio::fs::read(file_path).await?;

        let file_part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("transcription API returned {status}: {body}");
        }

        let json: serde_json::Value = response.json().await?;
        Ok(json["text"].as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl VoiceInput for InboxListener {
    async fn listen(&self, timeout_secs: u64) -> ListenOutcome {
        let deadline = std::time::Instant::now() + Duration::from_secs(timeout_secs);

        // Poll the inbox until something shows up or the deadline passes.
        let file = loop {
            if let Some(path) = self.next_audio_file() {
                break path;
            }
            if std::time::Instant::now() >= deadline {
                debug!(timeout_secs, "no speech arrived before the deadline");
                return ListenOutcome::NoSpeech;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        };

        let transcript = self.transcribe(&file).await;

        // The utterance is consumed either way.
        if let Err(e) = std::fs::remove_file(&file) {
            warn!(path = %file.display(), error = %e, "failed to remove consumed audio file");
        }

        match transcript {
            Ok(text) if text.trim().is_empty() => ListenOutcome::Unintelligible,
            Ok(text) => ListenOutcome::Heard(text.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "transcription failed");
                ListenOutcome::ServiceUnavailable
            }
        }
    }
}

/// Check if a file path looks like an audio file.
pub fn is_audio_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".ogg")
        || lower.ends_with(".oga")
        || lower.ends_with(".opus")
        || lower.ends_with(".mp3")
        || lower.ends_with(".m4a")
        || lower.ends_with(".wav")
        || lower.ends_with(".flac")
        || lower.ends_with(".aac")
        || lower.ends_with(".webm")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
