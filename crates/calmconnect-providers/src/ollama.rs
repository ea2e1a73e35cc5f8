//! Ollama chat client — the local model backend.
//!
//! Talks to an Ollama server's `/api/chat` endpoint with `"stream": true`.
//! The response body is NDJSON, one chunk object per line; fragments are
//! forwarded to the caller as they arrive and concatenated into the final
//! reply.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;
use tracing::{debug, error, warn};

use crate::traits::ChatModel;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

/// Request body for `/api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// One NDJSON line of the streamed response.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

// ─────────────────────────────────────────────
// OllamaClient
// ─────────────────────────────────────────────

/// HTTP client for a locally hosted Ollama model.
pub struct OllamaClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for `model` at `api_base`
    /// (e.g. `"http://localhost:11434"`).
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        OllamaClient {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            model: model.into(),
        }
    }

    /// Build the full chat URL.
    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        on_fragment: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> anyhow::Result<String> {
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "calling Ollama"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "HTTP request failed");
                anyhow::anyhow!("error calling model: {e}")
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!(status = %status, body = %error_text, "Ollama API error");
            anyhow::bail!("model API returned {status}: {error_text}");
        }

        // NDJSON: one chunk per line until a chunk with done=true.
        let byte_stream = response
            .bytes_stream()
            .map(|result| result.map_err(std::io::Error::other));
        let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
        let mut lines = reader.lines();

        let mut reply = String::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let chunk: ChatChunk = match serde_json::from_str(&line) {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "skipping malformed stream line");
                    continue;
                }
            };

            if let Some(err) = chunk.error {
                anyhow::bail!("model stream error: {err}");
            }

            if let Some(message) = chunk.message {
                if !message.content.is_empty() {
                    on_fragment(&message.content);
                    reply.push_str(&message.content);
                }
            }

            if chunk.done {
                break;
            }
        }

        debug!(model = %self.model, reply_chars = reply.len(), "reply complete");
        Ok(reply.trim().to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "Ollama"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
