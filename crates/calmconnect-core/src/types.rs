//! Core types for CalmConnect — the transcript and its messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Roles and messages
// ─────────────────────────────────────────────

/// Who authored a message. The session only ever produces these two roles.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single transcript entry. Immutable once appended.
///
/// The persisted form is `{role, text}` with an optional timestamp; the
/// timestamp is omitted entirely when unset so old records stay readable.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Create a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Create an assistant message stamped with the current time.
    pub fn assistant(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

// ─────────────────────────────────────────────
// Transcript
// ─────────────────────────────────────────────

/// Ordered conversation history. Insertion order is chronological order;
/// the only mutations are `push` and `clear`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transcript(Vec<ChatMessage>);

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Transcript(Vec::new())
    }

    /// Append a message. Appended messages are never edited.
    pub fn push(&mut self, message: ChatMessage) {
        self.0.push(message);
    }

    /// Reset to empty (the explicit clear operation).
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last `n` messages — the context window sent to the model.
    /// The full transcript stays intact; this is only a view.
    pub fn window(&self, n: usize) -> &[ChatMessage] {
        let len = self.0.len();
        &self.0[len.saturating_sub(n)..]
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.0
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.0.last()
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Transcript(messages)
    }
}

// ─────────────────────────────────────────────
// Voice selector
// ─────────────────────────────────────────────

/// Which synthesized voice to use for spoken replies.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl std::fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceGender::Female => write!(f, "female"),
            VoiceGender::Male => write!(f, "male"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
