//! Render-surface events — what the session emits toward the UI.
//!
//! The session never draws anything itself. It announces transcript
//! updates, the thinking indicator, streamed reply fragments, and non-fatal
//! notices; whatever front end is attached decides how to paint them.

use calmconnect_core::types::Transcript;

// ─────────────────────────────────────────────
// Notices
// ─────────────────────────────────────────────

/// Why a listen attempt produced no text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenFailure {
    Unintelligible,
    ServiceUnavailable,
    NoSpeech,
}

/// A non-fatal problem surfaced to the user. None of these abort a turn or
/// touch the transcript beyond what the turn itself commits.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    /// The model backend failed; the turn completed with the fallback reply.
    ModelFailed(String),
    /// Speech synthesis failed; the reply stands, silently.
    VoiceFailed(String),
    /// Voice capture produced no usable text.
    ListenFailed(ListenFailure),
    /// Persisting the transcript failed; the in-memory copy remains
    /// authoritative for the rest of the session.
    StoreFailed(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::ModelFailed(_) => {
                write!(f, "An error occurred while generating the response.")
            }
            Notice::VoiceFailed(detail) => write!(f, "Voice error: {detail}"),
            Notice::ListenFailed(ListenFailure::Unintelligible) => {
                write!(f, "Couldn't understand. Try again.")
            }
            Notice::ListenFailed(ListenFailure::ServiceUnavailable) => {
                write!(f, "Voice service unavailable.")
            }
            Notice::ListenFailed(ListenFailure::NoSpeech) => {
                write!(f, "No speech detected.")
            }
            Notice::StoreFailed(detail) => write!(f, "Error saving chat memory: {detail}"),
        }
    }
}

// ─────────────────────────────────────────────
// RenderSurface
// ─────────────────────────────────────────────

/// The presentation seam the session emits to.
pub trait RenderSurface: Send + Sync {
    /// The transcript changed; repaint it role-tagged.
    fn show_transcript(&self, transcript: &Transcript);

    /// Toggle the "typing/thinking" indicator.
    fn set_thinking(&self, active: bool);

    /// One streamed reply fragment, in arrival order. Best-effort display
    /// only — the final reply arrives via `show_transcript`.
    fn fragment(&self, text: &str);

    /// A non-fatal notice to show the user.
    fn notice(&self, notice: &Notice);
}

/// A surface that swallows everything — headless and test use.
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn show_transcript(&self, _transcript: &Transcript) {}
    fn set_thinking(&self, _active: bool) {}
    fn fragment(&self, _text: &str) {}
    fn notice(&self, _notice: &Notice) {}
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
