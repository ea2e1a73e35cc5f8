//! Prompt construction — persona preamble + context window + latest text.
//!
//! The model only ever sees the trailing window of the transcript; the full
//! history is a persistence and display concern, not a prompting one.

use calmconnect_core::types::ChatMessage;

/// The cue token the prompt ends with, inviting the companion's reply.
const REPLY_CUE: &str = "Nia:";

/// Assemble the single prompt string sent to the model backend.
///
/// Shape: persona, then the windowed history role-tagged one message per
/// line, then the literal latest user text on its own `User:` line,
/// closed by the companion's name as the completion cue.
pub fn build_prompt(persona: &str, window: &[ChatMessage], user_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(persona.trim());
    prompt.push_str("\n\nRecent chat history:\n");

    if window.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        for message in window {
            prompt.push_str(&format!("{}: {}\n", message.role, message.text));
        }
    }

    prompt.push_str(&format!("\nUser: {user_text}\n{REPLY_CUE}"));
    prompt
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
