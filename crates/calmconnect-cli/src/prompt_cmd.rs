//! `calmconnect prompt` — one-off wellbeing prompts.
//!
//! These go straight to the model and never touch the saved transcript.

use anyhow::{Context, Result};
use clap::ValueEnum;

use calmconnect_providers::traits::ChatModel;
use calmconnect_session::surface::RenderSurface;

use crate::console::ConsoleSurface;
use crate::helpers;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PromptKind {
    /// A short positive affirmation.
    Affirmation,
    /// A brief guided meditation.
    Meditation,
}

impl PromptKind {
    fn text(self) -> &'static str {
        match self {
            PromptKind::Affirmation => "Give me a positive affirmation.",
            PromptKind::Meditation => "Give me a guided meditation.",
        }
    }
}

/// Send the canned prompt and stream the reply to the terminal.
pub async fn run(model: &dyn ChatModel, kind: PromptKind) -> Result<()> {
    let surface = ConsoleSurface::new(false);
    surface.set_thinking(true);

    let mut on_fragment = |fragment: &str| surface.fragment(fragment);
    let result = model.generate(kind.text(), &mut on_fragment).await;
    surface.set_thinking(false);

    let reply = result.context("model call failed")?;
    if surface.streamed_len() == 0 {
        helpers::print_response(&reply);
    } else {
        println!();
        println!();
    }

    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_texts() {
        assert_eq!(
            PromptKind::Affirmation.text(),
            "Give me a positive affirmation."
        );
        assert_eq!(
            PromptKind::Meditation.text(),
            "Give me a guided meditation."
        );
    }
}
