//! Terminal implementation of the session's render surface.
//!
//! Fragments stream to stdout as they arrive; the REPL falls back to
//! printing the finished reply when nothing was streamed (a fallback reply
//! produces no fragments).

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use colored::Colorize;

use calmconnect_core::types::{Role, Transcript};
use calmconnect_session::surface::{Notice, RenderSurface};

pub struct ConsoleSurface {
    /// Replay prior history on the first `show_transcript` only; after
    /// that the stream of fragments is the display.
    replay_pending: AtomicBool,
    thinking_shown: AtomicBool,
    /// Characters streamed during the current turn.
    streamed: AtomicUsize,
}

impl ConsoleSurface {
    /// `replay_history` controls whether the hydrated transcript is printed
    /// on startup (REPL yes, single-shot no).
    pub fn new(replay_history: bool) -> Self {
        Self {
            replay_pending: AtomicBool::new(replay_history),
            thinking_shown: AtomicBool::new(false),
            streamed: AtomicUsize::new(0),
        }
    }

    /// How many characters streamed during the current turn.
    pub fn streamed_len(&self) -> usize {
        self.streamed.load(Ordering::SeqCst)
    }

    fn clear_thinking_line(&self) {
        if self.thinking_shown.swap(false, Ordering::SeqCst) {
            eprint!("\r{}\r", " ".repeat(24));
        }
    }
}

impl RenderSurface for ConsoleSurface {
    fn show_transcript(&self, transcript: &Transcript) {
        if !self.replay_pending.swap(false, Ordering::SeqCst) {
            return;
        }
        for message in transcript.messages() {
            match message.role {
                Role::User => println!("{} {}", "You:".bold(), message.text),
                Role::Assistant => {
                    println!("{} {}", "Nia:".cyan().bold(), message.text)
                }
            }
        }
        if !transcript.is_empty() {
            println!();
        }
    }

    fn set_thinking(&self, active: bool) {
        if active {
            self.streamed.store(0, Ordering::SeqCst);
            self.thinking_shown.store(true, Ordering::SeqCst);
            eprint!("{}", "⠿ thinking...".dimmed());
        } else {
            self.clear_thinking_line();
        }
    }

    fn fragment(&self, text: &str) {
        self.clear_thinking_line();
        if self.streamed.fetch_add(text.len(), Ordering::SeqCst) == 0 {
            println!();
            println!("{}", "🌿 Nia".cyan().bold());
        }
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn notice(&self, notice: &Notice) {
        self.clear_thinking_line();
        match notice {
            Notice::ModelFailed(_) | Notice::StoreFailed(_) => {
                eprintln!("{} {}", "✗".red(), notice.to_string().red());
            }
            Notice::VoiceFailed(_) | Notice::ListenFailed(_) => {
                eprintln!("{} {}", "·".yellow(), notice.to_string().yellow());
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
