//! Interactive REPL — readline loop over a conversation session.
//!
//! Uses `rustyline` for line editing with persistent history. Slash
//! commands control the session; everything else is submitted as a turn.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use calmconnect_core::types::VoiceGender;
use calmconnect_session::ConversationSession;

use crate::console::ConsoleSurface;
use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Exit,
    Help,
    Clear,
    Voice(bool),
    VoiceInput(bool),
    Gender(VoiceGender),
    Listen,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let lower = line.to_lowercase();
    if EXIT_COMMANDS.contains(&lower.as_str()) {
        return ReplInput::Exit;
    }
    if !line.starts_with('/') {
        return ReplInput::Message(line);
    }
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("");
    match (command, arg) {
        ("/help", _) => ReplInput::Help,
        ("/clear", _) => ReplInput::Clear,
        ("/voice", "on") => ReplInput::Voice(true),
        ("/voice", "off") => ReplInput::Voice(false),
        ("/input", "on") => ReplInput::VoiceInput(true),
        ("/input", "off") => ReplInput::VoiceInput(false),
        ("/gender", "female") => ReplInput::Gender(VoiceGender::Female),
        ("/gender", "male") => ReplInput::Gender(VoiceGender::Male),
        ("/listen", _) => ReplInput::Listen,
        _ => ReplInput::Unknown(line),
    }
}

/// Run the interactive REPL loop.
pub async fn run(
    session: Arc<ConversationSession>,
    surface: Arc<ConsoleSurface>,
    listen_timeout_secs: u64,
) -> Result<()> {
    helpers::print_banner();

    let mut editor = create_editor()?;

    loop {
        // When voice input is on, the inbox replaces the keyboard as the
        // input source; a failed capture falls back to the prompt below.
        if session.settings().voice_input_enabled {
            println!(
                "{}",
                "Listening... drop an audio file into the inbox (or type below).".dimmed()
            );
            if let Some(text) = session.listen(listen_timeout_secs).await {
                println!("{} {}", "You (heard):".bold(), text);
                submit(&session, &surface, &text).await;
                continue;
            }
        }

        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        match parse_input(trimmed) {
            ReplInput::Exit => {
                println!("\nTake care! 🌿");
                break;
            }
            ReplInput::Help => print_help(),
            ReplInput::Clear => {
                session.clear();
                println!("{}", "Chat history cleared.".dimmed());
            }
            ReplInput::Voice(enabled) => {
                session.set_voice_enabled(enabled);
                println!(
                    "{}",
                    format!("Voice output {}.", if enabled { "on" } else { "off" }).dimmed()
                );
            }
            ReplInput::Gender(gender) => {
                session.set_voice_gender(gender);
                println!("{}", format!("Voice set to {gender}.").dimmed());
            }
            ReplInput::VoiceInput(enabled) => {
                session.set_voice_input_enabled(enabled);
                println!(
                    "{}",
                    format!("Voice input {}.", if enabled { "on" } else { "off" }).dimmed()
                );
            }
            ReplInput::Listen => {
                if !session.settings().voice_input_enabled {
                    println!(
                        "{}",
                        "Voice input is off. Turn it on with /input on.".dimmed()
                    );
                    continue;
                }
                println!(
                    "{}",
                    "Listening... drop an audio file into the inbox.".dimmed()
                );
                match session.listen(listen_timeout_secs).await {
                    Some(text) => {
                        println!("{} {}", "You (heard):".bold(), text);
                        submit(&session, &surface, &text).await;
                    }
                    None => {} // failure already surfaced as a notice
                }
            }
            ReplInput::Unknown(line) => {
                println!("{}", format!("Unknown command: {line}").dimmed());
            }
            ReplInput::Message(text) => {
                debug!(chars = text.len(), "submitting turn");
                submit(&session, &surface, text).await;
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Drive one turn and make sure the reply reaches the screen even when
/// nothing streamed (fallback replies produce no fragments).
async fn submit(session: &ConversationSession, surface: &ConsoleSurface, text: &str) {
    match session.submit(text).await {
        Some(reply) if surface.streamed_len() == 0 => helpers::print_response(&reply.text),
        Some(_) => {
            println!();
            println!();
        }
        None => {}
    }
}

fn print_help() {
    println!();
    println!("  {:<18} clear the chat history", "/clear".bold());
    println!("  {:<18} speak replies aloud", "/voice on|off".bold());
    println!("  {:<18} take input from the audio inbox", "/input on|off".bold());
    println!("  {:<18} choose the voice", "/gender female|male".bold());
    println!("  {:<18} capture one spoken message", "/listen".bold());
    println!("  {:<18} leave", "exit".bold());
    println!();
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    calmconnect_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert_eq!(parse_input("exit"), ReplInput::Exit);
        assert_eq!(parse_input("EXIT"), ReplInput::Exit);
        assert_eq!(parse_input("/quit"), ReplInput::Exit);
        assert_eq!(parse_input(":q"), ReplInput::Exit);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/clear"), ReplInput::Clear);
        assert_eq!(parse_input("/voice on"), ReplInput::Voice(true));
        assert_eq!(parse_input("/voice off"), ReplInput::Voice(false));
        assert_eq!(parse_input("/input on"), ReplInput::VoiceInput(true));
        assert_eq!(parse_input("/input off"), ReplInput::VoiceInput(false));
        assert_eq!(
            parse_input("/gender male"),
            ReplInput::Gender(VoiceGender::Male)
        );
        assert_eq!(
            parse_input("/gender female"),
            ReplInput::Gender(VoiceGender::Female)
        );
        assert_eq!(parse_input("/listen"), ReplInput::Listen);
        assert_eq!(parse_input("/help"), ReplInput::Help);
    }

    #[test]
    fn bad_slash_commands_are_unknown() {
        assert_eq!(parse_input("/voice"), ReplInput::Unknown("/voice"));
        assert_eq!(parse_input("/voice maybe"), ReplInput::Unknown("/voice maybe"));
        assert_eq!(parse_input("/input"), ReplInput::Unknown("/input"));
        assert_eq!(parse_input("/gender"), ReplInput::Unknown("/gender"));
        assert_eq!(parse_input("/nope"), ReplInput::Unknown("/nope"));
    }

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse_input("hello there"), ReplInput::Message("hello there"));
        assert_eq!(parse_input("how are you?"), ReplInput::Message("how are you?"));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".calmconnect"));
        assert!(path.to_string_lossy().contains("cli_history"));
    }
}
