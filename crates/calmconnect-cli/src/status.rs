//! `calmconnect status` — show configuration, memory, and voice status.

use anyhow::{Context, Result};
use colored::Colorize;

use calmconnect_core::config::load_config;
use calmconnect_core::memory::{FileStore, MemoryStore, MEMORY_KEY};
use calmconnect_core::utils::get_data_path;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let data_dir = get_data_path();
    let config_path = data_dir.join("config.json");

    println!();
    println!("{}", "🌿 CalmConnect Status".cyan().bold());
    println!();

    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".dimmed().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), config.chat.model);
    println!("  {:<18} {}", "API base:".bold(), config.chat.api_base);
    println!(
        "  {:<18} {}",
        "Context window:".bold(),
        config.chat.context_window
    );

    // Memory
    let store = FileStore::new(None).context("failed to open memory store")?;
    let transcript = store.load(MEMORY_KEY);
    println!(
        "  {:<18} {} saved message{}",
        "Memory:".bold(),
        transcript.len(),
        if transcript.len() == 1 { "" } else { "s" }
    );

    // Voice
    println!();
    println!("  {}", "Voice:".bold());
    println!(
        "    {:<16} {}",
        "Output:",
        if config.voice.enabled {
            format!("{} ({})", "on".green(), config.voice.gender)
        } else {
            "off".dimmed().to_string()
        }
    );
    println!(
        "    {:<16} {}",
        "Input:",
        if config.voice.input_enabled {
            "on".green().to_string()
        } else {
            "off".dimmed().to_string()
        }
    );
    println!(
        "    {:<16} {}",
        "ElevenLabs key:",
        key_status(&config.voice.elevenlabs_api_key)
    );
    println!(
        "    {:<16} {}",
        "Groq key:",
        key_status(&config.voice.groq_api_key)
    );

    println!();

    Ok(())
}

fn key_status(key: &str) -> String {
    if key.is_empty() {
        format!("{}", "· not configured".dimmed())
    } else {
        format!("{} (key set)", "✓".green())
    }
}
