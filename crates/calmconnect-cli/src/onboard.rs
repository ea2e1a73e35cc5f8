//! `calmconnect onboard` — initialize configuration and data directories.

use anyhow::Result;
use colored::Colorize;

use calmconnect_core::config::{load_config, save_config};
use calmconnect_core::utils::{get_audio_path, get_data_path, get_memory_path};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🌿 CalmConnect — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    let config_path = data_dir.join("config.json");

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let config = load_config(None); // defaults
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    for (label, dir) in [
        ("memory dir", get_memory_path()),
        ("audio dir", get_audio_path()),
        ("audio inbox", data_dir.join("inbox")),
        ("history dir", data_dir.join("history")),
    ] {
        std::fs::create_dir_all(&dir)?;
        println!("  {} {} at {}", "✓".green(), label, dir.display());
    }

    println!();
    println!(
        "{}",
        "  Setup complete! Run `calmconnect chat` to start talking.".green()
    );
    println!(
        "{}",
        "  Voice needs an ELEVENLABS_API_KEY (and GROQ_API_KEY for input).".dimmed()
    );
    println!();

    Ok(())
}
