//! Config loader — reads `~/.calmconnect/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.calmconnect/config.json`
//! 3. Environment variables `ELEVENLABS_API_KEY` / `GROQ_API_KEY` for secrets

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed — a missing config is valid initial state.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    let config = if config_path.exists() {
        debug!("loading config from {}", config_path.display());
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(c) => c,
                Err(e) => {
                    warn!("failed to parse config JSON: {e}");
                    Config::default()
                }
            },
            Err(e) => {
                warn!("failed to read config file {}: {e}", config_path.display());
                Config::default()
            }
        }
    } else {
        info!(
            "no config file found at {}, using defaults",
            config_path.display()
        );
        Config::default()
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(&config_path, json)?;
    debug!("config saved to {}", config_path.display());
    Ok(())
}

/// API keys from the environment override whatever the file carries.
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(key) = std::env::var("ELEVENLABS_API_KEY") {
        if !key.is_empty() {
            config.voice.elevenlabs_api_key = key;
        }
    }
    if let Ok(key) = std::env::var("GROQ_API_KEY") {
        if !key.is_empty() {
            config.voice.groq_api_key = key;
        }
    }
    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
