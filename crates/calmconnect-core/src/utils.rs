//! Path helpers for the CalmConnect data directory.

use std::path::PathBuf;

/// Get the CalmConnect data directory (e.g. `~/.calmconnect/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".calmconnect")
}

/// Get the transcript store directory (e.g. `~/.calmconnect/memory/`).
pub fn get_memory_path() -> PathBuf {
    get_data_path().join("memory")
}

/// Get the synthesized-audio directory (e.g. `~/.calmconnect/audio/`).
pub fn get_audio_path() -> PathBuf {
    get_data_path().join("audio")
}

/// Sanitize a string for use as a filename.
pub fn safe_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_ends_with_calmconnect() {
        assert!(get_data_path().ends_with(".calmconnect"));
    }

    #[test]
    fn test_memory_path_under_data_dir() {
        let path = get_memory_path();
        assert!(path.ends_with("memory"));
        assert!(path.parent().unwrap().ends_with(".calmconnect"));
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("hello world!"), "hello_world_");
        assert_eq!(safe_filename("messages"), "messages");
        assert_eq!(safe_filename("a/b/c"), "a_b_c");
    }

}
