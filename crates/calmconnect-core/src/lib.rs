//! CalmConnect core — transcript types, the memory store, and configuration.

pub mod config;
pub mod memory;
pub mod types;
pub mod utils;

pub use memory::{FileStore, MemoryStore, StoreError, MEMORY_KEY};
pub use types::{ChatMessage, Role, Transcript, VoiceGender};
