//! External-collaborator clients for CalmConnect.
//!
//! The conversation session talks to three seams, each a dyn-dispatch async
//! trait so the session can be driven by stubs in tests:
//!
//! - [`traits::ChatModel`] — the model backend ([`ollama::OllamaClient`])
//! - [`voice::VoiceOutput`] — speech synthesis ([`voice::ElevenLabsSpeaker`])
//! - [`listen::VoiceInput`] — speech capture ([`listen::InboxListener`])

pub mod listen;
pub mod ollama;
pub mod traits;
pub mod voice;

pub use listen::{InboxListener, ListenOutcome, VoiceInput};
pub use ollama::OllamaClient;
pub use traits::ChatModel;
pub use voice::{ElevenLabsSpeaker, VoiceOutput};
