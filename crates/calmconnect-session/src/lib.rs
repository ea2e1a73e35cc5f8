//! Conversation state machine for CalmConnect.
//!
//! [`session::ConversationSession`] owns the transcript and drives one
//! exchange at a time against pluggable model, voice, and memory backends.
//! [`surface::RenderSurface`] is the seam a front end implements to observe
//! the session.

pub mod prompt;
pub mod session;
pub mod surface;

pub use session::{ConversationSession, SessionSettings, FALLBACK_REPLY};
pub use surface::{ListenFailure, Notice, NullSurface, RenderSurface};
