//! The model-backend seam consumed by the conversation session.

use async_trait::async_trait;

/// A language-model backend that turns a prompt into reply text.
///
/// Synchronous from the caller's perspective even when the backend streams:
/// `generate` resolves to the full joined reply, invoking `on_fragment` for
/// each intermediate piece in arrival order. Fragments are best-effort
/// display material — only the returned reply matters for correctness.
///
/// Replies may be arbitrarily long and arbitrarily slow; callers must treat
/// both as valid. Errors are propagated, not retried.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        on_fragment: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> anyhow::Result<String>;

    /// The model identifier this backend calls.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
