//! The conversation session — one turn at a time, transcript and memory
//! kept consistent.
//!
//! State machine: `Idle → (submit) → AwaitingModel → (reply resolved,
//! success or fallback) → Idle`. `clear` forces any state back to `Idle`
//! with an empty transcript. There is no retry state anywhere: a failed
//! model call resolves the same turn with the fallback reply.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use calmconnect_core::memory::{MemoryStore, MEMORY_KEY};
use calmconnect_core::types::{ChatMessage, Transcript, VoiceGender};
use calmconnect_providers::listen::{ListenOutcome, VoiceInput};
use calmconnect_providers::traits::ChatModel;
use calmconnect_providers::voice::VoiceOutput;

use crate::prompt;
use crate::surface::{ListenFailure, Notice, RenderSurface};

/// Substituted for a genuine reply when the model backend fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, but I couldn't process your request. Please try again.";

// ─────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────

/// Per-session toggles. Not persisted — the transcript is the only durable
/// state.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionSettings {
    pub voice_enabled: bool,
    pub voice_gender: VoiceGender,
    pub voice_input_enabled: bool,
}

// ─────────────────────────────────────────────
// ConversationSession
// ─────────────────────────────────────────────

/// Owns the transcript, mediates one in-flight exchange, and coordinates
/// the model, voice, and memory collaborators.
pub struct ConversationSession {
    transcript: Mutex<Transcript>,
    /// True exactly while a model call is outstanding. Checked-and-set
    /// atomically at the entry of `submit` so a re-entrant duplicate
    /// dispatch is a silent no-op.
    pending: AtomicBool,
    /// Bumped by `clear` so a turn that was in flight when the transcript
    /// was cleared drops its reply instead of appending it unpaired.
    epoch: AtomicU64,
    settings: Mutex<SessionSettings>,
    model: Arc<dyn ChatModel>,
    store: Arc<dyn MemoryStore>,
    surface: Arc<dyn RenderSurface>,
    voice: Option<Arc<dyn VoiceOutput>>,
    voice_input: Option<Arc<dyn VoiceInput>>,
    persona: String,
    context_window: usize,
}

impl ConversationSession {
    /// Create a session hydrated from the store.
    ///
    /// A missing or unreadable record is valid initial state (empty
    /// transcript), never an error.
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: Arc<dyn MemoryStore>,
        surface: Arc<dyn RenderSurface>,
        persona: impl Into<String>,
        context_window: usize,
        settings: SessionSettings,
    ) -> Self {
        let transcript = store.load(MEMORY_KEY);
        info!(messages = transcript.len(), "session hydrated");
        surface.show_transcript(&transcript);

        Self {
            transcript: Mutex::new(transcript),
            pending: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            settings: Mutex::new(settings),
            model,
            store,
            surface,
            voice: None,
            voice_input: None,
            persona: persona.into(),
            context_window,
        }
    }

    /// Attach a speech-synthesis backend (builder pattern).
    pub fn with_voice(mut self, voice: Arc<dyn VoiceOutput>) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Attach a speech-capture backend (builder pattern).
    pub fn with_voice_input(mut self, input: Arc<dyn VoiceInput>) -> Self {
        self.voice_input = Some(input);
        self
    }

    // ────────────── Turn processing ──────────────

    /// Drive one conversational turn to completion.
    ///
    /// Silently a no-op (returns `None`) when the text trims to empty or a
    /// turn is already in flight. Otherwise the user message is committed
    /// and persisted before any blocking call, so a crash mid-model-call
    /// never loses it; the turn always completes — a backend failure
    /// resolves to [`FALLBACK_REPLY`] rather than an error.
    pub async fn submit(&self, text: &str) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.pending.swap(true, Ordering::SeqCst) {
            debug!("duplicate submission while a turn is in flight, ignoring");
            return None;
        }

        // Commit the user message first, then build the windowed prompt.
        // The epoch is read under the same lock: any clear after this point
        // is ordered after our append and will bump it.
        let (prompt, epoch) = {
            let mut transcript = self.transcript.lock().unwrap();
            transcript.push(ChatMessage::user(text));
            self.persist(&transcript);
            self.surface.show_transcript(&transcript);
            (
                prompt::build_prompt(&self.persona, transcript.window(self.context_window), text),
                self.epoch.load(Ordering::SeqCst),
            )
        };

        self.surface.set_thinking(true);

        let surface = Arc::clone(&self.surface);
        let mut on_fragment = move |fragment: &str| surface.fragment(fragment);
        let reply = match self.model.generate(&prompt, &mut on_fragment).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "model call failed, substituting fallback reply");
                self.surface.notice(&Notice::ModelFailed(e.to_string()));
                FALLBACK_REPLY.to_string()
            }
        };

        self.surface.set_thinking(false);

        // Voice is fire-and-forget: a failure is a notice, never a rollback.
        let settings = self.settings();
        if settings.voice_enabled {
            if let Some(voice) = &self.voice {
                if let Err(e) = voice.speak(&reply, settings.voice_gender).await {
                    warn!(backend = voice.display_name(), error = %e, "voice output failed");
                    self.surface.notice(&Notice::VoiceFailed(e.to_string()));
                }
            }
        }

        // Commit the assistant reply and release the turn. If the
        // transcript was cleared while the model call was outstanding, the
        // reply belongs to a conversation that no longer exists: drop it,
        // and leave `pending` alone — the clear already reset it, and a
        // newer turn may own it by now.
        let message = ChatMessage::assistant(reply);
        {
            let mut transcript = self.transcript.lock().unwrap();
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!("transcript cleared mid-turn, dropping stale reply");
                return None;
            }
            transcript.push(message.clone());
            self.persist(&transcript);
            self.surface.show_transcript(&transcript);
        }
        self.pending.store(false, Ordering::SeqCst);

        Some(message)
    }

    /// Reset the transcript to empty and persist the empty record.
    ///
    /// `pending` is force-reset: clearing is allowed from any state. A turn
    /// whose model call is still outstanding notices the cleared transcript
    /// when it resolves and drops its reply.
    pub fn clear(&self) {
        let mut transcript = self.transcript.lock().unwrap();
        transcript.clear();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.persist(&transcript);
        self.surface.show_transcript(&transcript);
        self.pending.store(false, Ordering::SeqCst);
        info!("chat history cleared");
    }

    /// Capture one utterance of user speech, if voice input is enabled and
    /// a backend is attached.
    ///
    /// All three failure kinds are reported distinctly but mean the same
    /// thing here: no text, no transcript mutation.
    pub async fn listen(&self, timeout_secs: u64) -> Option<String> {
        if !self.settings().voice_input_enabled {
            debug!("voice input disabled, ignoring listen request");
            return None;
        }
        let input = self.voice_input.as_ref()?;

        match input.listen(timeout_secs).await {
            ListenOutcome::Heard(text) => Some(text),
            ListenOutcome::Unintelligible => {
                self.surface
                    .notice(&Notice::ListenFailed(ListenFailure::Unintelligible));
                None
            }
            ListenOutcome::ServiceUnavailable => {
                self.surface
                    .notice(&Notice::ListenFailed(ListenFailure::ServiceUnavailable));
                None
            }
            ListenOutcome::NoSpeech => {
                self.surface
                    .notice(&Notice::ListenFailed(ListenFailure::NoSpeech));
                None
            }
        }
    }

    // ────────────── Accessors ──────────────

    /// Snapshot of the current transcript.
    pub fn transcript(&self) -> Transcript {
        self.transcript.lock().unwrap().clone()
    }

    /// Whether a turn is currently in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> SessionSettings {
        *self.settings.lock().unwrap()
    }

    pub fn set_voice_enabled(&self, enabled: bool) {
        self.settings.lock().unwrap().voice_enabled = enabled;
    }

    pub fn set_voice_gender(&self, gender: VoiceGender) {
        self.settings.lock().unwrap().voice_gender = gender;
    }

    pub fn set_voice_input_enabled(&self, enabled: bool) {
        self.settings.lock().unwrap().voice_input_enabled = enabled;
    }

    // ────────────── Internal ──────────────

    /// Persist after a mutation. A save failure is reported and the
    /// in-memory transcript stays authoritative.
    fn persist(&self, transcript: &Transcript) {
        if let Err(e) = self.store.save(MEMORY_KEY, transcript) {
            warn!(error = %e, "failed to persist transcript, continuing in memory");
            self.surface.notice(&Notice::StoreFailed(e.to_string()));
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calmconnect_core::types::Role;
    use std::time::Duration;
    use tokio::sync::Notify;

    // ── Stub collaborators ──

    /// Model that returns a canned reply, optionally failing, optionally
    /// parking until a gate opens (to hold a turn in flight).
    struct StubModel {
        reply: Result<String, String>,
        fragments: Vec<String>,
        gate: Option<Arc<Notify>>,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                fragments: Vec::new(),
                gate: None,
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                fragments: Vec::new(),
                gate: None,
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn streaming(fragments: &[&str]) -> Self {
            Self {
                reply: Ok(fragments.concat()),
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
                gate: None,
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn gated(text: &str, gate: Arc<Notify>) -> Self {
            Self {
                reply: Ok(text.to_string()),
                fragments: Vec::new(),
                gate: Some(gate),
                seen_prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn generate(
            &self,
            prompt: &str,
            on_fragment: &mut (dyn for<'a> FnMut(&'a str) + Send),
        ) -> anyhow::Result<String> {
            self.seen_prompts.lock().unwrap().push(prompt.to_string());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            for fragment in &self.fragments {
                on_fragment(fragment);
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow::anyhow!("{message}")),
            }
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        fn display_name(&self) -> &str {
            "Stub"
        }
    }

    /// In-memory store with an optional save-failure switch.
    #[derive(Default)]
    struct StubStore {
        record: Mutex<Option<Transcript>>,
        fail_saves: AtomicBool,
    }

    impl MemoryStore for StubStore {
        fn load(&self, _key: &str) -> Transcript {
            self.record.lock().unwrap().clone().unwrap_or_default()
        }

        fn save(&self, _key: &str, transcript: &Transcript) -> anyhow::Result<()> {
            if self.fail_saves.load(Ordering::SeqCst) {
                anyhow::bail!("disk full");
            }
            *self.record.lock().unwrap() = Some(transcript.clone());
            Ok(())
        }
    }

    /// Surface that records everything it is told.
    #[derive(Default)]
    struct RecordingSurface {
        notices: Mutex<Vec<Notice>>,
        fragments: Mutex<Vec<String>>,
        thinking: Mutex<Vec<bool>>,
    }

    impl RenderSurface for RecordingSurface {
        fn show_transcript(&self, _transcript: &Transcript) {}
        fn set_thinking(&self, active: bool) {
            self.thinking.lock().unwrap().push(active);
        }
        fn fragment(&self, text: &str) {
            self.fragments.lock().unwrap().push(text.to_string());
        }
        fn notice(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.clone());
        }
    }

    struct FailingVoice;

    #[async_trait]
    impl VoiceOutput for FailingVoice {
        async fn speak(&self, _text: &str, _gender: VoiceGender) -> anyhow::Result<()> {
            anyhow::bail!("no engine")
        }
        fn display_name(&self) -> &str {
            "FailingVoice"
        }
    }

    struct StubInput {
        outcome: ListenOutcome,
    }

    #[async_trait]
    impl VoiceInput for StubInput {
        async fn listen(&self, _timeout_secs: u64) -> ListenOutcome {
            self.outcome.clone()
        }
    }

    const PERSONA: &str = "You are Nia, a warm and supportive companion.";

    fn make_session(
        model: Arc<StubModel>,
        store: Arc<StubStore>,
        surface: Arc<RecordingSurface>,
    ) -> ConversationSession {
        ConversationSession::new(
            model,
            store,
            surface,
            PERSONA,
            8,
            SessionSettings::default(),
        )
    }

    // ── Initialization ──

    #[test]
    fn test_empty_store_hydrates_empty() {
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        );

        assert!(session.transcript().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_hydrates_prior_history() {
        let store = Arc::new(StubStore::default());
        let mut prior = Transcript::new();
        prior.push(ChatMessage::user("earlier"));
        prior.push(ChatMessage::assistant("indeed"));
        store.save(MEMORY_KEY, &prior).unwrap();

        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            store,
            Arc::new(RecordingSurface::default()),
        );

        assert_eq!(session.transcript().len(), 2);
    }

    // ── The basic turn ──

    #[tokio::test]
    async fn test_turn_appends_exactly_two_messages() {
        let store = Arc::new(StubStore::default());
        let session = make_session(
            Arc::new(StubModel::replying("Hello!")),
            store.clone(),
            Arc::new(RecordingSurface::default()),
        );

        let reply = session.submit("Hi").await.unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.text, "Hello!");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.messages()[0].text, "Hi");
        assert_eq!(transcript.messages()[1].role, Role::Assistant);
        assert_eq!(transcript.messages()[1].text, "Hello!");

        // The store holds the same transcript
        assert_eq!(store.load(MEMORY_KEY), transcript);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_input_is_a_noop() {
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        );

        assert!(session.submit("").await.is_none());
        assert!(session.submit("   \n\t ").await.is_none());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_input_is_trimmed_before_append() {
        let session = make_session(
            Arc::new(StubModel::replying("ok")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        );

        session.submit("  hello  ").await.unwrap();
        assert_eq!(session.transcript().messages()[0].text, "hello");
    }

    // ── Duplicate-submission guard ──

    #[tokio::test]
    async fn test_submit_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let model = Arc::new(StubModel::gated("Hello!", gate.clone()));
        let store = Arc::new(StubStore::default());
        let session = Arc::new(make_session(
            model,
            store,
            Arc::new(RecordingSurface::default()),
        ));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit("first").await })
        };

        // Wait for the first turn to park inside the model call
        while !session.is_pending() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        // Re-entrant dispatch: silently dropped, transcript untouched
        assert!(session.submit("duplicate").await.is_none());
        assert_eq!(session.transcript().len(), 1);

        gate.notify_one();
        let reply = first.await.unwrap().unwrap();
        assert_eq!(reply.text, "Hello!");
        assert_eq!(session.transcript().len(), 2);
        assert!(!session.is_pending());
    }

    // ── Model failure → fallback ──

    #[tokio::test]
    async fn test_model_failure_substitutes_fallback() {
        let surface = Arc::new(RecordingSurface::default());
        let store = Arc::new(StubStore::default());
        let session = make_session(
            Arc::new(StubModel::failing("connection refused")),
            store.clone(),
            surface.clone(),
        );

        let reply = session.submit("Hi").await.unwrap();

        assert_eq!(reply.text, FALLBACK_REPLY);
        // The turn still completes: +2 messages, persisted, idle again
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[1].text, FALLBACK_REPLY);
        assert_eq!(store.load(MEMORY_KEY), transcript);
        assert!(!session.is_pending());

        let notices = surface.notices.lock().unwrap();
        assert!(matches!(notices[0], Notice::ModelFailed(_)));
    }

    // ── Voice failure is non-fatal ──

    #[tokio::test]
    async fn test_voice_failure_does_not_roll_back_the_turn() {
        let surface = Arc::new(RecordingSurface::default());
        let session = make_session(
            Arc::new(StubModel::replying("Hello!")),
            Arc::new(StubStore::default()),
            surface.clone(),
        )
        .with_voice(Arc::new(FailingVoice));
        session.set_voice_enabled(true);

        let reply = session.submit("Hi").await.unwrap();

        assert_eq!(reply.text, "Hello!");
        assert_eq!(session.transcript().len(), 2);

        let notices = surface.notices.lock().unwrap();
        assert!(matches!(notices[0], Notice::VoiceFailed(_)));
    }

    #[tokio::test]
    async fn test_voice_disabled_skips_speaker() {
        // FailingVoice attached but disabled: no notice should appear
        let surface = Arc::new(RecordingSurface::default());
        let session = make_session(
            Arc::new(StubModel::replying("Hello!")),
            Arc::new(StubStore::default()),
            surface.clone(),
        )
        .with_voice(Arc::new(FailingVoice));

        session.submit("Hi").await.unwrap();
        assert!(surface.notices.lock().unwrap().is_empty());
    }

    // ── Store failure is non-fatal ──

    #[tokio::test]
    async fn test_store_failure_keeps_session_in_memory() {
        let surface = Arc::new(RecordingSurface::default());
        let store = Arc::new(StubStore::default());
        store.fail_saves.store(true, Ordering::SeqCst);

        let session = make_session(
            Arc::new(StubModel::replying("Hello!")),
            store,
            surface.clone(),
        );

        let reply = session.submit("Hi").await.unwrap();

        assert_eq!(reply.text, "Hello!");
        assert_eq!(session.transcript().len(), 2);

        let notices = surface.notices.lock().unwrap();
        assert!(notices
            .iter()
            .any(|n| matches!(n, Notice::StoreFailed(_))));
    }

    // ── Clear ──

    #[tokio::test]
    async fn test_clear_resets_transcript_and_store() {
        let store = Arc::new(StubStore::default());
        let session = make_session(
            Arc::new(StubModel::replying("Hello!")),
            store.clone(),
            Arc::new(RecordingSurface::default()),
        );

        session.submit("Hi").await.unwrap();
        session.submit("More").await.unwrap();
        assert_eq!(session.transcript().len(), 4);

        session.clear();

        assert_eq!(session.transcript().len(), 0);
        assert!(!session.is_pending());
        assert!(store.load(MEMORY_KEY).is_empty());
    }

    #[tokio::test]
    async fn test_clear_mid_turn_drops_the_stale_reply() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(StubStore::default());
        let session = Arc::new(make_session(
            Arc::new(StubModel::gated("too late", gate.clone())),
            store.clone(),
            Arc::new(RecordingSurface::default()),
        ));

        let turn = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit("question").await })
        };
        while !session.is_pending() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        session.clear();

        // The in-flight turn resolves against a cleared transcript:
        // its reply is dropped, nothing unpaired appears anywhere.
        gate.notify_one();
        assert!(turn.await.unwrap().is_none());
        assert!(session.transcript().is_empty());
        assert!(store.load(MEMORY_KEY).is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_clear_on_fresh_session_is_fine() {
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        );
        session.clear();
        assert!(session.transcript().is_empty());
    }

    // ── Context window ──

    #[tokio::test]
    async fn test_prompt_carries_only_the_window() {
        let store = Arc::new(StubStore::default());
        let mut prior = Transcript::new();
        for i in 0..20 {
            prior.push(ChatMessage::user(format!("msg {i}")));
        }
        store.save(MEMORY_KEY, &prior).unwrap();

        let model = Arc::new(StubModel::replying("ok"));
        let session = make_session(model.clone(), store, Arc::new(RecordingSurface::default()));

        session.submit("the new question").await.unwrap();

        let prompts = model.seen_prompts.lock().unwrap();
        let prompt = &prompts[0];
        // Window of 8 over 21 messages (20 prior + the new user message)
        assert!(prompt.contains("msg 19"));
        assert!(prompt.contains("msg 13"));
        assert!(!prompt.contains("msg 12"));
        assert!(prompt.contains("User: the new question"));
        assert!(prompt.starts_with(PERSONA));
    }

    // ── Streaming fragments ──

    #[tokio::test]
    async fn test_fragments_reach_the_surface_in_order() {
        let surface = Arc::new(RecordingSurface::default());
        let session = make_session(
            Arc::new(StubModel::streaming(&["Hel", "lo", "!"])),
            Arc::new(StubStore::default()),
            surface.clone(),
        );

        let reply = session.submit("Hi").await.unwrap();

        assert_eq!(reply.text, "Hello!");
        assert_eq!(
            *surface.fragments.lock().unwrap(),
            vec!["Hel".to_string(), "lo".to_string(), "!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_thinking_indicator_toggles_around_the_model_call() {
        let surface = Arc::new(RecordingSurface::default());
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            surface.clone(),
        );

        session.submit("Hi").await.unwrap();
        assert_eq!(*surface.thinking.lock().unwrap(), vec![true, false]);
    }

    // ── Voice input ──

    #[tokio::test]
    async fn test_listen_heard_returns_text() {
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        )
        .with_voice_input(Arc::new(StubInput {
            outcome: ListenOutcome::Heard("spoken words".into()),
        }));
        session.set_voice_input_enabled(true);

        assert_eq!(session.listen(4).await.as_deref(), Some("spoken words"));
    }

    #[tokio::test]
    async fn test_listen_ignored_while_input_disabled() {
        // Backend attached and ready, but the toggle is off
        let surface = Arc::new(RecordingSurface::default());
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            surface.clone(),
        )
        .with_voice_input(Arc::new(StubInput {
            outcome: ListenOutcome::Heard("should not surface".into()),
        }));

        assert!(session.listen(4).await.is_none());
        assert!(surface.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listen_failures_are_distinct_notices() {
        for (outcome, failure) in [
            (ListenOutcome::Unintelligible, ListenFailure::Unintelligible),
            (
                ListenOutcome::ServiceUnavailable,
                ListenFailure::ServiceUnavailable,
            ),
            (ListenOutcome::NoSpeech, ListenFailure::NoSpeech),
        ] {
            let surface = Arc::new(RecordingSurface::default());
            let session = make_session(
                Arc::new(StubModel::replying("hi")),
                Arc::new(StubStore::default()),
                surface.clone(),
            )
            .with_voice_input(Arc::new(StubInput { outcome }));
            session.set_voice_input_enabled(true);

            assert!(session.listen(4).await.is_none());
            // No transcript mutation on any listen failure
            assert!(session.transcript().is_empty());
            assert_eq!(
                *surface.notices.lock().unwrap(),
                vec![Notice::ListenFailed(failure)]
            );
        }
    }

    #[tokio::test]
    async fn test_listen_without_backend_is_none() {
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        );
        session.set_voice_input_enabled(true);
        assert!(session.listen(4).await.is_none());
    }

    // ── Settings ──

    #[test]
    fn test_settings_toggles() {
        let session = make_session(
            Arc::new(StubModel::replying("hi")),
            Arc::new(StubStore::default()),
            Arc::new(RecordingSurface::default()),
        );

        assert!(!session.settings().voice_enabled);
        session.set_voice_enabled(true);
        session.set_voice_gender(VoiceGender::Male);
        session.set_voice_input_enabled(true);

        let settings = session.settings();
        assert!(settings.voice_enabled);
        assert_eq!(settings.voice_gender, VoiceGender::Male);
        assert!(settings.voice_input_enabled);
    }
}
