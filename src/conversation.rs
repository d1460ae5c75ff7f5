//! Conversation controller.
//!
//! Owns everything the chat view renders: the message list, the input box,
//! the loading and warmup flags, and the backend session id. It is split
//! into synchronous state transitions (`begin_send` / `complete_send`) so a
//! UI runtime can await the network call in its own task, plus an async
//! [`Conversation::send`] helper that drives both halves against any
//! [`ChatBackend`].

use crate::api::{ApiResult, ChatBackend, ChatReply, ChatRequest};
use crate::types::{Message, Role};
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Delay before focus returns to the input after a send settles.
pub const REFOCUS_DELAY: Duration = Duration::from_millis(100);

pub const SUGGESTIONS: [&str; 3] = [
    "Tell me about your experience",
    "What tech stack do you use?",
    "What projects have you worked on?",
];

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour padding:zero]:[minute padding:zero]");

/// A send that passed the gate and is waiting on the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSend {
    pub request: ChatRequest,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    input: String,
    is_loading: bool,
    session_id: Option<String>,
    warmup_done: bool,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn warmup_done(&self) -> bool {
        self.warmup_done
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn finish_warmup(&mut self) {
        self.warmup_done = true;
    }

    /// Whether a send with `text` would pass the gate.
    pub fn can_send(&self, text: &str) -> bool {
        self.warmup_done && !self.is_loading && !text.trim().is_empty()
    }

    /// Whether the send button for the current input should be enabled.
    pub fn can_submit_input(&self) -> bool {
        self.can_send(&self.input)
    }

    /// Whether suggestion chips accept clicks.
    pub fn accepts_suggestions(&self) -> bool {
        self.warmup_done && !self.is_loading
    }

    /// Gate a send and apply its optimistic half: append the user message,
    /// clear the input and raise the loading flag. Returns `None` (and
    /// changes nothing) when the send is rejected.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if !self.can_send(text) {
            return None;
        }

        self.push_message(Role::User, text.to_string());
        self.input.clear();
        self.is_loading = true;

        Some(PendingSend {
            request: ChatRequest {
                message: text.to_string(),
                session_id: self.session_id.clone(),
            },
        })
    }

    /// Send whatever is in the input box.
    pub fn submit_input(&mut self) -> Option<PendingSend> {
        let text = self.input.clone();
        self.begin_send(&text)
    }

    /// Enter without Shift submits once warmup is done. The flag says whether
    /// the key press was consumed; the send itself may still be rejected.
    pub fn submit_on_enter(&mut self, shift_held: bool) -> (bool, Option<PendingSend>) {
        if shift_held || !self.warmup_done {
            return (false, None);
        }
        (true, self.submit_input())
    }

    /// Apply the network result of a send started with [`begin_send`].
    ///
    /// [`begin_send`]: Conversation::begin_send
    pub fn complete_send(&mut self, result: ApiResult<ChatReply>) {
        match result {
            Ok(reply) => {
                if self.session_id.is_none() {
                    tracing::info!(session_id = %reply.session_id, "chat session established");
                    self.session_id = Some(reply.session_id);
                }
                self.push_message(Role::Assistant, reply.response);
            }
            Err(err) => {
                tracing::warn!("chat request failed: {}", err);
                self.push_message(Role::Assistant, FALLBACK_REPLY.to_string());
            }
        }
        self.is_loading = false;
    }

    /// Gate, send and settle in one call. Returns whether a request was made.
    pub async fn send<B>(&mut self, backend: &B, text: &str) -> bool
    where
        B: ChatBackend + ?Sized,
    {
        let Some(pending) = self.begin_send(text) else {
            return false;
        };
        let result = backend.chat(&pending.request).await;
        self.complete_send(result);
        true
    }

    fn push_message(&mut self, role: Role, content: String) {
        self.next_id += 1;
        self.messages.push(Message {
            id: format!("msg-{}", self.next_id),
            role,
            content,
            timestamp: OffsetDateTime::now_utc(),
        });
    }
}

/// Fire the readiness probe. Failures are logged and otherwise ignored; the
/// caller flips `warmup_done` once this returns, whatever the outcome.
pub async fn warm_up<B>(backend: &B)
where
    B: ChatBackend + ?Sized,
{
    match backend.health().await {
        Ok(()) => tracing::info!("twin backend warmed up"),
        Err(err) => tracing::warn!("warm-up failed: {}", err),
    }
}

/// Wait out [`REFOCUS_DELAY`] on the timer the platform provides.
#[cfg(not(target_arch = "wasm32"))]
pub async fn refocus_pause() {
    tokio::time::sleep(REFOCUS_DELAY).await;
}

#[cfg(target_arch = "wasm32")]
pub async fn refocus_pause() {
    gloo_timers::future::sleep(REFOCUS_DELAY).await;
}

/// Local `HH:MM` label for a message bubble.
pub fn format_message_time(timestamp: OffsetDateTime) -> Option<String> {
    let mut datetime = timestamp;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedBackend {
        healthy: bool,
        replies: Mutex<VecDeque<ApiResult<ChatReply>>>,
        requests: Mutex<Vec<ChatRequest>>,
        health_calls: Mutex<usize>,
    }

    impl ScriptedBackend {
        fn replying(replies: Vec<ApiResult<ChatReply>>) -> Self {
            Self {
                healthy: true,
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn health(&self) -> ApiResult<()> {
            *self.health_calls.lock().unwrap() += 1;
            if self.healthy {
                Ok(())
            } else {
                Err(ApiError::Decode(
                    serde_json::from_str::<()>("not json").unwrap_err(),
                ))
            }
        }

        async fn chat(&self, request: &ChatRequest) -> ApiResult<ChatReply> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected chat request")
        }
    }

    fn reply(session_id: &str, response: &str) -> ApiResult<ChatReply> {
        Ok(ChatReply {
            session_id: session_id.to_string(),
            response: response.to_string(),
        })
    }

    fn failure() -> ApiResult<ChatReply> {
        Err(ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        })
    }

    fn ready() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.finish_warmup();
        conversation
    }

    #[tokio::test]
    async fn rejects_send_before_warmup() {
        let backend = ScriptedBackend::replying(vec![]);
        let mut conversation = Conversation::new();
        conversation.set_input("hello");
        let before = conversation.clone();

        assert!(!conversation.send(&backend, "hello").await);
        assert_eq!(conversation, before);
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn rejects_blank_text() {
        let backend = ScriptedBackend::replying(vec![]);
        let mut conversation = ready();

        assert!(!conversation.send(&backend, "").await);
        assert!(!conversation.send(&backend, "  \n\t ").await);
        assert!(conversation.messages().is_empty());
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn rejects_send_while_in_flight() {
        let mut conversation = ready();
        assert!(conversation.begin_send("first").is_some());
        let before = conversation.clone();

        assert!(conversation.begin_send("second").is_none());
        assert_eq!(conversation, before);
        assert_eq!(conversation.messages().len(), 1);
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_assistant() {
        let backend = ScriptedBackend::replying(vec![reply("abc", "Hi there")]);
        let mut conversation = ready();

        assert!(conversation.send(&backend, "  Hello twin ").await);

        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "  Hello twin ");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Hi there");
        assert_ne!(messages[0].id, messages[1].id);
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn session_is_set_once_and_reused() {
        let backend = ScriptedBackend::replying(vec![
            reply("abc", "one"),
            reply("xyz", "two"),
            reply("xyz", "three"),
        ]);
        let mut conversation = ready();

        conversation.send(&backend, "first").await;
        assert_eq!(conversation.session_id(), Some("abc"));
        conversation.send(&backend, "second").await;
        conversation.send(&backend, "third").await;
        assert_eq!(conversation.session_id(), Some("abc"));

        let sessions: Vec<_> = backend
            .requests()
            .into_iter()
            .map(|request| request.session_id)
            .collect();
        assert_eq!(
            sessions,
            vec![None, Some("abc".to_string()), Some("abc".to_string())]
        );
    }

    #[tokio::test]
    async fn failure_appends_fallback_and_keeps_session() {
        let backend = ScriptedBackend::replying(vec![reply("abc", "ok"), failure()]);
        let mut conversation = ready();

        conversation.send(&backend, "first").await;
        conversation.send(&backend, "second").await;

        let messages = conversation.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].content, "second");
        assert_eq!(messages[3].role, Role::Assistant);
        assert_eq!(messages[3].content, FALLBACK_REPLY);
        assert_eq!(conversation.session_id(), Some("abc"));
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn failure_before_any_session_leaves_it_empty() {
        let backend = ScriptedBackend::replying(vec![failure()]);
        let mut conversation = ready();

        conversation.send(&backend, "hello").await;
        assert_eq!(conversation.session_id(), None);
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[0].content, "hello");
    }

    #[test]
    fn suggestion_scenario_walkthrough() {
        let mut conversation = ready();
        conversation.set_input("draft");

        let pending = conversation
            .begin_send(SUGGESTIONS[0])
            .expect("send accepted");
        assert_eq!(pending.request.message, "Tell me about your experience");
        assert_eq!(pending.request.session_id, None);
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].content, "Tell me about your experience");
        assert!(conversation.is_loading());
        assert!(!conversation.accepts_suggestions());
        assert_eq!(conversation.input(), "");

        conversation.complete_send(reply("abc", "I have 5 years..."));
        assert_eq!(conversation.session_id(), Some("abc"));
        assert_eq!(conversation.messages()[1].content, "I have 5 years...");
        assert!(!conversation.is_loading());
    }

    #[test]
    fn enter_submits_only_without_shift_after_warmup() {
        let mut conversation = Conversation::new();
        conversation.set_input("hello");

        assert_eq!(conversation.submit_on_enter(false), (false, None));
        assert!(conversation.messages().is_empty());

        conversation.finish_warmup();
        assert_eq!(conversation.submit_on_enter(true), (false, None));

        let (consumed, pending) = conversation.submit_on_enter(false);
        assert!(consumed);
        assert_eq!(pending.map(|p| p.request.message), Some("hello".to_string()));
        assert_eq!(conversation.input(), "");
    }

    #[test]
    fn send_button_state_tracks_input() {
        let mut conversation = ready();
        assert!(!conversation.can_submit_input());
        conversation.set_input("   ");
        assert!(!conversation.can_submit_input());
        conversation.set_input("hi");
        assert!(conversation.can_submit_input());
    }

    #[tokio::test]
    async fn warm_up_tolerates_failure() {
        let backend = ScriptedBackend::default();
        let mut conversation = Conversation::new();

        warm_up(&backend).await;
        conversation.finish_warmup();

        assert_eq!(*backend.health_calls.lock().unwrap(), 1);
        assert!(conversation.warmup_done());
    }

    #[test]
    fn formats_time_as_hours_and_minutes() {
        let timestamp = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let label = format_message_time(timestamp).unwrap();
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }

    #[tokio::test]
    async fn refocus_pause_waits_the_full_delay() {
        let started = std::time::Instant::now();
        refocus_pause().await;
        assert!(started.elapsed() >= REFOCUS_DELAY);
    }

    #[test]
    fn messages_are_stamped_with_the_current_time() {
        let before = OffsetDateTime::now_utc();
        let mut conversation = Conversation::new();
        conversation.finish_warmup();
        conversation.begin_send("hi");
        let stamped = conversation.messages()[0].timestamp;
        assert!(stamped >= before);
        assert!(stamped <= OffsetDateTime::now_utc());
    }
}
