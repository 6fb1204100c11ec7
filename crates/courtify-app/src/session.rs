//! Legal question-and-answer session.
//!
//! A session owns an append-only transcript. `ask` appends the user's turn
//! immediately, waits for the chat service, then appends the assistant's
//! sanitized answer. Asks on one session (and its clones) run one at a time,
//! so every user turn is directly followed by its answer. Observers read
//! snapshots through [`QuerySession::messages`] and are told about changes on
//! the shared [`EventBus`].

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

use courtify_core::defaults;
use courtify_core::{ChatService, CourtifyEvent, EventBus, Message};

/// Greeting shown at the top of a fresh transcript.
pub const GREETING: &str = "Namaste! I am your AI Legal Assistant specializing in Indian Constitutional Law. I can help you understand constitutional provisions, fundamental rights, directive principles, and legal procedures. How may I assist you today?";

pub const GREETING_REFERENCE: &str = "General Constitutional Guidance";

/// Appended when the chat service itself errors.
pub const APOLOGY: &str = "I apologize, but I'm experiencing technical difficulties. Please try again or consult with a qualified legal professional for immediate assistance.";

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seed the transcript with [`GREETING`].
    pub seed_greeting: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed_greeting: defaults::SEED_GREETING,
        }
    }
}

impl SessionConfig {
    /// `COURTIFY_GREETING` (default `true`).
    pub fn from_env() -> Self {
        Self {
            seed_greeting: defaults::env_flag(defaults::ENV_GREETING, defaults::SEED_GREETING),
        }
    }

    pub fn with_greeting(mut self, seed_greeting: bool) -> Self {
        self.seed_greeting = seed_greeting;
        self
    }
}

/// Strip bold markers and trailing whitespace from an answer.
///
/// Leading whitespace and all other formatting are preserved.
pub fn sanitize(text: &str) -> String {
    text.replace("**", "").trim_end().to_string()
}

#[derive(Debug, Default)]
struct Transcript {
    messages: Vec<Message>,
    typing: bool,
}

/// One conversation with the legal assistant.
#[derive(Clone)]
pub struct QuerySession {
    chat: Arc<dyn ChatService>,
    events: EventBus,
    transcript: Arc<RwLock<Transcript>>,
    /// Held from the user append through the assistant append.
    turn: Arc<Mutex<()>>,
}

impl QuerySession {
    pub fn new(chat: Arc<dyn ChatService>, events: EventBus, config: SessionConfig) -> Self {
        let mut transcript = Transcript::default();
        if config.seed_greeting {
            transcript.messages.push(Message::assistant(
                GREETING,
                Some(GREETING_REFERENCE.to_string()),
            ));
        }
        Self {
            chat,
            events,
            transcript: Arc::new(RwLock::new(transcript)),
            turn: Arc::new(Mutex::new(())),
        }
    }

    /// Ask a question and return the assistant's reply.
    ///
    /// Blank input is ignored and returns `None` without touching the transcript.
    /// A second ask waits until the first one's answer has been appended.
    #[instrument(skip(self, text), fields(query_len = text.len()))]
    pub async fn ask(&self, text: &str) -> Option<Message> {
        let question = text.trim();
        if question.is_empty() {
            debug!("Ignoring blank question");
            return None;
        }

        let _turn = self.turn.lock().await;
        self.append(Message::user(question), true).await;

        let reply = match self.chat.chat(question).await {
            Ok(reply) => Message::assistant(sanitize(&reply.content), reply.reference),
            Err(e) => {
                warn!(error = %e, "Chat failed, answering with apology");
                Message::assistant(APOLOGY, None)
            }
        };

        self.append(reply.clone(), false).await;
        Some(reply)
    }

    /// Append a message; `typing` is whether an answer is outstanding afterwards.
    async fn append(&self, message: Message, typing: bool) {
        let (message_id, role) = (message.id, message.role);
        let mut transcript = self.transcript.write().await;
        let was_typing = transcript.typing;
        transcript.messages.push(message);
        transcript.typing = typing;

        self.events
            .emit(CourtifyEvent::MessageAppended { message_id, role });
        if was_typing != typing {
            self.events
                .emit(CourtifyEvent::TypingChanged { is_typing: typing });
        }
    }

    /// Transcript snapshot in append order.
    pub async fn messages(&self) -> Vec<Message> {
        self.transcript.read().await.messages.clone()
    }

    /// Whether an answer is outstanding.
    pub async fn is_typing(&self) -> bool {
        self.transcript.read().await.typing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtify_core::Role;
    use courtify_inference::mock::MockService;

    fn session(mock: MockService, greeting: bool) -> QuerySession {
        QuerySession::new(
            Arc::new(mock),
            EventBus::new(64),
            SessionConfig::default().with_greeting(greeting),
        )
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("**bold** trailing words   "), "bold trailing words");
        assert_eq!(sanitize("  indented\n- item\n\n"), "  indented\n- item");
        assert_eq!(sanitize("*single* stays"), "*single* stays");
        assert_eq!(sanitize(""), "");
    }

    #[tokio::test]
    async fn test_greeting_seeded() {
        let session = session(MockService::new(), true);
        let messages = session.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert!(messages[0].content.starts_with("Namaste!"));
        assert_eq!(messages[0].reference.as_deref(), Some(GREETING_REFERENCE));
    }

    #[tokio::test]
    async fn test_blank_question_ignored() {
        let mock = MockService::new();
        let session = session(mock.clone(), false);
        assert!(session.ask("   \n\t").await.is_none());
        assert!(session.messages().await.is_empty());
        assert_eq!(mock.call_count("chat"), 0);
    }

    #[tokio::test]
    async fn test_ask_appends_user_then_sanitized_answer() {
        let mock = MockService::new().with_reply("**Article 21** protects life.  \n", Some("Article 21"));
        let session = session(mock.clone(), false);

        let reply = session.ask("  What is Article 21?  ").await.unwrap();
        assert_eq!(reply.content, "Article 21 protects life.");

        let messages = session.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "What is Article 21?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].reference.as_deref(), Some("Article 21"));
        assert_eq!(mock.calls()[0].input, "What is Article 21?");
        assert!(!session.is_typing().await);
    }

    #[tokio::test]
    async fn test_chat_error_appends_apology() {
        let session = session(MockService::new().with_failure("broken"), false);
        let reply = session.ask("hello").await.unwrap();
        assert_eq!(reply.content, APOLOGY);
        assert!(reply.reference.is_none());
        assert_eq!(session.messages().await.len(), 2);
        assert!(!session.is_typing().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_while_waiting() {
        let session = session(MockService::new().with_latency_ms(500), false);
        let pending = {
            let session = session.clone();
            tokio::spawn(async move { session.ask("Explain Article 19").await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(session.is_typing().await);
        let messages = session.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);

        pending.await.unwrap().unwrap();
        assert!(!session.is_typing().await);
        assert_eq!(session.messages().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_asks_keep_turns_paired() {
        let mock = MockService::new().with_latency_ms(500);
        let session = session(mock.clone(), false);
        let mut rx = session.events.subscribe();

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.ask("first").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = {
            let session = session.clone();
            tokio::spawn(async move { session.ask("second").await })
        };

        // The second question waits for the first answer.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(session.messages().await.len(), 1);
        assert_eq!(mock.call_count("chat"), 1);

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let messages = session.messages().await;
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[2].content, "second");
        assert!(!session.is_typing().await);

        let mut typing = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            if let CourtifyEvent::TypingChanged { is_typing } = envelope.payload {
                typing.push(is_typing);
            }
        }
        assert_eq!(typing, vec![true, false, true, false]);
    }
}
