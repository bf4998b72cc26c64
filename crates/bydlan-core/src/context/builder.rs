//! Reply-chain traversal

use super::pacing::TraversalPacing;
use crate::chat::{ChatId, ChatMessage, MessageId};
use crate::conversation::{ConversationCache, ConversationKey, ConversationTurn};
use crate::debug::DebugReporter;
use crate::error::BotResult;
use crate::transport::ChatTransport;
use crate::trigger::BotIdentity;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// How an ancestor message takes part in the conversation
enum Ancestor<'a> {
    /// Written by the bot itself
    Bot(&'a str),
    /// Written by a human whose display name is known
    Named(&'a str, &'a str),
    /// Written by a human without a display name
    Nameless(&'a str),
    /// No author attached, typically another bot or a channel post
    Unidentified,
    /// Author known but nothing to say (media without caption)
    Empty,
}

/// Builds the oldest-first turn list preceding a message.
///
/// Reads the conversation cache but never writes it; the orchestrator owns
/// cache updates.
pub struct ContextBuilder {
    transport: Arc<dyn ChatTransport>,
    cache: Arc<ConversationCache>,
    identity: BotIdentity,
    debug: Arc<dyn DebugReporter>,
    pacing: TraversalPacing,
}

impl ContextBuilder {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        cache: Arc<ConversationCache>,
        identity: BotIdentity,
        debug: Arc<dyn DebugReporter>,
    ) -> Self {
        Self {
            transport,
            cache,
            identity,
            debug,
            pacing: TraversalPacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: TraversalPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Turns preceding `message`, oldest first. The message itself is not
    /// included.
    ///
    /// A cached conversation anchored at the parent is returned as-is without
    /// touching the transport. Otherwise the reply chain is walked through
    /// the transport until a message has no parent or cannot be fetched.
    /// Transport errors are returned to the caller.
    pub async fn build_context(&self, message: &ChatMessage) -> BotResult<Vec<ConversationTurn>> {
        let Some(parent_id) = message.parent_id else {
            return Ok(Vec::new());
        };

        let key = ConversationKey::new(message.chat_id, parent_id);
        if let Some(turns) = self.cache.get(&key) {
            debug!(key = %key, turns = turns.len(), "conversation cache hit");
            return Ok(turns);
        }

        self.traverse(message.chat_id, parent_id).await
    }

    async fn traverse(&self, chat_id: ChatId, parent_id: MessageId) -> BotResult<Vec<ConversationTurn>> {
        let mut turns = Vec::new();
        let mut visited: HashSet<MessageId> = HashSet::new();
        let mut next_id = Some(parent_id);

        debug!(chat_id, parent_id, "walking reply chain");
        while let Some(id) = next_id {
            if !visited.insert(id) {
                warn!(chat_id, message_id = id, "reply chain loops back on itself");
                break;
            }

            let fetched = self.transport.fetch_message(chat_id, id).await?;
            self.pacing.after_step().await;

            let Some(ancestor) = fetched else {
                debug!(chat_id, message_id = id, "ancestor not available, stopping");
                break;
            };

            match self.classify(&ancestor) {
                Ancestor::Bot(text) => turns.push(ConversationTurn::assistant(text)),
                Ancestor::Named(name, text) => turns.push(ConversationTurn::user(Some(name), text)),
                Ancestor::Nameless(text) => {
                    warn!(chat_id, message_id = id, "author without a display name");
                    self.debug
                        .report(&format!("author without a display name: {:?}", ancestor))
                        .await;
                    self.pacing.after_anomaly().await;
                    turns.push(ConversationTurn::user(None, text));
                }
                Ancestor::Unidentified => {
                    warn!(chat_id, message_id = id, "message author not found");
                    self.debug
                        .report(&format!("message author not found: {:?}", ancestor))
                        .await;
                    self.pacing.after_anomaly().await;
                }
                Ancestor::Empty => {
                    debug!(chat_id, message_id = id, "ancestor has no text, skipping");
                }
            }

            next_id = ancestor.parent_id;
        }

        debug!(chat_id, depth = turns.len(), "finished walking reply chain");
        turns.reverse();
        Ok(turns)
    }

    fn classify<'a>(&self, message: &'a ChatMessage) -> Ancestor<'a> {
        let Some(author) = message.author.as_ref() else {
            return Ancestor::Unidentified;
        };
        let Some(text) = message.text() else {
            return Ancestor::Empty;
        };
        if self.identity.is_bot_handle(author.handle.as_deref()) {
            return Ancestor::Bot(text);
        }
        match author.known_display_name() {
            Some(name) => Ancestor::Named(name, text),
            None => Ancestor::Nameless(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Author;
    use crate::conversation::TurnRole;
    use crate::debug::MockDebugReporter;
    use crate::error::BotError;
    use crate::transport::MockChatTransport;
    use mockall::predicate::eq;
    use std::collections::HashMap;

    const CHAT: i64 = -100;

    fn human(id: MessageId, name: &str, text: &str) -> ChatMessage {
        ChatMessage::new(CHAT, id)
            .with_text(text)
            .with_author(Author::new(1).with_display_name(name))
    }

    fn bot(id: MessageId, text: &str) -> ChatMessage {
        ChatMessage::new(CHAT, id)
            .with_text(text)
            .with_author(Author::new(99).with_handle("bydlan_bot"))
    }

    fn transport_with(messages: Vec<ChatMessage>) -> MockChatTransport {
        let store: HashMap<MessageId, ChatMessage> =
            messages.into_iter().map(|m| (m.id, m)).collect();
        let mut transport = MockChatTransport::new();
        transport
            .expect_fetch_message()
            .returning(move |_, id| Ok(store.get(&id).cloned()));
        transport
    }

    fn quiet_reporter() -> MockDebugReporter {
        let mut reporter = MockDebugReporter::new();
        reporter.expect_report().times(0);
        reporter
    }

    fn builder(
        transport: MockChatTransport,
        cache: Arc<ConversationCache>,
        reporter: MockDebugReporter,
    ) -> ContextBuilder {
        ContextBuilder::new(
            Arc::new(transport),
            cache,
            BotIdentity::with_handle("bydlan_bot"),
            Arc::new(reporter),
        )
        .with_pacing(TraversalPacing::none())
    }

    #[tokio::test]
    async fn test_message_without_parent_has_empty_context() {
        let mut transport = MockChatTransport::new();
        transport.expect_fetch_message().times(0);
        let b = builder(transport, Arc::default(), quiet_reporter());

        let turns = b.build_context(&human(1, "Вася", "быдлан 2+2?")).await.unwrap();
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_issues_no_fetches() {
        let cache = Arc::new(ConversationCache::default());
        let cached = vec![
            ConversationTurn::user(Some("Вася"), "2+2?"),
            ConversationTurn::assistant("4"),
        ];
        cache.put(ConversationKey::new(CHAT, 2), cached.clone());

        let mut transport = MockChatTransport::new();
        transport.expect_fetch_message().times(0);
        let b = builder(transport, cache, quiet_reporter());

        let message = human(3, "Вася", "и 3+3?").replying_to(2);
        assert_eq!(b.build_context(&message).await.unwrap(), cached);
    }

    #[tokio::test]
    async fn test_traversal_is_oldest_first_and_classifies_roles() {
        let chain = vec![
            human(1, "Вася", "быдлан 2+2?"),
            bot(2, "4").replying_to(1),
            human(3, "Петя", "а 3+3?").replying_to(2),
        ];
        let b = builder(transport_with(chain), Arc::default(), quiet_reporter());

        let message = human(4, "Вася", "быдлан ну?").replying_to(3);
        let turns = b.build_context(&message).await.unwrap();

        let texts: Vec<_> = turns.iter().map(|t| (t.role, t.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![
                (TurnRole::User, "Вася: быдлан 2+2?"),
                (TurnRole::Assistant, "4"),
                (TurnRole::User, "Петя: а 3+3?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_ancestor_stops_traversal() {
        // message 2 replies to 1, which the transport cannot find
        let chain = vec![bot(2, "4").replying_to(1)];
        let b = builder(transport_with(chain), Arc::default(), quiet_reporter());

        let turns = b
            .build_context(&human(3, "Вася", "ok").replying_to(2))
            .await
            .unwrap();
        assert_eq!(turns, vec![ConversationTurn::assistant("4")]);
    }

    #[tokio::test]
    async fn test_unidentified_author_is_skipped_and_reported() {
        let anonymous = ChatMessage::new(CHAT, 2).with_text("channel post").replying_to(1);
        let chain = vec![human(1, "Вася", "first"), anonymous];

        let mut reporter = MockDebugReporter::new();
        reporter
            .expect_report()
            .withf(|text| text.starts_with("message author not found"))
            .times(1)
            .return_const(());
        let b = builder(transport_with(chain), Arc::default(), reporter);

        let turns = b
            .build_context(&human(3, "Петя", "быдлан?").replying_to(2))
            .await
            .unwrap();
        assert_eq!(turns, vec![ConversationTurn::user(Some("Вася"), "first")]);
    }

    #[tokio::test]
    async fn test_nameless_author_keeps_turn_without_prefix() {
        let nameless = ChatMessage::new(CHAT, 1)
            .with_text("hello")
            .with_author(Author::new(7));

        let mut reporter = MockDebugReporter::new();
        reporter
            .expect_report()
            .withf(|text| text.starts_with("author without a display name"))
            .times(1)
            .return_const(());
        let b = builder(transport_with(vec![nameless]), Arc::default(), reporter);

        let turns = b
            .build_context(&human(2, "Вася", "быдлан?").replying_to(1))
            .await
            .unwrap();
        assert_eq!(turns, vec![ConversationTurn::user(None, "hello")]);
        assert_eq!(turns[0].text, "hello");
    }

    #[tokio::test]
    async fn test_bot_handle_wins_over_missing_name() {
        let own = ChatMessage::new(CHAT, 1)
            .with_text("4")
            .with_author(Author::new(99).with_handle("bydlan_bot"));
        let b = builder(transport_with(vec![own]), Arc::default(), quiet_reporter());

        let turns = b
            .build_context(&human(2, "Вася", "ну").replying_to(1))
            .await
            .unwrap();
        assert_eq!(turns, vec![ConversationTurn::assistant("4")]);
    }

    #[tokio::test]
    async fn test_ancestor_without_text_is_skipped() {
        let photo = ChatMessage::new(CHAT, 2)
            .with_author(Author::new(1).with_display_name("Вася"))
            .replying_to(1);
        let chain = vec![human(1, "Вася", "смотри"), photo];
        let b = builder(transport_with(chain), Arc::default(), quiet_reporter());

        let turns = b
            .build_context(&human(3, "Петя", "быдлан что там").replying_to(2))
            .await
            .unwrap();
        assert_eq!(turns, vec![ConversationTurn::user(Some("Вася"), "смотри")]);
    }

    #[tokio::test]
    async fn test_reply_cycle_terminates() {
        let chain = vec![human(1, "Вася", "a").replying_to(2), human(2, "Петя", "b").replying_to(1)];
        let b = builder(transport_with(chain), Arc::default(), quiet_reporter());

        let turns = b
            .build_context(&human(3, "Вася", "быдлан").replying_to(2))
            .await
            .unwrap();
        assert_eq!(turns.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_miss_is_not_written_back() {
        let cache = Arc::new(ConversationCache::default());
        let b = builder(
            transport_with(vec![human(1, "Вася", "hi")]),
            Arc::clone(&cache),
            quiet_reporter(),
        );

        b.build_context(&human(2, "Петя", "быдлан").replying_to(1))
            .await
            .unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let mut transport = MockChatTransport::new();
        transport
            .expect_fetch_message()
            .with(eq(CHAT), eq(1))
            .times(1)
            .returning(|_, _| Err(BotError::flood_wait("Too Many Requests", 5)));
        let b = builder(transport, Arc::default(), quiet_reporter());

        let err = b
            .build_context(&human(2, "Вася", "быдлан").replying_to(1))
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
    }
}
