//! Per-message handling: trigger, context, completion, reply, cache update

use crate::chat::{ChatMessage, MessageId};
use crate::config::ConversationConfig;
use crate::context::{ContextBuilder, TraversalPacing};
use crate::conversation::{ConversationCache, ConversationCacheStats, ConversationKey, ConversationTurn};
use crate::debug::DebugReporter;
use crate::error::BotError;
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::splitter::split_message;
use crate::transport::ChatTransport;
use crate::trigger::{BotIdentity, TriggerEvaluator};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// External capabilities the orchestrator drives
#[derive(Clone)]
pub struct Capabilities {
    pub transport: Arc<dyn ChatTransport>,
    pub completion: Arc<dyn CompletionProvider>,
    pub debug: Arc<dyn DebugReporter>,
}

/// Result of handling one incoming message
#[derive(Debug, Clone)]
pub enum HandleOutcome {
    /// The message did not ask for a reply
    Ignored,
    /// A reply was sent and the conversation cached under `anchor`
    Replied { anchor: MessageId, chunks: usize },
    /// Handling failed; the cache was left untouched
    Failed { error: BotError },
}

impl HandleOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, Self::Replied { .. })
    }
}

/// Ties trigger evaluation, context building, completion, reply sending and
/// cache maintenance together for each incoming message.
pub struct ConversationOrchestrator {
    trigger: TriggerEvaluator,
    context: ContextBuilder,
    cache: Arc<ConversationCache>,
    transport: Arc<dyn ChatTransport>,
    completion: Arc<dyn CompletionProvider>,
    debug: Arc<dyn DebugReporter>,
    model: String,
    system_prompt: String,
    max_message_len: usize,
    error_notice: String,
}

impl ConversationOrchestrator {
    pub fn new(
        config: &ConversationConfig,
        model: impl Into<String>,
        identity: BotIdentity,
        cache: Arc<ConversationCache>,
        capabilities: Capabilities,
    ) -> Self {
        let Capabilities {
            transport,
            completion,
            debug,
        } = capabilities;

        let context = ContextBuilder::new(
            Arc::clone(&transport),
            Arc::clone(&cache),
            identity.clone(),
            Arc::clone(&debug),
        )
        .with_pacing(TraversalPacing::from(config));

        Self {
            trigger: TriggerEvaluator::new(&config.trigger_word, identity),
            context,
            cache,
            transport,
            completion,
            debug,
            model: model.into(),
            system_prompt: config.system_prompt.clone(),
            max_message_len: config.max_message_len,
            error_notice: config.error_notice.clone(),
        }
    }

    /// Handle one incoming message.
    ///
    /// Failures are turned into an error notice in the chat plus a debug
    /// report and returned as [`HandleOutcome::Failed`]. The cache is only
    /// written after the whole reply was sent.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id, message_id = message.id))]
    pub async fn on_incoming_message(&self, message: &ChatMessage) -> HandleOutcome {
        if !self.trigger.should_respond(message) {
            return HandleOutcome::Ignored;
        }

        info!("processing group message");
        match self.respond(message).await {
            Ok((anchor, chunks)) => {
                info!(anchor, chunks, "message processed");
                HandleOutcome::Replied { anchor, chunks }
            }
            Err(err) => {
                error!(error = %err, "failed to handle group message");
                self.report_failure(message, &err).await;
                HandleOutcome::Failed { error: err }
            }
        }
    }

    /// Counters of the shared conversation cache
    pub fn cache_statistics(&self) -> ConversationCacheStats {
        self.cache.statistics()
    }

    async fn respond(&self, message: &ChatMessage) -> crate::error::BotResult<(MessageId, usize)> {
        let mut turns = self.context.build_context(message).await?;
        turns.push(self.current_turn(message));

        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            turns,
        };
        let response = self.completion.complete(&request).await?;
        let reply = response.reply_text();

        let (anchor, chunks) = self.send_reply(message, &reply).await?;

        let mut turns = request.turns;
        turns.push(ConversationTurn::assistant(reply));
        let previous = message
            .parent_id
            .map(|parent| ConversationKey::new(message.chat_id, parent));
        self.cache
            .replace(previous, ConversationKey::new(message.chat_id, anchor), turns);

        Ok((anchor, chunks))
    }

    fn current_turn(&self, message: &ChatMessage) -> ConversationTurn {
        let text = message.text().unwrap_or_default();
        let stripped = self.trigger.strip_trigger_prefix(text).trim();
        // A bare trigger word still has to reach the model as something
        let text = if stripped.is_empty() { text } else { stripped };
        ConversationTurn::user(message.author_name(), text)
    }

    /// Send `reply` as a chain of chunks, each replying to the previous one.
    /// Returns the id of the last message sent and the number of chunks.
    async fn send_reply(&self, message: &ChatMessage, reply: &str) -> crate::error::BotResult<(MessageId, usize)> {
        let mut reply_to = message.id;
        let mut sent = 0;
        for chunk in split_message(reply, self.max_message_len) {
            if chunk.is_empty() {
                continue;
            }
            reply_to = self
                .transport
                .send_message(message.chat_id, Some(reply_to), chunk)
                .await?;
            sent += 1;
        }
        Ok((reply_to, sent))
    }

    async fn report_failure(&self, message: &ChatMessage, err: &BotError) {
        let notice = format!("{}\n\n{}", self.error_notice, err);
        if let Err(notice_err) = self
            .transport
            .send_message(message.chat_id, Some(message.id), &notice)
            .await
        {
            error!(error = %notice_err, "failed to send error notice");
        }

        self.debug
            .report(&format!(
                "failed to handle message {}:{}: {:?}",
                message.chat_id, message.id, err
            ))
            .await;
    }
}
