//! Process bootstrap and the update polling loop

use crate::signal_handler;
use anyhow::Context;
use bydlan_core::transport::telegram::Update;
use bydlan_core::{
    AnthropicClient, BotConfig, BotError, BotIdentity, Capabilities, ChatDebugReporter,
    ConversationCache, ConversationOrchestrator, DebugReporter, HandleOutcome, TelegramTransport,
    TracingReporter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Pause after an unreadable `getUpdates` response
const PARSE_ERROR_BACKOFF: Duration = Duration::from_secs(2);
/// Pause after a failed `getUpdates` request
const NETWORK_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Run the bot until a shutdown signal arrives
pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    let transport = Arc::new(
        TelegramTransport::new(config.telegram.clone()).context("failed to create Telegram client")?,
    );
    let completion = Arc::new(
        AnthropicClient::new(config.anthropic.clone()).context("failed to create Anthropic client")?,
    );

    let identity = BotIdentity::new();
    match transport.get_me().await {
        Ok(me) => {
            let handle = me.username.unwrap_or_else(|| config.fallback_handle.clone());
            info!(handle = %handle, "bot started");
            identity.set_handle(handle);
        }
        Err(e) => {
            error!(error = %e, fallback = %config.fallback_handle, "failed to get bot info");
            identity.set_handle(config.fallback_handle.clone());
        }
    }

    let debug: Arc<dyn DebugReporter> = match config.debug_chat_id {
        Some(chat_id) => Arc::new(
            ChatDebugReporter::new(transport.clone(), chat_id)
                .with_max_message_len(config.conversation.max_message_len),
        ),
        None => Arc::new(TracingReporter),
    };

    let cache = Arc::new(ConversationCache::new(config.conversation.cache_capacity));
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        &config.conversation,
        config.anthropic.model.clone(),
        identity,
        cache,
        Capabilities {
            transport: transport.clone(),
            completion,
            debug,
        },
    ));

    let shutdown = CancellationToken::new();
    let signals = signal_handler::spawn(shutdown.clone()).context("failed to install signal handler")?;

    poll_updates(&transport, &orchestrator, config.workers, &shutdown).await;

    signals.abort();
    info!(stats = ?orchestrator.cache_statistics(), "bot stopped");
    Ok(())
}

async fn poll_updates(
    transport: &Arc<TelegramTransport>,
    orchestrator: &Arc<ConversationOrchestrator>,
    workers: usize,
    shutdown: &CancellationToken,
) {
    let permits = Arc::new(Semaphore::new(workers));
    let mut handlers = JoinSet::new();
    let mut offset: i64 = 0;

    info!(workers, "polling for updates");
    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = transport.get_updates(offset) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                let backoff = poll_backoff(&e);
                warn!(error = %e, backoff_secs = backoff.as_secs(), "Telegram poll failed, retrying");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = accepted_message(transport, &update) else {
                continue;
            };

            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let orchestrator = Arc::clone(orchestrator);
            handlers.spawn(async move {
                let outcome = orchestrator.on_incoming_message(&message).await;
                drop(permit);
                if let HandleOutcome::Replied { .. } = outcome {
                    debug!(stats = ?orchestrator.cache_statistics(), "conversation cache");
                }
            });
        }

        while let Some(finished) = handlers.try_join_next() {
            if let Err(e) = finished {
                error!(error = %e, "message handler panicked");
            }
        }
    }

    info!(in_flight = handlers.len(), "waiting for in-flight messages");
    while let Some(finished) = handlers.join_next().await {
        if let Err(e) = finished {
            error!(error = %e, "message handler panicked");
        }
    }
}

/// Record the update's message and return it if it should be handled.
/// Only group and supergroup messages are dispatched.
fn accepted_message(
    transport: &TelegramTransport,
    update: &Update,
) -> Option<bydlan_core::ChatMessage> {
    let message = update.message.as_ref()?;
    if !message.is_group() {
        debug!(chat_id = message.chat.id, "ignoring non-group message");
        return None;
    }
    Some(transport.observe(message))
}

fn poll_backoff(error: &BotError) -> Duration {
    match error {
        BotError::Json { .. } => PARSE_ERROR_BACKOFF,
        e => e
            .retry_after()
            .map(Duration::from_secs)
            .unwrap_or(NETWORK_ERROR_BACKOFF),
    }
}
