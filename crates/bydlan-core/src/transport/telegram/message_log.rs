use crate::chat::{ChatId, ChatMessage, MessageId};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// A logged message and how it became known
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMessage {
    pub message: ChatMessage,
    /// Only seen as another message's embedded reply target, so its own
    /// `parent_id` is unknown and traversal stops here
    pub embedded_only: bool,
}

/// Bounded record of messages seen by the transport, keyed by chat and id.
///
/// Entries are stored flat (without the embedded reply target); the parent
/// is reachable through `parent_id`.
#[derive(Debug)]
pub struct MessageLog {
    entries: Mutex<LruCache<(ChatId, MessageId), LoggedMessage>>,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Record `message` and the reply targets embedded in it.
    ///
    /// Embedded targets arrive without their own parent, so they never
    /// replace an entry that is already known.
    pub fn record(&self, message: &ChatMessage) {
        let mut entries = self.entries.lock();
        entries.put((message.chat_id, message.id), flatten(message, false));

        let mut embedded = message.reply_to.as_deref();
        while let Some(parent) = embedded {
            let key = (parent.chat_id, parent.id);
            if entries.get(&key).is_none() {
                entries.put(key, flatten(parent, true));
            }
            embedded = parent.reply_to.as_deref();
        }
    }

    pub fn get(&self, chat_id: ChatId, message_id: MessageId) -> Option<LoggedMessage> {
        self.entries.lock().get(&(chat_id, message_id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn flatten(message: &ChatMessage, embedded_only: bool) -> LoggedMessage {
    LoggedMessage {
        message: ChatMessage {
            reply_to: None,
            ..message.clone()
        },
        embedded_only,
    }
}
