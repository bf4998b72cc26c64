//! Bounded conversation cache
//!
//! Maps `(chat, anchor message)` to the turn list that was sent to the
//! completion service when the anchor was produced. Entries are evicted in
//! least-recently-used order once the capacity is exceeded. The cache is
//! purely in memory and is lost on restart.

use super::turn::ConversationTurn;
use crate::chat::{ChatId, MessageId};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Capacity used by the reference deployment
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Cache key: the chat and the anchor message inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl ConversationKey {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.message_id)
    }
}

/// Counters describing cache behaviour since start-up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub removals: u64,
    pub entry_count: usize,
}

impl ConversationCacheStats {
    /// Fraction of lookups that found an entry
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<ConversationKey, Vec<ConversationTurn>>,
    stats: ConversationCacheStats,
}

impl Inner {
    fn insert(&mut self, key: ConversationKey, turns: Vec<ConversationTurn>) {
        self.stats.insertions += 1;
        if let Some((displaced, _)) = self.entries.push(key, turns) {
            if displaced != key {
                self.stats.evictions += 1;
                tracing::debug!(evicted = %displaced, "conversation cache full, evicted oldest entry");
            }
        }
        self.stats.entry_count = self.entries.len();
    }

    fn remove(&mut self, key: &ConversationKey) -> Option<Vec<ConversationTurn>> {
        let removed = self.entries.pop(key);
        if removed.is_some() {
            self.stats.removals += 1;
        }
        self.stats.entry_count = self.entries.len();
        removed
    }
}

/// Process-wide conversation store.
///
/// All operations take a single short lock, so lookups and updates for
/// different keys can run from concurrent handlers and
/// [`ConversationCache::replace`] is atomic with respect to readers.
#[derive(Debug)]
pub struct ConversationCache {
    inner: Mutex<Inner>,
}

impl ConversationCache {
    /// Create a cache bounded at `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: ConversationCacheStats::default(),
            }),
        }
    }

    /// Look up a conversation, marking it as most recently used
    pub fn get(&self, key: &ConversationKey) -> Option<Vec<ConversationTurn>> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key).cloned() {
            Some(turns) => {
                inner.stats.hits += 1;
                Some(turns)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching recency or statistics
    pub fn contains(&self, key: &ConversationKey) -> bool {
        self.inner.lock().entries.contains(key)
    }

    /// Insert or overwrite a conversation; evicts the least recently used
    /// entry when the cache is full.
    pub fn put(&self, key: ConversationKey, turns: Vec<ConversationTurn>) {
        self.inner.lock().insert(key, turns);
    }

    /// Remove a conversation, returning it if it was present
    pub fn remove(&self, key: &ConversationKey) -> Option<Vec<ConversationTurn>> {
        self.inner.lock().remove(key)
    }

    /// Re-key a conversation after a reply: drop the entry under `previous`
    /// (if any) and store `turns` under `next`, as one step.
    ///
    /// The old entry is removed before inserting so a re-keyed conversation
    /// never pushes an unrelated entry out of a full cache.
    pub fn replace(
        &self,
        previous: Option<ConversationKey>,
        next: ConversationKey,
        turns: Vec<ConversationTurn>,
    ) {
        let mut inner = self.inner.lock();
        if let Some(previous) = previous {
            if previous != next && inner.remove(&previous).is_some() {
                tracing::debug!(key = %previous, "dropped superseded conversation");
            }
        }
        inner.insert(next, turns);
    }

    /// Number of cached conversations
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no conversations
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of conversations kept
    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.stats = ConversationCacheStats::default();
    }

    /// Snapshot of the cache counters
    pub fn statistics(&self) -> ConversationCacheStats {
        self.inner.lock().stats.clone()
    }
}

impl Default for ConversationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TurnRole;
    use std::sync::Arc;

    fn turns(text: &str) -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user(Some("Name"), text),
            ConversationTurn::assistant("ok"),
        ]
    }

    #[test]
    fn test_put_then_get() {
        let cache = ConversationCache::default();
        let key = ConversationKey::new(-100, 7);
        cache.put(key, turns("2+2?"));

        let cached = cache.get(&key).expect("entry should be cached");
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].text, "Name: 2+2?");
        assert_eq!(cached[1].role, TurnRole::Assistant);
    }

    #[test]
    fn test_remove_then_get_is_absent() {
        let cache = ConversationCache::default();
        let key = ConversationKey::new(1, 1);
        cache.put(key, turns("hi"));

        assert!(cache.remove(&key).is_some());
        assert!(cache.get(&key).is_none());
        assert!(cache.remove(&key).is_none());
    }

    #[test]
    fn test_keys_are_scoped_by_chat() {
        let cache = ConversationCache::default();
        cache.put(ConversationKey::new(1, 5), turns("first chat"));

        assert!(cache.get(&ConversationKey::new(2, 5)).is_none());
        assert!(cache.get(&ConversationKey::new(1, 5)).is_some());
    }

    #[test]
    fn test_overflow_evicts_exactly_one_least_recently_used() {
        let cache = ConversationCache::new(DEFAULT_CACHE_CAPACITY);
        for id in 0..DEFAULT_CACHE_CAPACITY as i64 {
            cache.put(ConversationKey::new(1, id), turns("x"));
        }
        assert_eq!(cache.len(), 1000);

        // Touch the oldest entry so the second-oldest becomes the LRU one
        assert!(cache.get(&ConversationKey::new(1, 0)).is_some());

        cache.put(ConversationKey::new(1, 1000), turns("new"));

        assert_eq!(cache.len(), 1000);
        assert!(cache.contains(&ConversationKey::new(1, 0)));
        assert!(!cache.contains(&ConversationKey::new(1, 1)));
        assert!(cache.contains(&ConversationKey::new(1, 1000)));
        assert_eq!(cache.statistics().evictions, 1);
    }

    #[test]
    fn test_overwrite_same_key_is_not_an_eviction() {
        let cache = ConversationCache::new(2);
        let key = ConversationKey::new(1, 1);
        cache.put(key, turns("a"));
        cache.put(key, turns("b"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.statistics().evictions, 0);
        assert_eq!(cache.get(&key).unwrap()[0].text, "Name: b");
    }

    #[test]
    fn test_replace_moves_entry_to_new_anchor() {
        let cache = ConversationCache::default();
        let old = ConversationKey::new(1, 10);
        let new = ConversationKey::new(1, 12);
        cache.put(old, turns("first"));

        cache.replace(Some(old), new, turns("second"));

        assert!(!cache.contains(&old));
        assert_eq!(cache.get(&new).unwrap()[0].text, "Name: second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_replace_in_full_cache_keeps_unrelated_entries() {
        let cache = ConversationCache::new(2);
        let unrelated = ConversationKey::new(1, 1);
        let old = ConversationKey::new(1, 2);
        cache.put(unrelated, turns("keep me"));
        cache.put(old, turns("old"));

        cache.replace(Some(old), ConversationKey::new(1, 3), turns("new"));

        assert!(cache.contains(&unrelated));
        assert_eq!(cache.statistics().evictions, 0);
    }

    #[test]
    fn test_replace_without_previous_is_plain_insert() {
        let cache = ConversationCache::default();
        cache.replace(None, ConversationKey::new(1, 3), turns("fresh"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = ConversationCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_statistics_track_hits_and_misses() {
        let cache = ConversationCache::default();
        let key = ConversationKey::new(1, 1);
        cache.get(&key);
        cache.put(key, turns("x"));
        cache.get(&key);

        let stats = cache.statistics();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_access_from_threads() {
        let cache = Arc::new(ConversationCache::new(100));
        let handles: Vec<_> = (0..4)
            .map(|chat| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for id in 0..50 {
                        let key = ConversationKey::new(chat, id);
                        cache.put(key, turns("t"));
                        let _ = cache.get(&key);
                        if id % 2 == 0 {
                            cache.replace(Some(key), ConversationKey::new(chat, id + 1000), turns("r"));
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 100);
    }
}
