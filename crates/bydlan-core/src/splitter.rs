//! Splitting of long replies into transport-sized chunks
//!
//! Lengths are counted in characters (Unicode scalar values), so a chunk never
//! ends in the middle of a multi-byte character.

/// Maximum message length accepted by Telegram
pub const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Lazily split `text` into consecutive chunks of at most `max_len`
/// characters. Empty input yields no chunks and no chunk is ever empty.
///
/// A `max_len` of zero is treated as one.
pub fn split_message(text: &str, max_len: usize) -> MessageChunks<'_> {
    MessageChunks {
        rest: text,
        max_len: max_len.max(1),
    }
}

/// Iterator returned by [`split_message`]
#[derive(Debug, Clone)]
pub struct MessageChunks<'a> {
    rest: &'a str,
    max_len: usize,
}

impl<'a> Iterator for MessageChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let split_at = self
            .rest
            .char_indices()
            .nth(self.max_len)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(split_at);
        self.rest = rest;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for MessageChunks<'_> {}
