//! Sentence-preserving text chunking.

use texchunk_core::ChunkingConfig;

/// Characters that end a sentence fragment.
const SENTENCE_DELIMITERS: [char; 5] = ['。', '！', '？', '；', '\n'];

/// Terminator appended to fragments ended by a hard line break.
const LINE_BREAK_TERMINATOR: char = '。';

/// Splits a node's sanitized text into bounded chunks of whole sentences.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chars: usize,
    min_content_length: usize,
}

impl Chunker {
    pub fn new(max_chars: usize, min_content_length: usize) -> Self {
        Self {
            max_chars,
            min_content_length,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_chunk_chars, config.min_content_length)
    }

    /// Chunk `text`, preserving sentence order.
    ///
    /// Fragments accumulate until the next one would bring the buffer to
    /// `max_chars`. A single fragment longer than `max_chars` becomes its own
    /// oversized chunk rather than being cut. Text shorter than the minimum
    /// content length yields nothing.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.chars().count() < self.min_content_length {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0;

        for fragment in split_fragments(text) {
            let fragment_chars = fragment.chars().count();
            if buffer_chars > 0 && buffer_chars + fragment_chars >= self.max_chars {
                chunks.push(std::mem::take(&mut buffer));
                buffer_chars = 0;
            }
            buffer.push_str(&fragment);
            buffer_chars += fragment_chars;
        }

        if !buffer.is_empty() {
            chunks.push(buffer);
        }

        tracing::trace!(
            "Chunked {} chars into {} chunks (max {})",
            text.chars().count(),
            chunks.len(),
            self.max_chars
        );

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Split on sentence delimiters, dropping empty fragments.
///
/// Each fragment keeps the punctuation that ended it; a line break becomes
/// `。` and a trailing fragment with no delimiter gets no terminator.
fn split_fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if !SENTENCE_DELIMITERS.contains(&ch) {
            continue;
        }
        let fragment = text[start..idx].trim();
        if !fragment.is_empty() {
            let terminator = if ch == '\n' { LINE_BREAK_TERMINATOR } else { ch };
            let mut owned = String::with_capacity(fragment.len() + terminator.len_utf8());
            owned.push_str(fragment);
            owned.push(terminator);
            fragments.push(owned);
        }
        start = idx + ch.len_utf8();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        fragments.push(tail.to_string());
    }

    fragments
}
