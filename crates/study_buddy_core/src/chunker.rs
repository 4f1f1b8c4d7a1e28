//! crates/study_buddy_core/src/chunker.rs
//!
//! Splits extracted document text into sentence-aligned chunks small enough to
//! be sent to the flashcard generation backend one at a time.

/// Default upper bound, in characters, for a single chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Cleans raw extracted text before chunking.
///
/// Strips NUL and other control characters, collapses every run of whitespace
/// (including line breaks and tabs) into a single space and trims both ends.
pub fn normalize_text(raw: &str) -> String {
    let without_controls: String = raw
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    without_controls.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace. The terminator stays
/// with its sentence; the whitespace run that follows it is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let sentence = &text[start..idx];
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            let mut next_start = idx + c.len_utf8();
            while let Some(&(i, w)) = chars.peek() {
                if !w.is_whitespace() {
                    break;
                }
                next_start = i + w.len_utf8();
                chars.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Greedily packs whole sentences into chunks of at most `max_size` characters.
///
/// Sentences are joined with a single space. A sentence that is longer than
/// `max_size` on its own becomes a chunk by itself rather than being cut.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();

        if current.is_empty() {
            current.push_str(sentence);
            current_len = sentence_len;
        } else if current_len + 1 + sentence_len <= max_size {
            current.push(' ');
            current.push_str(sentence);
            current_len += 1 + sentence_len;
        } else {
            chunks.push(current.trim().to_string());
            current = sentence.to_string();
            current_len = sentence_len;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}
