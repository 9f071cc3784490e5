//! Sentence-aligned transcript chunking.
//!
//! Long transcripts are cut into bounded segments so every backend call stays
//! within a single context window. Split points are sentence boundaries only;
//! concatenating the chunks reproduces the trimmed input exactly.

pub const DEFAULT_MIN_LENGTH: usize = 300;
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Split `text` into sentence-aligned chunks of `min_length..=max_length`
/// chars. The final chunk may be shorter; a chunk may exceed `max_length`
/// when no sentence boundary arrives before the floor is reached (the floor
/// wins over the ceiling when they conflict).
pub fn split(text: &str, min_length: usize, max_length: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_length {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for sentence in sentences(text) {
        let sentence_len = sentence.chars().count();
        if buf_len + sentence_len <= max_length || buf_len < min_length {
            buf.push_str(sentence);
            buf_len += sentence_len;
        } else {
            chunks.push(std::mem::take(&mut buf));
            buf.push_str(sentence);
            buf_len = sentence_len;
        }
    }
    if !buf.is_empty() {
        chunks.push(buf);
    }

    chunks
}

/// Iterate sentences of `text`, each keeping its terminator and any trailing
/// whitespace so the split is lossless.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if matches!(c, '。' | '！' | '？' | '.' | '!' | '?') {
            let mut end = i + c.len_utf8();
            while let Some(&(j, d)) = iter.peek() {
                if !d.is_whitespace() {
                    break;
                }
                end = j + d.len_utf8();
                iter.next();
            }
            out.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }

    out.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(sentence_count: usize) -> String {
        (0..sentence_count)
            .map(|i| format!("This is sentence number {i} of the lecture. "))
            .collect()
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split("  One short sentence.  ", DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
        assert_eq!(chunks, vec!["One short sentence.".to_string()]);
    }

    #[test]
    fn short_chinese_text_is_a_single_trimmed_chunk() {
        let chunks = split("今天天氣很好。我們來上課。", DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
        assert_eq!(chunks, vec!["今天天氣很好。我們來上課。".to_string()]);
    }

    #[test]
    fn concatenation_reconstructs_the_trimmed_input() {
        let text = long_text(80);
        let chunks = split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), text.trim());
    }

    #[test]
    fn no_chunk_is_empty() {
        let text = long_text(120);
        for chunk in split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH) {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn non_final_chunks_respect_the_bounds() {
        let text = long_text(100);
        let chunks = split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
        for chunk in &chunks[..chunks.len() - 1] {
            let len = chunk.chars().count();
            assert!(len >= DEFAULT_MIN_LENGTH, "chunk below floor: {len}");
            assert!(len <= DEFAULT_MAX_LENGTH, "chunk above ceiling: {len}");
        }
    }

    #[test]
    fn text_without_boundaries_stays_one_oversized_chunk() {
        let text = "x".repeat(2500);
        let chunks = split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 2500);
    }

    #[test]
    fn floor_wins_over_ceiling() {
        // A tiny fragment followed by an oversized sentence: the fragment
        // alone never reaches the floor, so the two merge past the ceiling.
        let text = format!("Hi. {}. One more sentence to push past the limit.", "y".repeat(1100));
        let chunks = split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
        assert!(chunks[0].chars().count() > DEFAULT_MAX_LENGTH);
        assert_eq!(chunks.concat(), text.trim());
    }

    #[test]
    fn split_is_deterministic() {
        let text = long_text(60);
        assert_eq!(
            split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH),
            split(&text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH)
        );
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split("   ", DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH).is_empty());
    }
}
