//! Fixed-size word-count chunking of extracted document text.

/// Default chunk size in whitespace-delimited words.
pub const DEFAULT_WORDS_PER_CHUNK: usize = 500;

/// Splits `text` into chunks of up to `words_per_chunk` whitespace-delimited
/// words, preserving word order with no overlap, no dropped words, and no
/// duplicates. Empty input produces no chunks. Pure and deterministic.
pub fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words_per_chunk = words_per_chunk.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(words_per_chunk)
        .map(|chunk| chunk.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_words("", DEFAULT_WORDS_PER_CHUNK).is_empty());
        assert!(chunk_words("   \n\t  ", DEFAULT_WORDS_PER_CHUNK).is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_words("alpha beta gamma", 500);
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn test_exact_boundary_has_no_trailing_empty_chunk() {
        let chunks = chunk_words("a b c d", 2);
        assert_eq!(chunks, vec!["a b".to_string(), "c d".to_string()]);
    }

    #[test]
    fn test_remainder_lands_in_final_chunk() {
        let chunks = chunk_words("a b c d e", 2);
        assert_eq!(
            chunks,
            vec!["a b".to_string(), "c d".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_no_chunk_exceeds_limit_and_none_is_empty() {
        let text = (0..137).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        for n in [1, 2, 7, 50, 137, 500] {
            for chunk in chunk_words(&text, n) {
                let count = chunk.split_whitespace().count();
                assert!(count > 0 && count <= n, "chunk had {count} words for n={n}");
            }
        }
    }

    #[test]
    fn test_concatenation_reconstructs_normalized_word_sequence() {
        let text = "  one\ttwo\nthree   four five six seven ";
        let chunks = chunk_words(text, 3);
        let rebuilt = chunks.join(" ");
        let expected = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_zero_chunk_size_treated_as_one() {
        let chunks = chunk_words("a b", 0);
        assert_eq!(chunks, vec!["a".to_string(), "b".to_string()]);
    }
}
