// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Text chunk scheduling shared by every provider encoder

/// Split `text` into consecutive pieces of `size` characters; the last piece
/// may be shorter. A size of zero yields the whole text as one piece, and
/// empty text yields a single empty piece.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if text.is_empty() || size == 0 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// Chunk size used when a command carries none: the full text length.
pub fn effective_chunk_size(text: &str, configured: Option<usize>) -> usize {
    configured.unwrap_or_else(|| text.chars().count()).max(1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn splits_into_fixed_pieces() {
        assert_eq!(chunk_text("Hello World", 5), vec!["Hello", " Worl", "d"]);
        assert_eq!(chunk_text("abcdef", 3), vec!["abc", "def"]);
        assert_eq!(chunk_text("abc", 10), vec!["abc"]);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(chunk_text("", 5), vec![""]);
        assert_eq!(chunk_text("abc", 0), vec!["abc"]);
    }

    #[test]
    fn never_splits_inside_a_character() {
        assert_eq!(chunk_text("héllo🌍!", 2), vec!["hé", "ll", "o🌍", "!"]);
    }

    #[test]
    fn rejoining_restores_text() {
        let text = "The quick brown fox jumps over the lazy dog. ünïcödé ✓";
        for size in 1..=text.chars().count() + 1 {
            let chunks = chunk_text(text, size);
            assert_eq!(chunks.concat(), text, "size {size}");
            let (last, rest) = chunks.split_last().unwrap();
            assert!(rest.iter().all(|chunk| chunk.chars().count() == size));
            assert!(last.chars().count() <= size);
        }
    }

    #[test]
    fn default_size_is_full_length() {
        assert_eq!(effective_chunk_size("Hello", None), 5);
        assert_eq!(effective_chunk_size("Hello", Some(2)), 2);
        assert_eq!(effective_chunk_size("", None), 1);
        assert_eq!(chunk_text("Hello", effective_chunk_size("Hello", None)), vec!["Hello"]);
    }
}
