//! Fixed-size, overlapping character windows.

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 900;

/// Default overlap between adjacent windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Overlap actually used for a given chunk size.
///
/// An overlap that would stall the window (`overlap >= chunk_size`) is
/// clamped to a quarter of the chunk size.
pub fn effective_overlap(chunk_size: usize, overlap: usize) -> usize {
    if overlap >= chunk_size {
        chunk_size / 4
    } else {
        overlap
    }
}

/// Split `text` into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one.
///
/// Sizes count `char`s, not bytes, so multi-byte text is never cut inside a
/// code point. A zero `chunk_size` yields the whole text as one chunk. The
/// last window always ends at the end of the text.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<&str> {
    if chunk_size == 0 {
        return vec![text];
    }
    let overlap = effective_overlap(chunk_size, overlap);

    // byte offset of every char boundary, including the end of the text
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let length = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < length {
        let end = (start + chunk_size).min(length);
        chunks.push(&text[bounds[start]..bounds[end]]);
        if end == length {
            break;
        }
        start = end - overlap;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_chunk_size_returns_whole_text() {
        assert_eq!(chunk_text("abc def", 0, 10), vec!["abc def"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 10, 2).is_empty());
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let chunks = chunk_text("abcdefghij", 4, 1);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn stops_once_end_is_reached() {
        // "ghij" already reaches the end, so no trailing "j" window
        let chunks = chunk_text("abcdefghij", 4, 2);
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij"]);
    }

    #[test]
    fn oversized_overlap_is_clamped() {
        assert_eq!(effective_overlap(8, 8), 2);
        assert_eq!(effective_overlap(8, 20), 2);
        assert_eq!(effective_overlap(3, 3), 0);
        let chunks = chunk_text("abcdefghijkl", 8, 100);
        assert_eq!(chunks, vec!["abcdefgh", "ghijkl"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = chunk_text("ééééé", 2, 0);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }
}
