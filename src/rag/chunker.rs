//! Text chunking for document indexing.
//!
//! Splits document text into overlapping chunks suitable for embedding,
//! using a priority list of separators from coarsest to finest.

/// Maximum characters per chunk.
pub const CHUNK_SIZE: usize = 500;

/// Characters carried over from the tail of each chunk into the next.
pub const CHUNK_OVERLAP: usize = 50;

/// Separator priority for recursive splitting, coarsest to finest. The
/// multi-character markers are field labels from the tabular reports this
/// service ingests. The empty separator splits into single characters, so
/// no chunk ever exceeds the size bound.
const SEPARATORS: &[&str] = &[
    "\n\n",
    "\n",
    " Vn",
    " SR ",
    " NAME ",
    " DEPARTMENT ",
    " BRANCH ",
    " ",
    "",
];

/// Split text into overlapping chunks.
///
/// Deterministic: the same input always produces the same chunk sequence.
/// Chunks are not trimmed, so stripping the overlap prefix from each chunk
/// after the first reconstructs the input exactly. Empty or
/// whitespace-only input yields no chunks; the caller treats that as an
/// ingestion failure.
pub fn chunk_text(text: &str) -> Vec<String> {
    chunk_text_with(text, CHUNK_SIZE, CHUNK_OVERLAP)
}

fn chunk_text_with(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let pieces = split_recursive(text, SEPARATORS, size);
    merge_pieces(&pieces, size, overlap)
}

/// Recursively split text until every piece fits the size bound, trying
/// separators in priority order. Separators are kept attached as a prefix
/// of the piece that follows them, so no text is lost.
fn split_recursive(text: &str, separators: &[&str], size: usize) -> Vec<String> {
    // Pick the first separator present in the text; the empty separator
    // always matches.
    let index = separators
        .iter()
        .position(|sep| sep.is_empty() || text.contains(sep))
        .unwrap_or(separators.len() - 1);
    let separator = separators[index];
    let remaining = &separators[index + 1..];

    let splits = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        split_keeping_separator(text, separator)
    };

    let mut pieces = Vec::new();
    for piece in splits {
        if char_len(&piece) <= size || remaining.is_empty() {
            pieces.push(piece);
        } else {
            pieces.extend(split_recursive(&piece, remaining, size));
        }
    }
    pieces
}

/// Split on a separator, attaching each separator occurrence to the piece
/// that follows it.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    let starts: Vec<usize> = text.match_indices(separator).map(|(i, _)| i).collect();
    if starts.is_empty() {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    if starts[0] > 0 {
        pieces.push(text[..starts[0]].to_string());
    }
    for pair in starts.windows(2) {
        pieces.push(text[pair[0]..pair[1]].to_string());
    }
    pieces.push(text[starts[starts.len() - 1]..].to_string());
    pieces
}

/// Greedily merge pieces into chunks of at most `size` characters, seeding
/// each new chunk with up to `overlap` characters from the tail of the
/// previous one. The seed shrinks when a large piece would otherwise push
/// the chunk over the bound.
fn merge_pieces(pieces: &[String], size: usize, overlap: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        let piece_len = char_len(piece);
        let current_len = char_len(&current);

        if current_len > 0 && current_len + piece_len > size {
            let keep = overlap.min(size.saturating_sub(piece_len));
            let seed = tail_chars(&current, keep);
            chunks.push(std::mem::take(&mut current));
            current = seed;
        }

        current.push_str(piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of a string (char-safe).
fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    if len <= n {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}
