//! Recursive separator-based chunking.

use super::{ChunkingConfig, TextChunk};
use std::collections::VecDeque;
use std::ops::Range;
use tracing::debug;

/// A contiguous byte range of the transcript with its character count.
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

/// Splits text by a descending list of separators, merging the pieces back
/// into overlapping chunks of at most `chunk_size` characters.
///
/// Every piece is a contiguous slice of the input and separators stay attached
/// to the end of the piece they terminate, so a merged chunk is always a
/// verbatim substring of the transcript.
pub struct RecursiveChunker {
    config: ChunkingConfig,
}

impl RecursiveChunker {
    /// Create a new chunker.
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Split a transcript into ordered chunks.
    pub fn chunk(&self, transcript: &str) -> Vec<TextChunk> {
        let mut ranges = Vec::new();
        self.split_range(transcript, 0..transcript.len(), &self.config.separators, &mut ranges);

        let mut chunks = Vec::with_capacity(ranges.len());
        for range in ranges {
            let raw = &transcript[range.clone()];
            let content = raw.trim();
            if content.is_empty() {
                continue;
            }

            let start_byte = range.start + (raw.len() - raw.trim_start().len());
            chunks.push(TextChunk {
                order: chunks.len(),
                content: content.to_string(),
                start: transcript[..start_byte].chars().count(),
                len: content.chars().count(),
            });
        }

        debug!(
            "Split {} chars into {} chunks",
            transcript.chars().count(),
            chunks.len()
        );
        chunks
    }

    fn split_range(
        &self,
        text: &str,
        range: Range<usize>,
        separators: &[String],
        out: &mut Vec<Range<usize>>,
    ) {
        let slice = &text[range.clone()];
        let (separator, remaining) = pick_separator(slice, separators);
        let pieces = split_keeping_separator(slice, separator, range.start);

        let mut fitting: Vec<Piece> = Vec::new();
        for piece in pieces {
            if piece.chars < self.config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                self.merge_pieces(&fitting, out);
                fitting.clear();
            }

            if remaining.is_empty() {
                out.push(piece.start..piece.end);
            } else {
                self.split_range(text, piece.start..piece.end, remaining, out);
            }
        }

        if !fitting.is_empty() {
            self.merge_pieces(&fitting, out);
        }
    }

    /// Greedily merge consecutive pieces into chunks, carrying at most
    /// `chunk_overlap` characters of trailing pieces into the next chunk.
    fn merge_pieces(&self, pieces: &[Piece], out: &mut Vec<Range<usize>>) {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut window: VecDeque<Piece> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            if total + piece.chars > size {
                if let (Some(first), Some(last)) = (window.front(), window.back()) {
                    out.push(first.start..last.end);
                }
                while total > overlap || (total > 0 && total + piece.chars > size) {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }
            window.push_back(*piece);
            total += piece.chars;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            out.push(first.start..last.end);
        }
    }
}

/// Pick the first separator present in `text`, returning it with the
/// lower-priority separators left for recursion.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }
    (separators.last().map(|s| s.as_str()).unwrap_or(""), &[])
}

/// Split `text` after each occurrence of `separator`. `offset` is the byte
/// position of `text` within the full transcript.
fn split_keeping_separator(text: &str, separator: &str, offset: usize) -> Vec<Piece> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| Piece {
                start: offset + i,
                end: offset + i + c.len_utf8(),
                chars: 1,
            })
            .collect();
    }

    let mut cuts = vec![0];
    cuts.extend(text.match_indices(separator).map(|(i, s)| i + s.len()));
    cuts.push(text.len());

    cuts.windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| Piece {
            start: offset + w[0],
            end: offset + w[1],
            chars: text[w[0]..w[1]].chars().count(),
        })
        .collect()
}
