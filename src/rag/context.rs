//! Context assembly for RAG prompts.

use crate::vector_store::SearchResult;

/// Join retrieved chunk texts in rank order, one per line.
///
/// No results yields an empty string, which is a valid context.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;

    fn result(order: usize, content: &str, score: f32) -> SearchResult {
        SearchResult {
            chunk: TextChunk {
                order,
                content: content.to_string(),
                start: 0,
                len: content.len(),
            },
            score,
        }
    }

    #[test]
    fn test_format_context_keeps_rank_order() {
        let results = vec![
            result(2, "Cats sleep a lot.", 0.9),
            result(0, "Cats are mammals.", 0.4),
        ];
        assert_eq!(
            format_context(&results),
            "Cats sleep a lot.\nCats are mammals."
        );
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }
}
