//! Token indexer: turns the lexer's block sequence into a gap-free,
//! non-overlapping partition of the document.
//!
//! The lexer reports each block's own byte range, which leaves gaps for the
//! blank lines between blocks. Offset arithmetic in `replace`, `before` and
//! `after` needs an exact partition, so each token's span is widened to run
//! up to the next token's start (the first token is pulled back to offset 0
//! and the last runs to the end of the document).

use std::sync::Arc;

use crate::lexer::{self, Token};

/// One token with its span in the source document.
#[derive(Debug, Clone)]
pub struct IndexedRange {
    pub token: Arc<Token>,
    pub start: usize,
    pub len: usize,
}

impl IndexedRange {
    /// Exclusive end offset of this range.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Runs the lexer once and builds the base candidate list for queries.
///
/// Invariant: the returned ranges are ascending and contiguous, and their
/// slices concatenate back to `source` exactly. A document with no blocks
/// (empty or whitespace-only) indexes to an empty list.
pub fn index(source: &str) -> Vec<IndexedRange> {
    let blocks = lexer::lex(source);
    let count = blocks.len();

    let starts: Vec<usize> = blocks
        .iter()
        .enumerate()
        .map(|(i, b)| if i == 0 { 0 } else { b.range.start })
        .collect();

    let mut out = Vec::with_capacity(count);
    for (i, block) in blocks.into_iter().enumerate() {
        let start = starts[i];
        let end = if i + 1 < count {
            starts[i + 1]
        } else {
            source.len()
        };
        out.push(IndexedRange {
            token: Arc::new(Token {
                kind: block.kind,
                raw: source[start..end].to_string(),
            }),
            start,
            len: end - start,
        });
    }

    out
}
