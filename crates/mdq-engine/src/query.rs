//! The public query surface: an immutable, chainable view over a markdown
//! document's matched ranges.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::PatternError;
use crate::index::{self, IndexedRange};
use crate::lexer::TokenKind;
use crate::resolve::{self, MatchedRange};
use crate::selector;

/// A document plus the ranges currently matched in it.
///
/// The initial query matches every top-level token; `query` narrows the
/// match set and returns a new value, leaving the receiver untouched. The
/// source text is shared, so cloning and chaining are cheap.
#[derive(Debug, Clone)]
pub struct MarkdownQuery {
    source: Arc<str>,
    matches: Vec<MatchedRange>,
}

impl MarkdownQuery {
    /// Parses `source` and starts a query matching every top-level token.
    pub fn new(source: &str) -> Self {
        let matches = index::index(source)
            .into_iter()
            .map(MatchedRange::from_range)
            .collect();
        Self {
            source: Arc::from(source),
            matches,
        }
    }

    /// Narrows the current match set with a selector string.
    ///
    /// Fails only on a malformed regex matcher; all other selector oddities
    /// degrade to smaller (possibly empty) match sets.
    pub fn query(&self, selector: &str) -> Result<MarkdownQuery, PatternError> {
        let segments = selector::parse(selector)?;
        let candidates = self.expand_candidates();
        Ok(MarkdownQuery {
            source: self.source.clone(),
            matches: resolve::resolve(&candidates, &segments),
        })
    }

    /// Current matches as ranges over `source`, when the raw tokens and
    /// offsets are wanted instead of text.
    pub fn matches(&self) -> &[MatchedRange] {
        &self.matches
    }

    /// The full document this query was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Verbatim source text of every match, concatenated in document order.
    pub fn text(&self) -> String {
        self.matches
            .iter()
            .map(|m| &self.source[m.start..m.end()])
            .collect()
    }

    /// Alias for [`text`](Self::text).
    pub fn get(&self) -> String {
        self.text()
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Keeps only the first match. Empty stays empty.
    pub fn first(&self) -> MarkdownQuery {
        MarkdownQuery {
            source: self.source.clone(),
            matches: self.matches.first().cloned().into_iter().collect(),
        }
    }

    /// Keeps only the last match. Empty stays empty.
    pub fn last(&self) -> MarkdownQuery {
        MarkdownQuery {
            source: self.source.clone(),
            matches: self.matches.last().cloned().into_iter().collect(),
        }
    }

    /// Splits into one single-match query per current match.
    pub fn each(&self) -> Vec<MarkdownQuery> {
        self.matches
            .iter()
            .map(|m| MarkdownQuery {
                source: self.source.clone(),
                matches: vec![m.clone()],
            })
            .collect()
    }

    /// Table rows of every matched table, each row keyed by the table's
    /// header cells. Non-table matches contribute nothing; a short row's
    /// missing cells come through as empty strings.
    pub fn to_json(&self) -> Vec<Map<String, Value>> {
        let mut out = Vec::new();
        for m in &self.matches {
            let TokenKind::Table { headers, rows } = &m.token.kind else {
                continue;
            };
            for row in rows {
                let mut object = Map::new();
                for (i, header) in headers.iter().enumerate() {
                    let cell = row.get(i).cloned().unwrap_or_default();
                    object.insert(header.clone(), Value::String(cell));
                }
                out.push(object);
            }
        }
        out
    }

    /// Everything in the document strictly before the first match. With no
    /// matches the result is empty.
    pub fn before(&self) -> MarkdownQuery {
        let matches = match self.matches.first() {
            Some(first) => index::index(&self.source)
                .into_iter()
                .filter(|r| r.end() <= first.start)
                .map(MatchedRange::from_range)
                .collect(),
            None => Vec::new(),
        };
        MarkdownQuery {
            source: self.source.clone(),
            matches,
        }
    }

    /// Everything in the document strictly after the last match. With no
    /// matches the result is empty.
    pub fn after(&self) -> MarkdownQuery {
        let matches = match self.matches.last() {
            Some(last) => index::index(&self.source)
                .into_iter()
                .filter(|r| r.start >= last.end())
                .map(MatchedRange::from_range)
                .collect(),
            None => Vec::new(),
        };
        MarkdownQuery {
            source: self.source.clone(),
            matches,
        }
    }

    /// Rebuilds the document with every matched span replaced by
    /// `replacement`. Matches nested inside an earlier match are skipped so
    /// overlapping spans are not substituted twice.
    pub fn replace(&self, replacement: &str) -> String {
        let mut spans: Vec<(usize, usize)> =
            self.matches.iter().map(|m| (m.start, m.end())).collect();
        spans.sort_unstable();

        let mut out = String::with_capacity(self.source.len());
        let mut pos = 0;
        let mut prev_end = 0;
        for (start, end) in spans {
            if start < prev_end {
                continue;
            }
            out.push_str(&self.source[pos..start]);
            out.push_str(replacement);
            pos = end;
            prev_end = end;
        }
        out.push_str(&self.source[pos..]);
        out
    }

    /// The candidate list the next segment chain resolves against.
    ///
    /// Section matches contribute themselves (flattened to their full span,
    /// so a re-query for the heading kind still finds the opening heading)
    /// plus their inner ranges; every other match passes through unchanged.
    fn expand_candidates(&self) -> Vec<IndexedRange> {
        let mut out = Vec::new();
        for m in &self.matches {
            out.push(IndexedRange {
                token: m.token.clone(),
                start: m.start,
                len: m.token.raw.len(),
            });
            if let Some(inner) = &m.inner {
                out.extend(inner.iter().cloned());
            }
        }
        out
    }
}
