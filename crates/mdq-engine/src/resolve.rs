//! The range resolver: matches a chain of query segments against a
//! candidate list of indexed ranges.
//!
//! Resolution is recursive over the segment chain. Section segments open a
//! hierarchical scope (the heading plus everything up to the next heading of
//! equal-or-shallower depth) and resolve the remaining chain against each
//! section's own inner ranges independently; item segments derive synthetic
//! sub-item ranges from list tokens; every other kind is a flat filter.

use std::borrow::Cow;
use std::sync::Arc;

use crate::index::IndexedRange;
use crate::lexer::{Token, TokenKind};
use crate::selector::{QuerySegment, SelectorKind};

/// One resolved match: a token, its span, and (for sections only) the
/// ordered ranges the section owns.
#[derive(Debug, Clone)]
pub struct MatchedRange {
    pub token: Arc<Token>,
    pub start: usize,
    pub len: usize,
    /// Present only for section matches: the candidates strictly inside the
    /// section, exactly covering the span between the heading's own raw text
    /// and the section end.
    pub inner: Option<Vec<IndexedRange>>,
}

impl MatchedRange {
    /// Exclusive end offset of this match.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub(crate) fn from_range(range: IndexedRange) -> Self {
        Self {
            token: range.token,
            start: range.start,
            len: range.len,
            inner: None,
        }
    }
}

/// Resolves `segments` against `candidates`. An empty segment chain
/// resolves to an empty match set.
pub(crate) fn resolve(
    candidates: &[IndexedRange],
    segments: &[QuerySegment],
) -> Vec<MatchedRange> {
    let Some((segment, rest)) = segments.split_first() else {
        return Vec::new();
    };
    match segment.kind {
        SelectorKind::Section(depth) => resolve_sections(candidates, segment, depth, rest),
        SelectorKind::Item => resolve_items(candidates, segment, rest),
        _ => resolve_leaf(candidates, segment, rest),
    }
}

/// Opens a section at every matching heading and either returns the
/// sections or resolves the rest of the chain inside each one.
///
/// Per-section independence is the point: `section2 paragraph[0]` yields
/// one paragraph per matching section, not one paragraph globally.
fn resolve_sections(
    candidates: &[IndexedRange],
    segment: &QuerySegment,
    depth: Option<u8>,
    rest: &[QuerySegment],
) -> Vec<MatchedRange> {
    let mut sections = Vec::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let TokenKind::Heading { depth: d, text } = &candidate.token.kind else {
            continue;
        };
        if depth.is_some_and(|want| *d != want) {
            continue;
        }
        if let Some(matcher) = &segment.matcher {
            if !matcher.matches(text) {
                continue;
            }
        }

        // The section runs until the next heading of equal-or-shallower
        // depth, or the end of the candidate list.
        let mut inner = Vec::new();
        for follow in &candidates[i + 1..] {
            if let TokenKind::Heading { depth: fd, .. } = &follow.token.kind {
                if *fd <= *d {
                    break;
                }
            }
            inner.push(follow.clone());
        }
        let end = inner.last().map_or(candidate.end(), IndexedRange::end);
        sections.push(MatchedRange {
            token: candidate.token.clone(),
            start: candidate.start,
            len: end - candidate.start,
            inner: Some(inner),
        });
    }

    let sections = apply_position(sections, segment);
    if rest.is_empty() {
        return sections;
    }

    let mut out = Vec::new();
    for section in &sections {
        if let Some(inner) = &section.inner {
            out.extend(resolve(inner, rest));
        }
    }
    out
}

/// Derives synthetic item ranges from every list candidate.
///
/// Each entry's offset is found by scanning the owning list's verbatim span
/// left to right with a cursor that advances past each found item, which
/// keeps byte-identical duplicate items apart.
fn resolve_items(
    candidates: &[IndexedRange],
    segment: &QuerySegment,
    rest: &[QuerySegment],
) -> Vec<MatchedRange> {
    let mut found = Vec::new();
    for candidate in candidates {
        let TokenKind::List { items } = &candidate.token.kind else {
            continue;
        };
        let mut cursor = 0usize;
        for entry in items {
            let Some(rel) = candidate.token.raw[cursor..].find(&entry.raw) else {
                continue;
            };
            let item_start = cursor + rel;
            cursor = item_start + entry.raw.len();
            found.push(IndexedRange {
                token: Arc::new(Token {
                    kind: TokenKind::Item {
                        text: entry.text.clone(),
                    },
                    raw: entry.raw.clone(),
                }),
                start: candidate.start + item_start,
                len: entry.raw.len(),
            });
        }
    }

    let found = filter_matcher(found, segment);
    let found = apply_position(found, segment);
    if rest.is_empty() {
        found.into_iter().map(MatchedRange::from_range).collect()
    } else {
        // Items have no inner structure; chaining past `item` only matches
        // if the next kind happens to match the item ranges themselves.
        resolve(&found, rest)
    }
}

/// Flat filter for leaf selectors (headings, paragraphs, tables, ...).
fn resolve_leaf(
    candidates: &[IndexedRange],
    segment: &QuerySegment,
    rest: &[QuerySegment],
) -> Vec<MatchedRange> {
    let filtered: Vec<IndexedRange> = candidates
        .iter()
        .filter(|c| kind_matches(segment.kind, &c.token.kind))
        .cloned()
        .collect();
    let filtered = filter_matcher(filtered, segment);
    let filtered = apply_position(filtered, segment);
    if rest.is_empty() {
        filtered.into_iter().map(MatchedRange::from_range).collect()
    } else {
        resolve(&filtered, rest)
    }
}

fn kind_matches(selector: SelectorKind, kind: &TokenKind) -> bool {
    match selector {
        SelectorKind::Heading(depth) => match kind {
            TokenKind::Heading { depth: d, .. } => depth.is_none_or(|want| *d == want),
            _ => false,
        },
        SelectorKind::Paragraph => matches!(kind, TokenKind::Paragraph { .. }),
        SelectorKind::Table => matches!(kind, TokenKind::Table { .. }),
        SelectorKind::Code => matches!(kind, TokenKind::Code { .. }),
        SelectorKind::List => matches!(kind, TokenKind::List { .. }),
        SelectorKind::Blockquote => matches!(kind, TokenKind::Blockquote { .. }),
        SelectorKind::Rule => matches!(kind, TokenKind::Rule),
        SelectorKind::Item => matches!(kind, TokenKind::Item { .. }),
        // Sections are handled by resolve_sections, never as a leaf.
        SelectorKind::Section(_) => false,
    }
}

fn filter_matcher(candidates: Vec<IndexedRange>, segment: &QuerySegment) -> Vec<IndexedRange> {
    let Some(matcher) = &segment.matcher else {
        return candidates;
    };
    candidates
        .into_iter()
        .filter(|c| comparison_text(&c.token.kind).is_some_and(|text| matcher.matches(&text)))
        .collect()
}

fn apply_position<T>(items: Vec<T>, segment: &QuerySegment) -> Vec<T> {
    match &segment.position {
        Some(position) => position.apply(items),
        None => items,
    }
}

/// The text a matcher evaluates against, per token kind.
///
/// Lists and rules have no comparison text, so a matcher attached to them
/// never matches, negated or not.
fn comparison_text(kind: &TokenKind) -> Option<Cow<'_, str>> {
    match kind {
        TokenKind::Heading { text, .. }
        | TokenKind::Paragraph { text }
        | TokenKind::Code { text }
        | TokenKind::Blockquote { text }
        | TokenKind::Item { text } => Some(Cow::Borrowed(text.as_str())),
        TokenKind::Table { headers, .. } => Some(Cow::Owned(headers.join(", "))),
        TokenKind::List { .. } | TokenKind::Rule => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;
    use crate::selector;

    fn run(source: &str, selector: &str) -> Vec<MatchedRange> {
        let candidates = index::index(source);
        let segments = selector::parse(selector).unwrap();
        resolve(&candidates, &segments)
    }

    const DOC: &str = "\
# Title

Intro.

## API

API description.

### Endpoints

- GET /users
- POST /users

## Settings

Settings description.
";

    #[test]
    fn leaf_selector_filters_by_kind_and_depth() {
        assert_eq!(run(DOC, "heading").len(), 4);
        assert_eq!(run(DOC, "h2").len(), 2);
        assert_eq!(run(DOC, "h5").len(), 0);
        assert_eq!(run(DOC, "paragraph").len(), 3);
    }

    #[test]
    fn section_spans_until_next_equal_or_shallower_heading() {
        let sections = run(DOC, "section2");
        assert_eq!(sections.len(), 2);

        let api = &sections[0];
        let api_text = &DOC[api.start..api.end()];
        assert!(api_text.contains("API description."));
        assert!(api_text.contains("### Endpoints"));
        assert!(!api_text.contains("Settings"));

        let settings = &sections[1];
        let settings_text = &DOC[settings.start..settings.end()];
        assert!(settings_text.contains("Settings description."));
        assert!(!settings_text.contains("API"));
    }

    #[test]
    fn section_inner_ranges_cover_span_after_heading() {
        let sections = run(DOC, "section2");
        let api = &sections[0];
        let inner = api.inner.as_ref().unwrap();

        let mut offset = api.start + api.token.raw.len();
        for range in inner {
            assert_eq!(range.start, offset, "inner ranges must be contiguous");
            offset = range.end();
        }
        assert_eq!(offset, api.end(), "inner ranges must reach the section end");
    }

    #[test]
    fn section_with_no_content_is_just_its_heading() {
        let sections = run("## Lonely\n", "section");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].len, sections[0].token.raw.len());
        assert!(sections[0].inner.as_ref().unwrap().is_empty());
    }

    #[test]
    fn nested_sections_match_independently() {
        let sections = run(DOC, "section");
        // Title, API, Endpoints, Settings all open sections.
        assert_eq!(sections.len(), 4);
    }

    #[test]
    fn section_chain_resolves_per_section() {
        let matches = run(DOC, "section2 paragraph");
        assert_eq!(matches.len(), 2);
        assert!(DOC[matches[0].start..matches[0].end()].contains("API description."));
        assert!(DOC[matches[1].start..matches[1].end()].contains("Settings description."));
    }

    #[test]
    fn items_derive_from_lists_with_distinct_offsets() {
        let items = run(DOC, "item");
        assert_eq!(items.len(), 2);
        assert!(DOC[items[0].start..items[0].end()].contains("GET /users"));
        assert!(DOC[items[1].start..items[1].end()].contains("POST /users"));
    }

    #[test]
    fn duplicate_item_text_disambiguates_by_cursor_scan() {
        let md = "- dup\n- dup\n- dup\n";
        let items = run(md, "item");
        assert_eq!(items.len(), 3);
        let starts: Vec<usize> = items.iter().map(|m| m.start).collect();
        assert_eq!(starts, vec![0, 6, 12]);
    }

    #[test]
    fn item_matcher_filters_on_item_text() {
        let items = run(DOC, "item(~\"POST\")");
        assert_eq!(items.len(), 1);
        assert!(DOC[items[0].start..items[0].end()].contains("POST /users"));
    }

    #[test]
    fn matcher_on_list_or_rule_never_matches() {
        let md = "- one\n- two\n\n---\n";
        assert_eq!(run(md, "list").len(), 1);
        assert_eq!(run(md, "list(\"one\")").len(), 0);
        assert_eq!(run(md, "list(!\"one\")").len(), 0);
        assert_eq!(run(md, "hr").len(), 1);
        assert_eq!(run(md, "hr(~\"-\")").len(), 0);
    }

    #[test]
    fn table_matcher_compares_joined_headers() {
        let md = "| Name | Role |\n| --- | --- |\n| Ada | Engineer |\n";
        assert_eq!(run(md, "table(\"Name, Role\")").len(), 1);
        assert_eq!(run(md, "table(~\"Role\")").len(), 1);
        assert_eq!(run(md, "table(\"Ada\")").len(), 0, "cell text is not compared");
    }

    #[test]
    fn chaining_past_a_leaf_yields_nothing() {
        assert!(run(DOC, "paragraph table").is_empty());
        assert!(run(DOC, "item item").is_empty());
    }

    #[test]
    fn empty_segments_resolve_to_nothing() {
        assert!(run(DOC, "").is_empty());
    }
}
