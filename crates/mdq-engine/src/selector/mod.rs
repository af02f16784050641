//! The `mdq` selector language: types for parsed query segments.
//!
//! A selector string is a whitespace-separated chain of segments, each
//! naming a token kind, an optional text matcher and an optional
//! index-or-slice position filter, e.g. `section2("API") paragraph[0]`.

pub mod parser;

use regex::Regex;

pub use parser::parse;

/// The kind of token a segment selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// `heading` (any depth) or `h1`..`h6` (fixed depth).
    Heading(Option<u8>),
    Paragraph,
    Table,
    Code,
    List,
    Blockquote,
    /// `hr`.
    Rule,
    /// `item`: sub-items of list tokens in the current candidate set.
    Item,
    /// `section` (any depth) or `section1`..`section6`: a heading plus
    /// everything up to the next heading of equal-or-shallower depth.
    Section(Option<u8>),
}

/// How a matcher compares against a token's text.
#[derive(Debug, Clone)]
pub enum MatchMode {
    Exact,
    Contains,
    /// Always compiled case-insensitive; any flags written in the selector
    /// are parsed but discarded.
    Regex(Regex),
}

/// A text predicate attached to a segment, e.g. `("API")`, `(~"user")`,
/// `(!/v[0-9]+/)`.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    pub mode: MatchMode,
    pub value: String,
    pub negated: bool,
}

impl TextMatcher {
    pub(crate) fn matches(&self, text: &str) -> bool {
        let hit = match &self.mode {
            MatchMode::Exact => text == self.value,
            MatchMode::Contains => text.contains(&self.value),
            MatchMode::Regex(re) => re.is_match(text),
        };
        hit != self.negated
    }
}

/// A positional filter: a single index (negative counts from the end) or an
/// open-ended slice with standard array-slice semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Index(i64),
    Slice { from: Option<i64>, to: Option<i64> },
}

impl Position {
    /// Applies this filter to an already text-filtered candidate list.
    /// Out-of-range indexes and degenerate slices yield an empty list.
    pub(crate) fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let len = items.len() as i64;
        match *self {
            Position::Index(i) => {
                let idx = if i < 0 { len + i } else { i };
                if idx < 0 || idx >= len {
                    return Vec::new();
                }
                let idx = idx as usize;
                items.into_iter().skip(idx).take(1).collect()
            }
            Position::Slice { from, to } => {
                let clamp = |n: i64| {
                    if n < 0 {
                        (len + n).max(0) as usize
                    } else {
                        n.min(len) as usize
                    }
                };
                let from = clamp(from.unwrap_or(0));
                let to = clamp(to.unwrap_or(len));
                if from >= to {
                    return Vec::new();
                }
                items.into_iter().skip(from).take(to - from).collect()
            }
        }
    }
}

/// One stage of a compound selector query.
#[derive(Debug, Clone)]
pub struct QuerySegment {
    pub kind: SelectorKind,
    pub matcher: Option<TextMatcher>,
    pub position: Option<Position>,
}
