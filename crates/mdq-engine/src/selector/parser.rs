//! Hand-rolled parser for selector strings.
//!
//! The lexer side is deliberately permissive: a character that cannot start
//! an identifier is skipped, an unknown identifier drops its whole segment,
//! and a matcher or bracket body that fits no recognized shape is consumed
//! without effect. The only hard error is an invalid regex pattern.

use regex::RegexBuilder;

use super::{MatchMode, Position, QuerySegment, SelectorKind, TextMatcher};
use crate::error::PatternError;

/// A byte cursor over the selector string.
///
/// Delimiters and identifiers are ASCII, so byte peeks are safe; arbitrary
/// content (quoted values, skipped junk) is always advanced char-by-char to
/// keep slice boundaries valid.
struct Cursor<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Advances by one byte. Only valid when the current byte is ASCII.
    fn bump(&mut self) {
        self.i += 1;
    }

    /// Advances past the current char, whatever its width.
    fn bump_char(&mut self) -> Option<char> {
        let ch = self.s[self.i..].chars().next()?;
        self.i += ch.len_utf8();
        Some(ch)
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parses a selector string into its ordered query segments.
pub fn parse(input: &str) -> Result<Vec<QuerySegment>, PatternError> {
    let mut cur = Cursor::new(input);
    let mut segments = Vec::new();

    while let Some(b) = cur.peek() {
        if b.is_ascii_whitespace() {
            cur.bump();
        } else if is_ident_byte(b) {
            if let Some(segment) = parse_segment(&mut cur)? {
                segments.push(segment);
            }
        } else {
            // Permissive lexer: skip anything that cannot start an identifier.
            cur.bump_char();
        }
    }

    Ok(segments)
}

/// Parses one segment: identifier, optional `(matcher)`, any brackets.
/// Returns `None` for an unknown identifier (the segment is consumed but
/// contributes nothing).
fn parse_segment(cur: &mut Cursor<'_>) -> Result<Option<QuerySegment>, PatternError> {
    let start = cur.i;
    while cur.peek().is_some_and(is_ident_byte) {
        cur.bump();
    }
    let kind = selector_kind(&cur.s[start..cur.i]);

    let mut matcher = None;
    if cur.peek() == Some(b'(') {
        cur.bump();
        matcher = parse_matcher(cur)?;
    }

    let mut position = None;
    while cur.peek() == Some(b'[') {
        cur.bump();
        // Last recognized bracket shape wins.
        if let Some(p) = parse_bracket(cur) {
            position = Some(p);
        }
    }

    Ok(kind.map(|kind| QuerySegment {
        kind,
        matcher,
        position,
    }))
}

fn selector_kind(ident: &str) -> Option<SelectorKind> {
    match ident {
        "heading" => Some(SelectorKind::Heading(None)),
        "paragraph" => Some(SelectorKind::Paragraph),
        "table" => Some(SelectorKind::Table),
        "code" => Some(SelectorKind::Code),
        "list" => Some(SelectorKind::List),
        "blockquote" => Some(SelectorKind::Blockquote),
        "hr" => Some(SelectorKind::Rule),
        "item" => Some(SelectorKind::Item),
        "section" => Some(SelectorKind::Section(None)),
        _ => {
            if let Some(depth) = ident.strip_prefix('h').and_then(single_depth) {
                return Some(SelectorKind::Heading(Some(depth)));
            }
            if let Some(depth) = ident.strip_prefix("section").and_then(single_depth) {
                return Some(SelectorKind::Section(Some(depth)));
            }
            None
        }
    }
}

fn single_depth(rest: &str) -> Option<u8> {
    match rest.as_bytes() {
        [d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Parses the matcher body after an opening `(`, consuming through the
/// closing `)` whether or not the body fits a recognized shape.
fn parse_matcher(cur: &mut Cursor<'_>) -> Result<Option<TextMatcher>, PatternError> {
    let negated = if cur.peek() == Some(b'!') {
        cur.bump();
        true
    } else {
        false
    };

    let matcher = match cur.peek() {
        Some(b'~') => {
            cur.bump();
            quoted(cur).map(|value| TextMatcher {
                mode: MatchMode::Contains,
                value,
                negated,
            })
        }
        Some(b'/') => {
            cur.bump();
            match delimited(cur, b'/') {
                Some(body) => {
                    // Flag letters are consumed but discarded: evaluation is
                    // always case-insensitive, regardless of what was written.
                    while cur.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
                        cur.bump();
                    }
                    let regex = RegexBuilder::new(&body)
                        .case_insensitive(true)
                        .build()
                        .map_err(|source| PatternError {
                            pattern: body.clone(),
                            source,
                        })?;
                    Some(TextMatcher {
                        mode: MatchMode::Regex(regex),
                        value: body,
                        negated,
                    })
                }
                None => None,
            }
        }
        Some(b'"') | Some(b'\'') => quoted(cur).map(|value| TextMatcher {
            mode: MatchMode::Exact,
            value,
            negated,
        }),
        _ => None,
    };

    while let Some(b) = cur.peek() {
        if b == b')' {
            cur.bump();
            break;
        }
        cur.bump_char();
    }

    Ok(matcher)
}

/// Reads a `"…"` or `'…'` value at the cursor.
fn quoted(cur: &mut Cursor<'_>) -> Option<String> {
    let quote = cur.peek()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    cur.bump();
    delimited(cur, quote)
}

/// Reads up to the next `delim`, honoring `\` as an escape for the
/// delimiter only. Returns `None` if the delimiter never closes.
fn delimited(cur: &mut Cursor<'_>, delim: u8) -> Option<String> {
    let mut out = String::new();
    loop {
        match cur.peek() {
            None => return None,
            Some(b) if b == delim => {
                cur.bump();
                return Some(out);
            }
            Some(b'\\') => {
                cur.bump();
                if cur.peek() == Some(delim) {
                    cur.bump();
                    out.push(delim as char);
                } else {
                    out.push('\\');
                }
            }
            Some(_) => {
                if let Some(ch) = cur.bump_char() {
                    out.push(ch);
                }
            }
        }
    }
}

/// Parses a bracket body after an opening `[`, consuming through `]`.
/// Unrecognized bodies yield `None` and are otherwise ignored.
fn parse_bracket(cur: &mut Cursor<'_>) -> Option<Position> {
    let start = cur.i;
    while let Some(b) = cur.peek() {
        if b == b']' {
            break;
        }
        cur.bump_char();
    }
    let body = &cur.s[start..cur.i];
    if cur.peek() == Some(b']') {
        cur.bump();
    }
    position_from_body(body)
}

fn position_from_body(body: &str) -> Option<Position> {
    if let Ok(index) = body.parse::<i64>() {
        return Some(Position::Index(index));
    }
    if body.bytes().filter(|&b| b == b':').count() == 1 {
        let (from, to) = body.split_once(':')?;
        let parse_side = |side: &str| -> Option<Option<i64>> {
            if side.is_empty() {
                Some(None)
            } else {
                side.parse::<i64>().ok().map(Some)
            }
        };
        return Some(Position::Slice {
            from: parse_side(from)?,
            to: parse_side(to)?,
        });
    }
    None
}
