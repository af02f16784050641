//! Block-level lexer built on pulldown-cmark.
//!
//! The engine treats block tokenization as an external concern: this module
//! adapts pulldown-cmark's offset iterator into an ordered sequence of
//! top-level block tokens, each carrying its byte range in the source plus
//! the type-specific payload the resolver matches against. Malformed input
//! never errors; unrecognized top-level constructs (raw HTML blocks and the
//! like) fall back to paragraph tokens.

pub mod tokens;

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

pub use tokens::{ListEntry, Token, TokenKind};

/// A lexed top-level block before span normalization: the kind payload plus
/// the byte range reported by the underlying parser.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

/// Lex `source` into its ordered top-level blocks.
///
/// Ranges come straight from pulldown-cmark and are ascending and
/// non-overlapping, but may leave gaps (blank lines between blocks); the
/// indexer widens them into an exact partition of the document.
pub fn lex(source: &str) -> Vec<RawBlock> {
    let mut events = Parser::new_ext(source, Options::ENABLE_TABLES).into_offset_iter();
    let mut blocks = Vec::new();

    while let Some((event, range)) = events.next() {
        let kind = match event {
            Event::Start(Tag::Heading { level, .. }) => TokenKind::Heading {
                depth: heading_depth(level),
                text: collect_text(&mut events).trim().to_string(),
            },
            Event::Start(Tag::Paragraph) => TokenKind::Paragraph {
                text: collect_text(&mut events).trim().to_string(),
            },
            Event::Start(Tag::Table(_)) => lex_table(&mut events),
            Event::Start(Tag::CodeBlock(_)) => TokenKind::Code {
                text: collect_text(&mut events),
            },
            Event::Start(Tag::List(_)) => lex_list(source, &mut events),
            Event::Start(Tag::BlockQuote(_)) => TokenKind::Blockquote {
                text: collect_text(&mut events).trim().to_string(),
            },
            Event::Rule => TokenKind::Rule,
            // Anything else that opens at the top level (raw HTML blocks,
            // metadata) is treated as an opaque paragraph run.
            Event::Start(_) => TokenKind::Paragraph {
                text: collect_text(&mut events).trim().to_string(),
            },
            _ => continue,
        };
        blocks.push(RawBlock { kind, range });
    }

    blocks
}

fn heading_depth(level: pulldown_cmark::HeadingLevel) -> u8 {
    use pulldown_cmark::HeadingLevel::*;
    match level {
        H1 => 1,
        H2 => 2,
        H3 => 3,
        H4 => 4,
        H5 => 5,
        H6 => 6,
    }
}

/// Flattens the inline content of the block whose `Start` was just consumed.
///
/// Text and code literals are concatenated, soft breaks become spaces, hard
/// breaks become newlines, and inner paragraph boundaries (blockquotes,
/// loose lists) become newlines. Consumes events through the matching `End`.
fn collect_text<'a, I>(events: &mut I) -> String
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    let mut out = String::new();
    let mut depth = 1usize;

    for (event, _) in events.by_ref() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(TagEnd::Paragraph) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                out.push('\n');
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(t) => out.push_str(&t),
            Event::Code(t) => out.push_str(&t),
            Event::Html(t) | Event::InlineHtml(t) => out.push_str(&t),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            _ => {}
        }
    }

    out
}

/// Consumes a table body, splitting header-row cells from data-row cells.
fn lex_table<'a, I>(events: &mut I) -> TokenKind
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    let mut headers = Vec::new();
    let mut rows = Vec::new();
    let mut current: Option<Vec<String>> = None;
    let mut in_head = false;

    while let Some((event, _)) = events.next() {
        match event {
            Event::Start(Tag::TableHead) => in_head = true,
            Event::End(TagEnd::TableHead) => in_head = false,
            Event::Start(Tag::TableRow) => current = Some(Vec::new()),
            Event::End(TagEnd::TableRow) => {
                if let Some(row) = current.take() {
                    rows.push(row);
                }
            }
            Event::Start(Tag::TableCell) => {
                let cell = collect_text(events).trim().to_string();
                if in_head {
                    headers.push(cell);
                } else if let Some(row) = current.as_mut() {
                    row.push(cell);
                }
            }
            Event::End(TagEnd::Table) => break,
            _ => {}
        }
    }

    TokenKind::Table { headers, rows }
}

/// Consumes a top-level list, collecting its direct items.
///
/// Each direct item keeps its verbatim source span (which still contains any
/// nested sub-lists) alongside its own flattened text; nested sub-lists do
/// not contribute separate entries.
fn lex_list<'a, I>(source: &str, events: &mut I) -> TokenKind
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    let mut items = Vec::new();
    let mut depth = 1usize;

    while let Some((event, range)) = events.next() {
        match event {
            Event::Start(Tag::Item) if depth == 1 => {
                let text = lex_item_text(events);
                items.push(ListEntry {
                    raw: source[range].to_string(),
                    text,
                });
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }

    TokenKind::List { items }
}

/// Flattens one list item's own text, excluding nested sub-list content.
fn lex_item_text<'a, I>(events: &mut I) -> String
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    let mut out = String::new();
    let mut depth = 1usize;
    let mut list_depth = 0usize;

    for (event, _) in events.by_ref() {
        match event {
            Event::Start(Tag::List(_)) => {
                depth += 1;
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                depth -= 1;
                list_depth -= 1;
            }
            Event::Start(_) => depth += 1,
            Event::End(TagEnd::Paragraph) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                if list_depth == 0 {
                    out.push('\n');
                }
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(t) if list_depth == 0 => out.push_str(&t),
            Event::Code(t) if list_depth == 0 => out.push_str(&t),
            Event::SoftBreak if list_depth == 0 => out.push(' '),
            Event::HardBreak if list_depth == 0 => out.push('\n'),
            _ => {}
        }
    }

    out.trim().to_string()
}
