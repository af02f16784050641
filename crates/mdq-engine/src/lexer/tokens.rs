/// One direct sub-item of a list token.
///
/// `raw` is the item's verbatim source span (nested sub-lists included);
/// `text` is the item's own flattened text.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub raw: String,
    pub text: String,
}

/// The kind of a block token, with its type-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// ATX or setext heading with its depth (1-6) and flattened text.
    Heading { depth: u8, text: String },
    /// Paragraph with flattened text.
    Paragraph { text: String },
    /// Pipe table: ordered header cell texts plus ordered rows of cell texts.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Fenced or indented code block; `text` is the content without fences.
    Code { text: String },
    /// List with its direct sub-items.
    List { items: Vec<ListEntry> },
    /// Blockquote with flattened text, paragraph breaks as newlines.
    Blockquote { text: String },
    /// Horizontal rule.
    Rule,
    /// A list's sub-item, derived by the resolver from a `List` token.
    /// Never produced by the lexer directly.
    Item { text: String },
}

/// A block token: its kind plus the verbatim source slice for its span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source substring covering this token's span. For indexed
    /// tokens this includes any trailing blank lines up to the next block,
    /// so that concatenating all token slices reproduces the document.
    pub raw: String,
}
