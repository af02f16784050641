pub mod error;
pub mod index;
pub mod lexer;
pub mod query;
pub mod resolve;
pub mod selector;

// Re-export key types for easier usage
pub use error::PatternError;
pub use index::IndexedRange;
pub use lexer::{ListEntry, Token, TokenKind};
pub use query::MarkdownQuery;
pub use resolve::MatchedRange;
pub use selector::{MatchMode, Position, QuerySegment, SelectorKind, TextMatcher};
