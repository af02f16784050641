use thiserror::Error;

/// A `regex` matcher whose pattern text is not a valid regular expression.
///
/// This is the only caller error the engine signals: malformed selector
/// syntax is skipped and absent matches propagate as empty result sets.
#[derive(Debug, Error)]
#[error("invalid regex pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}
