//! Error types for spanlight

use thiserror::Error;

/// Result type alias for highlighting operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Highlighter has been disposed")]
    UseAfterDispose,

    #[error("Reentrant highlighting: a highlight pass is already running on this document")]
    ReentrantHighlighting,

    #[error("Unbalanced batch: {0}")]
    UnbalancedBatch(&'static str),

    #[error("Malformed grammar: rule matched zero characters (pattern: {pattern})")]
    ZeroLengthRule { pattern: String },

    #[error("Malformed grammar: span matched zero characters (start: {start}, end: {end})")]
    ZeroLengthSpan { start: String, end: String },

    #[error("Line {line} out of range ({min}..={max})")]
    LineOutOfRange { line: usize, min: usize, max: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Section {index} lies outside its line")]
    SectionOutOfBounds { index: usize },

    #[error("Sections {first} and {second} overlap or are incorrectly sorted")]
    SectionsOverlap { first: usize, second: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for HighlightError {
    fn from(err: toml::de::Error) -> Self {
        HighlightError::Config(err.to_string())
    }
}
