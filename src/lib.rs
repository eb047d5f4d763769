//! spanlight - incremental regex-driven syntax highlighting for text editors
//!
//! A [`Grammar`] describes a language as rules (single matches) and spans
//! (delimited regions that may cross lines and switch rule-sets). The
//! [`DocumentHighlighter`] runs a grammar over a [`TextSource`] one line at
//! a time, caching the span stack at every line end so that edits only
//! cost a rescan from the first changed line.

pub mod config;
pub mod error;
pub mod syntax;

pub use config::Config;
pub use error::{HighlightError, Result};
pub use syntax::{
    Color, DocumentHighlighter, FontWeight, Grammar, GrammarRegistry, HighlightedLine,
    HighlightingEngine, Rule, RuleSet, Span, SpanStack, StringDocument, StyleAttributes,
    StyleTable, StyledRun, TextSource, TokenType,
};
