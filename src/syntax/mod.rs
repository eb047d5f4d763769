//! Syntax highlighting
//!
//! This module provides the highlighting engine and its support types:
//! - Styles and the named style table
//! - Grammars built from rules, spans and rule-sets
//! - The per-line engine and the section model it produces
//! - Incremental per-document highlighting with cached span stacks
//! - A registry of built-in grammars

mod document;
mod engine;
mod highlighter;
mod registry;
mod rules;
mod section;
mod span_stack;
mod style;
mod tokens;

pub mod builtin;

pub use document::{StringDocument, TextSource};
pub use engine::{HighlightResult, HighlightingEngine};
pub use highlighter::{DocumentHighlighter, StateChangedListener};
pub use registry::GrammarRegistry;
pub use rules::{Grammar, Rule, RuleSet, RuleSetId, Span, SpanRef};
pub use section::{HighlightedLine, Section, StyledRun};
pub use span_stack::SpanStack;
pub use style::{Color, FontWeight, StyleAttributes};
pub use tokens::{StyleTable, TokenType};
