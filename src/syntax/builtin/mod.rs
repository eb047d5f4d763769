//! Built-in grammars
//!
//! Grammars for common languages, resolved against a [`StyleTable`] so that
//! user style overrides apply to them.

mod c;
mod python;
mod rust;
mod toml_lang;

pub use c::c_grammar;
pub use python::python_grammar;
pub use rust::rust_grammar;
pub use toml_lang::toml_grammar;

use crate::error::Result;
use crate::syntax::rules::{Grammar, Rule, RuleSet, Span};
use crate::syntax::tokens::{StyleTable, TokenType};

/// Build every built-in grammar
pub fn all_grammars(styles: &StyleTable) -> Result<Vec<Grammar>> {
    Ok(vec![
        rust_grammar(styles)?,
        c_grammar(styles)?,
        python_grammar(styles)?,
        toml_grammar(styles)?,
    ])
}

/// A rule styled as a token type
fn rule(styles: &StyleTable, pattern: &str, token_type: TokenType) -> Result<Rule> {
    Rule::new(pattern, styles.token(token_type))
}

/// A span that closes where its opening match ends, so a whole token
/// competes with other span openers by position
fn token_span(styles: &StyleTable, pattern: &str, token_type: TokenType) -> Result<Span> {
    Ok(Span::new(pattern, "")?.with_start_style(styles.token(token_type)))
}

/// Rule-set for comment bodies: highlights TODO-style markers
fn comment_markers(styles: &StyleTable) -> Result<RuleSet> {
    let marker = rule(styles, r"\b(TODO|FIXME|XXX|HACK)\b", TokenType::Marker)?;
    Ok(RuleSet::new("comment").with_rule(marker))
}

/// Rule-set for string bodies: a backslash escapes the next character
fn escapes(styles: &StyleTable) -> Result<RuleSet> {
    let escape = Span::single_line(r"\\", ".")?.with_style(styles.token(TokenType::Special));
    Ok(RuleSet::new("escapes").with_span(escape))
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::rc::Rc;

    use crate::syntax::engine::HighlightingEngine;
    use crate::syntax::rules::Grammar;
    use crate::syntax::span_stack::SpanStack;
    use crate::syntax::style::StyleAttributes;
    use crate::syntax::tokens::{StyleTable, TokenType};

    /// Highlight `lines` in order; returns `(offset, length, style)` per
    /// line and the final span stack
    pub fn highlight(
        grammar: Grammar,
        lines: &[&str],
    ) -> (Vec<Vec<(usize, usize, StyleAttributes)>>, SpanStack) {
        let engine = HighlightingEngine::new(Rc::new(grammar));
        let mut stack = SpanStack::empty();
        let mut out = Vec::new();
        for (i, text) in lines.iter().enumerate() {
            let result = engine.highlight_line(&stack, i + 1, 0, text).unwrap();
            result.line.validate().unwrap();
            out.push(
                result
                    .line
                    .sections
                    .iter()
                    .map(|s| (s.offset, s.length, s.style))
                    .collect(),
            );
            stack = result.end_stack;
        }
        (out, stack)
    }

    pub fn style(token_type: TokenType) -> StyleAttributes {
        StyleTable::default().token(token_type)
    }
}
