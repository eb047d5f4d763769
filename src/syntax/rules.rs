//! Grammar model for syntax highlighting
//!
//! A [`Grammar`] is an arena of [`RuleSet`]s. Each rule-set holds ordered
//! single-run [`Rule`]s and ordered multi-line [`Span`]s; a span switches
//! the active rule-set while it is open. Rule-sets refer to each other by
//! [`RuleSetId`], so recursive grammars (nested block comments, string
//! interpolation) need no reference cycles.
//!
//! Grammars are built once and then shared immutably behind an `Rc`.

use std::ops::Range;

use regex::Regex;

use super::span_stack::SpanStack;
use super::style::StyleAttributes;
use super::tokens::{StyleTable, TokenType};
use crate::error::Result;

/// Index of a rule-set inside its grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSetId(usize);

impl RuleSetId {
    /// The grammar's main rule-set
    pub const MAIN: RuleSetId = RuleSetId(0);
}

/// Identifies a span declaration: the rule-set it is declared in and its
/// position in that rule-set's span list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanRef {
    rule_set: RuleSetId,
    index: usize,
}

impl SpanRef {
    pub fn new(rule_set: RuleSetId, index: usize) -> Self {
        Self { rule_set, index }
    }

    /// Rule-set the span is declared in
    pub fn rule_set(&self) -> RuleSetId {
        self.rule_set
    }

    /// Position in the declaring rule-set's span list
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A single-run pattern rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Style for matched text; `None` consumes the text unstyled
    pub style: Option<StyleAttributes>,
}

impl Rule {
    /// Create a new rule
    pub fn new(pattern: &str, style: StyleAttributes) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            style: Some(style),
        })
    }

    /// Create a rule that consumes text without styling it
    pub fn unstyled(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            style: None,
        })
    }

    /// Find the first match in `text` at or after `start`
    pub fn find_at(&self, text: &str, start: usize) -> Option<Range<usize>> {
        if start > text.len() {
            return None;
        }
        self.pattern.find_at(text, start).map(|m| m.range())
    }
}

/// A bracketed construct that may run over several lines
#[derive(Debug, Clone)]
pub struct Span {
    /// Pattern that opens the span
    pub start: Regex,
    /// Pattern that closes the span
    pub end: Regex,
    /// Style of the opening delimiter
    pub start_style: Option<StyleAttributes>,
    /// Style of the whole span body
    pub span_style: Option<StyleAttributes>,
    /// Style of the closing delimiter
    pub end_style: Option<StyleAttributes>,
    /// Rule-set active inside the span; `None` means no rules at all
    pub rule_set: Option<RuleSetId>,
    /// Whether the span may continue past the end of its line
    pub multiline: bool,
    /// Whether `span_style` also covers the opening delimiter
    pub span_style_includes_start: bool,
    /// Whether `span_style` also covers the closing delimiter
    pub span_style_includes_end: bool,
}

impl Span {
    /// Create a multi-line span
    pub fn new(start_pattern: &str, end_pattern: &str) -> Result<Self> {
        Ok(Self {
            start: Regex::new(start_pattern)?,
            end: Regex::new(end_pattern)?,
            start_style: None,
            span_style: None,
            end_style: None,
            rule_set: None,
            multiline: true,
            span_style_includes_start: true,
            span_style_includes_end: true,
        })
    }

    /// Create a span that always closes by the end of its line
    pub fn single_line(start_pattern: &str, end_pattern: &str) -> Result<Self> {
        let bounded = format!("(?:{end_pattern})|$");
        let mut span = Self::new(start_pattern, &bounded)?;
        span.multiline = false;
        Ok(span)
    }

    /// Builder: set the body style
    pub fn with_style(mut self, style: StyleAttributes) -> Self {
        self.span_style = Some(style);
        self
    }

    /// Builder: set the opening delimiter style
    pub fn with_start_style(mut self, style: StyleAttributes) -> Self {
        self.start_style = Some(style);
        self
    }

    /// Builder: set the closing delimiter style
    pub fn with_end_style(mut self, style: StyleAttributes) -> Self {
        self.end_style = Some(style);
        self
    }

    /// Builder: set the rule-set active inside the span
    pub fn with_rule_set(mut self, rule_set: RuleSetId) -> Self {
        self.rule_set = Some(rule_set);
        self
    }

    /// Builder: keep the body style off the opening delimiter
    pub fn excluding_start(mut self) -> Self {
        self.span_style_includes_start = false;
        self
    }

    /// Builder: keep the body style off the closing delimiter
    pub fn excluding_end(mut self) -> Self {
        self.span_style_includes_end = false;
        self
    }

    /// Find the opening delimiter at or after `start`
    pub fn find_start(&self, text: &str, start: usize) -> Option<Range<usize>> {
        if start > text.len() {
            return None;
        }
        self.start.find_at(text, start).map(|m| m.range())
    }

    /// Find the closing delimiter at or after `start`
    pub fn find_end(&self, text: &str, start: usize) -> Option<Range<usize>> {
        if start > text.len() {
            return None;
        }
        self.end.find_at(text, start).map(|m| m.range())
    }
}

/// An ordered set of rules and spans, active until a span changes context
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Name for debugging
    pub name: String,
    /// Single-run rules; earlier rules win ties
    pub rules: Vec<Rule>,
    /// Spans; earlier spans win ties
    pub spans: Vec<Span>,
}

impl RuleSet {
    /// Create an empty rule-set
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Append a rule
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append a span
    pub fn add_span(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Builder: append a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    /// Builder: append a span
    pub fn with_span(mut self, span: Span) -> Self {
        self.add_span(span);
        self
    }

    /// Check if the rule-set has neither rules nor spans
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.spans.is_empty()
    }
}

/// A complete highlighting grammar
#[derive(Debug, Clone)]
pub struct Grammar {
    /// Grammar name (e.g., "Rust", "C")
    pub name: String,
    /// File extensions (e.g., ["rs"], ["py", "pyw"])
    pub extensions: Vec<String>,
    rule_sets: Vec<RuleSet>,
    empty: RuleSet,
    styles: StyleTable,
}

impl Grammar {
    /// Create a grammar with an empty main rule-set and default styles
    pub fn new(name: &str) -> Self {
        Self::with_styles(name, StyleTable::default())
    }

    /// Create a grammar resolving named styles through `styles`
    pub fn with_styles(name: &str, styles: StyleTable) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            rule_sets: vec![RuleSet::new(name)],
            empty: RuleSet::new("empty"),
            styles,
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Add a rule-set and return its id
    pub fn add_rule_set(&mut self, rule_set: RuleSet) -> RuleSetId {
        self.rule_sets.push(rule_set);
        RuleSetId(self.rule_sets.len() - 1)
    }

    /// The main rule-set, active when no span is open
    pub fn main(&self) -> &RuleSet {
        &self.rule_sets[0]
    }

    /// Mutable access to the main rule-set
    pub fn main_mut(&mut self) -> &mut RuleSet {
        &mut self.rule_sets[0]
    }

    /// Look up a rule-set by id
    pub fn rule_set(&self, id: RuleSetId) -> Option<&RuleSet> {
        self.rule_sets.get(id.0)
    }

    /// Mutable lookup of a rule-set by id
    pub fn rule_set_mut(&mut self, id: RuleSetId) -> Option<&mut RuleSet> {
        self.rule_sets.get_mut(id.0)
    }

    /// Look up a span declaration
    pub fn span(&self, span: SpanRef) -> Option<&Span> {
        self.rule_set(span.rule_set)?.spans.get(span.index)
    }

    /// Resolve a rule-set id; `None` (and unknown ids) give the empty set
    pub fn resolve(&self, id: Option<RuleSetId>) -> &RuleSet {
        id.and_then(|id| self.rule_set(id)).unwrap_or(&self.empty)
    }

    /// Id of the rule-set active at the top of `stack`; `None` when the
    /// innermost span has no rule-set of its own
    pub fn active_rule_set_id(&self, stack: &SpanStack) -> Option<RuleSetId> {
        match stack.peek() {
            None => Some(RuleSetId::MAIN),
            Some(top) => self.span(top).and_then(|span| span.rule_set),
        }
    }

    /// Rule-set active at the top of `stack`
    pub fn active_rule_set(&self, stack: &SpanStack) -> &RuleSet {
        self.resolve(self.active_rule_set_id(stack))
    }

    /// Look up a named style
    pub fn named_style(&self, name: &str) -> Option<StyleAttributes> {
        self.styles.get(name)
    }

    /// Style for a standard token type
    pub fn style(&self, token_type: TokenType) -> StyleAttributes {
        self.styles.token(token_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::style::Color;

    #[test]
    fn test_rule_find_at() {
        let rule = Rule::new(r"\d+", StyleAttributes::fg(Color::Cyan)).unwrap();
        assert_eq!(rule.find_at("abc 123 def", 0), Some(4..7));
        assert_eq!(rule.find_at("abc 123 def", 5), Some(5..7));
        assert_eq!(rule.find_at("no numbers", 0), None);
    }

    #[test]
    fn test_rule_find_at_keeps_word_boundary_context() {
        let rule = Rule::new(r"\bif\b", StyleAttributes::default()).unwrap();
        // "if" inside "elif" must not match even when searching from inside it
        assert_eq!(rule.find_at("elif x", 2), None);
        assert_eq!(rule.find_at("x if", 1), Some(2..4));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Rule::new(r"(unclosed", StyleAttributes::default()).is_err());
        assert!(Span::new(r"/\*", r"[").is_err());
    }

    #[test]
    fn test_span_delimiters() {
        let span = Span::new(r"/\*", r"\*/").unwrap();
        assert!(span.multiline);
        assert_eq!(span.find_start("/* comment */", 0), Some(0..2));
        assert_eq!(span.find_end("/* comment */", 2), Some(11..13));
    }

    #[test]
    fn test_single_line_span_closes_at_line_end() {
        let span = Span::single_line("\"", "\"").unwrap();
        assert!(!span.multiline);
        assert_eq!(span.find_end("\"abc\" x", 1), Some(4..5));
        assert_eq!(span.find_end("\"abc", 1), Some(4..4));
    }

    #[test]
    fn test_grammar_rule_set_arena() {
        let mut grammar = Grammar::new("Test");
        let strings = grammar.add_rule_set(RuleSet::new("string"));
        grammar.main_mut().add_span(
            Span::new("\"", "\"")
                .unwrap()
                .with_rule_set(strings),
        );
        grammar.main_mut().add_span(Span::new("'", "'").unwrap());

        let string_span = SpanRef::new(RuleSetId::MAIN, 0);
        let char_span = SpanRef::new(RuleSetId::MAIN, 1);

        let stack = SpanStack::empty();
        assert_eq!(grammar.active_rule_set(&stack).name, "Test");

        let inside = stack.push(string_span);
        assert_eq!(grammar.active_rule_set(&inside).name, "string");

        let inside_char = stack.push(char_span);
        assert_eq!(grammar.active_rule_set(&inside_char).name, "empty");

        assert!(grammar.span(SpanRef::new(RuleSetId::MAIN, 9)).is_none());
    }

    #[test]
    fn test_named_style() {
        let grammar = Grammar::new("Test");
        assert_eq!(
            grammar.named_style("Comment"),
            Some(TokenType::Comment.default_style())
        );
        assert_eq!(grammar.named_style("Nope"), None);
    }
}
