//! Per-line highlighting engine
//!
//! The engine walks one line of text against a [`Grammar`], starting from
//! the span stack left open by the previous line, and produces the styled
//! sections of the line together with the span stack for the next line.
//!
//! Two modes share the same walk:
//! - [`HighlightingEngine::scan_line`] only tracks spans (cheap, used to
//!   bring the span stack up to date for lines nobody is looking at)
//! - [`HighlightingEngine::highlight_line`] also applies the rules and
//!   builds sections

use std::mem;
use std::ops::Range;
use std::rc::Rc;

use tracing::{trace, warn};

use super::rules::{Grammar, RuleSet, Span, SpanRef};
use super::section::{HighlightedLine, Section};
use super::span_stack::SpanStack;
use super::style::StyleAttributes;
use crate::error::{HighlightError, Result};

/// Result of highlighting a single line
#[derive(Debug)]
pub struct HighlightResult {
    /// Styled sections of the line
    pub line: HighlightedLine,
    /// Span stack at end of line (input for the next line)
    pub end_stack: SpanStack,
}

/// Runs a grammar over individual lines
#[derive(Debug, Clone)]
pub struct HighlightingEngine {
    grammar: Rc<Grammar>,
}

impl HighlightingEngine {
    /// Create an engine for a grammar
    pub fn new(grammar: Rc<Grammar>) -> Self {
        Self { grammar }
    }

    /// The grammar this engine runs
    pub fn grammar(&self) -> &Rc<Grammar> {
        &self.grammar
    }

    /// Compute the span stack at the end of a line without building sections
    pub fn scan_line(&self, stack: &SpanStack, text: &str) -> Result<SpanStack> {
        let mut scanner = Scanner::new(&self.grammar, stack.clone(), text, None);
        scanner.run()?;
        Ok(scanner.stack)
    }

    /// Highlight a line starting at absolute offset `line_offset`
    pub fn highlight_line(
        &self,
        stack: &SpanStack,
        line_number: usize,
        line_offset: usize,
        text: &str,
    ) -> Result<HighlightResult> {
        let builder = SectionBuilder::new(line_offset);
        let mut scanner = Scanner::new(&self.grammar, stack.clone(), text, Some(builder));
        scanner.run()?;

        let mut line = HighlightedLine::new(line_number, line_offset, text.len());
        if let Some(builder) = scanner.builder.take() {
            line.sections = builder.sections;
        }
        Ok(HighlightResult {
            line,
            end_stack: scanner.stack,
        })
    }
}

/// Next match of one pattern, computed lazily and reused until the
/// cursor moves past it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingMatch {
    Unknown,
    NoMatch,
    Found(usize, usize),
}

impl PendingMatch {
    fn from_range(range: Option<Range<usize>>) -> Self {
        match range {
            Some(r) => PendingMatch::Found(r.start, r.end),
            None => PendingMatch::NoMatch,
        }
    }

    fn is_stale(&self, pos: usize) -> bool {
        match *self {
            PendingMatch::Unknown => true,
            PendingMatch::NoMatch => false,
            PendingMatch::Found(start, _) => start < pos,
        }
    }
}

/// What the nearest match does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FirstMatch {
    /// Opens the span at this index of the active rule-set
    Open(usize),
    /// Closes the innermost open span
    Close,
}

/// Pick the nearest match. Earlier entries win ties; the end match only
/// wins when strictly earlier than every start match.
fn first_match(
    matches: &[PendingMatch],
    end: Option<Range<usize>>,
) -> Option<(FirstMatch, Range<usize>)> {
    let mut best: Option<(FirstMatch, Range<usize>)> = None;
    for (index, pending) in matches.iter().enumerate() {
        if let PendingMatch::Found(start, stop) = *pending {
            if best.as_ref().map_or(true, |(_, r)| start < r.start) {
                best = Some((FirstMatch::Open(index), start..stop));
            }
        }
    }
    match end {
        Some(range) if best.as_ref().map_or(true, |(_, r)| range.start < r.start) => {
            Some((FirstMatch::Close, range))
        }
        _ => best,
    }
}

/// Shadow stack of open styled runs
#[derive(Debug)]
struct SectionBuilder {
    line_offset: usize,
    sections: Vec<Section>,
    /// Mirrors pushes; `None` entries are unstyled placeholders
    open: Vec<Option<usize>>,
    /// Most recently closed run, candidate for reopening
    last_closed: Option<usize>,
}

impl SectionBuilder {
    fn new(line_offset: usize) -> Self {
        Self {
            line_offset,
            sections: Vec::new(),
            open: Vec::new(),
            last_closed: None,
        }
    }

    fn push(&mut self, style: Option<StyleAttributes>, pos: usize) {
        let Some(style) = style else {
            self.open.push(None);
            return;
        };
        let offset = self.line_offset + pos;

        if let Some(index) = self.last_closed.take() {
            let previous = &self.sections[index];
            if previous.style == style && previous.end() == offset {
                self.open.push(Some(index));
                return;
            }
        }

        self.sections.push(Section::new(offset, 0, style));
        self.open.push(Some(self.sections.len() - 1));
    }

    fn pop(&mut self, pos: usize) {
        let Some(Some(index)) = self.open.pop() else {
            return;
        };
        let end = self.line_offset + pos;
        let section = &mut self.sections[index];
        section.length = end - section.offset;

        if section.length == 0 {
            // Nothing opened after it can have survived, so it is the last one
            debug_assert_eq!(index + 1, self.sections.len());
            self.sections.remove(index);
        } else {
            self.last_closed = Some(index);
        }
    }

    fn pop_all(&mut self, pos: usize) {
        while !self.open.is_empty() {
            self.pop(pos);
        }
    }
}

struct Scanner<'a> {
    grammar: &'a Grammar,
    text: &'a str,
    pos: usize,
    stack: SpanStack,
    /// `None` in state-only mode
    builder: Option<SectionBuilder>,
}

impl<'a> Scanner<'a> {
    fn new(
        grammar: &'a Grammar,
        stack: SpanStack,
        text: &'a str,
        builder: Option<SectionBuilder>,
    ) -> Self {
        Self {
            grammar,
            text,
            pos: 0,
            stack,
            builder,
        }
    }

    fn push_style(&mut self, style: Option<StyleAttributes>) {
        if let Some(builder) = self.builder.as_mut() {
            builder.push(style, self.pos);
        }
    }

    fn pop_style(&mut self) {
        if let Some(builder) = self.builder.as_mut() {
            builder.pop(self.pos);
        }
    }

    fn run(&mut self) -> Result<()> {
        let grammar = self.grammar;
        let text = self.text;

        // Spans left open by the previous line style the line from its start
        if self.builder.is_some() {
            for span_ref in self.stack.outermost_first() {
                let style = grammar.span(span_ref).and_then(|s| s.span_style);
                self.push_style(style);
            }
        }

        let mut active = grammar.active_rule_set_id(&self.stack);
        let mut rule_set = grammar.resolve(active);
        let mut matches = vec![PendingMatch::Unknown; rule_set.spans.len()];
        // Pending matches of each enclosing rule-set opened on this line
        let mut saved: Vec<Vec<PendingMatch>> = Vec::new();
        let mut zero_width_open_at: Option<usize> = None;

        loop {
            for (pending, span) in matches.iter_mut().zip(&rule_set.spans) {
                if pending.is_stale(self.pos) {
                    *pending = PendingMatch::from_range(span.find_start(text, self.pos));
                }
            }
            let open_span = self
                .stack
                .peek()
                .and_then(|top| grammar.span(top).map(|span| (top, span)));
            let end_match = open_span.and_then(|(_, span)| span.find_end(text, self.pos));

            let Some((first, range)) = first_match(&matches, end_match) else {
                break;
            };

            self.highlight_rules(rule_set, range.start)?;
            debug_assert_eq!(self.pos, range.start);

            match first {
                FirstMatch::Close => {
                    let Some((top, span)) = open_span else {
                        break;
                    };
                    if !span.span_style_includes_end {
                        self.pop_style();
                    }
                    self.push_style(span.end_style);
                    self.pos = range.end;
                    self.pop_style();
                    if span.span_style_includes_end {
                        self.pop_style();
                    }

                    self.stack = self.stack.pop().unwrap_or_default();
                    active = grammar.active_rule_set_id(&self.stack);
                    rule_set = grammar.resolve(active);
                    trace!(span_ref = ?top, pos = self.pos, depth = self.stack.len(), "close span");

                    match saved.pop() {
                        Some(previous) => {
                            matches = previous;
                            if let Some(PendingMatch::Found(start, _)) = matches.get(top.index()) {
                                if *start == self.pos {
                                    return Err(zero_length_span(span));
                                }
                            }
                        }
                        None => {
                            matches = vec![PendingMatch::Unknown; rule_set.spans.len()];
                        }
                    }
                }
                FirstMatch::Open(index) => {
                    let (Some(rule_set_id), Some(span)) = (active, rule_set.spans.get(index))
                    else {
                        break;
                    };
                    if range.is_empty() {
                        // Two zero-width opens at one position would nest forever
                        if zero_width_open_at == Some(self.pos) {
                            return Err(zero_length_span(span));
                        }
                        zero_width_open_at = Some(self.pos);
                    }

                    if span.span_style_includes_start {
                        self.push_style(span.span_style);
                    }
                    self.push_style(span.start_style);
                    self.pos = range.end;
                    self.pop_style();
                    if !span.span_style_includes_start {
                        self.push_style(span.span_style);
                    }

                    let span_ref = SpanRef::new(rule_set_id, index);
                    self.stack = self.stack.push(span_ref);
                    active = span.rule_set;
                    rule_set = grammar.resolve(active);
                    trace!(span_ref = ?span_ref, pos = self.pos, depth = self.stack.len(), "open span");

                    let fresh = vec![PendingMatch::Unknown; rule_set.spans.len()];
                    saved.push(mem::replace(&mut matches, fresh));
                }
            }
        }

        self.highlight_rules(rule_set, text.len())?;
        let pos = self.pos;
        if let Some(builder) = self.builder.as_mut() {
            builder.pop_all(pos);
        }
        Ok(())
    }

    /// Apply the rules of `rule_set` to the text between the cursor and
    /// `until`, leaving the cursor at `until`
    fn highlight_rules(&mut self, rule_set: &'a RuleSet, until: usize) -> Result<()> {
        if self.pos >= until {
            return Ok(());
        }
        if self.builder.is_none() || rule_set.rules.is_empty() {
            self.pos = until;
            return Ok(());
        }

        let text = &self.text[..until];
        let mut matches = vec![PendingMatch::Unknown; rule_set.rules.len()];
        loop {
            for (pending, rule) in matches.iter_mut().zip(&rule_set.rules) {
                if pending.is_stale(self.pos) {
                    *pending = PendingMatch::from_range(rule.find_at(text, self.pos));
                }
            }
            let Some((FirstMatch::Open(index), range)) = first_match(&matches, None) else {
                break;
            };
            let rule = &rule_set.rules[index];
            if range.is_empty() {
                warn!(pattern = rule.pattern.as_str(), rule_set = %rule_set.name, "rule matched zero characters");
                return Err(HighlightError::ZeroLengthRule {
                    pattern: rule.pattern.as_str().to_string(),
                });
            }

            self.pos = range.start;
            self.push_style(rule.style);
            self.pos = range.end;
            self.pop_style();
        }

        self.pos = until;
        Ok(())
    }
}

fn zero_length_span(span: &Span) -> HighlightError {
    warn!(
        start = span.start.as_str(),
        end = span.end.as_str(),
        "span matched zero characters"
    );
    HighlightError::ZeroLengthSpan {
        start: span.start.as_str().to_string(),
        end: span.end.as_str().to_string(),
    }
}
