//! TOML grammar

use super::{escapes, rule};
use crate::error::Result;
use crate::syntax::rules::{Grammar, Span};
use crate::syntax::tokens::{StyleTable, TokenType};

/// Create the TOML grammar
pub fn toml_grammar(styles: &StyleTable) -> Result<Grammar> {
    let mut grammar = Grammar::with_styles("TOML", styles.clone());
    grammar.add_extension("toml");

    let string = styles.token(TokenType::String);
    let basic_body = grammar.add_rule_set(escapes(styles)?);

    let main = grammar.main_mut();
    main.add_span(Span::single_line("#", "$")?.with_style(styles.token(TokenType::Comment)));

    // Multi-line basic and literal strings
    main.add_span(
        Span::new(r#"""""#, r#"""""#)?
            .with_style(string)
            .with_rule_set(basic_body),
    );
    main.add_span(Span::new("'''", "'''")?.with_style(string));

    // Basic strings (escapes) and literal strings (none)
    main.add_span(
        Span::single_line("\"", "\"")?
            .with_style(string)
            .with_rule_set(basic_body),
    );
    main.add_span(Span::single_line("'", "'")?.with_style(string));

    // Table headers
    main.add_rule(rule(styles, r"^\s*\[\[?[^\]]+\]\]?", TokenType::Keyword)?);

    // Bare keys at the start of a line
    main.add_rule(rule(styles, r"^\s*[A-Za-z_][\w.-]*", TokenType::Type)?);

    // Booleans
    main.add_rule(rule(styles, r"\b(true|false)\b", TokenType::Constant)?);

    // Dates/times
    main.add_rule(rule(
        styles,
        r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)?|\d{2}:\d{2}:\d{2}(?:\.\d+)?",
        TokenType::Number,
    )?);

    // Numbers (including special floats)
    main.add_rule(rule(
        styles,
        r"[+-]?(?:0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?|inf|nan)\b",
        TokenType::Number,
    )?);

    Ok(grammar)
}
