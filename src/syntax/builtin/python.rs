//! Python grammar

use super::{escapes, rule};
use crate::error::Result;
use crate::syntax::rules::{Grammar, RuleSetId, Span};
use crate::syntax::tokens::{StyleTable, TokenType};

/// Create the Python grammar
pub fn python_grammar(styles: &StyleTable) -> Result<Grammar> {
    let mut grammar = Grammar::with_styles("Python", styles.clone());
    grammar.add_extension("py");
    grammar.add_extension("pyw");
    grammar.add_extension("pyi");

    let string = styles.token(TokenType::String);
    let special = styles.token(TokenType::Special);

    let string_body = grammar.add_rule_set(escapes(styles)?);

    // f-string bodies: escapes plus `{expr}` replacement fields, whose
    // contents are highlighted as ordinary code
    let mut fstring = escapes(styles)?;
    fstring.name = "f-string".to_string();
    fstring.add_span(
        Span::single_line(r"\{", r"\}")?
            .with_start_style(special)
            .with_end_style(special)
            .with_rule_set(RuleSetId::MAIN),
    );
    let fstring_body = grammar.add_rule_set(fstring);

    let main = grammar.main_mut();
    main.add_span(Span::single_line("#", "$")?.with_style(styles.token(TokenType::Comment)));

    // Triple-quoted strings (docstrings)
    main.add_span(
        Span::new(r#"(?:\b[rRbBuUfF]{1,2})?""""#, r#"""""#)?
            .with_style(string)
            .with_rule_set(string_body),
    );
    main.add_span(
        Span::new(r"(?:\b[rRbBuUfF]{1,2})?'''", r"'''")?
            .with_style(string)
            .with_rule_set(string_body),
    );

    // f-strings
    main.add_span(
        Span::single_line(r#"\b[rR]?[fF][rR]?""#, "\"")?
            .with_style(string)
            .with_rule_set(fstring_body),
    );
    main.add_span(
        Span::single_line(r"\b[rR]?[fF][rR]?'", "'")?
            .with_style(string)
            .with_rule_set(fstring_body),
    );

    // Regular strings
    main.add_span(
        Span::single_line(r#"(?:\b[rRbBuU]{1,2})?""#, "\"")?
            .with_style(string)
            .with_rule_set(string_body),
    );
    main.add_span(
        Span::single_line(r"(?:\b[rRbBuU]{1,2})?'", "'")?
            .with_style(string)
            .with_rule_set(string_body),
    );

    // Decorators
    main.add_rule(rule(styles, r"@[\w.]+", TokenType::Attribute)?);

    // Keywords
    let keywords = r"\b(False|None|True|and|as|assert|async|await|break|class|continue|def|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b";
    main.add_rule(rule(styles, keywords, TokenType::Keyword)?);

    // self/cls
    main.add_rule(rule(styles, r"\b(self|cls)\b", TokenType::Special)?);

    // Built-in functions
    let builtins = r"\b(abs|all|any|ascii|bin|bool|bytearray|bytes|callable|chr|classmethod|compile|complex|delattr|dict|dir|divmod|enumerate|eval|exec|filter|float|format|frozenset|getattr|globals|hasattr|hash|help|hex|id|input|int|isinstance|issubclass|iter|len|list|locals|map|max|memoryview|min|next|object|oct|open|ord|pow|print|property|range|repr|reversed|round|set|setattr|slice|sorted|staticmethod|str|sum|super|tuple|type|vars|zip)\b";
    main.add_rule(rule(styles, builtins, TokenType::Function)?);

    // Numbers
    let numbers = r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?j?)\b";
    main.add_rule(rule(styles, numbers, TokenType::Number)?);

    // Operators
    main.add_rule(rule(styles, r"[+\-*/%&|^!<>=@~]+", TokenType::Operator)?);

    Ok(grammar)
}
