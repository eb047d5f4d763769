//! Rust grammar

use super::{comment_markers, escapes, rule, token_span};
use crate::error::Result;
use crate::syntax::rules::{Grammar, Span};
use crate::syntax::tokens::{StyleTable, TokenType};

/// Create the Rust grammar
pub fn rust_grammar(styles: &StyleTable) -> Result<Grammar> {
    let mut grammar = Grammar::with_styles("Rust", styles.clone());
    grammar.add_extension("rs");

    let comment = styles.token(TokenType::Comment);
    let string = styles.token(TokenType::String);

    let string_body = grammar.add_rule_set(escapes(styles)?);
    let line_comment_body = grammar.add_rule_set(comment_markers(styles)?);

    // Block comments nest: the body rule-set opens the same span again
    let block_comment = Span::new(r"/\*", r"\*/")?.with_style(comment);
    let mut block_comment_body = comment_markers(styles)?;
    block_comment_body.name = "block comment".to_string();
    let comment_body = grammar.add_rule_set(block_comment_body);
    let block_comment = block_comment.with_rule_set(comment_body);
    if let Some(body) = grammar.rule_set_mut(comment_body) {
        body.add_span(block_comment.clone());
    }

    let main = grammar.main_mut();
    main.add_span(block_comment);
    main.add_span(
        Span::single_line("//", "$")?
            .with_style(comment)
            .with_rule_set(line_comment_body),
    );

    // Raw strings (one level of hashes) have no escapes
    main.add_span(Span::new(r##"\bb?r#""##, r##""#"##)?.with_style(string));
    main.add_span(Span::new(r#"\bb?r""#, "\"")?.with_style(string));
    main.add_span(
        Span::new(r#"(?:\bb)?""#, "\"")?
            .with_style(string)
            .with_rule_set(string_body),
    );

    // Character literals, before lifetimes get a chance at the quote
    main.add_span(token_span(
        styles,
        r"(?:\bb)?'(?:[^'\\]|\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\}|.))'",
        TokenType::Char,
    )?);

    // Attributes
    main.add_rule(rule(styles, r"#!?\[[^\]]*\]", TokenType::Attribute)?);

    // Lifetimes
    main.add_rule(rule(styles, r"'\w+", TokenType::Lifetime)?);

    // Macros (ending with !)
    main.add_rule(rule(styles, r"\b\w+!", TokenType::Macro)?);

    // Keywords
    let keywords = r"\b(as|async|await|break|const|continue|crate|dyn|else|enum|extern|false|fn|for|if|impl|in|let|loop|match|mod|move|mut|pub|ref|return|self|Self|static|struct|super|trait|true|type|union|unsafe|use|where|while)\b";
    main.add_rule(rule(styles, keywords, TokenType::Keyword)?);

    // Built-in types
    let types = r"\b(bool|char|str|u8|u16|u32|u64|u128|usize|i8|i16|i32|i64|i128|isize|f32|f64|String|Vec|Box|Rc|Arc|Option|Result|Some|None|Ok|Err)\b";
    main.add_rule(rule(styles, types, TokenType::Type)?);

    // Type names (capitalized identifiers)
    main.add_rule(rule(styles, r"\b[A-Z][a-zA-Z0-9_]*\b", TokenType::Type)?);

    // Numbers
    let numbers = r"\b(?:0x[0-9a-fA-F_]+|0b[01_]+|0o[0-7_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?)(?:[iu](?:8|16|32|64|128|size)|f32|f64)?\b";
    main.add_rule(rule(styles, numbers, TokenType::Number)?);

    // Operators
    main.add_rule(rule(styles, r"[+\-*/%&|^!<>=@]+", TokenType::Operator)?);

    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::test_util::{highlight, style};

    fn rust() -> Grammar {
        rust_grammar(&StyleTable::default()).unwrap()
    }

    #[test]
    fn test_rust_keywords_strings_comments() {
        let (lines, stack) = highlight(rust(), &[r#"let s = "a\"b"; // done"#]);
        assert_eq!(
            lines[0],
            vec![
                (0, 3, style(TokenType::Keyword)),
                (6, 1, style(TokenType::Operator)),
                (8, 6, style(TokenType::String)),
                (10, 2, style(TokenType::Special)),
                (16, 7, style(TokenType::Comment)),
            ]
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn test_rust_nested_block_comments() {
        let (lines, stack) = highlight(rust(), &["/* a /* b */ c", "*/ fn"]);
        let comment = style(TokenType::Comment);
        assert_eq!(lines[0], vec![(0, 14, comment), (5, 7, comment)]);
        assert_eq!(lines[1], vec![(0, 2, comment), (3, 2, style(TokenType::Keyword))]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_rust_unterminated_comment_carries() {
        let (_, stack) = highlight(rust(), &["/* a /* b */ c"]);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_rust_char_literal_holding_quote() {
        let (lines, stack) = highlight(rust(), &[r#"'"' x"#]);
        assert_eq!(lines[0], vec![(0, 3, style(TokenType::Char))]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_rust_lifetime_and_macro() {
        let (lines, _) = highlight(rust(), &["&'a x; println!"]);
        assert_eq!(
            lines[0],
            vec![
                (0, 1, style(TokenType::Operator)),
                (1, 2, style(TokenType::Lifetime)),
                (7, 8, style(TokenType::Macro)),
            ]
        );
    }

    #[test]
    fn test_rust_comment_markers() {
        let (lines, _) = highlight(rust(), &["// TODO: x", "/* FIXME */"]);
        let comment = style(TokenType::Comment);
        let marker = style(TokenType::Marker);
        assert_eq!(lines[0], vec![(0, 10, comment), (3, 4, marker)]);
        assert_eq!(lines[1], vec![(0, 11, comment), (3, 5, marker)]);
    }

    #[test]
    fn test_rust_line_comment_ends_with_line() {
        let (lines, stack) = highlight(rust(), &["// /* not a block", "x"]);
        assert_eq!(lines[0], vec![(0, 17, style(TokenType::Comment))]);
        assert!(lines[1].is_empty());
        assert!(stack.is_empty());
    }
}
