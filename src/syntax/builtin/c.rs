//! C/C++ grammar

use super::{comment_markers, escapes, rule, token_span};
use crate::error::Result;
use crate::syntax::rules::{Grammar, Span};
use crate::syntax::tokens::{StyleTable, TokenType};

/// Create the C grammar (also works for C++)
pub fn c_grammar(styles: &StyleTable) -> Result<Grammar> {
    let mut grammar = Grammar::with_styles("C", styles.clone());
    for ext in ["c", "h", "cpp", "hpp", "cc", "cxx"] {
        grammar.add_extension(ext);
    }

    let comment = styles.token(TokenType::Comment);
    let string_body = grammar.add_rule_set(escapes(styles)?);
    let comment_body = grammar.add_rule_set(comment_markers(styles)?);

    let main = grammar.main_mut();
    main.add_span(
        Span::new(r"/\*", r"\*/")?
            .with_style(comment)
            .with_rule_set(comment_body),
    );
    main.add_span(
        Span::single_line("//", "$")?
            .with_style(comment)
            .with_rule_set(comment_body),
    );
    main.add_span(
        Span::single_line("\"", "\"")?
            .with_style(styles.token(TokenType::String))
            .with_rule_set(string_body),
    );
    main.add_span(token_span(styles, r"'(?:[^'\\]|\\[^']+)'", TokenType::Char)?);

    // Preprocessor directives
    main.add_rule(rule(styles, r"^\s*#\s*\w+", TokenType::Preprocessor)?);

    // Keywords
    let keywords = r"\b(auto|break|case|char|const|continue|default|do|double|else|enum|extern|float|for|goto|if|inline|int|long|register|restrict|return|short|signed|sizeof|static|struct|switch|typedef|union|unsigned|void|volatile|while|_Alignas|_Alignof|_Atomic|_Bool|_Complex|_Generic|_Imaginary|_Noreturn|_Static_assert|_Thread_local)\b";
    main.add_rule(rule(styles, keywords, TokenType::Keyword)?);

    // C++ keywords
    let cpp_keywords = r"\b(alignas|alignof|and|and_eq|asm|bitand|bitor|bool|catch|class|compl|concept|consteval|constexpr|constinit|const_cast|co_await|co_return|co_yield|decltype|delete|dynamic_cast|explicit|export|false|friend|mutable|namespace|new|noexcept|not|not_eq|nullptr|operator|or|or_eq|private|protected|public|reinterpret_cast|requires|static_assert|static_cast|template|this|thread_local|throw|true|try|typeid|typename|using|virtual|xor|xor_eq)\b";
    main.add_rule(rule(styles, cpp_keywords, TokenType::Keyword)?);

    // Standard types
    let types = r"\b(size_t|ptrdiff_t|intptr_t|uintptr_t|int8_t|int16_t|int32_t|int64_t|uint8_t|uint16_t|uint32_t|uint64_t|FILE|NULL)\b";
    main.add_rule(rule(styles, types, TokenType::Type)?);

    // Numbers
    let numbers = r"\b(?:0[xX][0-9a-fA-F]+[uUlL]*|\d+\.\d*(?:[eE][+-]?\d+)?[fFlL]?|\d+[uUlL]*)\b|\.\d+(?:[eE][+-]?\d+)?[fFlL]?\b";
    main.add_rule(rule(styles, numbers, TokenType::Number)?);

    // Operators
    main.add_rule(rule(styles, r"[+\-*/%&|^!<>=~?:]+", TokenType::Operator)?);

    Ok(grammar)
}
