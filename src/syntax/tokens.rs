//! Named styles for syntax highlighting
//!
//! This module defines the standard token names grammars refer to,
//! their default visual styles, and the [`StyleTable`] used to look
//! named styles up (and override them from the config file).

use std::collections::HashMap;

use super::style::{Color, StyleAttributes};

/// Standard token types for syntax highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Source code comments (// or /* */)
    Comment,
    /// String literals ("..." or '...')
    String,
    /// Character literals
    Char,
    /// Numeric literals (integers, floats)
    Number,
    /// Language keywords (if, else, fn, let, etc.)
    Keyword,
    /// Type names (String, i32, etc.)
    Type,
    /// Function names
    Function,
    /// Operators (+, -, *, /, etc.)
    Operator,
    /// Preprocessor directives (#include, #define)
    Preprocessor,
    /// Macros (println!, vec!)
    Macro,
    /// Constants and enum variants
    Constant,
    /// Special tokens (escape sequences, etc.)
    Special,
    /// Attributes (#[derive], @decorator)
    Attribute,
    /// Lifetime annotations ('a)
    Lifetime,
    /// Documentation markers inside comments (TODO, FIXME)
    Marker,
}

impl TokenType {
    /// Every standard token type
    pub const ALL: [TokenType; 15] = [
        TokenType::Comment,
        TokenType::String,
        TokenType::Char,
        TokenType::Number,
        TokenType::Keyword,
        TokenType::Type,
        TokenType::Function,
        TokenType::Operator,
        TokenType::Preprocessor,
        TokenType::Macro,
        TokenType::Constant,
        TokenType::Special,
        TokenType::Attribute,
        TokenType::Lifetime,
        TokenType::Marker,
    ];

    /// Get the default style for this token type
    pub fn default_style(&self) -> StyleAttributes {
        match self {
            TokenType::Comment => StyleAttributes::fg(Color::BrightBlack).with_italic(),
            TokenType::String | TokenType::Char => StyleAttributes::fg(Color::Green),
            TokenType::Number => StyleAttributes::fg(Color::Cyan),
            TokenType::Keyword => StyleAttributes::fg(Color::Magenta).with_bold(),
            TokenType::Type => StyleAttributes::fg(Color::Yellow),
            TokenType::Function => StyleAttributes::fg(Color::Blue),
            TokenType::Operator => StyleAttributes::fg(Color::BrightWhite),
            TokenType::Preprocessor | TokenType::Lifetime => StyleAttributes::fg(Color::BrightMagenta),
            TokenType::Macro => StyleAttributes::fg(Color::BrightCyan),
            TokenType::Constant => StyleAttributes::fg(Color::BrightRed),
            TokenType::Special => StyleAttributes::fg(Color::BrightYellow),
            TokenType::Attribute => StyleAttributes::fg(Color::BrightBlue),
            TokenType::Marker => StyleAttributes::fg(Color::Yellow).with_bold().with_underline(),
        }
    }

    /// Get a human-readable name for this token type
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Comment => "Comment",
            TokenType::String => "String",
            TokenType::Char => "Char",
            TokenType::Number => "Number",
            TokenType::Keyword => "Keyword",
            TokenType::Type => "Type",
            TokenType::Function => "Function",
            TokenType::Operator => "Operator",
            TokenType::Preprocessor => "Preprocessor",
            TokenType::Macro => "Macro",
            TokenType::Constant => "Constant",
            TokenType::Special => "Special",
            TokenType::Attribute => "Attribute",
            TokenType::Lifetime => "Lifetime",
            TokenType::Marker => "Marker",
        }
    }

    /// Parse a token type from its name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Named style lookup table
///
/// Seeded with the default style of every [`TokenType`]; the config file
/// may override entries or add new names.
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: HashMap<String, StyleAttributes>,
}

impl StyleTable {
    /// Create a table holding the default token styles
    pub fn new() -> Self {
        let styles = TokenType::ALL
            .into_iter()
            .map(|t| (t.name().to_string(), t.default_style()))
            .collect();
        Self { styles }
    }

    /// Look up a named style
    pub fn get(&self, name: &str) -> Option<StyleAttributes> {
        self.styles.get(name).copied()
    }

    /// Style for a standard token type
    pub fn token(&self, token_type: TokenType) -> StyleAttributes {
        self.get(token_type.name())
            .unwrap_or_else(|| token_type.default_style())
    }

    /// Insert or replace a named style
    pub fn set(&mut self, name: &str, style: StyleAttributes) {
        self.styles.insert(name.to_string(), style);
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}
