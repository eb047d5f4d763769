//! Configuration file support
//!
//! Loads settings from ~/.spanlight.toml (or %USERPROFILE%\.spanlight.toml on Windows)
//!
//! Style entries are laid over the built-in defaults, so a partial entry
//! only changes the attributes it names. Unknown keys are ignored.
//!
//! Example:
//! ```toml
//! enabled = true
//!
//! [styles.Keyword]
//! foreground = "magenta"   # ANSI name or "#rrggbb"
//! weight = "bold"          # "normal", "bold" or a number
//!
//! [styles.Comment]
//! foreground = "#808080"
//! italic = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, warn};

use crate::error::{HighlightError, Result};
use crate::syntax::{Color, FontWeight, StyleAttributes, StyleTable};

/// Configuration settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether syntax highlighting is enabled
    pub enabled: bool,
    /// Named styles used by the grammars
    pub styles: StyleTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            styles: StyleTable::default(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".spanlight.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".spanlight.toml"))
        }
    }

    /// Load configuration from the default path, falling back to defaults
    /// when the file is missing or invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file");
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let table: Table = contents.parse()?;
        let mut config = Config::default();

        if let Some(value) = table.get("enabled") {
            config.enabled = value.as_bool().ok_or_else(|| invalid("enabled", "a boolean"))?;
        }

        if let Some(value) = table.get("styles") {
            let styles = value.as_table().ok_or_else(|| invalid("styles", "a table"))?;
            for (name, entry) in styles {
                let entry = entry
                    .as_table()
                    .ok_or_else(|| invalid(&format!("styles.{name}"), "a table"))?;
                let style = parse_style(name, entry)?;
                let base = config.styles.get(name).unwrap_or_default();
                config.styles.set(name, base.merged(&style));
            }
        }

        Ok(config)
    }
}

/// Parse one `[styles.Name]` entry
fn parse_style(name: &str, entry: &Table) -> Result<StyleAttributes> {
    let key = |field: &str| format!("styles.{name}.{field}");
    let mut style = StyleAttributes::default();

    if let Some(value) = entry.get("foreground") {
        style.foreground = Some(parse_color(value).ok_or_else(|| invalid(&key("foreground"), "a color"))?);
    }
    if let Some(value) = entry.get("background") {
        style.background = Some(parse_color(value).ok_or_else(|| invalid(&key("background"), "a color"))?);
    }
    if let Some(value) = entry.get("weight") {
        style.weight = Some(parse_weight(value).ok_or_else(|| {
            invalid(&key("weight"), "\"normal\", \"bold\" or a number from 1 to 1000")
        })?);
    }
    if let Some(value) = entry.get("italic") {
        style.italic = Some(value.as_bool().ok_or_else(|| invalid(&key("italic"), "a boolean"))?);
    }
    if let Some(value) = entry.get("underline") {
        style.underline = Some(value.as_bool().ok_or_else(|| invalid(&key("underline"), "a boolean"))?);
    }
    if let Some(value) = entry.get("strikethrough") {
        style.strikethrough =
            Some(value.as_bool().ok_or_else(|| invalid(&key("strikethrough"), "a boolean"))?);
    }

    Ok(style)
}

fn parse_color(value: &Value) -> Option<Color> {
    Color::from_name(value.as_str()?)
}

fn parse_weight(value: &Value) -> Option<FontWeight> {
    match value {
        Value::String(s) => match s.to_lowercase().as_str() {
            "normal" => Some(FontWeight::NORMAL),
            "bold" => Some(FontWeight::BOLD),
            _ => None,
        },
        Value::Integer(n) if (1..=1000).contains(n) => Some(FontWeight(*n as u16)),
        _ => None,
    }
}

fn invalid(key: &str, expected: &str) -> HighlightError {
    HighlightError::Config(format!("`{key}` must be {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TokenType;

    #[test]
    fn test_parse_config() {
        let contents = r##"
# Comment
enabled = false

[styles.Keyword]
foreground = "bright-blue"
weight = "normal"

[styles.Comment]
foreground = "#808080"
underline = true

[styles.Todo]
background = "yellow"
weight = 800
"##;

        let config = Config::parse(contents).unwrap();
        assert!(!config.enabled);

        let keyword = config.styles.get("Keyword").unwrap();
        assert_eq!(keyword.foreground, Some(Color::BrightBlue));
        assert_eq!(keyword.weight, Some(FontWeight::NORMAL));

        // Unnamed attributes keep their defaults
        let comment = config.styles.get("Comment").unwrap();
        assert_eq!(comment.foreground, Some(Color::Rgb(0x80, 0x80, 0x80)));
        assert_eq!(comment.underline, Some(true));
        assert_eq!(comment.italic, TokenType::Comment.default_style().italic);

        let todo = config.styles.get("Todo").unwrap();
        assert_eq!(todo.background, Some(Color::Yellow));
        assert!(todo.weight.is_some_and(|w| w.is_bold()));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert!(config.enabled);
        assert_eq!(
            config.styles.token(TokenType::String),
            TokenType::String.default_style()
        );
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::parse("theme = \"dark\"\n[styles.String]\nblink = true\n").unwrap();
        assert_eq!(
            config.styles.token(TokenType::String),
            TokenType::String.default_style()
        );
    }

    #[test]
    fn test_invalid_values() {
        let bad = [
            "enabled = \"yes\"",
            "styles = 3",
            "[styles]\nKeyword = \"red\"",
            "[styles.Keyword]\nforeground = \"chartreuse\"",
            "[styles.Keyword]\nforeground = \"#12345\"",
            "[styles.Keyword]\nweight = \"heavy\"",
            "[styles.Keyword]\nweight = 5000",
            "[styles.Keyword]\nitalic = 1",
        ];
        for contents in bad {
            assert!(
                matches!(Config::parse(contents), Err(HighlightError::Config(_))),
                "{contents}"
            );
        }
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            Config::parse("enabled = "),
            Err(HighlightError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = Path::new("/nonexistent/spanlight/config.toml");
        assert!(matches!(Config::load_from(path), Err(HighlightError::Io(_))));
    }
}
