//! Style types for highlighted text
//!
//! Every attribute of [`StyleAttributes`] is optional: `None` means
//! "inherit from whatever encloses this run", never "clear".

/// Text colors (ANSI 16-color palette plus 24-bit RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a color from a config value: an ANSI name ("bright-red",
    /// "brightred", "BrightRed") or a `#rrggbb` hex triple.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(hex) = name.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let color = match normalized.as_str() {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "brightblack" | "gray" | "grey" => Color::BrightBlack,
            "brightred" => Color::BrightRed,
            "brightgreen" => Color::BrightGreen,
            "brightyellow" => Color::BrightYellow,
            "brightblue" => Color::BrightBlue,
            "brightmagenta" => Color::BrightMagenta,
            "brightcyan" => Color::BrightCyan,
            "brightwhite" => Color::BrightWhite,
            _ => return None,
        };
        Some(color)
    }
}

/// Font weight, on the usual 100..=900 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Check if this weight renders as bold on a terminal
    pub fn is_bold(&self) -> bool {
        self.0 >= 600
    }
}

/// Optional style overrides for a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StyleAttributes {
    /// Foreground color
    pub foreground: Option<Color>,
    /// Background color
    pub background: Option<Color>,
    /// Font weight
    pub weight: Option<FontWeight>,
    /// Italic text
    pub italic: Option<bool>,
    /// Underlined text
    pub underline: Option<bool>,
    /// Struck-through text
    pub strikethrough: Option<bool>,
}

impl StyleAttributes {
    /// Create a style with just a foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Default::default()
        }
    }

    /// Create a style with just a background color
    pub fn bg(color: Color) -> Self {
        Self {
            background: Some(color),
            ..Default::default()
        }
    }

    /// Builder: set foreground color
    pub fn with_fg(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.weight = Some(FontWeight::BOLD);
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = Some(true);
        self
    }

    /// Check if no attribute is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay `other` onto this style, field by field.
    ///
    /// Only the fields `other` actually specifies are overwritten.
    pub fn merge_with(&mut self, other: &StyleAttributes) {
        if other.foreground.is_some() {
            self.foreground = other.foreground;
        }
        if other.background.is_some() {
            self.background = other.background;
        }
        if other.weight.is_some() {
            self.weight = other.weight;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.strikethrough.is_some() {
            self.strikethrough = other.strikethrough;
        }
    }

    /// Return a copy of this style with `other` overlaid onto it
    pub fn merged(mut self, other: &StyleAttributes) -> Self {
        self.merge_with(other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_default() {
        let style = StyleAttributes::default();
        assert!(style.is_empty());
        assert_eq!(style.foreground, None);
        assert_eq!(style.weight, None);
    }

    #[test]
    fn test_style_builders() {
        let style = StyleAttributes::fg(Color::Red).with_bold().with_bg(Color::Blue);
        assert_eq!(style.foreground, Some(Color::Red));
        assert_eq!(style.background, Some(Color::Blue));
        assert_eq!(style.weight, Some(FontWeight::BOLD));
        assert!(!style.is_empty());
    }

    #[test]
    fn test_merge_only_overwrites_specified_fields() {
        let mut base = StyleAttributes::fg(Color::Green).with_italic();
        let overlay = StyleAttributes::bg(Color::Black).with_fg(Color::Red);
        base.merge_with(&overlay);

        assert_eq!(base.foreground, Some(Color::Red));
        assert_eq!(base.background, Some(Color::Black));
        assert_eq!(base.italic, Some(true));
        assert_eq!(base.underline, None);
    }

    #[test]
    fn test_merge_explicit_false_overrides() {
        let base = StyleAttributes::default().with_italic();
        let overlay = StyleAttributes {
            italic: Some(false),
            ..Default::default()
        };
        assert_eq!(base.merged(&overlay).italic, Some(false));
        assert_eq!(base.merged(&StyleAttributes::default()), base);
    }

    #[test]
    fn test_color_from_name() {
        assert_eq!(Color::from_name("magenta"), Some(Color::Magenta));
        assert_eq!(Color::from_name("bright-red"), Some(Color::BrightRed));
        assert_eq!(Color::from_name("BrightBlue"), Some(Color::BrightBlue));
        assert_eq!(Color::from_name("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(Color::from_name("#ff80"), None);
        assert_eq!(Color::from_name("chartreuse"), None);
    }

    #[test]
    fn test_font_weight_bold() {
        assert!(FontWeight::BOLD.is_bold());
        assert!(!FontWeight::NORMAL.is_bold());
    }
}
