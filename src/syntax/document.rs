//! Text storage seam
//!
//! The highlighter never owns text. It reads lines through [`TextSource`],
//! which editors implement over their own buffer type. [`StringDocument`]
//! is a plain in-memory implementation used by the command-line tool and
//! the tests.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

/// Read access to a line-oriented document. Lines are 1-based.
pub trait TextSource {
    /// Number of lines (at least 1)
    fn line_count(&self) -> usize;

    /// Text of a line, without its terminator
    fn line_text(&self, line: usize) -> Cow<'_, str>;

    /// Absolute offset of the first byte of a line
    fn line_start_offset(&self, line: usize) -> usize;

    /// Absolute offset just past the last byte of a line (before the terminator)
    fn line_end_offset(&self, line: usize) -> usize;
}

impl<T: TextSource + ?Sized> TextSource for Rc<T> {
    fn line_count(&self) -> usize {
        (**self).line_count()
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        (**self).line_text(line)
    }

    fn line_start_offset(&self, line: usize) -> usize {
        (**self).line_start_offset(line)
    }

    fn line_end_offset(&self, line: usize) -> usize {
        (**self).line_end_offset(line)
    }
}

impl<T: TextSource> TextSource for RefCell<T> {
    fn line_count(&self) -> usize {
        self.borrow().line_count()
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        Cow::Owned(self.borrow().line_text(line).into_owned())
    }

    fn line_start_offset(&self, line: usize) -> usize {
        self.borrow().line_start_offset(line)
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.borrow().line_end_offset(line)
    }
}

/// An in-memory document split on `\n`
#[derive(Debug, Clone)]
pub struct StringDocument {
    lines: Vec<String>,
    /// Offset of each line start; recomputed on every edit
    starts: Vec<usize>,
}

impl StringDocument {
    /// Create a document from text. `\r\n` is normalized to `\n`.
    pub fn new(text: &str) -> Self {
        let lines = text.replace("\r\n", "\n").split('\n').map(String::from).collect();
        let mut doc = Self {
            lines,
            starts: Vec::new(),
        };
        doc.recompute_starts();
        doc
    }

    fn recompute_starts(&mut self) {
        self.starts.clear();
        let mut offset = 0;
        for line in &self.lines {
            self.starts.push(offset);
            offset += line.len() + 1;
        }
    }

    /// Replace the text of a line. Returns false if the line does not exist.
    pub fn replace_line(&mut self, line: usize, text: &str) -> bool {
        match line.checked_sub(1).and_then(|i| self.lines.get_mut(i)) {
            Some(slot) => {
                *slot = text.to_string();
                self.recompute_starts();
                true
            }
            None => false,
        }
    }

    /// Insert a new line after `after` (0 inserts at the top)
    pub fn insert_line(&mut self, after: usize, text: &str) -> bool {
        if after > self.lines.len() {
            return false;
        }
        self.lines.insert(after, text.to_string());
        self.recompute_starts();
        true
    }

    /// Remove a line. The last remaining line cannot be removed.
    pub fn remove_line(&mut self, line: usize) -> bool {
        if line == 0 || line > self.lines.len() || self.lines.len() == 1 {
            return false;
        }
        self.lines.remove(line - 1);
        self.recompute_starts();
        true
    }

    /// Full document text
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl TextSource for StringDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        line.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map_or(Cow::Borrowed(""), |s| Cow::Borrowed(s.as_str()))
    }

    fn line_start_offset(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|i| self.starts.get(i))
            .copied()
            .unwrap_or(0)
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.line_start_offset(line) + self.line_text(line).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_offsets() {
        let doc = StringDocument::new("ab\n\ncde");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(1), "ab");
        assert_eq!(doc.line_text(2), "");
        assert_eq!(doc.line_start_offset(3), 4);
        assert_eq!(doc.line_end_offset(3), 7);
        assert_eq!(doc.line_text(9), "");
    }

    #[test]
    fn test_trailing_newline_gives_empty_last_line() {
        let doc = StringDocument::new("a\r\nb\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(2), "b");
        assert_eq!(doc.line_text(3), "");
    }

    #[test]
    fn test_edits_update_offsets() {
        let mut doc = StringDocument::new("one\ntwo");
        assert!(doc.replace_line(1, "first"));
        assert_eq!(doc.line_start_offset(2), 6);

        assert!(doc.insert_line(0, "zero"));
        assert_eq!(doc.line_text(1), "zero");
        assert_eq!(doc.line_start_offset(2), 5);

        assert!(doc.remove_line(2));
        assert_eq!(doc.text(), "zero\ntwo");
        assert!(!doc.replace_line(0, "x"));
        assert!(!doc.insert_line(5, "x"));
    }

    #[test]
    fn test_shared_document() {
        let doc = Rc::new(RefCell::new(StringDocument::new("x\ny")));
        assert_eq!(doc.line_count(), 2);
        doc.borrow_mut().replace_line(2, "yy");
        assert_eq!(doc.line_text(2), "yy");
        assert_eq!(doc.line_end_offset(2), 4);
    }
}
