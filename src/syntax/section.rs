//! Styled runs of a highlighted line
//!
//! A [`HighlightedLine`] stores its [`Section`]s in absolute document
//! offsets. The list is sorted by offset, and any two sections are either
//! disjoint or properly nested, with the outer section listed first.
//! Renderers that want flat, non-overlapping runs use
//! [`HighlightedLine::runs`].

use super::style::StyleAttributes;
use crate::error::{HighlightError, Result};

/// A contiguous styled run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Absolute document offset where the run starts
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Style for the run
    pub style: StyleAttributes,
}

impl Section {
    /// Create a new section
    pub fn new(offset: usize, length: usize, style: StyleAttributes) -> Self {
        Self {
            offset,
            length,
            style,
        }
    }

    /// Offset one past the last byte of the run
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Check if this section contains a byte offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.end()
    }
}

/// A non-overlapping run with all enclosing styles merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRun {
    pub offset: usize,
    pub length: usize,
    pub style: StyleAttributes,
}

/// Highlighting result for a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedLine {
    /// 1-based line number
    pub line_number: usize,
    /// Absolute offset of the line start
    pub offset: usize,
    /// Line length in bytes, excluding the line terminator
    pub length: usize,
    /// Styled sections, outer before inner
    pub sections: Vec<Section>,
}

impl HighlightedLine {
    /// Create a line with no sections
    pub fn new(line_number: usize, offset: usize, length: usize) -> Self {
        Self {
            line_number,
            offset,
            length,
            sections: Vec::new(),
        }
    }

    /// Absolute offset of the line end
    pub fn end_offset(&self) -> usize {
        self.offset + self.length
    }

    /// Check the section invariant: every section inside the line, and
    /// every pair either disjoint or nested with the outer one first.
    pub fn validate(&self) -> Result<()> {
        let line_end = self.end_offset();
        for (i, s1) in self.sections.iter().enumerate() {
            if s1.offset < self.offset || s1.end() > line_end {
                return Err(HighlightError::SectionOutOfBounds { index: i });
            }
            for (j, s2) in self.sections.iter().enumerate().skip(i + 1) {
                let after = s2.offset >= s1.end();
                let nested = s2.offset >= s1.offset && s2.end() <= s1.end();
                if !after && !nested {
                    return Err(HighlightError::SectionsOverlap {
                        first: i,
                        second: j,
                    });
                }
            }
        }
        Ok(())
    }

    /// Overlay the sections of `overlay` onto this line.
    ///
    /// Overlay sections become children of the base sections they fall
    /// inside. An overlay section crossing a base boundary is split there,
    /// so the result still satisfies [`validate`](Self::validate).
    pub fn merge_with(&mut self, overlay: &HighlightedLine) -> Result<()> {
        self.validate()?;
        overlay.validate()?;

        let mut pos = 0;
        // The line end acts as a sentinel that is never popped
        let mut active_ends = vec![self.end_offset()];
        for new_section in &overlay.sections {
            let mut piece_start = new_section.offset;
            let new_end = new_section.end();

            while pos < self.sections.len() {
                let s = self.sections[pos];
                if new_section.offset < s.offset {
                    break;
                }
                pop_closed(&mut active_ends, s.offset);
                active_ends.push(s.end());
                pos += 1;
            }

            let mut insertion = active_ends.clone();
            let mut i = pos;
            while i < self.sections.len() {
                let s = self.sections[i];
                if new_end <= s.offset {
                    break;
                }
                self.insert_pieces(&mut i, &mut piece_start, s.offset, new_section.style, &mut insertion);
                pop_closed(&mut insertion, s.offset);
                insertion.push(s.end());
                i += 1;
            }
            self.insert_pieces(&mut i, &mut piece_start, new_end, new_section.style, &mut insertion);
        }

        self.validate()
    }

    /// Insert the piece `[start, end)` at `pos`, split wherever an
    /// enclosing section on `stack` ends first.
    fn insert_pieces(
        &mut self,
        pos: &mut usize,
        start: &mut usize,
        end: usize,
        style: StyleAttributes,
        stack: &mut Vec<usize>,
    ) {
        if *start >= end {
            return;
        }
        pop_closed(stack, *start);
        while let Some(&top) = stack.last() {
            if top >= end {
                break;
            }
            stack.pop();
            if top > *start {
                self.sections.insert(*pos, Section::new(*start, top - *start, style));
                *pos += 1;
                *start = top;
            }
        }
        self.sections.insert(*pos, Section::new(*start, end - *start, style));
        *pos += 1;
        *start = end;
    }

    /// Flatten the nested sections into disjoint runs.
    ///
    /// Each run carries the merge of every section enclosing it, outermost
    /// first. Unstyled gaps are omitted and equal neighbours coalesced.
    pub fn runs(&self) -> Vec<StyledRun> {
        let mut runs = Vec::new();
        let mut stack: Vec<(usize, StyleAttributes)> = Vec::new();
        let mut pos = self.offset;

        for section in &self.sections {
            while let Some(&(end, style)) = stack.last() {
                if end > section.offset {
                    break;
                }
                push_run(&mut runs, pos, end, style);
                pos = end;
                stack.pop();
            }
            if let Some(&(_, style)) = stack.last() {
                push_run(&mut runs, pos, section.offset, style);
            }
            pos = section.offset;
            let inherited = stack.last().map(|&(_, style)| style).unwrap_or_default();
            stack.push((section.end(), inherited.merged(&section.style)));
        }
        while let Some((end, style)) = stack.pop() {
            push_run(&mut runs, pos, end, style);
            pos = end;
        }

        runs
    }
}

/// Pop enclosing ends that close at or before `offset`, keeping the sentinel
fn pop_closed(stack: &mut Vec<usize>, offset: usize) {
    while stack.len() > 1 && stack.last().is_some_and(|&end| end <= offset) {
        stack.pop();
    }
}

fn push_run(runs: &mut Vec<StyledRun>, start: usize, end: usize, style: StyleAttributes) {
    if end <= start {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if last.style == style && last.offset + last.length == start {
            last.length += end - start;
            return;
        }
    }
    runs.push(StyledRun {
        offset: start,
        length: end - start,
        style,
    });
}
