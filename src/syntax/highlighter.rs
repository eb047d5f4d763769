//! Incremental per-document highlighting
//!
//! [`DocumentHighlighter`] keeps the span stack at the end of every line it
//! has scanned, plus a stale marker: the first line whose stored stack can
//! no longer be trusted. Edits only lower the marker. Highlighting a line
//! replays the cheap state-only scan from the marker up to the line before
//! it, then runs the full highlighter on the line itself.
//!
//! All methods take `&self`. A highlight pass holds a guard flag, so any
//! call made from inside the pass (from a state-changed listener or from
//! the [`TextSource`] itself) fails with
//! [`HighlightError::ReentrantHighlighting`] instead of corrupting state.

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use tracing::debug;

use super::document::TextSource;
use super::engine::HighlightingEngine;
use super::rules::Grammar;
use super::section::HighlightedLine;
use super::span_stack::SpanStack;
use super::style::StyleAttributes;
use crate::error::{HighlightError, Result};

/// Callback fired with an inclusive `(from_line, to_line)` range whose
/// previously returned highlighting is stale
pub type StateChangedListener = Box<dyn FnMut(usize, usize)>;

/// Cached scan state
#[derive(Debug)]
struct HighlightState {
    /// `stacks[n]` is the span stack at the end of line `n`; `stacks[0]`
    /// is the initial stack. `None` means never computed.
    stacks: Vec<Option<SpanStack>>,
    /// First line whose stored end stack is not fresh (the stale marker)
    first_invalid_line: usize,
}

impl HighlightState {
    fn new(initial: SpanStack) -> Self {
        Self {
            stacks: vec![Some(initial)],
            first_invalid_line: 1,
        }
    }

    fn stack(&self, line: usize) -> SpanStack {
        self.stacks
            .get(line)
            .and_then(|s| s.clone())
            .unwrap_or_default()
    }

    /// Store the end stack of `line`. Returns true if the following line
    /// may have been returned with a different input stack: the slot held a
    /// different stack, or a placeholder left by an inserted line.
    fn store(&mut self, line: usize, stack: SpanStack) -> bool {
        let existed = line < self.stacks.len();
        if !existed {
            self.stacks.resize(line + 1, None);
        }
        match self.stacks[line].replace(stack) {
            Some(old) => self.stacks[line].as_ref() != Some(&old),
            None => existed,
        }
    }

    fn invalidate(&mut self, line: usize) {
        self.first_invalid_line = self.first_invalid_line.min(line.max(1));
    }
}

/// Resets the highlighting flag when a pass ends, even on error
struct PassGuard<'a>(&'a Cell<bool>);

impl<'a> PassGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Result<Self> {
        if flag.replace(true) {
            return Err(HighlightError::ReentrantHighlighting);
        }
        Ok(Self(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Highlights one document incrementally
pub struct DocumentHighlighter<D: TextSource> {
    document: D,
    engine: HighlightingEngine,
    state: RefCell<HighlightState>,
    listeners: RefCell<Vec<StateChangedListener>>,
    is_highlighting: Cell<bool>,
    in_batch: Cell<bool>,
    /// Changes coalesced while a batch is open
    pending_change: Cell<Option<(usize, usize)>>,
    disposed: Cell<bool>,
}

impl<D: TextSource> DocumentHighlighter<D> {
    /// Create a highlighter for `document` using `grammar`
    pub fn new(document: D, grammar: Rc<Grammar>) -> Self {
        Self {
            document,
            engine: HighlightingEngine::new(grammar),
            state: RefCell::new(HighlightState::new(SpanStack::empty())),
            listeners: RefCell::new(Vec::new()),
            is_highlighting: Cell::new(false),
            in_batch: Cell::new(false),
            pending_change: Cell::new(None),
            disposed: Cell::new(false),
        }
    }

    /// The highlighted document
    pub fn document(&self) -> &D {
        &self.document
    }

    /// The grammar in use
    pub fn grammar(&self) -> &Rc<Grammar> {
        self.engine.grammar()
    }

    /// Look up a named style of the grammar
    pub fn named_style(&self, name: &str) -> Option<StyleAttributes> {
        self.grammar().named_style(name)
    }

    /// First line whose span stack is not guaranteed fresh
    pub fn first_invalid_line(&self) -> usize {
        self.state.borrow().first_invalid_line
    }

    /// Check if a batch is open
    pub fn in_batch(&self) -> bool {
        self.in_batch.get()
    }

    /// Check if [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Register a state-changed listener
    pub fn on_state_changed(&self, listener: impl FnMut(usize, usize) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Tear the highlighter down. Every later call fails with
    /// [`HighlightError::UseAfterDispose`].
    pub fn dispose(&self) -> Result<()> {
        self.check_alive()?;
        if self.is_highlighting.get() {
            return Err(HighlightError::ReentrantHighlighting);
        }
        self.disposed.set(true);
        self.listeners.borrow_mut().clear();
        *self.state.borrow_mut() = HighlightState::new(SpanStack::empty());
        Ok(())
    }

    fn check_alive(&self) -> Result<()> {
        if self.disposed.get() {
            return Err(HighlightError::UseAfterDispose);
        }
        Ok(())
    }

    /// Edits are refused while a pass is running
    fn check_editable(&self) -> Result<()> {
        self.check_alive()?;
        if self.is_highlighting.get() {
            return Err(HighlightError::ReentrantHighlighting);
        }
        Ok(())
    }

    fn check_line(&self, line: usize, min: usize) -> Result<()> {
        let max = self.document.line_count();
        if line < min || line > max {
            return Err(HighlightError::LineOutOfRange { line, min, max });
        }
        Ok(())
    }

    /// Span stack the document starts with
    pub fn initial_span_stack(&self) -> SpanStack {
        self.state.borrow().stack(0)
    }

    /// Start the document inside the given spans (for example when
    /// highlighting a fragment embedded in another language)
    pub fn set_initial_span_stack(&self, stack: SpanStack) -> Result<()> {
        self.check_editable()?;
        *self.state.borrow_mut() = HighlightState::new(stack);
        self.notify(1, self.document.line_count());
        Ok(())
    }

    /// Lower the stale marker to `from_line`
    pub fn invalidate(&self, from_line: usize) -> Result<()> {
        self.check_editable()?;
        self.state.borrow_mut().invalidate(from_line);
        debug!(from_line, marker = self.first_invalid_line(), "invalidate");
        self.notify_line(from_line.max(1));
        Ok(())
    }

    /// Forget all cached state (full rebuild or attach)
    pub fn invalidate_all(&self) -> Result<()> {
        self.check_editable()?;
        {
            let mut state = self.state.borrow_mut();
            state.stacks.truncate(1);
            state.first_invalid_line = 1;
        }
        debug!("invalidate all");
        self.notify(1, self.document.line_count());
        Ok(())
    }

    /// Edit notification: the text of `line` changed
    pub fn line_length_changed(&self, line: usize) -> Result<()> {
        self.invalidate(line)
    }

    /// Edit notification: `new_line` was inserted after `after`
    pub fn line_inserted(&self, after: usize, new_line: usize) -> Result<()> {
        self.check_editable()?;
        {
            let mut state = self.state.borrow_mut();
            if new_line >= 1 && new_line < state.stacks.len() {
                state.stacks.insert(new_line, None);
            }
            state.invalidate(new_line);
        }
        debug!(after, new_line, marker = self.first_invalid_line(), "line inserted");
        self.notify_line(new_line.max(1));
        Ok(())
    }

    /// Edit notification: `line` was removed
    pub fn line_removed(&self, line: usize) -> Result<()> {
        self.check_editable()?;
        {
            let mut state = self.state.borrow_mut();
            if line >= 1 && line < state.stacks.len() {
                state.stacks.remove(line);
            }
            state.invalidate(line);
        }
        debug!(line, marker = self.first_invalid_line(), "line removed");
        // The line that moved up into the gap was drawn with the old input
        self.notify_line(line.max(1));
        Ok(())
    }

    /// Edit notification: the whole document was replaced
    pub fn rebuild(&self) -> Result<()> {
        self.invalidate_all()
    }

    /// Open a batch of highlight requests (one redraw pass). State-changed
    /// notifications are held back and fired once by [`end_batch`](Self::end_batch).
    pub fn begin_batch(&self) -> Result<()> {
        self.check_alive()?;
        if self.in_batch.replace(true) {
            return Err(HighlightError::UnbalancedBatch("begin_batch called inside a batch"));
        }
        debug!("begin batch");
        Ok(())
    }

    /// Close the batch opened by [`begin_batch`](Self::begin_batch)
    pub fn end_batch(&self) -> Result<()> {
        self.check_alive()?;
        if !self.in_batch.replace(false) {
            return Err(HighlightError::UnbalancedBatch("end_batch called without begin_batch"));
        }
        debug!("end batch");
        if let Some((from, to)) = self.pending_change.take() {
            self.fire(from, to);
        }
        Ok(())
    }

    /// Span stack at the end of `line` (0 gives the initial stack)
    pub fn span_stack_at(&self, line: usize) -> Result<SpanStack> {
        self.check_alive()?;
        self.check_line(line, 0)?;
        let _guard = PassGuard::enter(&self.is_highlighting)?;

        let mut changed = Vec::new();
        let result = self.replay(line + 1, &mut changed);
        let stack = self.state.borrow().stack(line);
        for line in changed {
            self.notify(line, line);
        }
        result.map(|()| stack)
    }

    /// Highlight `line`, bringing the cached state up to date first
    pub fn highlight_line(&self, line: usize) -> Result<HighlightedLine> {
        self.check_alive()?;
        self.check_line(line, 1)?;
        let _guard = PassGuard::enter(&self.is_highlighting)?;

        let mut changed = Vec::new();
        let highlighted = self.replay(line, &mut changed).and_then(|()| {
            // No state borrow is held while the document is read
            let input = self.state.borrow().stack(line - 1);
            let text = self.document.line_text(line);
            let offset = self.document.line_start_offset(line);
            let result = self.engine.highlight_line(&input, line, offset, &text)?;
            let line_count = self.document.line_count();

            let mut state = self.state.borrow_mut();
            if state.store(line, result.end_stack) && line < line_count {
                changed.push(line + 1);
            }
            state.first_invalid_line = state.first_invalid_line.max(line + 1);
            Ok(result.line)
        });

        // Listeners run while the guard is still held
        for line in changed {
            self.notify(line, line);
        }
        highlighted
    }

    /// Scan every stale line before `until`, leaving the marker at `until`
    /// (or at the first line that failed)
    fn replay(&self, until: usize, changed: &mut Vec<usize>) -> Result<()> {
        let line_count = self.document.line_count();
        let from = self.first_invalid_line();
        if from < until {
            debug!(from, to = until - 1, "replay span stacks");
        }
        loop {
            let (line, input) = {
                let state = self.state.borrow();
                let line = state.first_invalid_line;
                if line >= until {
                    return Ok(());
                }
                (line, state.stack(line - 1))
            };
            let text = self.document.line_text(line);
            let stack = self.engine.scan_line(&input, &text)?;
            let mut state = self.state.borrow_mut();
            if state.store(line, stack) && line < line_count {
                changed.push(line + 1);
            }
            state.first_invalid_line = line + 1;
        }
    }

    /// Notify a single line, skipping lines past the end of the document
    fn notify_line(&self, line: usize) {
        if line <= self.document.line_count() {
            self.notify(line, line);
        }
    }

    fn notify(&self, from: usize, to: usize) {
        if self.in_batch.get() {
            let merged = match self.pending_change.get() {
                Some((a, b)) => (a.min(from), b.max(to)),
                None => (from, to),
            };
            self.pending_change.set(Some(merged));
        } else {
            self.fire(from, to);
        }
    }

    fn fire(&self, from: usize, to: usize) {
        let mut listeners = mem::take(&mut *self.listeners.borrow_mut());
        for listener in listeners.iter_mut() {
            listener(from, to);
        }
        // Keep listeners registered from inside a callback
        let added = mem::replace(&mut *self.listeners.borrow_mut(), listeners);
        self.listeners.borrow_mut().extend(added);
    }
}
