//! Persistent stack of open spans
//!
//! Every line of a document starts with the spans left open by the line
//! before it. Many consecutive lines usually share the same stack (think
//! of a long block comment), so the stack is an immutable `Rc`-linked
//! list: push and pop build new heads, and clones are pointer copies.

use std::fmt;
use std::rc::Rc;

use super::rules::SpanRef;

struct Node {
    span: SpanRef,
    depth: usize,
    parent: Option<Rc<Node>>,
}

/// Immutable stack of open spans, innermost on top
#[derive(Clone, Default)]
pub struct SpanStack {
    head: Option<Rc<Node>>,
}

impl SpanStack {
    /// The empty stack (main rule-set active)
    pub fn empty() -> Self {
        Self { head: None }
    }

    /// Check if no span is open
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of open spans
    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |n| n.depth)
    }

    /// Innermost open span
    pub fn peek(&self) -> Option<SpanRef> {
        self.head.as_ref().map(|n| n.span)
    }

    /// Return a new stack with `span` on top. `self` is unchanged.
    pub fn push(&self, span: SpanRef) -> SpanStack {
        let depth = self.len() + 1;
        SpanStack {
            head: Some(Rc::new(Node {
                span,
                depth,
                parent: self.head.clone(),
            })),
        }
    }

    /// Return the stack below the top span, or `None` if empty
    pub fn pop(&self) -> Option<SpanStack> {
        self.head.as_ref().map(|n| SpanStack {
            head: n.parent.clone(),
        })
    }

    /// Iterate from the innermost span outwards
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Open spans from the outermost inwards
    pub fn outermost_first(&self) -> Vec<SpanRef> {
        let mut spans: Vec<SpanRef> = self.iter().collect();
        spans.reverse();
        spans
    }

    /// Check if both stacks share the same head node
    pub fn ptr_eq(&self, other: &SpanStack) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Iterator over a [`SpanStack`], innermost first
pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl Iterator for Iter<'_> {
    type Item = SpanRef;

    fn next(&mut self) -> Option<SpanRef> {
        let node = self.next?;
        self.next = node.parent.as_deref();
        Some(node.span)
    }
}

impl<'a> IntoIterator for &'a SpanStack {
    type Item = SpanRef;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl PartialEq for SpanStack {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for SpanStack {}

impl fmt::Debug for SpanStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.outermost_first()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::RuleSetId;

    fn span(index: usize) -> SpanRef {
        SpanRef::new(RuleSetId::MAIN, index)
    }

    #[test]
    fn test_empty_stack() {
        let stack = SpanStack::empty();
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
        assert_eq!(stack.peek(), None);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_push_pop_persistent() {
        let base = SpanStack::empty().push(span(0));
        let deeper = base.push(span(1));

        assert_eq!(base.len(), 1);
        assert_eq!(deeper.len(), 2);
        assert_eq!(deeper.peek(), Some(span(1)));
        assert_eq!(base.peek(), Some(span(0)));

        let popped = deeper.pop().unwrap_or_default();
        assert!(popped.ptr_eq(&base));
        assert_eq!(popped, base);
    }

    #[test]
    fn test_structural_equality() {
        let a = SpanStack::empty().push(span(0)).push(span(2));
        let b = SpanStack::empty().push(span(0)).push(span(2));
        let c = SpanStack::empty().push(span(2)).push(span(0));

        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, a.pop().unwrap_or_default());
    }

    #[test]
    fn test_iteration_order() {
        let stack = SpanStack::empty().push(span(0)).push(span(1)).push(span(2));
        let inner_first: Vec<_> = stack.iter().map(|s| s.index()).collect();
        assert_eq!(inner_first, vec![2, 1, 0]);
        let outer_first: Vec<_> = stack.outermost_first().iter().map(|s| s.index()).collect();
        assert_eq!(outer_first, vec![0, 1, 2]);
    }
}
