//! Mutate-in-place LIFO stack with inline small storage.
//!
//! This module provides [`ArrayStack`], a single-owner stack backed by a
//! `SmallVec`: up to 8 elements live inline without touching the heap, and
//! larger stacks spill to a heap buffer that grows by doubling.
//!
//! # Examples
//!
//! ```rust
//! use keepsake::transient::ArrayStack;
//!
//! let mut stack = ArrayStack::new();
//! stack.push(1);
//! stack.push(2);
//!
//! assert_eq!(stack.peek(), Some(&2));
//! assert_eq!(stack.pop(), Some(2));
//! assert_eq!(stack.pop(), Some(1));
//! assert_eq!(stack.pop(), None);
//! ```

use std::fmt;
use std::iter::FromIterator;

use smallvec::SmallVec;

/// Number of elements stored inline before spilling to the heap.
const INLINE_CAPACITY: usize = 8;

// =============================================================================
// ArrayStack Definition
// =============================================================================

/// A mutate-in-place LIFO stack.
///
/// `ArrayStack` is a single-owner structure: it mutates in place and keeps
/// no previous version. A `pop` immediately after `push(x)` returns `x`.
///
/// # Time Complexity
///
/// | Operation | Complexity     |
/// |-----------|----------------|
/// | `push`    | O(1) amortized |
/// | `pop`     | O(1)           |
/// | `peek`    | O(1)           |
/// | `len`     | O(1)           |
///
/// # Examples
///
/// ```rust
/// use keepsake::transient::ArrayStack;
///
/// let mut stack: ArrayStack<i32> = (1..=3).collect();
/// assert_eq!(stack.pop(), Some(3)); // Last in, first out
/// ```
pub struct ArrayStack<T> {
    items: SmallVec<[T; INLINE_CAPACITY]>,
}

impl<T> ArrayStack<T> {
    /// Creates a new empty stack.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Creates a new empty stack with room for at least `capacity` elements
    /// before the first reallocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: SmallVec::with_capacity(capacity),
        }
    }

    /// Returns the number of elements on the stack.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes an element on top of the stack.
    ///
    /// # Complexity
    ///
    /// O(1) amortized (the backing storage doubles when full)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::transient::ArrayStack;
    ///
    /// let mut stack = ArrayStack::new();
    /// stack.push("top");
    /// assert_eq!(stack.len(), 1);
    /// ```
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes and returns the top element, or `None` if the stack is
    /// empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::transient::ArrayStack;
    ///
    /// let mut stack = ArrayStack::new();
    /// assert_eq!(stack.pop(), None);
    ///
    /// stack.push(1);
    /// assert_eq!(stack.pop(), Some(1));
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns a reference to the top element without removing it, or
    /// `None` if the stack is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Removes all elements, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns a non-destructive iterator from top to bottom (pop order).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::transient::ArrayStack;
    ///
    /// let stack: ArrayStack<i32> = (1..=3).collect();
    /// let elements: Vec<i32> = stack.iter().copied().collect();
    /// assert_eq!(elements, vec![3, 2, 1]);
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An owning iterator that drains an [`ArrayStack`] in pop order.
pub struct ArrayStackIntoIterator<T> {
    stack: ArrayStack<T>,
}

impl<T> Iterator for ArrayStackIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.stack.len()))
    }
}

impl<T> ExactSizeIterator for ArrayStackIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for ArrayStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ArrayStack<T> {
    /// Pushes the iterator's items in order; the last item ends up on top.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for ArrayStack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for ArrayStack<T> {
    type Item = T;
    type IntoIter = ArrayStackIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        ArrayStackIntoIterator { stack: self }
    }
}

impl<'a, T> IntoIterator for &'a ArrayStack<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().rev()
    }
}

impl<T: PartialEq> PartialEq for ArrayStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for ArrayStack<T> {}

impl<T: fmt::Debug> fmt::Debug for ArrayStack<T> {
    /// Formats top to bottom, matching `iter`'s order.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_new_creates_empty() {
        let stack: ArrayStack<i32> = ArrayStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
    }

    #[rstest]
    fn test_pop_empty_returns_none() {
        let mut stack: ArrayStack<i32> = ArrayStack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.peek(), None);
    }

    #[rstest]
    fn test_lifo_order() {
        let mut stack = ArrayStack::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);

        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[rstest]
    fn test_pop_then_iterate_remaining() {
        let mut stack = ArrayStack::new();
        stack.push(1);
        stack.push(2);

        assert_eq!(stack.pop(), Some(2));
        let remaining: Vec<i32> = stack.iter().copied().collect();
        assert_eq!(remaining, vec![1]);
    }

    #[rstest]
    fn test_peek_is_non_destructive() {
        let mut stack = ArrayStack::new();
        stack.push(7);

        assert_eq!(stack.peek(), Some(&7));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop(), Some(7));
    }

    #[rstest]
    fn test_push_pop_invariant() {
        let mut stack: ArrayStack<i32> = (0..5).collect();
        stack.push(42);
        assert_eq!(stack.pop(), Some(42));
    }

    #[rstest]
    fn test_spill_past_inline_capacity() {
        let mut stack = ArrayStack::new();
        for item in 0..100 {
            stack.push(item);
        }
        assert_eq!(stack.len(), 100);
        for item in (0..100).rev() {
            assert_eq!(stack.pop(), Some(item));
        }
        assert!(stack.is_empty());
    }

    #[rstest]
    fn test_into_iter_drains_in_pop_order() {
        let stack: ArrayStack<i32> = (1..=3).collect();
        let drained: Vec<i32> = stack.into_iter().collect();
        assert_eq!(drained, vec![3, 2, 1]);
    }

    #[rstest]
    fn test_debug_format() {
        let stack: ArrayStack<i32> = (1..=2).collect();
        assert_eq!(format!("{stack:?}"), "[2, 1]");
    }
}
