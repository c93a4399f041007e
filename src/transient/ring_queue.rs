//! Mutate-in-place FIFO queue backed by a circular buffer.
//!
//! This module provides [`RingQueue`], a single-owner queue with O(1)
//! dequeue and amortized O(1) enqueue. Elements live in a circular buffer
//! addressed by a head index; when the buffer fills up, a new buffer of
//! twice the capacity is allocated and the live elements are moved into it
//! starting at index 0.
//!
//! # Examples
//!
//! ```rust
//! use keepsake::transient::RingQueue;
//!
//! let mut queue = RingQueue::new();
//! queue.enqueue("a");
//! queue.enqueue("b");
//!
//! assert_eq!(queue.peek(), Some(&"a"));
//! assert_eq!(queue.dequeue(), Some("a"));
//! assert_eq!(queue.dequeue(), Some("b"));
//! assert_eq!(queue.dequeue(), None);
//! ```

use std::fmt;
use std::iter::FromIterator;

/// Capacity of the first allocation when a queue created with [`RingQueue::new`]
/// receives its first element.
const INITIAL_CAPACITY: usize = 8;

// =============================================================================
// RingQueue Definition
// =============================================================================

/// A mutate-in-place FIFO queue over a circular buffer.
///
/// `RingQueue` is a single-owner structure: it mutates in place and keeps no
/// previous version. For any interleaving of enqueues and dequeues, the
/// relative order of the elements still present is exactly their insertion
/// order.
///
/// # Time Complexity
///
/// | Operation  | Complexity       |
/// |------------|------------------|
/// | `enqueue`  | O(1) amortized   |
/// | `dequeue`  | O(1)             |
/// | `peek`     | O(1)             |
/// | `len`      | O(1)             |
///
/// # Examples
///
/// ```rust
/// use keepsake::transient::RingQueue;
///
/// let mut queue: RingQueue<i32> = (1..=3).collect();
/// assert_eq!(queue.dequeue(), Some(1));
/// assert_eq!(queue.len(), 2);
/// ```
pub struct RingQueue<T> {
    /// Backing storage; `None` slots are free
    buffer: Vec<Option<T>>,
    /// Index of the front element (meaningless while empty)
    head: usize,
    /// Number of live elements
    length: usize,
}

impl<T> RingQueue<T> {
    /// Creates a new empty queue.
    ///
    /// No allocation happens until the first enqueue.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            head: 0,
            length: 0,
        }
    }

    /// Creates a new empty queue with room for at least `capacity` elements
    /// before the first grow.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Vec::new();
        buffer.resize_with(capacity, || None);
        Self {
            buffer,
            head: 0,
            length: 0,
        }
    }

    /// Returns the number of elements in the queue.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the queue contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of elements the queue can hold before growing.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Adds an element at the back of the queue.
    ///
    /// Grows the backing buffer by doubling when full.
    ///
    /// # Complexity
    ///
    /// O(1) amortized
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::transient::RingQueue;
    ///
    /// let mut queue = RingQueue::new();
    /// queue.enqueue(1);
    /// queue.enqueue(2);
    /// assert_eq!(queue.len(), 2);
    /// ```
    pub fn enqueue(&mut self, item: T) {
        if self.length == self.buffer.len() {
            self.grow();
        }
        let slot = (self.head + self.length) % self.buffer.len();
        self.buffer[slot] = Some(item);
        self.length += 1;
    }

    /// Doubles the backing buffer, moving live elements to the front of the
    /// new storage and resetting the head to 0.
    fn grow(&mut self) {
        let new_capacity = if self.buffer.is_empty() {
            INITIAL_CAPACITY
        } else {
            self.buffer.len() * 2
        };

        let mut new_buffer = Vec::new();
        new_buffer.resize_with(new_capacity, || None);

        for offset in 0..self.length {
            let slot = (self.head + offset) % self.buffer.len();
            new_buffer[offset] = self.buffer[slot].take();
        }

        self.buffer = new_buffer;
        self.head = 0;
    }

    /// Removes and returns the element at the front of the queue, or `None`
    /// if the queue is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::transient::RingQueue;
    ///
    /// let mut queue = RingQueue::new();
    /// assert_eq!(queue.dequeue(), None);
    ///
    /// queue.enqueue(1);
    /// assert_eq!(queue.dequeue(), Some(1));
    /// ```
    pub fn dequeue(&mut self) -> Option<T> {
        if self.length == 0 {
            return None;
        }
        let item = self.buffer[self.head].take();
        self.head = (self.head + 1) % self.buffer.len();
        self.length -= 1;
        item
    }

    /// Returns a reference to the element at the front of the queue without
    /// removing it, or `None` if the queue is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        if self.length == 0 {
            None
        } else {
            self.buffer[self.head].as_ref()
        }
    }

    /// Removes all elements, keeping the allocated buffer.
    pub fn clear(&mut self) {
        for slot in &mut self.buffer {
            *slot = None;
        }
        self.head = 0;
        self.length = 0;
    }

    /// Returns a non-destructive iterator from front to back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::transient::RingQueue;
    ///
    /// let queue: RingQueue<i32> = (1..=3).collect();
    /// let elements: Vec<i32> = queue.iter().copied().collect();
    /// assert_eq!(elements, vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> RingQueueIterator<'_, T> {
        RingQueueIterator {
            queue: self,
            offset: 0,
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A borrowed front-to-back iterator over a [`RingQueue`].
pub struct RingQueueIterator<'a, T> {
    queue: &'a RingQueue<T>,
    offset: usize,
}

impl<'a, T> Iterator for RingQueueIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.queue.length {
            return None;
        }
        let slot = (self.queue.head + self.offset) % self.queue.buffer.len();
        self.offset += 1;
        self.queue.buffer[slot].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.queue.length.saturating_sub(self.offset);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for RingQueueIterator<'_, T> {
    fn len(&self) -> usize {
        self.queue.length.saturating_sub(self.offset)
    }
}

/// An owning iterator that drains a [`RingQueue`] front to back.
pub struct RingQueueIntoIterator<T> {
    queue: RingQueue<T>,
}

impl<T> Iterator for RingQueueIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.dequeue()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.length, Some(self.queue.length))
    }
}

impl<T> ExactSizeIterator for RingQueueIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for RingQueue<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for RingQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<T> Extend<T> for RingQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.enqueue(item);
        }
    }
}

impl<T> IntoIterator for RingQueue<T> {
    type Item = T;
    type IntoIter = RingQueueIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        RingQueueIntoIterator { queue: self }
    }
}

impl<'a, T> IntoIterator for &'a RingQueue<T> {
    type Item = &'a T;
    type IntoIter = RingQueueIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for RingQueue<T> {
    /// Two queues are equal when they hold equal elements in the same FIFO
    /// order, regardless of internal head position or capacity.
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RingQueue<T> {}

impl<T: fmt::Debug> fmt::Debug for RingQueue<T> {
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
        let queue: RingQueue<i32> = RingQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 0);
    }

    #[rstest]
    fn test_dequeue_empty_returns_none() {
        let mut queue: RingQueue<i32> = RingQueue::new();
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.peek(), None);
    }

    #[rstest]
    fn test_fifo_order() {
        let mut queue = RingQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }

    #[rstest]
    fn test_dequeue_then_iterate_remaining() {
        let mut queue = RingQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);

        assert_eq!(queue.dequeue(), Some(1));
        let remaining: Vec<i32> = queue.iter().copied().collect();
        assert_eq!(remaining, vec![2]);
    }

    #[rstest]
    fn test_peek_is_non_destructive() {
        let mut queue = RingQueue::new();
        queue.enqueue(7);

        assert_eq!(queue.peek(), Some(&7));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(), Some(7));
    }

    #[rstest]
    fn test_grow_preserves_order_with_wrapped_head() {
        let mut queue = RingQueue::with_capacity(4);
        for item in 0..4 {
            queue.enqueue(item);
        }
        // Advance the head so the live region wraps after refilling
        assert_eq!(queue.dequeue(), Some(0));
        assert_eq!(queue.dequeue(), Some(1));
        queue.enqueue(4);
        queue.enqueue(5);

        // Buffer is full with head in the middle; the next enqueue grows
        queue.enqueue(6);
        assert!(queue.capacity() > 4);

        let elements: Vec<i32> = queue.into_iter().collect();
        assert_eq!(elements, vec![2, 3, 4, 5, 6]);
    }

    #[rstest]
    fn test_interleaved_operations_preserve_fifo() {
        let mut queue = RingQueue::new();
        let mut expected = std::collections::VecDeque::new();

        for round in 0..100 {
            queue.enqueue(round);
            expected.push_back(round);
            if round % 3 == 0 {
                assert_eq!(queue.dequeue(), expected.pop_front());
            }
        }
        let drained: Vec<i32> = queue.into_iter().collect();
        let expected: Vec<i32> = expected.into_iter().collect();
        assert_eq!(drained, expected);
    }

    #[rstest]
    fn test_clear() {
        let mut queue: RingQueue<i32> = (0..10).collect();
        let capacity = queue.capacity();
        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), capacity);
        assert_eq!(queue.dequeue(), None);
    }

    #[rstest]
    fn test_eq_ignores_head_position() {
        let mut queue_a = RingQueue::with_capacity(2);
        queue_a.enqueue(1);
        queue_a.enqueue(2);
        queue_a.dequeue();
        queue_a.enqueue(3);

        let queue_b: RingQueue<i32> = [2, 3].into_iter().collect();
        assert_eq!(queue_a, queue_b);
    }

    #[rstest]
    fn test_debug_format() {
        let queue: RingQueue<i32> = (1..=3).collect();
        assert_eq!(format!("{queue:?}"), "[1, 2, 3]");
    }
}
