//! Transient (mutate-in-place) collections.
//!
//! This module provides single-owner structures that trade persistence for
//! raw throughput:
//!
//! - [`RingQueue`]: circular-buffer FIFO queue
//! - [`ArrayStack`]: array-backed LIFO stack
//!
//! Unlike the persistent collections, these mutate in place and keep no
//! previous version. They are intended for single-threaded producer/consumer
//! patterns; exclusive access is enforced at compile time by their `&mut`
//! receivers, and sharing one across threads requires external
//! synchronization.
//!
//! Partial accesses (`dequeue`, `pop`, `peek`) on an empty collection return
//! `None` rather than panicking.
//!
//! # Examples
//!
//! ```rust
//! use keepsake::transient::{ArrayStack, RingQueue};
//!
//! let mut queue = RingQueue::new();
//! queue.enqueue(1);
//! queue.enqueue(2);
//! assert_eq!(queue.dequeue(), Some(1)); // FIFO
//!
//! let mut stack = ArrayStack::new();
//! stack.push(1);
//! stack.push(2);
//! assert_eq!(stack.pop(), Some(2)); // LIFO
//! ```

mod array_stack;
mod ring_queue;

pub use array_stack::ArrayStack;
pub use array_stack::ArrayStackIntoIterator;
pub use ring_queue::RingQueue;
pub use ring_queue::RingQueueIntoIterator;
pub use ring_queue::RingQueueIterator;
