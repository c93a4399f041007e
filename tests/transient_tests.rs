//! Unit tests for `RingQueue` and `ArrayStack`.
//!
//! Exercises the single-owner transient structures: FIFO/LIFO discipline,
//! absent-element results on empty collections, and growth behavior.

use keepsake::transient::{ArrayStack, RingQueue};
use rstest::rstest;

// =============================================================================
// RingQueue
// =============================================================================

#[rstest]
fn test_queue_fifo_scenario() {
    let mut queue = RingQueue::new();
    queue.enqueue(1);
    queue.enqueue(2);

    assert_eq!(queue.dequeue(), Some(1));
    let remaining: Vec<i32> = queue.iter().copied().collect();
    assert_eq!(remaining, vec![2]);
}

#[rstest]
fn test_queue_empty_accesses_return_none() {
    let mut queue: RingQueue<String> = RingQueue::new();
    assert_eq!(queue.dequeue(), None);
    assert_eq!(queue.peek(), None);

    // Still usable afterwards
    queue.enqueue("first".to_string());
    assert_eq!(queue.peek(), Some(&"first".to_string()));
}

#[rstest]
fn test_queue_drain_and_refill() {
    let mut queue = RingQueue::with_capacity(2);
    for round in 0..5 {
        queue.enqueue(round * 2);
        queue.enqueue(round * 2 + 1);
        assert_eq!(queue.dequeue(), Some(round * 2));
        assert_eq!(queue.dequeue(), Some(round * 2 + 1));
    }
    assert!(queue.is_empty());
}

#[rstest]
fn test_queue_growth_keeps_all_elements() {
    let mut queue = RingQueue::new();
    for item in 0..1000 {
        queue.enqueue(item);
    }
    assert_eq!(queue.len(), 1000);

    let drained: Vec<i32> = queue.into_iter().collect();
    assert_eq!(drained, (0..1000).collect::<Vec<_>>());
}

// =============================================================================
// ArrayStack
// =============================================================================

#[rstest]
fn test_stack_lifo_scenario() {
    let mut stack = ArrayStack::new();
    stack.push(1);
    stack.push(2);

    assert_eq!(stack.pop(), Some(2));
    let remaining: Vec<i32> = stack.iter().copied().collect();
    assert_eq!(remaining, vec![1]);
}

#[rstest]
fn test_stack_empty_accesses_return_none() {
    let mut stack: ArrayStack<String> = ArrayStack::new();
    assert_eq!(stack.pop(), None);
    assert_eq!(stack.peek(), None);

    stack.push("only".to_string());
    assert_eq!(stack.peek(), Some(&"only".to_string()));
}

#[rstest]
fn test_stack_push_pop_returns_pushed() {
    let mut stack: ArrayStack<i32> = (0..50).collect();
    stack.push(999);
    assert_eq!(stack.pop(), Some(999));
    assert_eq!(stack.len(), 50);
}

#[rstest]
fn test_stack_reverses_on_drain() {
    let stack: ArrayStack<char> = "abc".chars().collect();
    let drained: String = stack.into_iter().collect();
    assert_eq!(drained, "cba");
}
