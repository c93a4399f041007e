//! # keepsake
//!
//! Immutable, value-semantic collections for Rust.
//!
//! ## Overview
//!
//! This library provides collections that can be shared and passed around
//! freely without defensive copying:
//!
//! - **Persistent collections**: [`PersistentIndexMap`] and
//!   [`PersistentIndexSet`] are immutable, insertion-ordered keyed
//!   collections. Every "mutation" returns a new instance and leaves the
//!   receiver untouched, so a previously observed value never changes.
//! - **Mapped-key collections**: [`MappedMap`] and [`MappedSet`] let you key
//!   a persistent collection by an arbitrary complex type, by supplying a
//!   [`KeyTransform`] that encodes each key to a primitive representation
//!   (and decodes it back for iteration).
//! - **Transient collections**: [`RingQueue`] and [`ArrayStack`] are
//!   single-owner, mutate-in-place structures for O(1) FIFO/LIFO throughput
//!   where persistence is not needed.
//!
//! Partial lookups (`get`, `dequeue`, `pop`, `peek`) never panic; a missing
//! element is always reported as [`Option::None`].
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` for structural sharing, making the
//!   persistent collections shareable across threads.
//!
//! ## Example
//!
//! ```rust
//! use keepsake::prelude::*;
//!
//! let map = PersistentIndexMap::new()
//!     .insert("a", 1)
//!     .insert("b", 2);
//!
//! let updated = map.insert("a", 9);
//! assert_eq!(map.get("a"), Some(&1));     // Original unchanged
//! assert_eq!(updated.get("a"), Some(&9)); // New version
//! ```
//!
//! [`PersistentIndexMap`]: persistent::PersistentIndexMap
//! [`PersistentIndexSet`]: persistent::PersistentIndexSet
//! [`MappedMap`]: persistent::MappedMap
//! [`MappedSet`]: persistent::MappedSet
//! [`KeyTransform`]: persistent::KeyTransform
//! [`RingQueue`]: transient::RingQueue
//! [`ArrayStack`]: transient::ArrayStack

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use keepsake::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
    pub use crate::transient::*;
}

pub mod persistent;
pub mod transient;
