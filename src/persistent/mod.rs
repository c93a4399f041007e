//! Persistent (immutable) collections.
//!
//! This module provides immutable keyed collections that use structural
//! sharing to minimize copying:
//!
//! - [`PersistentIndexMap`]: insertion-ordered persistent map (HAMT)
//! - [`PersistentIndexSet`]: insertion-ordered persistent set
//! - [`MappedMap`] / [`MappedSet`]: complex-key variants addressed through a
//!   caller-supplied [`KeyTransform`]
//!
//! # Structural Sharing
//!
//! Every mutating operation returns a new collection that shares unchanged
//! substructure with its predecessor. The original instance remains valid
//! and observably unchanged for its whole lifetime, which makes these types
//! safe to read concurrently from many places without synchronization.
//!
//! # Insertion Order
//!
//! Iteration visits entries in the order their keys were first inserted.
//! Replacing the value of an existing key keeps that key's position; only a
//! remove followed by a fresh insert moves a key to the end.
//!
//! # Examples
//!
//! ## `PersistentIndexMap`
//!
//! ```rust
//! use keepsake::persistent::PersistentIndexMap;
//!
//! let map = PersistentIndexMap::new()
//!     .insert("one", 1)
//!     .insert("two", 2);
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one", 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! ## `PersistentIndexSet`
//!
//! ```rust
//! use keepsake::persistent::PersistentIndexSet;
//!
//! let set: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
//! let other: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();
//!
//! assert_eq!(set.union(&other).len(), 4);        // {1, 2, 3, 4}
//! assert_eq!(set.intersection(&other).len(), 2); // {2, 3}
//! ```
//!
//! ## `MappedMap`
//!
//! ```rust
//! use keepsake::persistent::{FnTransform, MappedMap};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let transform = FnTransform::new(
//!     |point: &Point| format!("{},{}", point.x, point.y),
//!     |text: &String| {
//!         let mut parts = text.split(',').map(|part| part.parse().unwrap_or(0));
//!         Point { x: parts.next().unwrap_or(0), y: parts.next().unwrap_or(0) }
//!     },
//! );
//!
//! let map = MappedMap::new(transform).insert(Point { x: 1, y: 2 }, "P");
//! assert_eq!(map.get(&Point { x: 1, y: 2 }), Some(&"P"));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod index_map;
mod index_set;
mod mapped;

pub use index_map::PersistentIndexMap;
pub use index_map::PersistentIndexMapIntoIterator;
pub use index_map::PersistentIndexMapIterator;
pub use index_set::PersistentIndexSet;
pub use index_set::PersistentIndexSetIntoIterator;
pub use index_set::PersistentIndexSetIterator;
pub use mapped::FnTransform;
pub use mapped::KeyTransform;
pub use mapped::MappedMap;
pub use mapped::MappedMapIterator;
pub use mapped::MappedSet;
pub use mapped::MappedSetIterator;

// =============================================================================
// Tests
// =============================================================================
