//! Persistent (immutable) insertion-ordered map.
//!
//! This module provides [`PersistentIndexMap`], an immutable map that uses
//! structural sharing for efficient operations and preserves insertion order
//! on iteration.
//!
//! # Overview
//!
//! `PersistentIndexMap` is based on a Hash Array Mapped Trie (HAMT) with
//! 32-way branching, where hash bits are used to navigate the tree. Each
//! stored entry additionally carries an insertion stamp, a monotonically
//! increasing counter assigned the first time a key enters the map; iteration
//! sorts by stamp, so entries come back in the order their keys were first
//! inserted.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//! - O(N log N) iteration (entries are gathered and ordered by stamp)
//!
//! All operations return new maps without modifying the original, and
//! structural sharing ensures memory efficiency.
//!
//! # Insertion Order
//!
//! Replacing the value of an existing key keeps the key's stamp, so its
//! position in iteration order is the position of its *first* insertion;
//! only the value changes. A key re-inserted after a remove is a fresh entry
//! and moves to the end.
//!
//! # Examples
//!
//! ```rust
//! use keepsake::persistent::PersistentIndexMap;
//!
//! let map = PersistentIndexMap::new()
//!     .insert("one", 1)
//!     .insert("two", 2)
//!     .insert("one", 100);
//!
//! // "one" keeps its original position, with the latest value
//! let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
//! assert_eq!(entries, vec![("one", 100), ("two", 2)]);
//! ```

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use super::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor (2^5 = 32)
const BRANCHING_FACTOR: usize = 32;

/// Bits per level in the trie
const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting index within a node
const MASK: u64 = (BRANCHING_FACTOR - 1) as u64;

// =============================================================================
// Hash computation
// =============================================================================

/// Computes the hash of a key using `DefaultHasher`.
fn compute_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Extracts the child index at a given depth from a hash.
#[inline]
const fn hash_index(hash: u64, depth: usize) -> usize {
    ((hash >> (depth * BITS_PER_LEVEL)) & MASK) as usize
}

// =============================================================================
// Node Definition
// =============================================================================

/// A stamped entry in a collision node: (stamp, key, value).
type Stamped<K, V> = (u64, K, V);

/// Internal node structure for the trie.
///
/// Unlike a classic HAMT with a separate child enum, leaves are ordinary
/// node variants; branch children are stored in a compressed slice shared
/// behind a reference counter.
#[derive(Clone)]
enum Node<K, V> {
    /// Empty node (root of an empty map only)
    Empty,
    /// Single key-value entry with its insertion stamp
    Leaf {
        hash: u64,
        stamp: u64,
        key: K,
        value: V,
    },
    /// Bitmap-indexed branch node
    Branch {
        /// Bitmap indicating which of the 32 slots are occupied
        bitmap: u32,
        /// Occupied children in slot order, compressed
        children: ReferenceCounter<[Node<K, V>]>,
    },
    /// Overflow node for distinct keys sharing a full 64-bit hash
    Collision {
        hash: u64,
        entries: ReferenceCounter<[Stamped<K, V>]>,
    },
}

impl<K, V> Node<K, V> {
    const fn empty() -> Self {
        Self::Empty
    }
}

// =============================================================================
// PersistentIndexMap Definition
// =============================================================================

/// A persistent (immutable) insertion-ordered map.
///
/// `PersistentIndexMap` is an immutable data structure that uses structural
/// sharing to efficiently support functional programming patterns, while
/// iterating entries in the order their keys were first inserted.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
/// | `iter`         | O(N log N)        |
///
/// # Examples
///
/// ```rust
/// use keepsake::persistent::PersistentIndexMap;
///
/// let map = PersistentIndexMap::singleton("key", 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
pub struct PersistentIndexMap<K, V> {
    /// Root node of the trie
    root: ReferenceCounter<Node<K, V>>,
    /// Number of entries
    length: usize,
    /// Stamp handed to the next newly inserted key
    next_stamp: u64,
}

impl<K, V> Clone for PersistentIndexMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: ReferenceCounter::clone(&self.root),
            length: self.length,
            next_stamp: self.next_stamp,
        }
    }
}

impl<K, V> PersistentIndexMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map: PersistentIndexMap<String, i32> = PersistentIndexMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            length: 0,
            next_stamp: 0,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentIndexMap<K, V> {
    /// Creates a map containing a single key-value pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::singleton("key", 42);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get("key"), Some(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and
    /// `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = compute_hash(key);
        Self::get_from_node(&self.root, key, hash, 0)
    }

    /// Recursive helper for get.
    fn get_from_node<'a, Q>(node: &'a Node<K, V>, key: &Q, hash: u64, depth: usize) -> Option<&'a V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match node {
            Node::Empty => None,
            Node::Leaf {
                hash: leaf_hash,
                key: leaf_key,
                value,
                ..
            } => {
                if *leaf_hash == hash && leaf_key.borrow() == key {
                    Some(value)
                } else {
                    None
                }
            }
            Node::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                if bitmap & bit == 0 {
                    None
                } else {
                    let position = (bitmap & (bit - 1)).count_ones() as usize;
                    Self::get_from_node(&children[position], key, hash, depth + 1)
                }
            }
            Node::Collision { entries, .. } => entries
                .iter()
                .find(|(_, entry_key, _)| entry_key.borrow() == key)
                .map(|(_, _, value)| value),
        }
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("key", 42);
    ///
    /// assert!(map.contains_key("key"));
    /// assert!(!map.contains_key("other"));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, the value is replaced and the
    /// key keeps its original position in iteration order; otherwise the
    /// entry is appended at the end.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map1 = PersistentIndexMap::new().insert("key", 1);
    /// let map2 = map1.insert("key", 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = compute_hash(&key);
        let (new_root, added) =
            Self::insert_into_node(&self.root, key, value, hash, self.next_stamp, 0);

        Self {
            root: ReferenceCounter::new(new_root),
            length: if added { self.length + 1 } else { self.length },
            next_stamp: if added {
                self.next_stamp + 1
            } else {
                self.next_stamp
            },
        }
    }

    /// Recursive helper for insert.
    ///
    /// `stamp` is the stamp to assign if the key turns out to be new.
    /// Returns (`new_node`, `was_added`).
    fn insert_into_node(
        node: &Node<K, V>,
        key: K,
        value: V,
        hash: u64,
        stamp: u64,
        depth: usize,
    ) -> (Node<K, V>, bool) {
        match node {
            Node::Empty => (
                Node::Leaf {
                    hash,
                    stamp,
                    key,
                    value,
                },
                true,
            ),
            Node::Leaf {
                hash: leaf_hash,
                stamp: leaf_stamp,
                key: leaf_key,
                value: leaf_value,
            } => {
                if *leaf_hash == hash && *leaf_key == key {
                    // Same key: replace the value, keep the original stamp
                    (
                        Node::Leaf {
                            hash,
                            stamp: *leaf_stamp,
                            key,
                            value,
                        },
                        false,
                    )
                } else if *leaf_hash == hash {
                    // Full 64-bit hash collision between distinct keys
                    let entries = ReferenceCounter::from(vec![
                        (*leaf_stamp, leaf_key.clone(), leaf_value.clone()),
                        (stamp, key, value),
                    ]);
                    (Node::Collision { hash, entries }, true)
                } else {
                    let existing = node.clone();
                    (
                        Self::branch_with_new_leaf(existing, *leaf_hash, key, value, hash, stamp, depth),
                        true,
                    )
                }
            }
            Node::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                let position = (bitmap & (bit - 1)).count_ones() as usize;
                let mut new_children = children.to_vec();

                if bitmap & bit == 0 {
                    new_children.insert(
                        position,
                        Node::Leaf {
                            hash,
                            stamp,
                            key,
                            value,
                        },
                    );
                    (
                        Node::Branch {
                            bitmap: bitmap | bit,
                            children: ReferenceCounter::from(new_children),
                        },
                        true,
                    )
                } else {
                    let (new_child, added) = Self::insert_into_node(
                        &children[position],
                        key,
                        value,
                        hash,
                        stamp,
                        depth + 1,
                    );
                    new_children[position] = new_child;
                    (
                        Node::Branch {
                            bitmap: *bitmap,
                            children: ReferenceCounter::from(new_children),
                        },
                        added,
                    )
                }
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if hash == *collision_hash {
                    let mut new_entries = entries.to_vec();
                    let existing = new_entries
                        .iter_mut()
                        .find(|(_, entry_key, _)| *entry_key == key);

                    let added = match existing {
                        Some(entry) => {
                            entry.2 = value;
                            false
                        }
                        None => {
                            new_entries.push((stamp, key, value));
                            true
                        }
                    };

                    (
                        Node::Collision {
                            hash: *collision_hash,
                            entries: ReferenceCounter::from(new_entries),
                        },
                        added,
                    )
                } else {
                    let existing = node.clone();
                    (
                        Self::branch_with_new_leaf(
                            existing,
                            *collision_hash,
                            key,
                            value,
                            hash,
                            stamp,
                            depth,
                        ),
                        true,
                    )
                }
            }
        }
    }

    /// Builds a branch holding an existing node and a fresh leaf whose hashes
    /// differ, recursing while the two hashes share index bits at this depth.
    fn branch_with_new_leaf(
        existing: Node<K, V>,
        existing_hash: u64,
        key: K,
        value: V,
        hash: u64,
        stamp: u64,
        depth: usize,
    ) -> Node<K, V> {
        let existing_index = hash_index(existing_hash, depth);
        let new_index = hash_index(hash, depth);

        if existing_index == new_index {
            let subnode =
                Self::branch_with_new_leaf(existing, existing_hash, key, value, hash, stamp, depth + 1);
            Node::Branch {
                bitmap: 1u32 << existing_index,
                children: ReferenceCounter::from(vec![subnode]),
            }
        } else {
            let leaf = Node::Leaf {
                hash,
                stamp,
                key,
                value,
            };
            let bitmap = (1u32 << existing_index) | (1u32 << new_index);
            let children = if existing_index < new_index {
                vec![existing, leaf]
            } else {
                vec![leaf, existing]
            };
            Node::Branch {
                bitmap,
                children: ReferenceCounter::from(children),
            }
        }
    }

    /// Removes a key from the map.
    ///
    /// Returns a new map without the key. If the key doesn't exist, returns
    /// a clone of the original map (equal by value, unchanged).
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("a", 1).insert("b", 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = compute_hash(key);
        match Self::remove_from_node(&self.root, key, hash, 0) {
            Some(new_root) => Self {
                root: ReferenceCounter::new(new_root),
                length: self.length - 1,
                next_stamp: self.next_stamp,
            },
            None => self.clone(),
        }
    }

    /// Recursive helper for remove.
    ///
    /// Returns `Some(new_node)` if the key was found and removed, `None` if
    /// the key is absent (no change needed).
    fn remove_from_node<Q>(node: &Node<K, V>, key: &Q, hash: u64, depth: usize) -> Option<Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match node {
            Node::Empty => None,
            Node::Leaf {
                hash: leaf_hash,
                key: leaf_key,
                ..
            } => {
                if *leaf_hash == hash && leaf_key.borrow() == key {
                    Some(Node::Empty)
                } else {
                    None
                }
            }
            Node::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                let position = (bitmap & (bit - 1)).count_ones() as usize;
                let new_child = Self::remove_from_node(&children[position], key, hash, depth + 1)?;

                let mut new_children = children.to_vec();
                if matches!(new_child, Node::Empty) {
                    let new_bitmap = bitmap & !bit;
                    if new_bitmap == 0 {
                        return Some(Node::Empty);
                    }
                    new_children.remove(position);
                    Some(Self::collapse_branch(new_bitmap, new_children))
                } else {
                    new_children[position] = new_child;
                    Some(Self::collapse_branch(*bitmap, new_children))
                }
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if hash != *collision_hash {
                    return None;
                }
                let found = entries
                    .iter()
                    .position(|(_, entry_key, _)| entry_key.borrow() == key)?;

                let mut new_entries = entries.to_vec();
                new_entries.remove(found);

                if new_entries.len() == 1 {
                    let (stamp, remaining_key, remaining_value) = new_entries.remove(0);
                    Some(Node::Leaf {
                        hash: *collision_hash,
                        stamp,
                        key: remaining_key,
                        value: remaining_value,
                    })
                } else {
                    Some(Node::Collision {
                        hash: *collision_hash,
                        entries: ReferenceCounter::from(new_entries),
                    })
                }
            }
        }
    }

    /// Collapses a branch down to its sole child when that child is a leaf
    /// or collision node, shortening lookup paths after removals.
    fn collapse_branch(bitmap: u32, children: Vec<Node<K, V>>) -> Node<K, V> {
        if children.len() == 1 && !matches!(children[0], Node::Branch { .. }) {
            children.into_iter().next().unwrap_or(Node::Empty)
        } else {
            Node::Branch {
                bitmap,
                children: ReferenceCounter::from(children),
            }
        }
    }

    /// Updates the value for a key using a function.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("count".to_string(), 10);
    /// let updated = map.update("count", |value| value + 1);
    ///
    /// assert_eq!(updated.unwrap().get("count"), Some(&11));
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let value = self.get(key)?;
        let new_value = function(value);
        let hash = compute_hash(key);
        let actual_key = Self::find_key(&self.root, key, hash, 0)?;
        Some(self.insert(actual_key, new_value))
    }

    /// Finds and clones the stored key matching the given query key.
    fn find_key<Q>(node: &Node<K, V>, key: &Q, hash: u64, depth: usize) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match node {
            Node::Empty => None,
            Node::Leaf {
                hash: leaf_hash,
                key: leaf_key,
                ..
            } => {
                if *leaf_hash == hash && leaf_key.borrow() == key {
                    Some(leaf_key.clone())
                } else {
                    None
                }
            }
            Node::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                if bitmap & bit == 0 {
                    None
                } else {
                    let position = (bitmap & (bit - 1)).count_ones() as usize;
                    Self::find_key(&children[position], key, hash, depth + 1)
                }
            }
            Node::Collision { entries, .. } => entries
                .iter()
                .find(|(_, entry_key, _)| entry_key.borrow() == key)
                .map(|(_, entry_key, _)| entry_key.clone()),
        }
    }

    /// Updates, inserts, or removes a value for a key using an updater
    /// function.
    ///
    /// The updater receives `Some(&V)` if the key exists, or `None` if it
    /// doesn't. Returning `Some(V)` inserts or updates; returning `None`
    /// removes the key (if present).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("count".to_string(), 10);
    ///
    /// let incremented = map.update_with("count", |current| current.map(|v| v + 1));
    /// assert_eq!(incremented.get("count"), Some(&11));
    ///
    /// let removed = map.update_with("count", |_| None);
    /// assert_eq!(removed.get("count"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let current_value = self.get(key);
        let new_value = updater(current_value);

        match (current_value, new_value) {
            (Some(_), Some(value)) => {
                let hash = compute_hash(key);
                let actual_key =
                    Self::find_key(&self.root, key, hash, 0).unwrap_or_else(|| key.to_owned());
                self.insert(actual_key, value)
            }
            (Some(_), None) => self.remove(key),
            (None, Some(value)) => self.insert(key.to_owned(), value),
            (None, None) => self.clone(),
        }
    }

    /// Transforms every value with a function, preserving keys and order.
    ///
    /// The function receives the value and its key.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("a", 1).insert("b", 2);
    /// let doubled = map.map_values(|value, _key| value * 2);
    ///
    /// assert_eq!(doubled.get("a"), Some(&2));
    /// assert_eq!(doubled.get("b"), Some(&4));
    /// ```
    #[must_use]
    pub fn map_values<V2, F>(&self, mut function: F) -> PersistentIndexMap<K, V2>
    where
        V2: Clone,
        F: FnMut(&V, &K) -> V2,
    {
        let mut result = PersistentIndexMap::new();
        for (key, value) in self.iter() {
            result = result.insert(key.clone(), function(value, key));
        }
        result
    }

    /// Keeps only the entries for which the predicate holds, preserving
    /// order among survivors.
    ///
    /// The predicate receives the value and its key.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("a", 1).insert("b", 2);
    /// let evens = map.retain(|value, _key| value % 2 == 0);
    ///
    /// assert_eq!(evens.len(), 1);
    /// assert_eq!(evens.get("b"), Some(&2));
    /// ```
    #[must_use]
    pub fn retain<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&V, &K) -> bool,
    {
        let mut result = Self::new();
        for (key, value) in self.iter() {
            if predicate(value, key) {
                result = result.insert(key.clone(), value.clone());
            }
        }
        result
    }

    /// Merges two maps, with values from `other` taking precedence on key
    /// conflicts.
    ///
    /// # Complexity
    ///
    /// O((n + m) log(n + m))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map1 = PersistentIndexMap::new().insert("a", 1).insert("b", 2);
    /// let map2 = PersistentIndexMap::new().insert("b", 20).insert("c", 3);
    ///
    /// let merged = map1.merge(&map2);
    ///
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&20)); // From map2
    /// assert_eq!(merged.get("c"), Some(&3));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        self.merge_with(other, |_, other_value| other_value.clone())
    }

    /// Merges two maps, combining the values of shared keys with a function.
    ///
    /// The result covers the union of both key sets. A key only in `self` or
    /// only in `other` keeps its value; a key in both gets
    /// `combine(self_value, other_value)`. Keys from `self` keep their
    /// positions; keys only in `other` follow, in `other`'s order.
    ///
    /// # Complexity
    ///
    /// O((n + m) log(n + m))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map1 = PersistentIndexMap::new().insert("a", 1).insert("b", 2);
    /// let map2 = PersistentIndexMap::new().insert("b", 20).insert("c", 3);
    ///
    /// let merged = map1.merge_with(&map2, |left, right| left + right);
    ///
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&22)); // Combined
    /// assert_eq!(merged.get("c"), Some(&3));
    /// ```
    #[must_use]
    pub fn merge_with<F>(&self, other: &Self, mut combine: F) -> Self
    where
        F: FnMut(&V, &V) -> V,
    {
        let mut result = self.clone();
        for (key, other_value) in other.iter() {
            let merged = result.get(key).map(|value| combine(value, other_value));
            result = match merged {
                Some(value) => result.insert(key.clone(), value),
                None => result.insert(key.clone(), other_value.clone()),
            };
        }
        result
    }

    /// Compares two maps using a custom value comparator.
    ///
    /// Returns `true` iff both maps have the same size and, for every key in
    /// `self`, `other` contains the key with a value accepted by `compare`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map1 = PersistentIndexMap::new().insert("a", 1.0_f64);
    /// let map2 = PersistentIndexMap::new().insert("a", 1.0000001_f64);
    ///
    /// assert!(map1.eq_by(&map2, |left, right| (left - right).abs() < 1e-6));
    /// ```
    #[must_use]
    pub fn eq_by<F>(&self, other: &Self, mut compare: F) -> bool
    where
        F: FnMut(&V, &V) -> bool,
    {
        if self.length != other.length {
            return false;
        }
        self.iter().all(|(key, value)| {
            other
                .get(key)
                .is_some_and(|other_value| compare(value, other_value))
        })
    }

    /// Returns an iterator over key-value pairs in insertion order.
    ///
    /// The iterator borrows the map; iterating never mutates the source and
    /// a fresh iterator can be obtained at any time.
    ///
    /// The ordering pass runs when the iterator is created: all entries are
    /// collected and sorted up front (O(N log N)), and `next` then yields
    /// them in O(1). Creating an iterator over a large map is therefore not
    /// free even if only a few items are consumed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexMap;
    ///
    /// let map = PersistentIndexMap::new().insert("a", 1).insert("b", 2);
    ///
    /// let keys: Vec<_> = map.iter().map(|(key, _)| *key).collect();
    /// assert_eq!(keys, vec!["a", "b"]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentIndexMapIterator<'_, K, V> {
        let mut entries = Vec::with_capacity(self.length);
        Self::collect_entries(&self.root, &mut entries);
        entries.sort_unstable_by_key(|(stamp, _, _)| *stamp);
        PersistentIndexMapIterator {
            entries,
            current_index: 0,
        }
    }

    /// Collects all stamped entries from a node into a vector.
    fn collect_entries<'a>(node: &'a Node<K, V>, entries: &mut Vec<(u64, &'a K, &'a V)>) {
        match node {
            Node::Empty => {}
            Node::Leaf {
                stamp, key, value, ..
            } => {
                entries.push((*stamp, key, value));
            }
            Node::Branch { children, .. } => {
                for child in children.iter() {
                    Self::collect_entries(child, entries);
                }
            }
            Node::Collision {
                entries: collision_entries,
                ..
            } => {
                for (stamp, key, value) in collision_entries.iter() {
                    entries.push((*stamp, key, value));
                }
            }
        }
    }

    /// Returns an iterator over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A borrowed iterator over the entries of a [`PersistentIndexMap`], in
/// insertion order.
pub struct PersistentIndexMapIterator<'a, K, V> {
    entries: Vec<(u64, &'a K, &'a V)>,
    current_index: usize,
}

impl<'a, K, V> Iterator for PersistentIndexMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (_, key, value) = *self.entries.get(self.current_index)?;
        self.current_index += 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentIndexMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.entries.len().saturating_sub(self.current_index)
    }
}

/// An owning iterator over the entries of a [`PersistentIndexMap`], in
/// insertion order.
pub struct PersistentIndexMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentIndexMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentIndexMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentIndexMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentIndexMap<K, V> {
    /// Builds a map from an iterator of entries.
    ///
    /// A key occurring more than once keeps the position of its first
    /// occurrence and the value of its last.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map = map.insert(key, value);
        }
        map
    }
}

impl<K: Clone + Hash + Eq, V: Clone> IntoIterator for PersistentIndexMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentIndexMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentIndexMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentIndexMap<K, V>
where
    K: Clone + Hash + Eq,
    V: Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentIndexMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentIndexMap<K, V> {
    /// Structural equality: same size and, for every key, equal values.
    ///
    /// Insertion order does not participate in equality; two maps holding
    /// the same entries in different orders compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.eq_by(other, |left, right| left == right)
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentIndexMap<K, V> {}

impl<K: Clone + Hash + Eq + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug
    for PersistentIndexMap<K, V>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
