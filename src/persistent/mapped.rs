//! Complex-key collections addressed through a key bijection.
//!
//! This module provides [`MappedMap`] and [`MappedSet`], persistent
//! collections keyed by an arbitrary complex type `K`. Internally they store
//! only a primitive, efficiently hashable representation: a caller-supplied
//! [`KeyTransform`] encodes each key on the way in and decodes it back when
//! entries are exposed through iteration.
//!
//! # The Transform Contract
//!
//! The transform is a caller contract, not a runtime-checked property:
//!
//! - `encode` must be injective over the set of keys ever used with a given
//!   collection instance — two distinct keys encoding to the same mapped
//!   value silently merge into one entry.
//! - `decode(encode(k))` must equal `k` for every such key.
//! - Both functions must be pure and deterministic.
//!
//! `decode` is only called on the iteration/introspection path; `get`,
//! `insert`, `contains`, and `remove` encode exactly once and never decode.
//!
//! # Equality
//!
//! Equality between mapped collections is defined on the materialized
//! mapped representation, not on logical key identity: two collections
//! built with semantically equivalent but distinct transforms over the same
//! logical content are not guaranteed equal. This is a documented design
//! limitation.
//!
//! # Examples
//!
//! ```rust
//! use keepsake::persistent::{FnTransform, MappedMap};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let transform = FnTransform::new(
//!     |point: &Point| (point.x, point.y),
//!     |&(x, y): &(i32, i32)| Point { x, y },
//! );
//!
//! let map = MappedMap::new(transform)
//!     .insert(Point { x: 1, y: 2 }, "P")
//!     .insert(Point { x: 3, y: 4 }, "Q");
//!
//! assert_eq!(map.get(&Point { x: 1, y: 2 }), Some(&"P"));
//! assert_eq!(map.len(), 2);
//! ```

use std::fmt;
use std::hash::Hash;

use super::{
    PersistentIndexMap, PersistentIndexMapIterator, PersistentIndexSet,
    PersistentIndexSetIterator, ReferenceCounter,
};

// =============================================================================
// KeyTransform
// =============================================================================

/// A bijection between a complex key type and a primitive mapped
/// representation.
///
/// Implementors supply a pair of total, deterministic functions. The
/// collection stores only [`Self::Mapped`] values; `decode` is expected to
/// invert `encode` over every key actually used (see the module docs for
/// the full contract).
///
/// The transform is attached to a collection at construction as immutable
/// configuration; every collection derived by a mutating operation shares
/// the same transform.
pub trait KeyTransform<K> {
    /// The primitive key representation stored internally.
    type Mapped: Clone + Hash + Eq;

    /// Encodes a caller-facing key to its mapped representation.
    fn encode(&self, key: &K) -> Self::Mapped;

    /// Decodes a mapped representation back to the caller-facing key.
    fn decode(&self, mapped: &Self::Mapped) -> K;
}

/// A [`KeyTransform`] built from a pair of closures.
///
/// # Examples
///
/// ```rust
/// use keepsake::persistent::{FnTransform, KeyTransform};
///
/// let transform = FnTransform::new(
///     |value: &u32| i64::from(*value),
///     |value: &i64| u32::try_from(*value).unwrap_or(0),
/// );
///
/// assert_eq!(transform.encode(&7), 7_i64);
/// assert_eq!(transform.decode(&7), 7_u32);
/// ```
#[derive(Clone)]
pub struct FnTransform<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnTransform<E, D> {
    /// Creates a transform from an encode and a decode closure.
    #[inline]
    pub const fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<K, KM, E, D> KeyTransform<K> for FnTransform<E, D>
where
    KM: Clone + Hash + Eq,
    E: Fn(&K) -> KM,
    D: Fn(&KM) -> K,
{
    type Mapped = KM;

    #[inline]
    fn encode(&self, key: &K) -> KM {
        (self.encode)(key)
    }

    #[inline]
    fn decode(&self, mapped: &KM) -> K {
        (self.decode)(mapped)
    }
}

// =============================================================================
// MappedMap Definition
// =============================================================================

/// A persistent map keyed by a complex type through a [`KeyTransform`].
///
/// Composes a [`PersistentIndexMap`] over the mapped key representation
/// with one shared transform. Every mutating operation returns a new map
/// sharing the same transform; the receiver is never modified.
///
/// Iteration yields entries in the insertion order of their keys, with each
/// exposed key decoded once.
///
/// # Examples
///
/// ```rust
/// use keepsake::persistent::{FnTransform, MappedMap};
///
/// let transform = FnTransform::new(
///     |key: &Vec<u8>| String::from_utf8_lossy(key).into_owned(),
///     |text: &String| text.clone().into_bytes(),
/// );
///
/// let map = MappedMap::new(transform).insert(b"id".to_vec(), 1);
/// assert_eq!(map.get(&b"id".to_vec()), Some(&1));
/// ```
pub struct MappedMap<K, V, T: KeyTransform<K>> {
    inner: PersistentIndexMap<T::Mapped, V>,
    transform: ReferenceCounter<T>,
}

impl<K, V, T: KeyTransform<K>> Clone for MappedMap<K, V, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }
}

impl<K, V: Clone, T: KeyTransform<K>> MappedMap<K, V, T> {
    /// Creates a new empty map with the given transform.
    #[must_use]
    pub fn new(transform: T) -> Self {
        Self {
            inner: PersistentIndexMap::new(),
            transform: ReferenceCounter::new(transform),
        }
    }

    /// Creates a map from an iterable of entries, encoding every input key.
    ///
    /// A key occurring more than once keeps the position of its first
    /// occurrence and the value of its last.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::{FnTransform, MappedMap};
    ///
    /// let transform = FnTransform::new(
    ///     |key: &(u8, u8)| u16::from(key.0) << 8 | u16::from(key.1),
    ///     |mapped: &u16| ((mapped >> 8) as u8, (mapped & 0xff) as u8),
    /// );
    ///
    /// let map = MappedMap::from_entries([((1, 2), "a"), ((3, 4), "b")], transform);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&(1, 2)), Some(&"a"));
    /// ```
    #[must_use]
    pub fn from_entries<I>(entries: I, transform: T) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new(transform);
        for (key, value) in entries {
            map = map.insert(key, value);
        }
        map
    }

    /// Returns a reference to the value for the given key, or `None`.
    ///
    /// The key is encoded exactly once; nothing is decoded.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(&self.transform.encode(key))
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(&self.transform.encode(key))
    }

    /// Inserts a key-value pair, returning a new map.
    ///
    /// An existing key keeps its position and gets the new value; a fresh
    /// key is appended at the end. The new map shares this map's transform.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        Self {
            inner: self.inner.insert(self.transform.encode(&key), value),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Removes a key, returning a new map. A no-op (value-equal) map is
    /// returned when the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        Self {
            inner: self.inner.remove(&self.transform.encode(key)),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Transforms every value with a function, preserving keys and order.
    ///
    /// The function receives the value and the decoded key.
    #[must_use]
    pub fn map_values<V2, F>(&self, mut function: F) -> MappedMap<K, V2, T>
    where
        V2: Clone,
        F: FnMut(&V, &K) -> V2,
    {
        let transform = &self.transform;
        MappedMap {
            inner: self
                .inner
                .map_values(|value, mapped| function(value, &transform.decode(mapped))),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Keeps only the entries for which the predicate holds.
    ///
    /// The predicate receives the value and the decoded key.
    #[must_use]
    pub fn retain<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&V, &K) -> bool,
    {
        let transform = &self.transform;
        Self {
            inner: self
                .inner
                .retain(|value, mapped| predicate(value, &transform.decode(mapped))),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns an iterator over entries in insertion order.
    ///
    /// Each exposed key is decoded once, so the iterator yields owned keys
    /// alongside borrowed values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::{FnTransform, MappedMap};
    ///
    /// let transform = FnTransform::new(
    ///     |key: &u32| u64::from(*key),
    ///     |mapped: &u64| u32::try_from(*mapped).unwrap_or(0),
    /// );
    /// let map = MappedMap::new(transform).insert(2, "b").insert(1, "a");
    ///
    /// let keys: Vec<u32> = map.iter().map(|(key, _)| key).collect();
    /// assert_eq!(keys, vec![2, 1]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> MappedMapIterator<'_, K, V, T> {
        MappedMapIterator {
            inner: self.inner.iter(),
            transform: &self.transform,
        }
    }

    /// Returns an iterator over decoded keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }
}

// =============================================================================
// MappedMap Iterator
// =============================================================================

/// An iterator over the entries of a [`MappedMap`], in insertion order.
///
/// Keys are decoded lazily, one per yielded entry.
pub struct MappedMapIterator<'a, K, V, T: KeyTransform<K>> {
    inner: PersistentIndexMapIterator<'a, T::Mapped, V>,
    transform: &'a T,
}

impl<'a, K, V, T: KeyTransform<K>> Iterator for MappedMapIterator<'a, K, V, T> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(mapped, value)| (self.transform.decode(mapped), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, T: KeyTransform<K>> ExactSizeIterator for MappedMapIterator<'_, K, V, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

// =============================================================================
// MappedMap Trait Implementations
// =============================================================================

impl<K, V, T> PartialEq for MappedMap<K, V, T>
where
    V: Clone + PartialEq,
    T: KeyTransform<K>,
{
    /// Equality on the materialized mapped representation.
    ///
    /// Two maps are equal iff their inner primitive-keyed maps are equal.
    /// Maps built with semantically equivalent but distinct transforms over
    /// identical logical content are **not** guaranteed equal; the transform
    /// itself never participates in the comparison.
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, V, T> Eq for MappedMap<K, V, T>
where
    V: Clone + Eq,
    T: KeyTransform<K>,
{
}

impl<K, V, T> fmt::Debug for MappedMap<K, V, T>
where
    K: fmt::Debug,
    V: Clone + fmt::Debug,
    T: KeyTransform<K>,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// MappedSet Definition
// =============================================================================

/// A persistent set of complex members addressed through a [`KeyTransform`].
///
/// Composes a [`PersistentIndexSet`] over the mapped representation with one
/// shared transform; membership tests encode once and never decode.
///
/// # Examples
///
/// ```rust
/// use keepsake::persistent::{FnTransform, MappedSet};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Tag(String);
///
/// let transform = FnTransform::new(
///     |tag: &Tag| tag.0.clone(),
///     |text: &String| Tag(text.clone()),
/// );
///
/// let set = MappedSet::new(transform).insert(Tag("alpha".into()));
/// assert!(set.contains(&Tag("alpha".into())));
/// assert!(!set.contains(&Tag("beta".into())));
/// ```
pub struct MappedSet<K, T: KeyTransform<K>> {
    inner: PersistentIndexSet<T::Mapped>,
    transform: ReferenceCounter<T>,
}

impl<K, T: KeyTransform<K>> Clone for MappedSet<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }
}

impl<K, T: KeyTransform<K>> MappedSet<K, T> {
    /// Creates a new empty set with the given transform.
    #[must_use]
    pub fn new(transform: T) -> Self {
        Self {
            inner: PersistentIndexSet::new(),
            transform: ReferenceCounter::new(transform),
        }
    }

    /// Creates a set from an iterable of members, encoding each one.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn from_members<I>(members: I, transform: T) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut set = Self::new(transform);
        for member in members {
            set = set.insert(member);
        }
        set
    }

    /// Adds a member, returning a new set sharing this set's transform.
    ///
    /// An existing member keeps its first-insertion position.
    #[must_use]
    pub fn insert(&self, member: K) -> Self {
        Self {
            inner: self.inner.insert(self.transform.encode(&member)),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns `true` if the set contains the given member.
    ///
    /// The member is encoded exactly once; nothing is decoded.
    #[must_use]
    pub fn contains(&self, member: &K) -> bool {
        self.inner.contains(&self.transform.encode(member))
    }

    /// Removes a member, returning a new set. A no-op (value-equal) set is
    /// returned when the member is absent.
    #[must_use]
    pub fn remove(&self, member: &K) -> Self {
        Self {
            inner: self.inner.remove(&self.transform.encode(member)),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns the number of members.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no members.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the union of two sets, keeping `self`'s transform.
    ///
    /// Both sets must have been built with the same transform for the
    /// result to be meaningful; this is part of the transform contract.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            inner: self.inner.union(&other.inner),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns the intersection of two sets, keeping `self`'s transform.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            inner: self.inner.intersection(&other.inner),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns the difference of two sets (members of `self` not in
    /// `other`), keeping `self`'s transform.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            inner: self.inner.difference(&other.inner),
            transform: ReferenceCounter::clone(&self.transform),
        }
    }

    /// Returns an iterator over decoded members in insertion order.
    #[must_use]
    pub fn iter(&self) -> MappedSetIterator<'_, K, T> {
        MappedSetIterator {
            inner: self.inner.iter(),
            transform: &self.transform,
        }
    }
}

// =============================================================================
// MappedSet Iterator
// =============================================================================

/// An iterator over the members of a [`MappedSet`], in insertion order.
///
/// Members are decoded lazily, one per yielded item.
pub struct MappedSetIterator<'a, K, T: KeyTransform<K>> {
    inner: PersistentIndexSetIterator<'a, T::Mapped>,
    transform: &'a T,
}

impl<K, T: KeyTransform<K>> Iterator for MappedSetIterator<'_, K, T> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|mapped| self.transform.decode(mapped))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, T: KeyTransform<K>> ExactSizeIterator for MappedSetIterator<'_, K, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

// =============================================================================
// MappedSet Trait Implementations
// =============================================================================

impl<K, T: KeyTransform<K>> PartialEq for MappedSet<K, T> {
    /// Equality on the materialized mapped representation only; the
    /// transform never participates (see [`MappedMap`]'s equality note).
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, T: KeyTransform<K>> Eq for MappedSet<K, T> {}

impl<K: fmt::Debug, T: KeyTransform<K>> fmt::Debug for MappedSet<K, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn point_transform()
    -> FnTransform<impl Fn(&Point) -> String, impl Fn(&String) -> Point> {
        FnTransform::new(
            |point: &Point| format!("{},{}", point.x, point.y),
            |text: &String| {
                let mut parts = text.split(',').map(|part| part.parse().unwrap_or(0));
                Point {
                    x: parts.next().unwrap_or(0),
                    y: parts.next().unwrap_or(0),
                }
            },
        )
    }

    #[rstest]
    fn test_fn_transform_round_trips() {
        let transform = point_transform();
        let point = Point { x: 3, y: -7 };
        assert_eq!(transform.decode(&transform.encode(&point)), point);
    }

    #[rstest]
    fn test_insert_and_get_complex_key() {
        let map = MappedMap::new(point_transform()).insert(Point { x: 1, y: 2 }, "P");

        assert_eq!(map.get(&Point { x: 1, y: 2 }), Some(&"P"));
        assert_eq!(map.get(&Point { x: 2, y: 1 }), None);
    }

    #[rstest]
    fn test_from_entries() {
        let map = MappedMap::from_entries(
            [(Point { x: 1, y: 2 }, "P"), (Point { x: 3, y: 4 }, "Q")],
            point_transform(),
        );

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Point { x: 3, y: 4 }), Some(&"Q"));
    }

    #[rstest]
    fn test_mutation_leaves_original_untouched() {
        let map = MappedMap::new(point_transform()).insert(Point { x: 0, y: 0 }, 1);
        let updated = map.insert(Point { x: 0, y: 0 }, 2);

        assert_eq!(map.get(&Point { x: 0, y: 0 }), Some(&1));
        assert_eq!(updated.get(&Point { x: 0, y: 0 }), Some(&2));
    }

    #[rstest]
    fn test_remove_missing_is_noop() {
        let map = MappedMap::new(point_transform()).insert(Point { x: 1, y: 1 }, "a");
        let removed = map.remove(&Point { x: 9, y: 9 });

        assert_eq!(removed.len(), 1);
        assert_eq!(removed, map);
    }

    #[rstest]
    fn test_iter_decodes_keys_in_insertion_order() {
        let map = MappedMap::new(point_transform())
            .insert(Point { x: 2, y: 2 }, "b")
            .insert(Point { x: 1, y: 1 }, "a");

        let keys: Vec<Point> = map.keys().collect();
        assert_eq!(keys, vec![Point { x: 2, y: 2 }, Point { x: 1, y: 1 }]);
    }

    #[rstest]
    fn test_map_values_sees_decoded_key() {
        let map = MappedMap::new(point_transform()).insert(Point { x: 2, y: 3 }, 10);
        let shifted = map.map_values(|value, key| value + key.x + key.y);

        assert_eq!(shifted.get(&Point { x: 2, y: 3 }), Some(&15));
    }

    #[rstest]
    fn test_retain_filters_by_decoded_key() {
        let map = MappedMap::from_entries(
            [
                (Point { x: 1, y: 0 }, "keep"),
                (Point { x: -1, y: 0 }, "drop"),
            ],
            point_transform(),
        );
        let positive = map.retain(|_, key| key.x > 0);

        assert_eq!(positive.len(), 1);
        assert!(positive.contains_key(&Point { x: 1, y: 0 }));
    }

    #[rstest]
    fn test_colliding_encode_merges_entries() {
        // Degenerate transform: every key encodes to the same mapped value.
        // The contract is violated on purpose; entries silently merge.
        let transform = FnTransform::new(
            |_point: &Point| "same".to_string(),
            |_text: &String| Point { x: 0, y: 0 },
        );
        let map = MappedMap::new(transform)
            .insert(Point { x: 1, y: 1 }, "a")
            .insert(Point { x: 2, y: 2 }, "b");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Point { x: 9, y: 9 }), Some(&"b"));
    }

    #[rstest]
    fn test_equality_is_on_mapped_representation() {
        let map1 = MappedMap::new(point_transform()).insert(Point { x: 1, y: 2 }, 1);
        let map2 = MappedMap::new(point_transform()).insert(Point { x: 1, y: 2 }, 1);

        assert_eq!(map1, map2);
    }

    #[rstest]
    fn test_mapped_set_membership_and_order() {
        let set = MappedSet::from_members(
            [Point { x: 2, y: 0 }, Point { x: 1, y: 0 }],
            point_transform(),
        );

        assert!(set.contains(&Point { x: 2, y: 0 }));
        assert!(!set.contains(&Point { x: 3, y: 0 }));

        let members: Vec<Point> = set.iter().collect();
        assert_eq!(members, vec![Point { x: 2, y: 0 }, Point { x: 1, y: 0 }]);
    }

    #[rstest]
    fn test_mapped_set_algebra() {
        let set_a = MappedSet::from_members(
            [Point { x: 1, y: 0 }, Point { x: 2, y: 0 }],
            point_transform(),
        );
        let set_b = MappedSet::from_members(
            [Point { x: 2, y: 0 }, Point { x: 3, y: 0 }],
            point_transform(),
        );

        assert_eq!(set_a.union(&set_b).len(), 3);
        assert_eq!(set_a.intersection(&set_b).len(), 1);
        assert_eq!(set_a.difference(&set_b).len(), 1);
        assert!(set_a.difference(&set_b).contains(&Point { x: 1, y: 0 }));
    }
}
