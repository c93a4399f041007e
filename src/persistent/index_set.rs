//! Persistent (immutable) insertion-ordered set.
//!
//! This module provides [`PersistentIndexSet`], an immutable set built on
//! top of [`PersistentIndexMap`] with a unit value. It inherits the map's
//! structural sharing, insertion-order iteration, and never-panicking
//! lookup behavior, and adds the usual set algebra.
//!
//! # Examples
//!
//! ```rust
//! use keepsake::persistent::PersistentIndexSet;
//!
//! let set = PersistentIndexSet::new().insert(1).insert(2).insert(3);
//! assert!(set.contains(&1));
//!
//! // Structural sharing: the original set is preserved
//! let updated = set.insert(4);
//! assert_eq!(set.len(), 3);      // Original unchanged
//! assert_eq!(updated.len(), 4);  // New version
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

use super::PersistentIndexMap;

// =============================================================================
// PersistentIndexSet Definition
// =============================================================================

/// A persistent (immutable) insertion-ordered set.
///
/// Every mutating operation returns a new set and leaves the receiver
/// untouched. Iteration visits members in the order they were first
/// inserted.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `insert`       | O(log32 N)        |
/// | `contains`     | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `union`        | O(n + m)          |
/// | `intersection` | O(n + m)          |
/// | `difference`   | O(n + m)          |
///
/// # Examples
///
/// ```rust
/// use keepsake::persistent::PersistentIndexSet;
///
/// let set: PersistentIndexSet<&str> = ["a", "b"].into_iter().collect();
/// assert!(set.contains(&"a"));
/// assert!(!set.contains(&"c"));
/// ```
#[derive(Clone)]
pub struct PersistentIndexSet<T> {
    inner: PersistentIndexMap<T, ()>,
}

impl<T> PersistentIndexSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexSet;
    ///
    /// let set: PersistentIndexSet<i32> = PersistentIndexSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentIndexMap::new(),
        }
    }

    /// Returns the number of members in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
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
}

impl<T: Clone + Hash + Eq> PersistentIndexSet<T> {
    /// Creates a set containing a single member.
    #[inline]
    #[must_use]
    pub fn singleton(value: T) -> Self {
        Self::new().insert(value)
    }

    /// Adds a member to the set.
    ///
    /// Re-inserting an existing member is a no-op for both membership and
    /// position: the member keeps its first-insertion position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexSet;
    ///
    /// let set = PersistentIndexSet::new().insert(1);
    /// let bigger = set.insert(2);
    ///
    /// assert_eq!(set.len(), 1);    // Original unchanged
    /// assert_eq!(bigger.len(), 2); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, value: T) -> Self {
        Self {
            inner: self.inner.insert(value, ()),
        }
    }

    /// Returns `true` if the set contains the given member.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(value)
    }

    /// Removes a member from the set.
    ///
    /// Returns a new set without the member; a no-op (value-equal) set if
    /// the member is absent.
    #[must_use]
    pub fn remove<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(value),
        }
    }

    /// Returns the union of two sets.
    ///
    /// Members of `self` keep their positions; members only in `other`
    /// follow, in `other`'s order.
    ///
    /// # Complexity
    ///
    /// O(n + m)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexSet;
    ///
    /// let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
    /// let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let union = set_a.union(&set_b);
    /// assert_eq!(union.len(), 4);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for member in other.iter() {
            result = result.insert(member.clone());
        }
        result
    }

    /// Returns the intersection of two sets.
    ///
    /// The intersection contains only members that are in both sets, in the
    /// insertion order of the smaller set.
    ///
    /// # Complexity
    ///
    /// O(min(n, m) * log32(max(n, m)))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexSet;
    ///
    /// let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
    /// let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let intersection = set_a.intersection(&set_b);
    /// assert_eq!(intersection.len(), 2);
    /// assert!(intersection.contains(&2));
    /// assert!(intersection.contains(&3));
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        // Iterate over the smaller set for better performance
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut result = Self::new();
        for member in smaller.iter() {
            if larger.contains(member) {
                result = result.insert(member.clone());
            }
        }
        result
    }

    /// Returns the difference of two sets.
    ///
    /// The difference contains members that are in `self` but not in
    /// `other`.
    ///
    /// # Complexity
    ///
    /// O(n * log32 m)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexSet;
    ///
    /// let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
    /// let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();
    ///
    /// let difference = set_a.difference(&set_b);
    /// assert_eq!(difference.len(), 1);
    /// assert!(difference.contains(&1));
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = Self::new();
        for member in self.iter() {
            if !other.contains(member) {
                result = result.insert(member.clone());
            }
        }
        result
    }

    /// Returns the symmetric difference of two sets: members in either set
    /// but not in both.
    ///
    /// # Complexity
    ///
    /// O(n + m)
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let self_minus_other = self.difference(other);
        let other_minus_self = other.difference(self);
        self_minus_other.union(&other_minus_self)
    }

    /// Returns `true` if every member of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|member| other.contains(member))
    }

    /// Returns `true` if every member of `other` is also in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Keeps only the members for which the predicate holds, preserving
    /// order among survivors.
    #[must_use]
    pub fn retain<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        Self {
            inner: self.inner.retain(|_, member| predicate(member)),
        }
    }

    /// Returns an iterator over members in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keepsake::persistent::PersistentIndexSet;
    ///
    /// let set = PersistentIndexSet::new().insert("b").insert("a");
    /// let members: Vec<_> = set.iter().copied().collect();
    /// assert_eq!(members, vec!["b", "a"]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentIndexSetIterator<'_, T> {
        PersistentIndexSetIterator {
            inner: self.inner.iter(),
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A borrowed iterator over the members of a [`PersistentIndexSet`], in
/// insertion order.
pub struct PersistentIndexSetIterator<'a, T> {
    inner: super::PersistentIndexMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentIndexSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(member, _)| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentIndexSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the members of a [`PersistentIndexSet`], in
/// insertion order.
pub struct PersistentIndexSetIntoIterator<T> {
    inner: super::PersistentIndexMapIntoIterator<T, ()>,
}

impl<T> Iterator for PersistentIndexSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(member, ())| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentIndexSetIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentIndexSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for PersistentIndexSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for member in iter {
            set = set.insert(member);
        }
        set
    }
}

impl<T: Clone + Hash + Eq> IntoIterator for PersistentIndexSet<T> {
    type Item = T;
    type IntoIter = PersistentIndexSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentIndexSetIntoIterator {
            inner: self.inner.into_iter(),
        }
    }
}

impl<'a, T: Clone + Hash + Eq> IntoIterator for &'a PersistentIndexSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentIndexSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Hash + Eq> PartialEq for PersistentIndexSet<T> {
    /// Structural equality: same size and same membership, regardless of
    /// insertion order.
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Clone + Hash + Eq> Eq for PersistentIndexSet<T> {}

impl<T: Clone + Hash + Eq + fmt::Debug> fmt::Debug for PersistentIndexSet<T> {
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

    #[rstest]
    fn test_new_creates_empty() {
        let set: PersistentIndexSet<i32> = PersistentIndexSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[rstest]
    fn test_insert_and_contains() {
        let set = PersistentIndexSet::new().insert(1).insert(2);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[rstest]
    fn test_insert_duplicate_keeps_size_and_position() {
        let set = PersistentIndexSet::new().insert("a").insert("b").insert("a");

        assert_eq!(set.len(), 2);
        let members: Vec<_> = set.iter().copied().collect();
        assert_eq!(members, vec!["a", "b"]);
    }

    #[rstest]
    fn test_remove_leaves_original_untouched() {
        let set = PersistentIndexSet::new().insert(1).insert(2);
        let removed = set.remove(&1);

        assert_eq!(set.len(), 2);
        assert_eq!(removed.len(), 1);
        assert!(!removed.contains(&1));
    }

    #[rstest]
    fn test_union() {
        let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
        let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();

        let union = set_a.union(&set_b);
        assert_eq!(union.len(), 4);
        for member in 1..=4 {
            assert!(union.contains(&member));
        }
    }

    #[rstest]
    fn test_union_order_self_first() {
        let set_a: PersistentIndexSet<i32> = [3, 1].into_iter().collect();
        let set_b: PersistentIndexSet<i32> = [2, 1].into_iter().collect();

        let members: Vec<_> = set_a.union(&set_b).iter().copied().collect();
        assert_eq!(members, vec![3, 1, 2]);
    }

    #[rstest]
    fn test_intersection() {
        let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
        let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();

        let intersection = set_a.intersection(&set_b);
        assert_eq!(intersection.len(), 2);
        assert!(intersection.contains(&2));
        assert!(intersection.contains(&3));
    }

    #[rstest]
    fn test_difference() {
        let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
        let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();

        let difference = set_a.difference(&set_b);
        assert_eq!(difference.len(), 1);
        assert!(difference.contains(&1));
    }

    #[rstest]
    fn test_symmetric_difference() {
        let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
        let set_b: PersistentIndexSet<i32> = [2, 3, 4].into_iter().collect();

        let symmetric = set_a.symmetric_difference(&set_b);
        assert_eq!(symmetric.len(), 2);
        assert!(symmetric.contains(&1));
        assert!(symmetric.contains(&4));
    }

    #[rstest]
    fn test_subset_superset() {
        let small: PersistentIndexSet<i32> = [1, 2].into_iter().collect();
        let big: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();

        assert!(small.is_subset(&big));
        assert!(big.is_superset(&small));
        assert!(!big.is_subset(&small));
    }

    #[rstest]
    fn test_retain() {
        let set: PersistentIndexSet<i32> = [1, 2, 3, 4].into_iter().collect();
        let evens = set.retain(|member| member % 2 == 0);

        let members: Vec<_> = evens.iter().copied().collect();
        assert_eq!(members, vec![2, 4]);
    }

    #[rstest]
    fn test_eq_ignores_order() {
        let set_a: PersistentIndexSet<i32> = [1, 2, 3].into_iter().collect();
        let set_b: PersistentIndexSet<i32> = [3, 2, 1].into_iter().collect();

        assert_eq!(set_a, set_b);
    }

    #[rstest]
    fn test_into_iter_owns_members() {
        let set: PersistentIndexSet<String> =
            ["a".to_string(), "b".to_string()].into_iter().collect();
        let members: Vec<String> = set.into_iter().collect();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
    }
}
