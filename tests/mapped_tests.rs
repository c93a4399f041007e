//! Unit tests for `MappedMap` and `MappedSet`.
//!
//! Exercises the key-transform layer through the public API: complex keys
//! addressed through an encode/decode pair, with the transform fixed at
//! construction and shared by every derived instance.

use keepsake::persistent::{FnTransform, KeyTransform, MappedMap, MappedSet};
use rstest::rstest;

#[derive(Clone, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

/// "x,y" string encoding, the classic structural-key-to-string bijection.
fn point_transform() -> FnTransform<impl Fn(&Point) -> String, impl Fn(&String) -> Point> {
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

// =============================================================================
// Lookup through the transform
// =============================================================================

#[rstest]
fn test_structural_key_lookup() {
    let map = MappedMap::from_entries([(Point { x: 1, y: 2 }, "P")], point_transform());

    // A structurally equal (but distinct) key instance finds the entry
    assert_eq!(map.get(&Point { x: 1, y: 2 }), Some(&"P"));
    assert_eq!(map.get(&Point { x: 2, y: 1 }), None);
}

#[rstest]
fn test_round_trip_through_iteration() {
    let original = vec![
        Point { x: 0, y: 0 },
        Point { x: -5, y: 17 },
        Point { x: 123, y: -456 },
    ];
    let map = MappedMap::from_entries(
        original.iter().cloned().map(|point| (point, ())),
        point_transform(),
    );

    let decoded: Vec<Point> = map.keys().collect();
    assert_eq!(decoded, original);
}

// =============================================================================
// Persistent mutation with a shared transform
// =============================================================================

#[rstest]
fn test_insert_returns_new_map_with_same_transform() {
    let map = MappedMap::new(point_transform()).insert(Point { x: 1, y: 1 }, 1);
    let updated = map.insert(Point { x: 1, y: 1 }, 2).insert(Point { x: 2, y: 2 }, 3);

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&Point { x: 1, y: 1 }), Some(&1));
    assert_eq!(updated.len(), 2);
    assert_eq!(updated.get(&Point { x: 1, y: 1 }), Some(&2));
}

#[rstest]
fn test_remove_preserves_original() {
    let map = MappedMap::from_entries(
        [(Point { x: 1, y: 0 }, "a"), (Point { x: 2, y: 0 }, "b")],
        point_transform(),
    );
    let removed = map.remove(&Point { x: 1, y: 0 });

    assert_eq!(map.len(), 2);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed.get(&Point { x: 1, y: 0 }), None);
}

// =============================================================================
// Equality on the mapped representation
// =============================================================================

#[rstest]
fn test_same_transform_same_content_compares_equal() {
    let map1 = MappedMap::from_entries([(Point { x: 1, y: 2 }, 7)], point_transform());
    let map2 = MappedMap::from_entries([(Point { x: 1, y: 2 }, 7)], point_transform());

    assert_eq!(map1, map2);
}

#[rstest]
fn test_textually_different_encodings_are_not_equal() {
    // Two encodings of the same logical keys: "x,y" vs "y,x". The maps hold
    // identical logical content but materialize different mapped keys, so
    // they are not equal. Equality is on the mapped representation only.
    let comma = FnTransform::new(
        |point: &Point| format!("{},{}", point.x, point.y),
        |text: &String| {
            let mut parts = text.split(',').map(|part| part.parse().unwrap_or(0));
            Point {
                x: parts.next().unwrap_or(0),
                y: parts.next().unwrap_or(0),
            }
        },
    );
    let swapped = FnTransform::new(
        |point: &Point| format!("{},{}", point.y, point.x),
        |text: &String| {
            let mut parts = text.split(',').map(|part| part.parse().unwrap_or(0));
            let y = parts.next().unwrap_or(0);
            let x = parts.next().unwrap_or(0);
            Point { x, y }
        },
    );

    let key = Point { x: 1, y: 2 };
    let map1 = MappedMap::new(comma).insert(key.clone(), 7);
    let map2 = MappedMap::new(swapped).insert(key.clone(), 7);

    // Both maps answer lookups identically...
    assert_eq!(map1.get(&key), Some(&7));
    assert_eq!(map2.get(&key), Some(&7));

    // ...but their mapped representations differ.
    let mapped1: Vec<String> = map1.iter().map(|(k, _)| map1_encode(&k)).collect();
    let mapped2: Vec<String> = map2.iter().map(|(k, _)| map2_encode(&k)).collect();
    assert_ne!(mapped1, mapped2);
}

fn map1_encode(point: &Point) -> String {
    format!("{},{}", point.x, point.y)
}

fn map2_encode(point: &Point) -> String {
    format!("{},{}", point.y, point.x)
}

// =============================================================================
// MappedSet
// =============================================================================

#[rstest]
fn test_mapped_set_round_trip() {
    let transform = point_transform();
    let point = Point { x: 4, y: -4 };
    assert_eq!(transform.decode(&transform.encode(&point)), point);

    let set = MappedSet::from_members([point.clone()], point_transform());
    assert!(set.contains(&point));
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![point]);
}

#[rstest]
fn test_mapped_set_operations_share_transform() {
    let set_a = MappedSet::from_members(
        [Point { x: 1, y: 0 }, Point { x: 2, y: 0 }],
        point_transform(),
    );
    let set_b = MappedSet::from_members(
        [Point { x: 2, y: 0 }, Point { x: 3, y: 0 }],
        point_transform(),
    );

    let union = set_a.union(&set_b);
    assert_eq!(union.len(), 3);
    assert!(union.contains(&Point { x: 3, y: 0 }));

    assert_eq!(set_a.len(), 2); // operands untouched
    assert_eq!(set_b.len(), 2);
}
