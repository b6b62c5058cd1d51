use bplustree::{BPlusTreeMap, BPlusTreeMultiMap};
use std::io::Cursor;

#[test]
fn empty_tree_has_no_entries() {
    let tree = BPlusTreeMap::<i32, String>::new(8).unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.get(&1), None);
    assert_eq!(tree.items().next(), None);
    assert_eq!(tree.items().next_back(), None);
}

#[test]
fn single_entry_round_trips_through_every_accessor() {
    let mut tree = BPlusTreeMap::new(8).unwrap();
    assert_eq!(tree.insert(1, "one".to_string()), None);

    assert_eq!(tree.get(&1), Some(&"one".to_string()));
    assert!(tree.contains_key(&1));
    assert_eq!(tree.first(), Some((&1, &"one".to_string())));
    assert_eq!(tree.last(), Some((&1, &"one".to_string())));
    assert_eq!(tree.remove(&1), Some("one".to_string()));
    assert!(tree.is_empty());
}

#[test]
fn sequential_insertion_forces_repeated_splits_and_stays_sorted() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for i in 0..2000i32 {
        tree.insert(i, i * 2);
    }
    assert_eq!(tree.len(), 2000);
    assert!(tree.check_invariants());

    let collected: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<_> = (0..2000i32).map(|i| (i, i * 2)).collect();
    assert_eq!(collected, expected);
}

#[test]
fn reverse_sequential_insertion_also_stays_sorted() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for i in (0..2000i32).rev() {
        tree.insert(i, i);
    }
    assert!(tree.check_invariants());

    let collected: Vec<_> = tree.items().map(|(k, _)| *k).collect();
    let expected: Vec<_> = (0..2000i32).collect();
    assert_eq!(collected, expected);
}

#[test]
fn random_insert_then_full_delete_empties_the_tree() {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let mut rng = StdRng::seed_from_u64(7);
    let mut keys: Vec<i32> = (0..3000).collect();
    keys.shuffle(&mut rng);

    let mut tree = BPlusTreeMap::new(8).unwrap();
    for &k in &keys {
        tree.insert(k, k);
    }
    assert_eq!(tree.len(), 3000);
    assert!(tree.check_invariants());

    keys.shuffle(&mut rng);
    for &k in &keys {
        assert_eq!(tree.remove(&k), Some(k));
        assert!(tree.check_invariants());
    }
    assert!(tree.is_empty());
    assert_eq!(tree.items().next(), None);
}

#[test]
fn bidirectional_iteration_meets_in_the_middle() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for i in 0..100i32 {
        tree.insert(i, i);
    }

    let mut forward = Vec::new();
    let mut backward = Vec::new();
    let mut iter = tree.items();
    for _ in 0..50 {
        forward.push(*iter.next().unwrap().0);
    }
    for _ in 0..50 {
        backward.push(*iter.next_back().unwrap().0);
    }
    assert_eq!(iter.next(), None);

    backward.reverse();
    let mut combined = forward;
    combined.extend(backward);
    let expected: Vec<_> = (0..100).collect();
    assert_eq!(combined, expected);
}

#[test]
fn range_query_matches_inclusive_and_exclusive_bounds() {
    let mut tree = BPlusTreeMap::new(4).unwrap();
    for i in 0..50i32 {
        tree.insert(i, i);
    }

    let inclusive: Vec<_> = tree.range(10..=15).map(|(k, _)| *k).collect();
    assert_eq!(inclusive, vec![10, 11, 12, 13, 14, 15]);

    let exclusive: Vec<_> = tree.range(10..15).map(|(k, _)| *k).collect();
    assert_eq!(exclusive, vec![10, 11, 12, 13, 14]);

    let unbounded_start: Vec<_> = tree.range(..5).map(|(k, _)| *k).collect();
    assert_eq!(unbounded_start, vec![0, 1, 2, 3, 4]);
}

#[test]
fn multimap_appends_and_remove_one_follow_insertion_order() {
    let mut map = BPlusTreeMultiMap::new(4).unwrap();
    map.insert("a", 1);
    map.insert("a", 2);
    map.insert("a", 3);
    map.insert("b", 10);

    assert_eq!(map.get(&"a"), Some(&[1, 2, 3][..]));
    assert!(map.remove_one(&"a", &2));
    assert_eq!(map.get(&"a"), Some(&[1, 3][..]));

    assert!(map.remove_one(&"b", &10));
    assert!(!map.contains_key(&"b"));

    let flattened: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(flattened, vec![("a", 1), ("a", 3)]);
}

#[test]
fn persistence_round_trips_a_large_tree() {
    let mut tree = BPlusTreeMap::new(32).unwrap();
    for i in 0..100_000i32 {
        tree.insert(i, i.wrapping_mul(31));
    }

    let mut buf = Vec::new();
    tree.save(&mut buf).unwrap();

    let loaded = BPlusTreeMap::<i32, i32>::load(32, Cursor::new(buf)).unwrap();
    assert_eq!(loaded.len(), tree.len());
    assert!(loaded.check_invariants());

    for i in (0..100_000i32).step_by(997) {
        assert_eq!(loaded.get(&i), Some(&i.wrapping_mul(31)));
    }
}

#[test]
fn persistence_round_trips_an_empty_tree() {
    let tree = BPlusTreeMap::<i32, i32>::new(8).unwrap();
    let mut buf = Vec::new();
    tree.save(&mut buf).unwrap();

    let loaded = BPlusTreeMap::<i32, i32>::load(8, Cursor::new(buf)).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn invalid_capacity_is_rejected() {
    let result = BPlusTreeMap::<i32, i32>::new(2);
    assert!(result.is_err());
    assert!(result.unwrap_err().is_capacity_error());
}
