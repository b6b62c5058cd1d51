//! `BPlusTreeMultiMap<K, V>` — an ordered multi-valued map layered on top of
//! `BPlusTreeMap<K, Vec<V>>`.
//!
//! Every key maps to a non-empty, insertion-ordered `Vec<V>`; the tree never
//! stores an empty list, so `remove_one` that would leave one behind removes
//! the key instead.

use std::io::{Read, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::codec::Codec;
use crate::error::BTreeResult;
use crate::types::{BPlusTreeMap, NodeId, NULL_NODE};

/// An ordered map from keys to lists of values.
///
/// # Examples
///
/// ```
/// use bplustree::BPlusTreeMultiMap;
///
/// let mut map = BPlusTreeMultiMap::new(16).unwrap();
/// map.insert(1, "a");
/// map.insert(1, "b");
/// assert_eq!(map.get(&1), Some(&["a", "b"][..]));
/// ```
#[derive(Debug)]
pub struct BPlusTreeMultiMap<K, V> {
    inner: BPlusTreeMap<K, Vec<V>>,
}

impl<K: Ord + Clone, V: Clone> BPlusTreeMultiMap<K, V> {
    /// Create a multimap with the given node capacity.
    pub fn new(capacity: usize) -> BTreeResult<Self> {
        Ok(Self {
            inner: BPlusTreeMap::new(capacity)?,
        })
    }

    /// Create a multimap with `DEFAULT_CAPACITY`.
    pub fn with_default_capacity() -> BTreeResult<Self> {
        Ok(Self {
            inner: BPlusTreeMap::with_default_capacity()?,
        })
    }

    /// Append `value` to the list stored at `key`, creating the list if
    /// `key` is new.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(values) = self.inner.get_mut(&key) {
            values.push(value);
        } else {
            self.inner.insert(key, vec![value]);
        }
    }

    /// Return the list of values stored at `key`, if any.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.inner.get(key).map(|values| values.as_slice())
    }

    /// Remove `key` entirely, returning its full value list.
    pub fn remove(&mut self, key: &K) -> Option<Vec<V>> {
        self.inner.remove(key)
    }

    /// Remove one occurrence of `value` from the list at `key`. If that was
    /// the list's only element, the key itself is removed. Returns whether
    /// anything was removed.
    pub fn remove_one(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let Some(values) = self.inner.get_mut(key) else {
            return false;
        };

        let Some(pos) = values.iter().position(|v| v == value) else {
            return false;
        };

        if values.len() == 1 {
            self.inner.remove(key);
        } else {
            values.remove(pos);
        }
        true
    }

    /// Check whether `key` has any values.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of distinct keys (not the total value count).
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the multimap has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove every key and value.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterate over every `(key, value)` pair, flattened across each key's
    /// value list, in ascending key order with values in insertion order.
    pub fn iter(&self) -> MultiIter<'_, K, V> {
        MultiIter::new(&self.inner)
    }

    /// Find `key`, returning a cursor positioned at the first value in its
    /// list, or `None` if `key` is absent.
    pub fn find(&self, key: &K) -> Option<MultiCursor<'_, K, V>> {
        let (leaf_id, index, matched) = self.inner.find_leaf_for_key_with_match(key)?;
        matched.then_some(MultiCursor {
            tree: &self.inner,
            leaf_id,
            index,
            sub_index: 0,
        })
    }
}

impl<K: Ord + Clone + Codec, V: Clone + Codec> BPlusTreeMultiMap<K, V> {
    /// Write every `(key, value-list)` pair, in ascending key order.
    pub fn save<W: Write>(&self, writer: W) -> BTreeResult<()> {
        self.inner.save(writer)
    }

    /// Truncate (or create) `path` and write the multimap there.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> BTreeResult<()> {
        self.inner.save_to_path(path)
    }

    /// Rebuild a multimap from a stream of encoded `(key, value-list)` pairs.
    pub fn load<R: Read>(capacity: usize, reader: R) -> BTreeResult<Self> {
        Ok(Self {
            inner: BPlusTreeMap::load(capacity, reader)?,
        })
    }

    /// Load from `path`, or return an empty multimap if it doesn't exist.
    pub fn load_from_path<P: AsRef<Path>>(capacity: usize, path: P) -> BTreeResult<Self> {
        Ok(Self {
            inner: BPlusTreeMap::load_from_path(capacity, path)?,
        })
    }
}

/// Flattened iterator over a `BPlusTreeMultiMap`: walks the key axis via the
/// leaf chain and, within each key, a `sub_index` into that key's value list.
pub struct MultiIter<'a, K, V> {
    tree: &'a BPlusTreeMap<K, Vec<V>>,
    current_leaf_id: Option<NodeId>,
    current_leaf_index: usize,
    sub_index: usize,
    _marker: PhantomData<&'a ()>,
}

impl<'a, K: Ord + Clone, V: Clone> MultiIter<'a, K, V> {
    fn new(tree: &'a BPlusTreeMap<K, Vec<V>>) -> Self {
        Self {
            tree,
            current_leaf_id: tree.get_first_leaf_id(),
            current_leaf_index: 0,
            sub_index: 0,
            _marker: PhantomData,
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for MultiIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf_id = self.current_leaf_id?;
            let leaf = self.tree.get_leaf(leaf_id)?;

            if self.current_leaf_index >= leaf.keys_len() {
                self.current_leaf_id = (leaf.next != NULL_NODE).then_some(leaf.next);
                self.current_leaf_index = 0;
                self.sub_index = 0;
                continue;
            }

            let key = leaf.get_key(self.current_leaf_index)?;
            let values = leaf.get_value(self.current_leaf_index)?;

            if self.sub_index >= values.len() {
                self.current_leaf_index += 1;
                self.sub_index = 0;
                continue;
            }

            let value = &values[self.sub_index];
            self.sub_index += 1;
            return Some((key, value));
        }
    }
}

/// An external position into a `BPlusTreeMultiMap`: a `(leaf id, index)` pair
/// plus a `sub_index` into that key's value list, mirroring `MultiIter`'s
/// traversal state but as a standalone snapshot rather than a live iterator.
pub struct MultiCursor<'a, K, V> {
    tree: &'a BPlusTreeMap<K, Vec<V>>,
    leaf_id: NodeId,
    index: usize,
    sub_index: usize,
}

impl<'a, K, V> Clone for MultiCursor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for MultiCursor<'a, K, V> {}

impl<'a, K, V> PartialEq for MultiCursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && self.leaf_id == other.leaf_id
            && self.index == other.index
            && self.sub_index == other.sub_index
    }
}

impl<'a, K, V> Eq for MultiCursor<'a, K, V> {}

impl<'a, K: Ord + Clone, V: Clone> MultiCursor<'a, K, V> {
    /// The key at this position.
    pub fn get_key(&self) -> &'a K {
        self.tree
            .get_leaf(self.leaf_id)
            .and_then(|leaf| leaf.get_key(self.index))
            .expect("cursor always points at a live entry")
    }

    /// The value at this position.
    pub fn get_value(&self) -> &'a V {
        self.tree
            .get_leaf(self.leaf_id)
            .and_then(|leaf| leaf.get_value(self.index))
            .and_then(|values| values.get(self.sub_index))
            .expect("cursor always points at a live entry")
    }

    /// The cursor for the next value: same key's next value, or the first
    /// value of the next key, or `None` past the last value.
    pub fn next(&self) -> Option<MultiCursor<'a, K, V>> {
        let leaf = self.tree.get_leaf(self.leaf_id)?;
        let values = leaf.get_value(self.index)?;
        if self.sub_index + 1 < values.len() {
            return Some(MultiCursor {
                tree: self.tree,
                leaf_id: self.leaf_id,
                index: self.index,
                sub_index: self.sub_index + 1,
            });
        }
        if self.index + 1 < leaf.keys_len() {
            return Some(MultiCursor {
                tree: self.tree,
                leaf_id: self.leaf_id,
                index: self.index + 1,
                sub_index: 0,
            });
        }
        if leaf.next != NULL_NODE {
            return Some(MultiCursor {
                tree: self.tree,
                leaf_id: leaf.next,
                index: 0,
                sub_index: 0,
            });
        }
        None
    }

    /// The cursor for the previous value: same key's previous value, or the
    /// last value of the previous key, or `None` before the first value.
    pub fn prev(&self) -> Option<MultiCursor<'a, K, V>> {
        if self.sub_index > 0 {
            return Some(MultiCursor {
                tree: self.tree,
                leaf_id: self.leaf_id,
                index: self.index,
                sub_index: self.sub_index - 1,
            });
        }
        let leaf = self.tree.get_leaf(self.leaf_id)?;
        if self.index > 0 {
            let prev_values = leaf.get_value(self.index - 1)?;
            return Some(MultiCursor {
                tree: self.tree,
                leaf_id: self.leaf_id,
                index: self.index - 1,
                sub_index: prev_values.len() - 1,
            });
        }
        if leaf.prev != NULL_NODE {
            let prev_leaf = self.tree.get_leaf(leaf.prev)?;
            let prev_index = prev_leaf.keys_len().checked_sub(1)?;
            let prev_values = prev_leaf.get_value(prev_index)?;
            return Some(MultiCursor {
                tree: self.tree,
                leaf_id: leaf.prev,
                index: prev_index,
                sub_index: prev_values.len() - 1,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn insert_appends_to_existing_key() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1, "a");
        map.insert(1, "b");
        map.insert(2, "c");

        assert_eq!(map.get(&1), Some(&["a", "b"][..]));
        assert_eq!(map.get(&2), Some(&["c"][..]));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn remove_one_drops_key_when_list_becomes_empty() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1, "a");

        assert!(map.remove_one(&1, &"a"));
        assert!(!map.contains_key(&1));
        assert!(!map.remove_one(&1, &"a"));
    }

    #[test]
    fn remove_one_keeps_key_with_remaining_values() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1, "a");
        map.insert(1, "b");
        map.insert(1, "a");

        assert!(map.remove_one(&1, &"a"));
        assert_eq!(map.get(&1), Some(&["b", "a"][..]));
    }

    #[test]
    fn remove_drops_the_whole_list() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1, "a");
        map.insert(1, "b");

        assert_eq!(map.remove(&1), Some(vec!["a", "b"]));
        assert_eq!(map.get(&1), None);
    }

    #[test]
    fn iter_flattens_keys_and_preserves_per_key_order() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        for i in 0..50u32 {
            map.insert(i / 3, i);
        }

        let flattened: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        let mut expected = Vec::new();
        for i in 0..50u32 {
            expected.push((i / 3, i));
        }
        assert_eq!(flattened, expected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1u32, 10u32);
        map.insert(1u32, 20u32);
        map.insert(2u32, 30u32);

        let mut buf = Vec::new();
        map.save(&mut buf).unwrap();

        let loaded = BPlusTreeMultiMap::<u32, u32>::load(4, Cursor::new(buf)).unwrap();
        assert_eq!(loaded.get(&1), Some(&[10, 20][..]));
        assert_eq!(loaded.get(&2), Some(&[30][..]));
    }

    #[test]
    fn find_positions_on_the_first_value_under_a_key() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1, "a");
        map.insert(1, "b");
        map.insert(1, "c");

        let cursor = map.find(&1).unwrap();
        assert_eq!(*cursor.get_key(), 1);
        assert_eq!(*cursor.get_value(), "a");
        assert!(map.find(&2).is_none());
    }

    #[test]
    fn cursor_next_walks_values_then_keys() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        map.insert(1, "a");
        map.insert(1, "b");
        map.insert(2, "c");

        let cursor = map.find(&1).unwrap();
        let mut values = vec![*cursor.get_key()];
        let mut values_seen = vec![*cursor.get_value()];
        let mut cursor = cursor;
        while let Some(next) = cursor.next() {
            values.push(*next.get_key());
            values_seen.push(*next.get_value());
            cursor = next;
        }
        assert_eq!(values, vec![1, 1, 2]);
        assert_eq!(values_seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn cursor_prev_reverses_next() {
        let mut map = BPlusTreeMultiMap::new(4).unwrap();
        for i in 0..20u32 {
            map.insert(i / 2, i);
        }

        let cursor = map.find(&9).unwrap();
        let forward = cursor.next().unwrap();
        let back = forward.prev().unwrap();
        assert_eq!(back, cursor);
        assert_eq!(*back.get_key(), 9);
    }
}
