//! INSERT operations for BPlusTreeMap.
//!
//! This module contains all the insertion operations for the B+ tree, including
//! key-value insertion, node splitting, tree growth, and helper methods for
//! managing the tree structure during insertions.

use crate::types::{BPlusTreeMap, BranchNode, InsertResult, NodeId, NodeRef, SplitNodeData, NULL_NODE};
use std::marker::PhantomData;

impl<K: Ord + Clone, V: Clone> BPlusTreeMap<K, V> {
    /// Insert a key-value pair, returning the previous value if the key already existed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.get(&1), Some(&"uno"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (leaf_id, _index) = self.find_leaf_for_key(&key)?;

        let leaf = self
            .get_leaf_mut(leaf_id)
            .expect("find_leaf_for_key returned a dangling leaf id");

        match leaf.insert(key, value) {
            InsertResult::Updated(old_value) => old_value,
            InsertResult::Split {
                old_value,
                new_node_data,
                separator_key,
            } => {
                self.complete_leaf_split(leaf_id, new_node_data, separator_key);
                old_value
            }
            InsertResult::Error(_) => None,
        }
    }

    /// Finish a leaf split: allocate the new sibling, thread it into the
    /// leaf chain on both sides, and propagate the separator upward.
    fn complete_leaf_split(&mut self, origin: NodeId, new_node_data: SplitNodeData<K, V>, separator_key: K) {
        let SplitNodeData::Leaf(mut new_leaf) = new_node_data else {
            unreachable!("leaf split always produces leaf data");
        };

        let old_next = new_leaf.next;
        new_leaf.prev = origin;
        let new_id = self.allocate_leaf(new_leaf);

        self.get_leaf_mut(origin)
            .expect("origin leaf vanished mid-split")
            .next = new_id;

        if old_next != NULL_NODE {
            if let Some(next_leaf) = self.get_leaf_mut(old_next) {
                next_leaf.prev = new_id;
            }
        }

        self.propagate_upward(origin, separator_key, NodeRef::Leaf(new_id, PhantomData));
    }

    /// Insert `(separator_key, new_child)` into the parent of `origin`, splitting
    /// branches upward as needed, and growing the tree's height when `origin` was
    /// the root.
    pub(crate) fn propagate_upward(&mut self, origin: NodeId, separator_key: K, new_child: NodeRef<K, V>) {
        let origin_ref = if new_child.is_leaf() {
            NodeRef::Leaf(origin, PhantomData)
        } else {
            NodeRef::Branch(origin, PhantomData)
        };

        if self.is_root(origin_ref) {
            let new_root = BranchNode {
                capacity: self.capacity,
                keys: vec![separator_key],
                children: vec![origin_ref, new_child],
            };
            let new_root_id = self.allocate_branch(new_root);
            self.root = NodeRef::Branch(new_root_id, PhantomData);
            return;
        }

        let parent_id = self
            .find_parent_of(origin_ref)
            .expect("a non-root node must have a parent reachable from the root");

        let parent = self
            .get_branch_mut(parent_id)
            .expect("find_parent_of returned a dangling branch id");
        let child_index = parent
            .children
            .iter()
            .position(|c| c.id() == origin && c.is_leaf() == origin_ref.is_leaf())
            .expect("origin must be a child of its own parent");

        if let Some((new_branch, promoted_key)) =
            parent.insert_child_and_split_if_needed(child_index, separator_key, new_child)
        {
            let new_branch_id = self.allocate_branch(new_branch);
            self.propagate_upward(parent_id, promoted_key, NodeRef::Branch(new_branch_id, PhantomData));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_without_split_returns_none_for_new_key() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        assert_eq!(tree.insert(1, "one"), None);
        assert_eq!(tree.get(&1), Some(&"one"));
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        tree.insert(1, "one");
        assert_eq!(tree.insert(1, "uno"), Some("one"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn insert_forces_leaf_split_and_grows_root() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..5 {
            tree.insert(i, i * 10);
        }
        assert!(!tree.is_leaf_root());
        assert_eq!(tree.len(), 5);
        let items: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(items, vec![(0, 0), (1, 10), (2, 20), (3, 30), (4, 40)]);
    }

    #[test]
    fn sequential_insert_preserves_leaf_chain_order() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..200 {
            tree.insert(i, i);
        }
        let keys: Vec<_> = tree.keys().cloned().collect();
        let expected: Vec<_> = (0..200).collect();
        assert_eq!(keys, expected);
        assert!(tree.check_invariants());
    }

    #[test]
    fn reverse_order_insert_also_balances() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in (0..200).rev() {
            tree.insert(i, i);
        }
        let keys: Vec<_> = tree.keys().cloned().collect();
        let expected: Vec<_> = (0..200).collect();
        assert_eq!(keys, expected);
        assert!(tree.check_invariants());
    }
}
