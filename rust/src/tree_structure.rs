//! Tree structure management operations for BPlusTreeMap.
//!
//! This module contains all tree-level operations that manage the overall structure,
//! including size queries, clearing, node counting, and tree statistics.

use crate::types::{BPlusTreeMap, LeafNode, NodeId, NodeRef};
use std::marker::PhantomData;

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K: Ord + Clone, V: Clone> BPlusTreeMap<K, V> {
    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len_recursive(&self.root)
    }

    /// Recursively count elements with proper arena access.
    fn len_recursive(&self, node: &NodeRef<K, V>) -> usize {
        match node {
            NodeRef::Leaf(id, _) => self.get_leaf(*id).map(|leaf| leaf.len()).unwrap_or(0),
            NodeRef::Branch(id, _) => self
                .get_branch(*id)
                .map(|branch| {
                    branch
                        .children
                        .iter()
                        .map(|child| self.len_recursive(child))
                        .sum()
                })
                .unwrap_or(0),
        }
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        matches!(self.root, NodeRef::Leaf(_, _))
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count_recursive(&self.root)
    }

    /// Recursively count leaf nodes with proper arena access.
    fn leaf_count_recursive(&self, node: &NodeRef<K, V>) -> usize {
        match node {
            NodeRef::Leaf(_, _) => 1, // An arena leaf is one leaf node
            NodeRef::Branch(id, _) => self
                .get_branch(*id)
                .map(|branch| {
                    branch
                        .children
                        .iter()
                        .map(|child| self.leaf_count_recursive(child))
                        .sum()
                })
                .unwrap_or(0),
        }
    }

    /// Clear all items from the tree.
    pub fn clear(&mut self) {
        // Clear all arenas and create a new root leaf
        self.leaf_arena.clear();
        self.branch_arena.clear();

        // Create a new root leaf
        let root_leaf = LeafNode::new(self.capacity);
        let root_id = self.leaf_arena.allocate(root_leaf);
        self.root = NodeRef::Leaf(root_id, PhantomData);
    }

    /// Count the number of leaf and branch nodes actually in the tree structure.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        if matches!(self.root, NodeRef::Leaf(_, _)) {
            // Single leaf root
            (1, 0)
        } else {
            self.count_nodes_recursive(&self.root)
        }
    }

    /// Recursively count nodes in the tree.
    fn count_nodes_recursive(&self, node: &NodeRef<K, V>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0), // Found a leaf
            NodeRef::Branch(id, _) => {
                if let Some(branch) = self.get_branch(*id) {
                    let mut total_leaves = 0;
                    let mut total_branches = 1; // Count this branch

                    // Recursively count in all children
                    for child in &branch.children {
                        let (child_leaves, child_branches) = self.count_nodes_recursive(child);
                        total_leaves += child_leaves;
                        total_branches += child_branches;
                    }

                    (total_leaves, total_branches)
                } else {
                    // Invalid branch reference
                    (0, 0)
                }
            }
        }
    }

    // ============================================================================
    // TREE NAVIGATION HELPERS
    // ============================================================================

    /// Get the ID of the first (leftmost) leaf in the tree
    pub fn get_first_leaf_id(&self) -> Option<NodeId> {
        let mut current = &self.root;

        loop {
            match current {
                NodeRef::Leaf(leaf_id, _) => return Some(*leaf_id),
                NodeRef::Branch(branch_id, _) => {
                    if let Some(branch) = self.get_branch(*branch_id) {
                        if !branch.children.is_empty() {
                            current = &branch.children[0];
                        } else {
                            return None;
                        }
                    } else {
                        return None;
                    }
                }
            }
        }
    }

    /// Get the ID of the last (rightmost) leaf in the tree, the starting
    /// point for backward iteration.
    pub fn get_last_leaf_id(&self) -> Option<NodeId> {
        let mut current = &self.root;

        loop {
            match current {
                NodeRef::Leaf(leaf_id, _) => return Some(*leaf_id),
                NodeRef::Branch(branch_id, _) => {
                    let branch = self.get_branch(*branch_id)?;
                    current = branch.children.last()?;
                }
            }
        }
    }

    /// Find the branch that directly parents `target`, by re-descending from
    /// the root. No node stores a literal back-pointer to its parent; this
    /// re-derives "the parent of X" on demand instead, trading an O(log n)
    /// walk for never needing to keep a stored parent pointer in sync.
    pub(crate) fn find_parent_of(&self, target: NodeRef<K, V>) -> Option<NodeId> {
        let NodeRef::Branch(root_id, _) = self.root else {
            return None;
        };
        self.find_parent_of_recursive(root_id, target)
    }

    fn find_parent_of_recursive(&self, branch_id: NodeId, target: NodeRef<K, V>) -> Option<NodeId> {
        let branch = self.get_branch(branch_id)?;
        if branch
            .children
            .iter()
            .any(|c| c.id() == target.id() && c.is_leaf() == target.is_leaf())
        {
            return Some(branch_id);
        }
        for child in &branch.children {
            if let NodeRef::Branch(child_id, _) = child {
                if let Some(found) = self.find_parent_of_recursive(*child_id, target) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Returns true if `candidate` (matched by id and variant) is the tree's root.
    pub(crate) fn is_root(&self, candidate: NodeRef<K, V>) -> bool {
        match (self.root, candidate) {
            (NodeRef::Leaf(a, _), NodeRef::Leaf(b, _)) => a == b,
            (NodeRef::Branch(a, _), NodeRef::Branch(b, _)) => a == b,
            _ => false,
        }
    }

    /// Returns `(left_sibling, right_sibling)` of `node`, both as positions
    /// within `parent`, given `node`'s index among `parent`'s children.
    pub(crate) fn sibling_ids(
        &self,
        parent_id: NodeId,
        child_index: usize,
    ) -> (Option<NodeRef<K, V>>, Option<NodeRef<K, V>>) {
        let Some(parent) = self.get_branch(parent_id) else {
            return (None, None);
        };
        let left = if child_index > 0 {
            parent.children.get(child_index - 1).copied()
        } else {
            None
        };
        let right = parent.children.get(child_index + 1).copied();
        (left, right)
    }

    /// Find the leaf node and index where a key should be located.
    /// Returns the leaf `NodeId` and the insertion index within that leaf.
    #[inline]
    pub(crate) fn find_leaf_for_key(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut current = &self.root;

        loop {
            match current {
                NodeRef::Leaf(leaf_id, _) => {
                    if let Some(leaf) = self.get_leaf(*leaf_id) {
                        // Find the position where this key would be inserted
                        let index = match leaf.binary_search_keys(key) {
                            Ok(idx) => idx,  // Key found at exact position
                            Err(idx) => idx, // Key would be inserted at this position
                        };
                        return Some((*leaf_id, index));
                    } else {
                        return None;
                    }
                }
                NodeRef::Branch(branch_id, _) => {
                    if let Some(branch) = self.get_branch(*branch_id) {
                        let child_index = branch.find_child_index(key);
                        if let Some(child) = branch.children.get(child_index) {
                            current = child;
                        } else {
                            return None;
                        }
                    } else {
                        return None;
                    }
                }
            }
        }
    }

    /// Find the target leaf and provide both the index and whether the key matched exactly.
    /// Returns `(leaf_id, index, matched)` where `matched` is true if the key exists at `index`.
    #[inline]
    pub(crate) fn find_leaf_for_key_with_match(&self, key: &K) -> Option<(NodeId, usize, bool)> {
        let mut current = &self.root;

        loop {
            match current {
                NodeRef::Leaf(leaf_id, _) => {
                    if let Some(leaf) = self.get_leaf(*leaf_id) {
                        match leaf.binary_search_keys(key) {
                            Ok(idx) => return Some((*leaf_id, idx, true)),
                            Err(idx) => return Some((*leaf_id, idx, false)),
                        }
                    } else {
                        return None;
                    }
                }
                NodeRef::Branch(branch_id, _) => {
                    if let Some(branch) = self.get_branch(*branch_id) {
                        let child_index = branch.find_child_index(key);
                        if let Some(child) = branch.children.get(child_index) {
                            current = child;
                        } else {
                            return None;
                        }
                    } else {
                        return None;
                    }
                }
            }
        }
    }

    // Arena statistics and management methods live in compact_arena.rs

    // ============================================================================
    // CHILD LOOKUP HELPERS
    // ============================================================================

    /// Find the child index and `NodeRef` for `key` in the specified branch,
    /// returning `None` if the branch does not exist or index is out of range.
    pub fn find_child(&self, branch_id: NodeId, key: &K) -> Option<(usize, NodeRef<K, V>)> {
        self.get_branch(branch_id).and_then(|branch| {
            let idx = branch.find_child_index(key);
            branch.children.get(idx).cloned().map(|child| (idx, child))
        })
    }

    /// Mutable version of `find_child`.
    pub fn find_child_mut(&mut self, branch_id: NodeId, key: &K) -> Option<(usize, NodeRef<K, V>)> {
        self.get_branch_mut(branch_id).and_then(|branch| {
            let idx = branch.find_child_index(key);
            branch.children.get(idx).cloned().map(|child| (idx, child))
        })
    }

    // Unsafe arena access methods live in compact_arena.rs
}
