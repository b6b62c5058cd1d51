//! Whole-structure persistence: `save`/`load` the tree as a flat stream of
//! `(key, value)` pairs, with `load` doing a bottom-up bulk rebuild rather
//! than inserting one entry at a time.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::codec::Codec;
use crate::compact_arena::CompactArena;
use crate::error::BTreeResult;
use crate::types::{BPlusTreeMap, BranchNode, LeafNode, NodeRef, MIN_CAPACITY, NULL_NODE};
use crate::BPlusTreeError;

impl<K: Ord + Clone + Codec, V: Clone + Codec> BPlusTreeMap<K, V> {
    /// Write every entry, in ascending key order, as back-to-back encoded
    /// `(key, value)` pairs. No header, magic, or trailer.
    pub fn save<W: Write>(&self, mut writer: W) -> BTreeResult<()> {
        let mut current = self.get_first_leaf_id();
        while let Some(id) = current {
            let leaf = self.get_leaf(id).expect("leaf chain id must resolve");
            for i in 0..leaf.keys_len() {
                leaf.get_key(i)
                    .expect("index within keys_len")
                    .encode(&mut writer)?;
                leaf.get_value(i)
                    .expect("index within keys_len")
                    .encode(&mut writer)?;
            }
            current = (leaf.next != NULL_NODE).then_some(leaf.next);
        }
        Ok(())
    }

    /// Truncate (or create) `path` and write the tree there.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> BTreeResult<()> {
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Rebuild a tree from a stream of encoded `(key, value)` pairs, bottom-up.
    ///
    /// The stream must already be in ascending key order; this does not
    /// re-sort. End of stream (an `UnexpectedEof` while decoding a key) ends
    /// the read cleanly; any other I/O or decode error aborts the load and
    /// no partially built tree is returned.
    pub fn load<R: Read>(capacity: usize, mut reader: R) -> BTreeResult<Self> {
        if capacity < MIN_CAPACITY {
            return Err(BPlusTreeError::invalid_capacity(capacity, MIN_CAPACITY));
        }

        let mut leaf_arena: CompactArena<LeafNode<K, V>> = CompactArena::new();
        let mut branch_arena: CompactArena<BranchNode<K, V>> = CompactArena::new();

        let leaf_ids = build_leaves(&mut reader, capacity, &mut leaf_arena)?;

        if leaf_ids.is_empty() {
            let root_id = leaf_arena.allocate(LeafNode::new(capacity));
            return Ok(Self {
                capacity,
                root: NodeRef::Leaf(root_id, PhantomData),
                leaf_arena,
                branch_arena,
            });
        }

        let mut level: Vec<NodeRef<K, V>> = leaf_ids
            .into_iter()
            .map(|id| NodeRef::Leaf(id, PhantomData))
            .collect();

        while level.len() > 1 {
            level = build_branch_level(level, capacity, &leaf_arena, &mut branch_arena);
        }

        Ok(Self {
            capacity,
            root: level[0],
            leaf_arena,
            branch_arena,
        })
    }

    /// Check that `path` names an existing regular file and load it;
    /// otherwise return a fresh empty tree at `capacity` (no error).
    pub fn load_from_path<P: AsRef<Path>>(capacity: usize, path: P) -> BTreeResult<Self> {
        let path = path.as_ref();
        let is_regular_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        if !is_regular_file {
            return Self::new(capacity);
        }

        let file = fs::File::open(path)?;
        Self::load(capacity, BufReader::new(file))
    }
}

/// Degree-selection rule shared by the leaf pass and every branch pass:
/// prefer `preferred`, fall back to an even split when there's a large
/// surplus, and otherwise take everything that's left.
fn choose_degree(available: usize, preferred: usize, max_allowed: usize) -> usize {
    if available >= 2 * preferred {
        preferred
    } else if available > max_allowed {
        available / 2
    } else {
        available
    }
}

fn try_decode_pair<R: Read, K: Codec, V: Codec>(reader: &mut R) -> BTreeResult<Option<(K, V)>> {
    match K::decode(reader) {
        Ok(key) => {
            let value = V::decode(reader)?;
            Ok(Some((key, value)))
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read-ahead buffered leaf construction: keeps up to `2 * PREF_LEAF`
/// decoded pairs on hand so `choose_degree` can tell a genuine tail from a
/// mid-stream lull, and links each new leaf into the chain as it's produced.
fn build_leaves<R: Read, K: Ord + Clone + Codec, V: Clone + Codec>(
    reader: &mut R,
    capacity: usize,
    leaf_arena: &mut CompactArena<LeafNode<K, V>>,
) -> BTreeResult<Vec<crate::types::NodeId>> {
    let pref_leaf = (3 * capacity / 4).max(1);
    let max_buffer = 2 * pref_leaf;

    let mut buffer: VecDeque<(K, V)> = VecDeque::new();
    let mut leaf_ids = Vec::new();
    let mut prev_id = NULL_NODE;
    let mut eof = false;

    loop {
        while !eof && buffer.len() < max_buffer {
            match try_decode_pair(reader)? {
                Some(pair) => buffer.push_back(pair),
                None => {
                    eof = true;
                    break;
                }
            }
        }

        if buffer.is_empty() {
            break;
        }

        let degree = choose_degree(buffer.len(), pref_leaf, capacity).max(1);
        let mut keys = Vec::with_capacity(degree);
        let mut values = Vec::with_capacity(degree);
        for _ in 0..degree {
            let (k, v) = buffer.pop_front().expect("degree bounded by buffer.len()");
            keys.push(k);
            values.push(v);
        }

        let leaf = LeafNode {
            capacity,
            keys,
            values,
            prev: prev_id,
            next: NULL_NODE,
        };
        let leaf_id = leaf_arena.allocate(leaf);
        if prev_id != NULL_NODE {
            leaf_arena
                .get_mut(prev_id)
                .expect("just-allocated previous leaf")
                .next = leaf_id;
        }
        prev_id = leaf_id;
        leaf_ids.push(leaf_id);
    }

    Ok(leaf_ids)
}

/// One pass of the bottom-up build: consume a level of nodes left to right
/// into parents, promoting a genuine single leftover node directly rather
/// than wrapping it in a zero-separator branch.
fn build_branch_level<K: Ord + Clone, V: Clone>(
    level: Vec<NodeRef<K, V>>,
    capacity: usize,
    leaf_arena: &CompactArena<LeafNode<K, V>>,
    branch_arena: &mut CompactArena<BranchNode<K, V>>,
) -> Vec<NodeRef<K, V>> {
    let pref_inner = (3 * capacity / 4).max(1);
    let n = level.len();
    let mut next_level = Vec::new();
    let mut i = 0;

    while i < n {
        let remaining = n - i;
        if remaining == 1 {
            next_level.push(level[i]);
            i += 1;
            continue;
        }

        let degree = choose_degree(remaining, pref_inner + 1, capacity + 1)
            .max(2)
            .min(remaining);

        let mut children = Vec::with_capacity(degree);
        let mut keys = Vec::with_capacity(degree - 1);
        for j in 0..degree {
            let child = level[i + j];
            if j > 0 {
                // Reads only already-allocated nodes from the previous pass,
                // never one just allocated below, so the reborrow is safe.
                keys.push(leftmost_key(child, leaf_arena, &*branch_arena));
            }
            children.push(child);
        }

        let branch = BranchNode {
            capacity,
            keys,
            children,
        };
        let branch_id = branch_arena.allocate(branch);
        next_level.push(NodeRef::Branch(branch_id, PhantomData));
        i += degree;
    }

    next_level
}

/// Descend to the leftmost leaf under `node` and clone its first key; used
/// to derive a branch separator from a freshly-built subtree during bulk load.
fn leftmost_key<K: Clone, V>(
    node: NodeRef<K, V>,
    leaf_arena: &CompactArena<LeafNode<K, V>>,
    branch_arena: &CompactArena<BranchNode<K, V>>,
) -> K {
    match node {
        NodeRef::Leaf(id, _) => leaf_arena
            .get(id)
            .and_then(|leaf| leaf.first_key())
            .expect("bulk-built leaf is never empty")
            .clone(),
        NodeRef::Branch(id, _) => {
            let branch = branch_arena
                .get(id)
                .expect("bulk-built branch must exist in arena");
            leftmost_key(branch.children[0], leaf_arena, branch_arena)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BPlusTreeMap;
    use std::io::Cursor;

    #[test]
    fn save_then_load_round_trips_in_order() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..500u32 {
            tree.insert(i, i * 3);
        }

        let mut buf = Vec::new();
        tree.save(&mut buf).unwrap();

        let loaded = BPlusTreeMap::<u32, u32>::load(4, Cursor::new(buf)).unwrap();
        assert_eq!(loaded.len(), tree.len());
        assert!(loaded.check_invariants());
        let expected: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
        let actual: Vec<_> = loaded.items().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(expected, actual);
    }

    #[test]
    fn load_never_produces_a_sparse_node() {
        for count in [0u32, 1, 2, 5, 17, 100, 257] {
            let mut tree = BPlusTreeMap::new(8).unwrap();
            for i in 0..count {
                tree.insert(i, i);
            }
            let mut buf = Vec::new();
            tree.save(&mut buf).unwrap();
            let loaded = BPlusTreeMap::<u32, u32>::load(8, Cursor::new(buf)).unwrap();
            assert!(
                loaded.check_invariants(),
                "invariants broken after bulk load of {} entries",
                count
            );
        }
    }

    #[test]
    fn load_tolerates_empty_stream() {
        let loaded = BPlusTreeMap::<u32, u32>::load(4, Cursor::new(Vec::new())).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn load_from_path_returns_empty_tree_for_missing_file() {
        let loaded =
            BPlusTreeMap::<u32, u32>::load_from_path(4, "/nonexistent/path/for/bplustree-test")
                .unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.capacity, 4);
    }

    #[test]
    fn save_load_path_round_trips() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("bplustree-test-{}.bin", std::process::id()));

        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..200u32 {
            tree.insert(i, i);
        }
        tree.save_to_path(&path).unwrap();

        let loaded = BPlusTreeMap::<u32, u32>::load_from_path(4, &path).unwrap();
        assert_eq!(loaded.len(), tree.len());

        let _ = std::fs::remove_file(&path);
    }
}
