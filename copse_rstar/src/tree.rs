// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree container: entry table, public mutation, and condensation.

use std::fmt;

use copse_aabb::Box2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{Arena, Child, Entry, Node, NodeIdx};
use crate::params::Params;

/// A dynamic R*-tree over 2D axis-aligned rectangles.
///
/// Rectangles are inserted one at a time and addressed by the `u64` handle
/// [`insert`](Self::insert) returns. Handles are unique across the whole life
/// of the tree, including after removal and [`clear`](Self::clear).
///
/// The tree is single-threaded: every public operation runs to completion and
/// leaves the structure valid. Callers sharing a tree across threads must
/// provide their own exclusion.
pub struct RStarTree {
    pub(crate) arena: Arena,
    pub(crate) root: Option<NodeIdx>,
    pub(crate) height: usize,
    /// Entry handle → leaf currently holding it. The source of truth for
    /// handle liveness.
    pub(crate) leaf_of: FxHashMap<u64, NodeIdx>,
    /// Levels that already ran forced reinsertion within the current
    /// insertion. Cleared on entry to and exit from a public insert.
    pub(crate) overflow_mem: FxHashSet<usize>,
    pub(crate) params: Params,
    next_entry_id: u64,
}

impl Default for RStarTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RStarTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RStarTree")
            .field("entries", &self.len())
            .field("height", &self.height)
            .field("max_children", &self.params.max_children)
            .field("min_children", &self.params.min_children)
            .finish_non_exhaustive()
    }
}

impl RStarTree {
    /// Create an empty tree with default parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Create an empty tree with the given parameters, clamped into their
    /// legal ranges (see [`Params`]).
    pub fn with_params(params: Params) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            height: 0,
            leaf_of: FxHashMap::default(),
            overflow_mem: FxHashSet::default(),
            params: params.clamped(),
            next_entry_id: 0,
        }
    }

    /// The parameters the tree was built with, after clamping.
    pub fn params(&self) -> Params {
        self.params
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.leaf_of.len()
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.leaf_of.is_empty()
    }

    /// Number of node levels; 0 iff the tree is empty.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounding rectangle of everything stored, or `None` when empty.
    pub fn envelope(&self) -> Option<Box2> {
        self.root.map(|r| self.node(r).bbox)
    }

    /// Whether `id` refers to a live entry.
    pub fn contains(&self, id: u64) -> bool {
        self.leaf_of.contains_key(&id)
    }

    /// The rectangle stored under `id`, if the handle is live.
    pub fn get(&self, id: u64) -> Option<Box2> {
        let leaf = *self.leaf_of.get(&id)?;
        self.node(leaf).children.iter().find_map(|c| match c {
            Child::Entry(e) if e.id == id => Some(e.bbox),
            _ => None,
        })
    }

    /// Insert a rectangle and return its handle.
    ///
    /// A rectangle with a negative extent is normalized to zero extent on
    /// that axis (and logged); coordinates are assumed finite.
    pub fn insert(&mut self, rect: Box2) -> u64 {
        let rect = sanitize(rect);
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        if self.root.is_some() {
            self.overflow_mem.clear();
            self.insert_at(Child::Entry(Entry { id, bbox: rect }), 0);
            self.overflow_mem.clear();
        } else {
            let root = self.new_node(true);
            let node = self.node_mut(root);
            node.children.push(Child::Entry(Entry { id, bbox: rect }));
            node.bbox = rect;
            self.root = Some(root);
            self.height = 1;
            self.leaf_of.insert(id, root);
        }
        id
    }

    /// Remove the entry under `id`, returning its rectangle.
    ///
    /// Returns `None` without touching the tree when the handle is unknown.
    pub fn remove(&mut self, id: u64) -> Option<Box2> {
        let leaf = self.leaf_of.remove(&id)?;
        let pos = self
            .node(leaf)
            .children
            .iter()
            .position(|c| matches!(c, Child::Entry(e) if e.id == id))
            .expect("entry table pointed at a leaf without the entry");
        let removed = match self.node_mut(leaf).children.remove(pos) {
            Child::Entry(e) => e.bbox,
            Child::Node(_) => unreachable!("node child in a leaf"),
        };
        self.recompute_bbox(leaf);
        self.condense(leaf);
        self.collapse_root();
        Some(removed)
    }

    /// Drop every entry and node. Handles are not reused: ids continue from
    /// where they left off.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.height = 0;
        self.leaf_of.clear();
        self.overflow_mem.clear();
    }

    /// Walk from the shrunk leaf to the root, pruning nodes that fell under
    /// the minimum fanout and repairing ancestor MBRs. Pruned subtrees are
    /// reinserted at the level they came from, highest first, so their leaves
    /// land back at leaf depth.
    fn condense(&mut self, leaf: NodeIdx) {
        let mut orphans: Vec<(usize, NodeIdx)> = Vec::new();
        let mut cur = leaf;
        let mut level = 0usize;
        while let Some(parent) = self.node(cur).parent {
            if self.node(cur).children.len() < self.params.min_children {
                let pos = self
                    .node(parent)
                    .children
                    .iter()
                    .position(|c| matches!(c, Child::Node(i) if *i == cur))
                    .expect("child missing from its parent");
                self.node_mut(parent).children.remove(pos);
                self.node_mut(cur).parent = None;
                orphans.push((level, cur));
            }
            self.recompute_bbox(parent);
            cur = parent;
            level += 1;
        }
        while let Some((level, orphan)) = orphans.pop() {
            let children = std::mem::take(&mut self.node_mut(orphan).children);
            for child in children {
                self.insert_at(child, level);
            }
            self.arena.release(orphan);
        }
    }

    /// Shrink the tree when the root became trivial: a single-child branch
    /// root is replaced by its child, an empty leaf root empties the tree.
    fn collapse_root(&mut self) {
        let Some(root) = self.root else { return };
        let node = self.node(root);
        if !node.leaf && node.children.len() == 1 {
            let child = match node.children[0] {
                Child::Node(i) => i,
                Child::Entry(_) => unreachable!("entry child in a branch"),
            };
            self.node_mut(child).parent = None;
            self.arena.release(root);
            self.root = Some(child);
            self.height -= 1;
        } else if node.leaf && node.children.is_empty() {
            self.arena.release(root);
            self.root = None;
            self.height = 0;
        }
    }

    pub(crate) fn node(&self, idx: NodeIdx) -> &Node {
        self.arena.get(idx)
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        self.arena.get_mut(idx)
    }

    pub(crate) fn new_node(&mut self, leaf: bool) -> NodeIdx {
        self.arena.alloc(Node::new(leaf))
    }

    pub(crate) fn child_bbox(&self, child: &Child) -> Box2 {
        match child {
            Child::Node(i) => self.node(*i).bbox,
            Child::Entry(e) => e.bbox,
        }
    }

    /// Reset a node's MBR from its children. Leaves an empty node untouched.
    pub(crate) fn recompute_bbox(&mut self, idx: NodeIdx) {
        let bbox = {
            let node = self.node(idx);
            Box2::mbr(node.children.iter().map(|c| self.child_bbox(c)))
        };
        if let Some(bbox) = bbox {
            self.node_mut(idx).bbox = bbox;
        }
    }
}

fn sanitize(rect: Box2) -> Box2 {
    debug_assert!(
        rect.x.is_finite() && rect.y.is_finite() && rect.w.is_finite() && rect.h.is_finite(),
        "non-finite rectangle: {rect:?}"
    );
    if rect.w < 0.0 || rect.h < 0.0 {
        log::warn!("normalizing rectangle with negative extent: {rect:?}");
        return Box2::new(rect.x, rect.y, rect.w.max(0.0), rect.h.max(0.0));
    }
    rect
}

#[cfg(test)]
impl RStarTree {
    /// Check the structural invariants: uniform leaf depth, fanout bounds,
    /// exact MBRs, entry-table bijection, and parent back-references.
    pub(crate) fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.height, 0, "empty tree with nonzero height");
            assert!(self.leaf_of.is_empty(), "entry table without a root");
            return;
        };
        assert!(self.height >= 1);
        assert!(self.node(root).parent.is_none(), "root with a parent");

        let mut seen_entries = 0usize;
        let mut live_nodes = 0usize;
        let mut stack = vec![(root, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            live_nodes += 1;
            let node = self.node(idx);
            assert!(!node.children.is_empty(), "node without children");
            let len = node.children.len();
            assert!(len <= self.params.max_children, "overfull node");
            if idx == root {
                if self.height > 1 {
                    assert!(!node.leaf, "leaf root in a tall tree");
                    assert!(len >= 2, "branch root with a single child");
                } else {
                    assert!(node.leaf, "branch root in a tree of height 1");
                }
            } else {
                assert!(len >= self.params.min_children, "underfull node");
            }

            let mbr = Box2::mbr(node.children.iter().map(|c| self.child_bbox(c)))
                .expect("mbr of a non-empty node");
            assert_eq!(node.bbox, mbr, "stale node bbox");

            if node.leaf {
                assert_eq!(depth, self.height - 1, "leaf off the leaf level");
                for child in &node.children {
                    match child {
                        Child::Entry(e) => {
                            assert_eq!(
                                self.leaf_of.get(&e.id),
                                Some(&idx),
                                "entry table out of sync for {}",
                                e.id
                            );
                            seen_entries += 1;
                        }
                        Child::Node(_) => panic!("node child in a leaf"),
                    }
                }
            } else {
                for child in &node.children {
                    match child {
                        Child::Node(i) => {
                            assert_eq!(self.node(*i).parent, Some(idx), "broken parent link");
                            stack.push((*i, depth + 1));
                        }
                        Child::Entry(_) => panic!("entry child in a branch"),
                    }
                }
            }
        }
        assert_eq!(seen_entries, self.leaf_of.len(), "entry table size mismatch");
        assert_eq!(live_nodes, self.arena.live(), "unreachable live nodes");
    }
}
