// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The insertion engine: choose-subtree descent, the upward overflow walk,
//! and forced reinsertion.

use copse_aabb::Box2;
use kurbo::Point;

use crate::node::{Child, NodeIdx};
use crate::params::ReinsertBasis;
use crate::tree::RStarTree;

impl RStarTree {
    /// Insert `child` so that it hangs from a node at `level` (0 = leaf
    /// level). Entries are inserted at level 0; a subtree whose root sits at
    /// level `k` is inserted at level `k + 1`.
    pub(crate) fn insert_at(&mut self, child: Child, level: usize) {
        let bbox = self.child_bbox(&child);
        let target = self.choose_subtree(bbox, level);
        self.attach(target, child);
        self.ascend(target, level);
    }

    /// Walk from `start` to the root, resolving overflow and repairing
    /// ancestor MBRs. A split bubbles its new sibling into the parent, which
    /// may overflow in turn; splitting the root grows the tree by one level.
    fn ascend(&mut self, start: NodeIdx, start_level: usize) {
        let mut cur = start;
        let mut level = start_level;
        loop {
            if self.node(cur).children.len() > self.params.max_children
                && let Some(sibling) = self.handle_overflow(cur, level)
            {
                match self.node(cur).parent {
                    None => cur = self.raise_root(cur, sibling),
                    Some(parent) => self.attach(parent, Child::Node(sibling)),
                }
            }
            match self.node(cur).parent {
                Some(parent) => {
                    self.recompute_bbox(parent);
                    cur = parent;
                    level += 1;
                }
                None => break,
            }
        }
    }

    /// Resolve an overfull node: the first overflow at a level within one
    /// insertion reinserts in place, every later one (and any overflow at the
    /// root) splits and returns the new sibling.
    fn handle_overflow(&mut self, idx: NodeIdx, level: usize) -> Option<NodeIdx> {
        let at_root = self.node(idx).parent.is_none();
        if at_root || self.overflow_mem.contains(&level) {
            Some(self.split_node(idx))
        } else {
            self.overflow_mem.insert(level);
            self.forced_reinsert(idx, level);
            None
        }
    }

    /// Pull the `reinsert_count` children farthest from the node's reference
    /// center and insert them again from the top, farthest first. The
    /// reinsertions may overflow this level again, which then splits because
    /// the level is already marked.
    fn forced_reinsert(&mut self, idx: NodeIdx, level: usize) {
        let reference = match self.params.reinsert_basis {
            ReinsertBasis::NodeCenter => self.node(idx).bbox.center(),
            ReinsertBasis::MassCenter => self.mass_center(idx),
        };
        let children = std::mem::take(&mut self.node_mut(idx).children);
        let mut ranked: Vec<(f64, Child)> = children
            .into_iter()
            .map(|c| {
                let d = self.child_bbox(&c).center().distance_squared(reference);
                (d, c)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let kept = ranked.split_off(self.params.reinsert_count);
        self.node_mut(idx).children = kept.into_iter().map(|(_, c)| c).collect();
        self.recompute_bbox(idx);
        for (_, child) in ranked {
            self.insert_at(child, level);
        }
    }

    fn mass_center(&self, idx: NodeIdx) -> Point {
        let node = self.node(idx);
        let mut x = 0.0;
        let mut y = 0.0;
        for child in &node.children {
            let c = self.child_bbox(child).center();
            x += c.x;
            y += c.y;
        }
        let n = node.children.len() as f64;
        Point::new(x / n, y / n)
    }

    /// Descend from the root to the node at `level` that should receive a new
    /// child with bounds `bbox`. One step above the leaves the overlap probe
    /// decides; higher up plain least enlargement does.
    fn choose_subtree(&self, bbox: Box2, level: usize) -> NodeIdx {
        let mut cur = self.root.expect("descent into an empty tree");
        let mut cur_level = self.height - 1;
        while cur_level > level {
            cur = if self.children_are_leaves(cur) {
                self.probe_leaves(cur, bbox)
            } else {
                self.least_enlargement(cur, bbox)
            };
            cur_level -= 1;
        }
        cur
    }

    fn children_are_leaves(&self, idx: NodeIdx) -> bool {
        match self.node(idx).children.first() {
            Some(Child::Node(i)) => self.node(*i).leaf,
            _ => false,
        }
    }

    /// Least-enlargement choice among branch children. Ties prefer the child
    /// with the smaller current area, then the earlier child.
    fn least_enlargement(&self, idx: NodeIdx, bbox: Box2) -> NodeIdx {
        let mut best: Option<(f64, f64, NodeIdx)> = None;
        for child in &self.node(idx).children {
            let Child::Node(i) = child else {
                unreachable!("entry child in a branch")
            };
            let cb = self.node(*i).bbox;
            let area = cb.area();
            let enlargement = cb.union(&bbox).area() - area;
            let better = best
                .map(|(be, ba, _)| enlargement < be || (enlargement == be && area < ba))
                .unwrap_or(true);
            if better {
                best = Some((enlargement, area, *i));
            }
        }
        best.expect("branch without children").2
    }

    /// Leaf-level choice: rank children by enlargement, then charge the top
    /// candidates for the overlap they would add against every sibling and
    /// take the cheapest. Ties keep the earliest candidate in rank order.
    fn probe_leaves(&self, idx: NodeIdx, bbox: Box2) -> NodeIdx {
        let mut ranked: Vec<(f64, Box2, NodeIdx)> = self
            .node(idx)
            .children
            .iter()
            .map(|child| {
                let Child::Node(i) = child else {
                    unreachable!("entry child in a branch")
                };
                let cb = self.node(*i).bbox;
                (cb.union(&bbox).area() - cb.area(), cb, *i)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let probe = self.params.overlap_candidates.min(ranked.len());
        let mut best: Option<(f64, NodeIdx)> = None;
        for (_, cb, i) in &ranked[..probe] {
            let grown = cb.union(&bbox);
            let mut delta = 0.0;
            for (_, ob, j) in &ranked {
                if j == i {
                    continue;
                }
                delta += grown.overlap_area(ob) - cb.overlap_area(ob);
            }
            if best.map(|(bd, _)| delta < bd).unwrap_or(true) {
                best = Some((delta, *i));
            }
        }
        best.expect("branch without children").1
    }

    /// Add `child` under `parent`, growing the parent MBR and updating the
    /// moved child's bookkeeping (parent link or entry table).
    pub(crate) fn attach(&mut self, parent: NodeIdx, child: Child) {
        let bbox = self.child_bbox(&child);
        match child {
            Child::Node(i) => {
                debug_assert!(!self.node(parent).leaf, "subtree attached to a leaf");
                self.node_mut(i).parent = Some(parent);
            }
            Child::Entry(e) => {
                debug_assert!(self.node(parent).leaf, "entry attached to a branch");
                self.leaf_of.insert(e.id, parent);
            }
        }
        let node = self.node_mut(parent);
        node.bbox = if node.children.is_empty() {
            bbox
        } else {
            node.bbox.union(&bbox)
        };
        node.children.push(child);
    }

    /// Grow the tree by one level: a fresh branch root over the split halves.
    fn raise_root(&mut self, left: NodeIdx, right: NodeIdx) -> NodeIdx {
        let root = self.new_node(false);
        self.attach(root, Child::Node(left));
        self.attach(root, Child::Node(right));
        self.root = Some(root);
        self.height += 1;
        root
    }
}
