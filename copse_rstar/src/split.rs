// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split selection for overfull nodes.
//!
//! The axis is chosen by the smaller perimeter sum over every candidate
//! distribution, the distribution on that axis by the smaller inter-group
//! overlap. Candidate orderings are the four (axis, edge) sorts, evaluated
//! with prefix/suffix MBR arrays so each distribution costs O(1).

use copse_aabb::Box2;

use crate::node::{Child, NodeIdx};
use crate::tree::RStarTree;

/// One candidate ordering: which axis, and which edge of the boxes the sort
/// key reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SortKey {
    XLow,
    XHigh,
    YLow,
    YHigh,
}

impl SortKey {
    const ALL: [Self; 4] = [Self::XLow, Self::XHigh, Self::YLow, Self::YHigh];

    fn value(self, b: &Box2) -> f64 {
        match self {
            Self::XLow => b.x,
            Self::XHigh => b.max_x(),
            Self::YLow => b.y,
            Self::YHigh => b.max_y(),
        }
    }
}

/// A fully ranked ordering: the children sorted by one key, the running MBRs
/// from both ends, and the perimeter sum over all candidate distributions.
struct SplitOrder {
    children: Vec<Child>,
    prefix: Vec<Box2>,
    suffix: Vec<Box2>,
    margin: f64,
}

impl RStarTree {
    /// Split an overfull node, returning the new sibling that took the upper
    /// group. The sibling inherits the parent link; attaching it to the
    /// parent is the caller's job.
    pub(crate) fn split_node(&mut self, idx: NodeIdx) -> NodeIdx {
        let m = self.params.min_children;
        let children = std::mem::take(&mut self.node_mut(idx).children);
        let n = children.len();
        debug_assert_eq!(n, self.params.max_children + 1, "split without overflow");
        let k = n - 2 * m + 1;

        let orders = SortKey::ALL.map(|key| self.rank(key, &children, m, k));

        // Choose the axis by the cheaper of its two edge sorts; x wins ties.
        let x = if orders[1].margin < orders[0].margin { 1 } else { 0 };
        let y = if orders[3].margin < orders[2].margin { 3 } else { 2 };
        let chosen = if orders[y].margin < orders[x].margin { y } else { x };
        let order = orders
            .into_iter()
            .nth(chosen)
            .expect("chosen order out of range");

        // Choose the distribution by least inter-group overlap, then least
        // total area, keeping the first seen.
        let mut best: Option<(f64, f64, usize)> = None;
        for j in 1..=k {
            let size = m - 1 + j;
            let first = order.prefix[size - 1];
            let second = order.suffix[size];
            let overlap = first.overlap_area(&second);
            let area = first.area() + second.area();
            let better = best
                .map(|(bo, ba, _)| overlap < bo || (overlap == bo && area < ba))
                .unwrap_or(true);
            if better {
                best = Some((overlap, area, size));
            }
        }
        let (_, _, size) = best.expect("no candidate distribution");

        // Keep the lower group in place, move the upper group to a sibling.
        let mut lower = order.children;
        let upper = lower.split_off(size);
        let leaf = self.node(idx).leaf;
        let parent = self.node(idx).parent;
        let sibling = self.new_node(leaf);
        self.node_mut(sibling).parent = parent;
        for child in &upper {
            match child {
                Child::Entry(e) => {
                    self.leaf_of.insert(e.id, sibling);
                }
                Child::Node(i) => {
                    self.node_mut(*i).parent = Some(sibling);
                }
            }
        }
        let sibling_bbox = Box2::mbr(upper.iter().map(|c| self.child_bbox(c)))
            .expect("empty upper split group");
        {
            let node = self.node_mut(sibling);
            node.children = upper;
            node.bbox = sibling_bbox;
        }
        {
            let node = self.node_mut(idx);
            node.children = lower;
        }
        self.recompute_bbox(idx);
        sibling
    }

    fn rank(&self, key: SortKey, children: &[Child], m: usize, k: usize) -> SplitOrder {
        let mut sorted = children.to_vec();
        sorted.sort_by(|a, b| {
            key.value(&self.child_bbox(a))
                .total_cmp(&key.value(&self.child_bbox(b)))
        });
        let boxes: Vec<Box2> = sorted.iter().map(|c| self.child_bbox(c)).collect();
        let n = boxes.len();

        let mut prefix: Vec<Box2> = Vec::with_capacity(n);
        for b in &boxes {
            let next = match prefix.last() {
                None => *b,
                Some(acc) => acc.union(b),
            };
            prefix.push(next);
        }
        let mut suffix: Vec<Box2> = vec![Box2::ZERO; n];
        for i in (0..n).rev() {
            suffix[i] = if i == n - 1 {
                boxes[i]
            } else {
                boxes[i].union(&suffix[i + 1])
            };
        }

        let mut margin = 0.0;
        for j in 1..=k {
            let size = m - 1 + j;
            margin += prefix[size - 1].perimeter() + suffix[size].perimeter();
        }

        SplitOrder {
            children: sorted,
            prefix,
            suffix,
            margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;

    fn small_params() -> Params {
        Params {
            max_children: 4,
            min_children: 2,
            reinsert_count: 2,
            ..Params::default()
        }
    }

    #[test]
    fn split_separates_along_the_spread_axis() {
        // A horizontal strip of identical boxes must split on x into two
        // disjoint groups.
        let mut tree = RStarTree::with_params(small_params());
        for i in 0..5 {
            tree.insert(Box2::new(i as f64 * 10.0, 0.0, 5.0, 5.0));
        }
        tree.assert_invariants();
        let root = tree.root.unwrap();
        let children = &tree.node(root).children;
        assert_eq!(children.len(), 2);
        let a = tree.child_bbox(&children[0]);
        let b = tree.child_bbox(&children[1]);
        assert_eq!(a.overlap_area(&b), 0.0);
        // Both groups satisfy the fanout bounds.
        for child in children {
            let Child::Node(i) = child else {
                panic!("leaf root after split")
            };
            let len = tree.node(*i).children.len();
            assert!((2..=4).contains(&len));
        }
    }

    #[test]
    fn vertical_strip_splits_on_y() {
        let mut tree = RStarTree::with_params(small_params());
        for i in 0..5 {
            tree.insert(Box2::new(0.0, i as f64 * 10.0, 5.0, 5.0));
        }
        tree.assert_invariants();
        let root = tree.root.unwrap();
        let children = &tree.node(root).children;
        assert_eq!(children.len(), 2);
        let a = tree.child_bbox(&children[0]);
        let b = tree.child_bbox(&children[1]);
        // Disjoint in y.
        assert!(a.max_y() <= b.y || b.max_y() <= a.y);
    }

    #[test]
    fn repeated_splits_keep_fanout_bounds() {
        let mut tree = RStarTree::with_params(Params {
            max_children: 6,
            min_children: 3,
            reinsert_count: 2,
            ..Params::default()
        });
        for i in 0..120 {
            tree.insert(Box2::new(
                (i % 12) as f64 * 6.0,
                (i / 12) as f64 * 6.0,
                4.0,
                4.0,
            ));
        }
        // Fanout and depth are covered by the invariant checker.
        tree.assert_invariants();
        assert!(tree.height() >= 3);
    }
}
