// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query traversals: window, point, circle, and nearest neighbor.

use std::collections::VecDeque;

use copse_aabb::Box2;
use kurbo::{Circle, Point};

use crate::node::{Child, Entry, NodeIdx};
use crate::tree::RStarTree;

impl RStarTree {
    /// Append every entry whose rectangle intersects `window` to `out`.
    /// Touching rectangles count; `out` is not cleared; order is unspecified.
    pub fn search(&self, window: Box2, out: &mut Vec<Entry>) {
        self.collect(|b| b.intersects(&window), out);
    }

    /// Append every entry whose rectangle contains `p` to `out`. Containment
    /// is half-open, so points on the right or bottom edge do not match.
    pub fn select(&self, p: Point, out: &mut Vec<Entry>) {
        self.collect(|b| b.contains_point(p), out);
    }

    /// Append every entry whose rectangle is reached by `circle` to `out`.
    pub fn range(&self, circle: Circle, out: &mut Vec<Entry>) {
        self.collect(|b| b.intersects_circle(circle), out);
    }

    /// Append every live entry to `out`, in unspecified order.
    pub fn entries(&self, out: &mut Vec<Entry>) {
        self.collect(|_| true, out);
    }

    fn collect(&self, pred: impl Fn(Box2) -> bool, out: &mut Vec<Entry>) {
        let Some(root) = self.root else { return };
        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(idx) = queue.pop_front() {
            for child in &self.node(idx).children {
                match child {
                    Child::Entry(e) => {
                        if pred(e.bbox) {
                            out.push(*e);
                        }
                    }
                    Child::Node(i) => {
                        if pred(self.node(*i).bbox) {
                            queue.push_back(*i);
                        }
                    }
                }
            }
        }
    }

    /// The entry nearest to the live entry `id`, excluding the entry itself.
    ///
    /// Distance is the rectangle metric of [`nearest_to_rect`]; `hollow`
    /// makes a containing/contained pair measure the gap to the nearest edge
    /// instead of zero. Returns `None` when `id` is unknown or the tree holds
    /// fewer than two entries.
    ///
    /// [`nearest_to_rect`]: Self::nearest_to_rect
    pub fn nearest_to_entry(&self, id: u64, hollow: bool) -> Option<Entry> {
        if self.len() < 2 {
            return None;
        }
        let leaf = *self.leaf_of.get(&id)?;
        let query = self.get(id)?;
        self.nearest_from(leaf, query, Some(id), hollow)
    }

    /// The entry nearest to an arbitrary rectangle.
    ///
    /// Rectangles separated on one axis measure the gap on that axis;
    /// rectangles separated on both measure the diagonal between the facing
    /// corners; overlapping rectangles measure zero unless `hollow` is set
    /// and one contains the other, in which case the gap to the nearest edge
    /// counts. Returns `None` when the tree holds fewer than two entries.
    pub fn nearest_to_rect(&self, query: Box2, hollow: bool) -> Option<Entry> {
        if self.len() < 2 {
            return None;
        }
        let seed = self.seed_leaf(query);
        self.nearest_from(seed, query, None, hollow)
    }

    /// Scan the seed leaf, then verify the local winner globally: anything
    /// closer must intersect the query window inflated by the winner's
    /// distance, so one window search settles it.
    fn nearest_from(
        &self,
        leaf: NodeIdx,
        query: Box2,
        exclude: Option<u64>,
        hollow: bool,
    ) -> Option<Entry> {
        let mut best: Option<(f64, Entry)> = None;
        for child in &self.node(leaf).children {
            let Child::Entry(e) = child else {
                unreachable!("branch used as seed leaf")
            };
            if exclude == Some(e.id) {
                continue;
            }
            let d = rect_distance(&query, &e.bbox, hollow);
            if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, *e));
            }
        }
        let (mut best_d, mut best_entry) = best?;

        if best_d > 0.0 {
            let mut candidates = Vec::new();
            self.search(query.outset(best_d), &mut candidates);
            for e in candidates {
                if exclude == Some(e.id) || self.leaf_of.get(&e.id) == Some(&leaf) {
                    continue;
                }
                let d = rect_distance(&query, &e.bbox, hollow);
                if d < best_d {
                    best_d = d;
                    best_entry = e;
                }
            }
        }
        Some(best_entry)
    }

    /// Pick the leaf most likely to hold the nearest entry: follow every
    /// child that intersects the query while any does, otherwise drop to a
    /// single-path descent by closest center. Among intersecting leaves the
    /// largest overlap wins.
    fn seed_leaf(&self, query: Box2) -> NodeIdx {
        let root = self.root.expect("seed leaf of an empty tree");
        if self.node(root).leaf {
            return root;
        }
        let center = query.center();
        let mut frontier = vec![root];
        loop {
            let mut next = Vec::new();
            for &idx in &frontier {
                for child in &self.node(idx).children {
                    let Child::Node(i) = child else {
                        unreachable!("entry child in a branch")
                    };
                    if self.node(*i).bbox.intersects(&query) {
                        next.push(*i);
                    }
                }
            }
            if next.is_empty() {
                // Nothing under the frontier meets the query; from here a
                // descendant cannot either, so follow the closest centers.
                let mut cur = self.closest_center_child(&frontier, center);
                while !self.node(cur).leaf {
                    cur = self.closest_center_child(&[cur], center);
                }
                return cur;
            }
            if self.node(next[0]).leaf {
                let mut best = next[0];
                let mut best_overlap = self.node(best).bbox.overlap_area(&query);
                for &i in &next[1..] {
                    let overlap = self.node(i).bbox.overlap_area(&query);
                    if overlap > best_overlap {
                        best = i;
                        best_overlap = overlap;
                    }
                }
                return best;
            }
            frontier = next;
        }
    }

    fn closest_center_child(&self, frontier: &[NodeIdx], center: Point) -> NodeIdx {
        let mut best: Option<(f64, NodeIdx)> = None;
        for &idx in frontier {
            for child in &self.node(idx).children {
                let Child::Node(i) = child else {
                    unreachable!("entry child in a branch")
                };
                let d = self.node(*i).bbox.center().distance_squared(center);
                if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                    best = Some((d, *i));
                }
            }
        }
        best.expect("branch without children").1
    }
}

/// Distance between two rectangles as the nearest search measures it.
///
/// The per-axis separations are positive gaps or negative overlap extents.
/// One-axis separation measures that gap, two-axis separation the diagonal
/// between the facing corners. Overlapping rectangles measure zero, except
/// that with `hollow` set a containing/contained pair measures the smallest
/// distance between corresponding edges.
pub(crate) fn rect_distance(query: &Box2, candidate: &Box2, hollow: bool) -> f64 {
    let (sx, sy) = query.separation(candidate);
    if sx >= 0.0 && sy >= 0.0 {
        (sx * sx + sy * sy).sqrt()
    } else if sx >= 0.0 {
        sx
    } else if sy >= 0.0 {
        sy
    } else {
        let contained = (-sx == query.w && -sy == query.h)
            || (-sx == candidate.w && -sy == candidate.h);
        if hollow && contained {
            let dx = (candidate.max_x() - query.max_x())
                .abs()
                .min((candidate.x - query.x).abs());
            let dy = (candidate.max_y() - query.max_y())
                .abs()
                .min((candidate.y - query.y).abs());
            dx.min(dy)
        } else {
            0.0
        }
    }
}
