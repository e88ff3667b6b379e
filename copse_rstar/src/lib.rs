// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Copse R\*-tree: a dynamic in-memory spatial index for 2D axis-aligned
//! rectangles.
//!
//! - Insert rectangles one at a time; each returns a stable `u64` handle.
//! - Remove by handle; the tree condenses and stays balanced.
//! - Query by window rectangle, point, or circle, or ask for the nearest
//!   entry to a handle or an arbitrary rectangle.
//!
//! Insertion uses the R\* heuristics: subtree choice by overlap cost near the
//! leaves and least enlargement above, forced reinsertion on the first
//! overflow per level, and margin-driven splits. Deletion reinserts the
//! contents of underfull nodes at their original level, so all leaves stay at
//! the same depth.
//!
//! Geometry comes from [`copse_aabb`]: rectangles are origin-plus-extent
//! [`Box2`] values, and point/circle queries use [`kurbo`] types.
//!
//! The tree is single-threaded; wrap it in your own lock to share it.
//! Float coordinates are assumed finite (no NaNs). Debug builds may assert.
//!
//! # Example
//!
//! ```
//! use copse_rstar::{Box2, RStarTree};
//! use kurbo::Point;
//!
//! let mut tree = RStarTree::new();
//! let a = tree.insert(Box2::new(0.0, 0.0, 10.0, 10.0));
//! let b = tree.insert(Box2::new(20.0, 0.0, 5.0, 5.0));
//!
//! // Window query: everything touching the left half.
//! let mut hits = Vec::new();
//! tree.search(Box2::new(0.0, 0.0, 12.0, 12.0), &mut hits);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id, a);
//!
//! // Point stabbing is half-open: the right edge is outside.
//! let mut hits = Vec::new();
//! tree.select(Point::new(10.0, 5.0), &mut hits);
//! assert!(hits.is_empty());
//!
//! // Nearest neighbor of `a` is `b`, ten units away.
//! let hit = tree.nearest_to_entry(a, false).unwrap();
//! assert_eq!(hit.id, b);
//!
//! // Removal hands the rectangle back.
//! assert_eq!(tree.remove(a), Some(Box2::new(0.0, 0.0, 10.0, 10.0)));
//! assert_eq!(tree.remove(a), None);
//! ```
//!
//! # Choosing parameters
//!
//! [`Params`] controls the fanout bounds and the two R\* knobs: how many
//! children a first overflow reinserts and how many candidates the leaf-level
//! overlap probe ranks. The defaults (fanout 8..20, reinsert 6) are good
//! general-purpose values; smaller fanouts trade query speed for cheaper
//! updates.

mod insert;
mod node;
mod params;
mod query;
mod split;
mod tree;

pub use copse_aabb::Box2;
pub use node::Entry;
pub use params::{Params, ReinsertBasis};
pub use tree::RStarTree;

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Circle, Point};

    #[test]
    fn the_crate_example_workflow_holds_together() {
        let mut tree = RStarTree::with_params(Params {
            max_children: 4,
            min_children: 2,
            reinsert_count: 2,
            ..Params::default()
        });
        let ids: Vec<u64> = (0..20)
            .map(|i| tree.insert(Box2::new((i % 5) as f64 * 10.0, (i / 5) as f64 * 10.0, 6.0, 6.0)))
            .collect();
        tree.assert_invariants();

        let mut hits = Vec::new();
        tree.range(Circle::new(Point::new(0.0, 0.0), 5.0), &mut hits);
        assert!(hits.iter().any(|e| e.id == ids[0]));

        for id in ids {
            tree.remove(id).unwrap();
        }
        assert!(tree.is_empty());
        tree.assert_invariants();
    }
}
