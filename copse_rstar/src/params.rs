// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree shape and heuristic parameters.

/// Reference point used to order a node's children during forced reinsertion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReinsertBasis {
    /// Center of the node's bounding rectangle.
    #[default]
    NodeCenter,
    /// Arithmetic mean of the children's centers.
    MassCenter,
}

/// Parameters fixed at construction time.
///
/// Out-of-range values are clamped when the tree is built, so any `Params`
/// value produces a working tree. See [`RStarTree::with_params`].
///
/// [`RStarTree::with_params`]: crate::RStarTree::with_params
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Params {
    /// Maximum children per node. Clamped to at least 4.
    pub max_children: usize,
    /// Minimum children per non-root node. Clamped to `[2, max_children / 2]`.
    pub min_children: usize,
    /// How many children are pulled out and reinserted the first time a level
    /// overflows within one insertion. Clamped to `[1, max_children - 1]`.
    pub reinsert_count: usize,
    /// Reference point for the reinsertion distance ordering.
    pub reinsert_basis: ReinsertBasis,
    /// How many least-enlargement candidates are re-ranked by overlap cost
    /// when choosing a leaf for an entry. Clamped to `[1, max_children]`; the
    /// default probes every child.
    pub overlap_candidates: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_children: 20,
            min_children: 8,
            reinsert_count: 6,
            reinsert_basis: ReinsertBasis::default(),
            overlap_candidates: usize::MAX,
        }
    }
}

impl Params {
    /// Clamp every field into its legal range.
    pub(crate) fn clamped(self) -> Self {
        let max_children = self.max_children.max(4);
        Self {
            max_children,
            min_children: self.min_children.clamp(2, max_children / 2),
            reinsert_count: self.reinsert_count.clamp(1, max_children - 1),
            reinsert_basis: self.reinsert_basis,
            overlap_candidates: self.overlap_candidates.clamp(1, max_children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_clamp_to_themselves() {
        let p = Params::default().clamped();
        assert_eq!(p.max_children, 20);
        assert_eq!(p.min_children, 8);
        assert_eq!(p.reinsert_count, 6);
        assert_eq!(p.overlap_candidates, 20);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let p = Params {
            max_children: 0,
            min_children: 100,
            reinsert_count: 0,
            reinsert_basis: ReinsertBasis::MassCenter,
            overlap_candidates: 0,
        }
        .clamped();
        assert_eq!(p.max_children, 4);
        assert_eq!(p.min_children, 2);
        assert_eq!(p.reinsert_count, 1);
        assert_eq!(p.overlap_candidates, 1);
        assert_eq!(p.reinsert_basis, ReinsertBasis::MassCenter);

        let p = Params {
            min_children: 1,
            reinsert_count: 50,
            ..Params::default()
        }
        .clamped();
        assert_eq!(p.min_children, 2);
        assert_eq!(p.reinsert_count, 19);
    }
}
