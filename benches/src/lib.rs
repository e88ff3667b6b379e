// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the copse benchmarks.

use copse_aabb::Box2;

/// A regular `n × n` grid of `cell`-sized boxes starting at the origin.
pub fn gen_grid_rects(n: usize, cell: f64) -> Vec<Box2> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Box2::new(x as f64 * cell, y as f64 * cell, cell, cell));
        }
    }
    out
}
