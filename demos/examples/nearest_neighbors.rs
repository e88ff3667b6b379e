// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-neighbor queries.
//!
//! Build a scattered scene and ask for nearest entries by handle and by
//! arbitrary rectangle, including the hollow containment mode.
//!
//! Run:
//! - `cargo run -p copse_demos --example nearest_neighbors`

use copse_rstar::{Box2, RStarTree};

fn main() {
    let mut tree = RStarTree::new();

    let ids: Vec<u64> = (0..8)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::FRAC_PI_4;
            let (s, c) = angle.sin_cos();
            tree.insert(Box2::new(100.0 + 60.0 * c, 100.0 + 60.0 * s, 8.0, 8.0))
        })
        .collect();
    let arena = tree.insert(Box2::new(0.0, 0.0, 220.0, 220.0));

    // Nearest to a stored entry, by handle.
    let hit = tree.nearest_to_entry(ids[0], false).expect("two entries live");
    println!("nearest to {}: {} at {:?}", ids[0], hit.id, hit.bbox);

    // Nearest to a probe rectangle dropped between the ring points.
    let probe = Box2::new(96.0, 96.0, 8.0, 8.0);
    let hit = tree.nearest_to_rect(probe, false).expect("two entries live");
    println!("nearest to {probe:?}: {} at {:?}", hit.id, hit.bbox);

    // The probe sits inside the arena box; with the hollow flag set, the
    // arena measures its edge distance instead of zero.
    let hit = tree.nearest_to_rect(probe, true).expect("two entries live");
    println!("hollow nearest to {probe:?}: {} at {:?}", hit.id, hit.bbox);
    let _ = arena;
}
