// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree basics.
//!
//! Insert a handful of rectangles, run the three query shapes, and remove an
//! entry.
//!
//! Run:
//! - `cargo run -p copse_demos --example tree_basics`

use copse_rstar::{Box2, RStarTree};
use kurbo::{Circle, Point};

fn main() {
    let mut tree = RStarTree::new();

    let desk = tree.insert(Box2::new(0.0, 0.0, 120.0, 60.0));
    let lamp = tree.insert(Box2::new(10.0, 10.0, 15.0, 15.0));
    let rug = tree.insert(Box2::new(200.0, 0.0, 80.0, 80.0));
    println!("inserted handles: {desk}, {lamp}, {rug}");
    println!("tree: {tree:?}");

    // Everything touching the left half of the scene.
    let mut hits = Vec::new();
    tree.search(Box2::new(0.0, 0.0, 150.0, 100.0), &mut hits);
    println!("window hits: {:?}", hits.iter().map(|e| e.id).collect::<Vec<_>>());

    // What lies under the cursor?
    let mut under = Vec::new();
    tree.select(Point::new(12.0, 12.0), &mut under);
    println!("under (12, 12): {:?}", under.iter().map(|e| e.id).collect::<Vec<_>>());

    // Everything within 50 units of a probe point.
    let mut near = Vec::new();
    tree.range(Circle::new(Point::new(150.0, 40.0), 50.0), &mut near);
    println!("in range: {:?}", near.iter().map(|e| e.id).collect::<Vec<_>>());

    let removed = tree.remove(lamp).expect("lamp was live");
    println!("removed {removed:?}; {} entries left", tree.len());
}
