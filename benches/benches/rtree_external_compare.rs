// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

//! Comparison against the `rstar` crate on the same workloads.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use copse_benches::gen_grid_rects;
use copse_rstar::{Box2, RStarTree};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

fn to_rstar_rects(v: &[Box2]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|r| Rectangle::from_corners([r.x, r.y], [r.max_x(), r.max_y()]))
        .collect()
}

fn bench_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let window = Box2::new(100.0, 100.0, 400.0, 400.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("copse_build_query_n{n}"), |b| {
            b.iter_batched(
                RStarTree::new,
                |mut tree| {
                    for r in rects.iter().copied() {
                        let _ = tree.insert(r);
                    }
                    let mut out = Vec::new();
                    tree.search(window, &mut out);
                    black_box(out.len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_rects(&rects),
                |rectangles| {
                    let mut tree = RTree::new();
                    for r in rectangles {
                        tree.insert(r);
                    }
                    let aabb = AABB::from_corners(
                        [window.x, window.y],
                        [window.max_x(), window.max_y()],
                    );
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_external_compare);
criterion_main!(benches);
