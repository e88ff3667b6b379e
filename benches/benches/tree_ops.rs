// Copyright 2026 the Copse Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build, query, and churn benchmarks for the copse R*-tree.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use copse_benches::gen_grid_rects;
use copse_rstar::{Box2, RStarTree};

fn bench_build_and_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_build_query");
    for &n in &[32usize, 64] {
        let rects = gen_grid_rects(n, 10.0);
        let window = Box2::new(100.0, 100.0, 200.0, 200.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("build_n{n}"), |b| {
            b.iter_batched(
                RStarTree::new,
                |mut tree| {
                    for r in rects.iter().copied() {
                        let _ = tree.insert(r);
                    }
                    black_box(tree.height());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("window_n{n}"), |b| {
            let mut tree = RStarTree::new();
            for r in rects.iter().copied() {
                let _ = tree.insert(r);
            }
            b.iter(|| {
                let mut out = Vec::new();
                tree.search(window, &mut out);
                black_box(out.len());
            })
        });

        group.bench_function(format!("nearest_n{n}"), |b| {
            let mut tree = RStarTree::new();
            for r in rects.iter().copied() {
                let _ = tree.insert(r);
            }
            let query = Box2::new(-40.0, -40.0, 5.0, 5.0);
            b.iter(|| {
                black_box(tree.nearest_to_rect(query, false));
            })
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_churn");
    let rects = gen_grid_rects(48, 10.0);
    group.throughput(Throughput::Elements(rects.len() as u64));

    group.bench_function("insert_remove_all", |b| {
        let mut rng = StdRng::seed_from_u64(9);
        b.iter_batched(
            RStarTree::new,
            |mut tree| {
                let mut ids: Vec<u64> = rects.iter().copied().map(|r| tree.insert(r)).collect();
                ids.shuffle(&mut rng);
                for id in ids {
                    let _ = tree.remove(id);
                }
                black_box(tree.is_empty());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_build_and_query, bench_churn);
criterion_main!(benches);
