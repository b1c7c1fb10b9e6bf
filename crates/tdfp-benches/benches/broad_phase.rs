// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::{hint::black_box, time::Duration};
use tdfp_geom::{Aabb, DynamicTree, Fattening, ProxyId};
use tdfp_math::{Fix, Vec2};

/// Boxes on a jittered grid; the jitter is a fixed LCG so runs compare.
fn layout(n: usize) -> Vec<Aabb> {
    let mut seed = 0x2545_f491_u32;
    let side = (1..).find(|s: &usize| s * s >= n).unwrap_or(1);
    (0..n)
        .map(|i| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let jitter = Fix::from_raw(i32::try_from((seed >> 16) & 0x7fff).unwrap_or(0));
            let x = i32::try_from(i % side).unwrap_or(0) * 3;
            let y = i32::try_from(i / side).unwrap_or(0) * 3;
            let c = Vec2::new(Fix::from_int(x) + jitter, Fix::from_int(y) - jitter);
            Aabb::from_center_half_extents(c, Vec2::new(Fix::ONE, Fix::HALF))
        })
        .collect()
}

fn build(boxes: &[Aabb]) -> (DynamicTree<usize>, Vec<ProxyId>) {
    let fattening = Fattening::default();
    let mut tree = DynamicTree::new(fattening);
    let ids = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| tree.create_proxy(*b, i, fattening.margin))
        .collect();
    (tree, ids)
}

fn configure(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.noise_threshold(0.02);
}

fn bench_tree(c: &mut Criterion) {
    let sizes = [16_usize, 256, 4_096];

    let mut insert = c.benchmark_group("tree_insert");
    configure(&mut insert);
    for &n in &sizes {
        let boxes = layout(n);
        insert.throughput(Throughput::Elements(n as u64));
        insert.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter(|| black_box(build(boxes)));
        });
    }
    insert.finish();

    // Every proxy escapes its fat box, so each move is a remove plus reinsert.
    let mut moves = c.benchmark_group("tree_move");
    configure(&mut moves);
    let step = Vec2::from_ints(2, 1);
    for &n in &sizes {
        let boxes = layout(n);
        moves.throughput(Throughput::Elements(n as u64));
        moves.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter_batched(
                || build(boxes),
                |(mut tree, ids)| {
                    for (id, aabb) in ids.iter().zip(boxes) {
                        tree.move_proxy(*id, aabb.translated(step), step);
                    }
                    black_box(tree.height())
                },
                BatchSize::LargeInput,
            );
        });
    }
    moves.finish();

    let mut query = c.benchmark_group("tree_query");
    configure(&mut query);
    for &n in &sizes {
        let boxes = layout(n);
        let (tree, _) = build(&boxes);
        query.throughput(Throughput::Elements(n as u64));
        query.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter(|| {
                let mut hits = 0_usize;
                for probe in boxes {
                    tree.query(probe, |_| {
                        hits += 1;
                        true
                    });
                }
                black_box(hits)
            });
        });
    }
    query.finish();
}

criterion_group!(benches, bench_tree);
criterion_main!(benches);
