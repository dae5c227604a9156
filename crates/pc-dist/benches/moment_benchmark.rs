use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use pc_dist::{add, DistRef, Distribution, Joint, Normal, Uniform};

fn bench_moment_grid(c: &mut Criterion) {
    let shifted = add(Arc::new(Normal::new(0.0, 1.0).unwrap()), 10.0).unwrap();
    c.bench_function("normal_shift_mom_order_12", |b| {
        b.iter(|| black_box(shifted.get_mom(&[12]).unwrap()))
    });

    let sum = add(
        Arc::new(Uniform::new(0.0, 1.0).unwrap()),
        Arc::new(Uniform::new(2.0, 3.0).unwrap()),
    )
    .unwrap();
    c.bench_function("uniform_sum_mom_order_12", |b| {
        b.iter(|| black_box(sum.get_mom(&[12]).unwrap()))
    });

    // Three axes: the dense grid has (6+1)^3 = 343 sub-indices.
    let parts: Vec<DistRef> = (0..3)
        .map(|i| -> DistRef { Arc::new(Uniform::new(i as f64, i as f64 + 1.0).unwrap()) })
        .collect();
    let joint = Arc::new(Joint::new(parts).unwrap());
    let shifted = add(joint, vec![1.0, 2.0, 3.0]).unwrap();
    c.bench_function("joint3_shift_mom_order_666", |b| {
        b.iter(|| black_box(shifted.get_mom(&[6, 6, 6]).unwrap()))
    });
}

criterion_group!(benches, bench_moment_grid);
criterion_main!(benches);
