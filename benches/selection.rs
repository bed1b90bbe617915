//! Selection performance benchmarks
//!
//! Measures registration and the per-call cost of `balance()` as the number
//! of registered entries grows. Each call is a linear scan over all entries.
//!
//! Run with: `cargo bench`

use asymmetric_balancer::{WeightedSelector, WeightedWorkload};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

/// Selector with `count` entries splitting 100% as evenly as possible
fn selector_with(count: usize) -> WeightedSelector<usize> {
    let mut selector = WeightedSelector::new();
    let share = (100 / count) as i32;
    for i in 0..count - 1 {
        selector
            .add(WeightedWorkload::new(share, move || i))
            .expect("share fits");
    }
    selector
        .fill(WeightedWorkload::unweighted(move || count - 1))
        .expect("fill fits");
    selector
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    for count in [1usize, 4, 20, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter(|| selector_with(black_box(n)));
        });
    }

    group.finish();
}

fn bench_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance");

    for count in [1usize, 4, 20, 100] {
        let selector = selector_with(count);
        group.bench_with_input(
            BenchmarkId::new("thread_rng", count),
            &selector,
            |b, selector| {
                b.iter(|| selector.balance().expect("ready"));
            },
        );

        let mut rng = StdRng::seed_from_u64(42);
        group.bench_with_input(BenchmarkId::new("seeded", count), &selector, |b, selector| {
            b.iter(|| selector.balance_with(&mut rng).expect("ready"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_registration, bench_balance);
criterion_main!(benches);
