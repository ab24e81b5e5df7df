use std::time::Instant;

use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use fastrand::Rng;
use stratum::{Point2, Rect2, Tree};

fn unit() -> Rect2 {
    Rect2::new([0.0, 0.0], [1.0, 1.0])
}

fn filled(rng: &mut Rng, capacity: usize, count: u64) -> Tree<Point2, Rect2> {
    let mut tree = Tree::new(unit(), capacity).unwrap();
    for id in 0..count {
        tree.insert(Point2::new(id, [rng.f64(), rng.f64()]));
    }
    tree
}

/* -------------------------------------------- Insert ------------------------------------------- */

fn insert<const CAPACITY: usize>(c: &mut Bencher) {
    c.iter_custom(|iters| {
        let mut rng = Rng::with_seed(0);
        let mut tree = Tree::<Point2, Rect2>::new(unit(), CAPACITY).unwrap();
        let points: Vec<_> = (0..iters)
            .map(|id| Point2::new(id, [rng.f64(), rng.f64()]))
            .collect();

        let now = Instant::now();

        for p in points {
            tree.insert(p);
        }

        now.elapsed()
    });
}

fn bench_insert(c: &mut Criterion) {
    let mut c = c.benchmark_group("insertion");
    c.bench_function("cap4", insert::<4>);
    c.bench_function("cap8", insert::<8>);
    c.bench_function("cap16", insert::<16>);
    c.bench_function("cap32", insert::<32>);
    c.bench_function("cap64", insert::<64>);
    c.finish();
}

/* -------------------------------------------- Query -------------------------------------------- */

fn query<const CAPACITY: usize>(c: &mut Bencher) {
    let mut rng = Rng::with_seed(0);
    let tree = filled(&mut rng, CAPACITY, 100_000);
    let mut result = Vec::new();

    c.iter(|| {
        let (x, y) = (rng.f64(), rng.f64());
        result.clear();
        tree.query_into(&Rect2::new([x, y], [x + 0.05, y + 0.05]), &mut result);
        result.len()
    });
}

fn bench_query(c: &mut Criterion) {
    let mut c = c.benchmark_group("query");
    c.bench_function("cap4", query::<4>);
    c.bench_function("cap16", query::<16>);
    c.bench_function("cap64", query::<64>);
    c.finish();
}

/* -------------------------------------------- Churn -------------------------------------------- */

fn churn<const CAPACITY: usize>(c: &mut Bencher) {
    c.iter_custom(|iters| {
        let mut rng = Rng::with_seed(0);
        let mut tree = filled(&mut rng, CAPACITY, 10_000);
        let points: Vec<_> = (0..iters)
            .map(|it| Point2::new(10_000 + it, [rng.f64(), rng.f64()]))
            .collect();

        let now = Instant::now();

        for p in &points {
            tree.insert(*p);
        }

        for p in &points {
            tree.remove(p);
        }

        now.elapsed()
    });
}

fn bench_churn(c: &mut Criterion) {
    let mut c = c.benchmark_group("insert-remove");
    c.bench_function("cap4", churn::<4>);
    c.bench_function("cap16", churn::<16>);
    c.bench_function("cap64", churn::<64>);
    c.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_churn);
criterion_main!(benches);
