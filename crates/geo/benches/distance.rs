//! Benchmarks for distance, radius filtering and viewport planning.

use bandit_geo::proximity::{nearest, within_radius_sorted};
use bandit_geo::{distance_km, filter_within_radius, Coordinate, GeoPoint, ViewportPlanner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn create_test_points(count: usize) -> Vec<GeoPoint> {
    (0..count)
        .map(|i| {
            // Grid around central Athens
            let lat = 37.90 + (i as f64 * 0.001) % 0.2;
            let lng = 23.65 + (i as f64 * 0.0007) % 0.2;
            GeoPoint::new(format!("event-{i}"), lat, lng)
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let athens = Coordinate::new(37.9838, 23.7275);
    let thessaloniki = Coordinate::new(40.6401, 22.9444);

    c.bench_function("haversine_single", |b| {
        b.iter(|| distance_km(black_box(&athens), black_box(&thessaloniki)))
    });
}

fn bench_radius_filter(c: &mut Criterion) {
    let center = Coordinate::new(37.9838, 23.7275);
    let mut group = c.benchmark_group("radius_filter");

    for size in [10, 100, 1000, 10000].iter() {
        let points = create_test_points(*size);

        group.bench_with_input(BenchmarkId::new("filter", size), size, |b, _| {
            b.iter(|| filter_within_radius(black_box(&points), black_box(&center), 5.0))
        });
        group.bench_with_input(BenchmarkId::new("sorted", size), size, |b, _| {
            b.iter(|| within_radius_sorted(black_box(&center), black_box(&points), 5.0))
        });
        group.bench_with_input(BenchmarkId::new("nearest_10", size), size, |b, _| {
            b.iter(|| nearest(black_box(&center), black_box(&points), Some(10)))
        });
    }

    group.finish();
}

fn bench_viewport_plan(c: &mut Criterion) {
    let planner = ViewportPlanner::default();
    let mut group = c.benchmark_group("viewport_plan");

    for size in [1, 100, 10000].iter() {
        let points = create_test_points(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| planner.plan(black_box(&points)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_distance,
    bench_radius_filter,
    bench_viewport_plan
);
criterion_main!(benches);
