use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use station_aggregator::models::StationValues;
use station_aggregator::processors::{parse_batch, StationMerger, StatisticsReducer};
use std::collections::HashMap;

// Create test data for benchmarking
fn create_measurements(station_count: usize, rows: usize) -> Vec<u8> {
    let mut data = String::with_capacity(rows * 16);

    for row in 0..rows {
        let station = row % station_count;
        let value = ((row * 37) % 999) as f32 / 10.0 - 50.0;
        data.push_str(&format!("Station {};{:.1}\n", station, value));
    }

    data.into_bytes()
}

fn benchmark_parse_batch(c: &mut Criterion) {
    let data = create_measurements(400, 100_000);

    c.bench_function("parse_batch_100k", |b| {
        b.iter(|| {
            let mut local = StationValues::new();
            let stats = parse_batch(black_box(&data), &mut local);
            black_box(stats.records)
        })
    });
}

fn benchmark_merger(c: &mut Criterion) {
    // Eight workers' worth of local maps over the same station set
    let locals: Vec<StationValues> = (0..8)
        .map(|_| {
            let data = create_measurements(400, 50_000);
            let mut local = StationValues::new();
            parse_batch(&data, &mut local);
            local
        })
        .collect();

    c.bench_function("merger_8_locals", |b| {
        b.iter(|| {
            let merger = StationMerger::new();
            for local in locals.clone() {
                merger.merge(local).unwrap();
            }
            black_box(merger.station_count().unwrap())
        })
    });
}

fn benchmark_reducer_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("reducer_by_values_per_station");

    for &size in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("values", size), &size, |b, &size| {
            let stations: HashMap<String, Vec<f32>> = (0..400)
                .map(|s| {
                    let values = (0..size).map(|v| ((v * s) % 700) as f32 / 10.0).collect();
                    (format!("Station {}", s), values)
                })
                .collect();
            let reducer = StatisticsReducer::default();

            b.iter(|| {
                let outcomes = reducer
                    .reduce(StationValues::from(stations.clone()))
                    .unwrap();
                black_box(outcomes.len())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_batch,
    benchmark_merger,
    benchmark_reducer_by_size
);
criterion_main!(benches);
