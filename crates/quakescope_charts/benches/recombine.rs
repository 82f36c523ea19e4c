use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quakescope_charts::prelude::*;
use quakescope_charts::{bin_by_magnitude, daily_counts};
use quakescope_core::{EventRecord, EventStore};

fn synthetic(n: usize) -> EventStore {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let records = (0..n)
        .map(|i| {
            let f = i as f64;
            let t = t0 + Duration::minutes(37 * i as i64);
            EventRecord {
                latitude: (f * 0.618).sin() * 80.0,
                longitude: (f * 0.414).cos() * 179.0,
                magnitude: 3.0 + (f * 0.173) % 7.0,
                depth: (f * 3.7) % 700.0,
                occurred_at_utc: t,
                occurred_at_local: t.naive_utc(),
                local_timezone_label: "UTC".into(),
                place: String::new(),
                duration_proxy: 0.0,
            }
        })
        .collect();
    EventStore::new(records)
}

fn bench_recombine(c: &mut Criterion) {
    let store = synthetic(20_000);

    let mut coordinator = Coordinator::new(store.clone());
    coordinator
        .register(MapViewHandle::new(MapView::new()))
        .unwrap();
    coordinator
        .register(HistogramViewHandle::new(HistogramView::default()))
        .unwrap();
    coordinator
        .register(LineChartViewHandle::new(LineChartView::new(1200.0)))
        .unwrap();
    let pacific = GeoBounds::new(-60.0, 60.0, 100.0, 179.0).unwrap();
    coordinator
        .on_brush_end(ViewKind::Map, Some(Selection::Bounds(pacific)))
        .unwrap();
    let strong = ValueRange::new(5.0, 10.0).unwrap();
    coordinator
        .on_brush_end(ViewKind::Histogram, Some(Selection::Magnitude(strong)))
        .unwrap();

    c.bench_function("recombine_20k_two_predicates", |b| {
        b.iter(|| black_box(coordinator.recombine().len()))
    });

    c.bench_function("compute_visible_20k", |b| {
        b.iter(|| black_box(coordinator.compute_visible().len()))
    });

    c.bench_function("bin_by_magnitude_20k", |b| {
        b.iter(|| black_box(bin_by_magnitude(store.iter())))
    });

    c.bench_function("daily_counts_20k", |b| {
        b.iter(|| black_box(daily_counts(store.iter())))
    });
}

criterion_group!(benches, bench_recombine);
criterion_main!(benches);
