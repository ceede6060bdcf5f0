//! Per-tick cost benchmarks for linkwatch-core.
//!
//! Measures:
//! - TimeWindow ingest and the O(W) summary scan
//! - HealthPipeline recompute via ingest and note_time
//! - HealthRegistry fan-out over several interfaces
//!
//! Run with: cargo bench --package linkwatch-core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use linkwatch_core::config::{HealthConfig, ScoreStrategy};
use linkwatch_core::pipeline::HealthPipeline;
use linkwatch_core::registry::HealthRegistry;
use linkwatch_core::types::Sample;
use linkwatch_core::window::{TimeWindow, WINDOW_SECS};

fn sample_at(t: i64) -> Sample {
    let w = (t % 10) as f64 * 0.3;
    Sample::new(90.0 + w, 90.0, 1.0, 10.0 + 0.5 * w)
}

fn full_window() -> TimeWindow {
    let mut w = TimeWindow::new();
    for t in 0..WINDOW_SECS as i64 {
        w.ingest(t, sample_at(t));
    }
    w
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window");

    group.bench_function("ingest_in_order", |b| {
        let mut w = full_window();
        let mut t = WINDOW_SECS as i64;
        b.iter(|| {
            black_box(w.ingest(t, sample_at(t)));
            t += 1;
        });
    });

    group.bench_function("ingest_correction", |b| {
        let mut w = full_window();
        b.iter(|| black_box(w.ingest(40, sample_at(3))));
    });

    group.bench_function("summary_full", |b| {
        let w = full_window();
        b.iter(|| black_box(w.summary()));
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for strategy in [ScoreStrategy::Raw, ScoreStrategy::Smoothed] {
        let cfg = HealthConfig {
            score: linkwatch_core::ScoreConfig {
                strategy,
                ..Default::default()
            },
            ..Default::default()
        };
        group.bench_function(format!("tick_and_ingest_{strategy}"), |b| {
            let mut p = HealthPipeline::new("lte0", &cfg);
            let mut t = 0i64;
            b.iter(|| {
                p.note_time(t);
                p.ingest(t, sample_at(t));
                black_box(p.drain_transition());
                t += 1;
            });
        });
    }

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    let ifaces = ["eth0", "lte0", "sat0", "wifi0", "wifi1", "lte1", "eth1", "sat1"];

    group.throughput(Throughput::Elements(ifaces.len() as u64));
    group.bench_function("tick_8_interfaces", |b| {
        let mut reg = HealthRegistry::new(HealthConfig::default());
        for iface in ifaces {
            reg.ensure_interface(iface);
        }
        let mut t = 0i64;
        b.iter(|| {
            reg.note_time(t);
            for iface in ifaces {
                reg.ingest(iface, t, sample_at(t));
            }
            black_box(reg.drain_transitions());
            reg.record_tick();
            t += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_window, bench_pipeline, bench_registry);
criterion_main!(benches);
