//! Criterion benchmarks for the hot paths of a trajectory run
//!
//! Covers: rolling median and Savitzky-Golay filtering, convex hulls,
//! transition model scoring, and the full single-trajectory pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_events::analysis::geometry::{graham_scan, Point2};
use gaze_events::aoi::TransitionModel;
use gaze_events::app::config::Config;
use gaze_events::signal::{rolling, RollingStat, SavitzkyGolay};
use gaze_events::workflow::Trajectory;
use gaze_events::Sample;

/// Noisy fixations on a ring of screen positions, normalized coordinates
fn generate_scanpath(n: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let fixation = (i / 60) as f64;
            let jitter = ((i * 7919) % 13) as f64 * 1e-4;
            let x = 0.5 + 0.3 * (fixation * 1.3).cos() + jitter;
            let y = 0.5 + 0.3 * (fixation * 1.3).sin() - jitter;
            Sample::new(i as f64 * 0.004, x, y)
        })
        .collect()
}

fn generate_signal(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.05).sin() * 100.0 + (i % 7) as f64).collect()
}

// ---------------------------------------------------------------------------
// Filter benchmarks
// ---------------------------------------------------------------------------

fn bench_rolling_median(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_median");

    for count in [1_000, 10_000] {
        let signal = generate_signal(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &signal, |b, values| {
            b.iter(|| {
                let result = rolling(black_box(values), 33, true, RollingStat::Median);
                black_box(result);
            });
        });
    }

    group.finish();
}

fn bench_savgol_derivative(c: &mut Criterion) {
    let filter = match SavitzkyGolay::new(13, 2) {
        Ok(filter) => filter.derivative(1),
        Err(e) => panic!("invalid filter: {}", e),
    };

    let mut group = c.benchmark_group("savgol_derivative");

    for count in [1_000, 10_000] {
        let signal = generate_signal(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &signal, |b, values| {
            b.iter(|| {
                let result = filter.apply(black_box(values));
                black_box(result);
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Geometry benchmarks
// ---------------------------------------------------------------------------

fn bench_graham_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("graham_scan");

    for count in [50, 500, 5000] {
        let cloud: Vec<Point2> = (0..count)
            .map(|i| {
                let r = ((i * 31) % 97) as f64;
                let a = i as f64 * 0.61;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &cloud, |b, points| {
            b.iter(|| {
                let hull = graham_scan(black_box(points));
                black_box(hull);
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Transition model benchmarks
// ---------------------------------------------------------------------------

fn bench_transition_model(c: &mut Criterion) {
    // 10x10 grid plus the catch-all cell
    let size = 101;
    let ids: Vec<u32> = (0..20_000u32).map(|i| (i / 40 * 17) % 101 + 1).collect();
    let other: Vec<u32> = (0..20_000u32).map(|i| (i / 25 * 29) % 101 + 1).collect();

    c.bench_function("transition_from_sequence_20000", |b| {
        b.iter(|| {
            let model = TransitionModel::from_sequence(black_box(&ids), size);
            black_box(model.map(|m| m.entropy()).ok());
        });
    });

    let (evaluated, model) = match (
        TransitionModel::from_sequence(&ids, size),
        TransitionModel::from_sequence(&other, size),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        _ => panic!("sequence ids out of range"),
    };
    c.bench_function("transition_log_likelihood_101", |b| {
        b.iter(|| {
            let score = black_box(&evaluated).log_likelihood(black_box(&model));
            black_box(score.ok());
        });
    });
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

fn bench_trajectory_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("trajectory_analyze");
    group.sample_size(20);

    for count in [1_000, 10_000] {
        let samples = generate_scanpath(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| {
                let report = Trajectory::new("bench", samples.clone(), Config::default())
                    .and_then(|mut t| t.analyze());
                black_box(report.ok());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rolling_median,
    bench_savgol_derivative,
    bench_graham_scan,
    bench_transition_model,
    bench_trajectory_analyze,
);
criterion_main!(benches);
