use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pprof::criterion::{Output, PProfProfiler};
use std::time::Duration;

use percept_core::{Mask, Pattern};
use percept_render::mask::{build_mask, WindowFrame};
use percept_render::texture::synthesize;

fn grating() -> Pattern {
    Pattern::Grating {
        orientation_deg: 45.0,
        bar_width: 8.0,
        duty: 0.5,
        phase: 0.0,
        contrast: 0.8,
        gray: 0.5,
    }
}

fn noise() -> Pattern {
    Pattern::Noise {
        cell: 1,
        seed: 1234,
        contrast: 0.8,
        gray: 0.5,
    }
}

/// Tile synthesis across sizes, gamma-encoded as in a real trial.
pub fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");

    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2));

    for side in [64u32, 256, 512] {
        group.bench_with_input(BenchmarkId::new("grating", side), &side, |b, &side| {
            let pattern = grating();
            b.iter(|| black_box(synthesize(side, side, &pattern, 2.2)));
        });
        group.bench_with_input(BenchmarkId::new("noise", side), &side, |b, &side| {
            let pattern = noise();
            b.iter(|| black_box(synthesize(side, side, &pattern, 2.2)));
        });
    }

    group.finish();
}

/// Full-surface coverage masks, the per-item cost of a windowed layer.
pub fn bench_masks(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask");
    let frame = WindowFrame {
        origin: (640.0, 360.0),
        rotation_deg: 30.0,
    };
    let masks = [
        ("circular", Mask::Circular { radius: 150.0 }),
        ("raised_cosine", Mask::RaisedCosine { radius: 150.0 }),
        ("gaussian", Mask::Gaussian { sigma: 50.0 }),
    ];
    for (name, mask) in masks {
        group.bench_function(name, |b| {
            b.iter(|| black_box(build_mask(&mask, frame, 1280, 720)));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
        .confidence_level(0.95)
        .noise_threshold(0.02)
        .significance_level(0.05);
    targets = bench_synthesize, bench_masks
}

criterion_main!(benches);
