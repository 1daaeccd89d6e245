use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use percept_core::{BlendMode, Fill, Mask, Pattern, Shape, StimulusItem, TrialContext};
use percept_render::{Compositor, StimulusRenderer as _};
use percept_timing::HighPrecisionTimer;

fn gabor_array() -> Vec<StimulusItem> {
    (0..8)
        .map(|i| {
            let angle = (i as f64) * std::f64::consts::TAU / 8.0;
            StimulusItem {
                shape: Shape::Texture {
                    width: 136,
                    height: 136,
                    pattern: Pattern::Grating {
                        orientation_deg: 22.5 * i as f64,
                        bar_width: 6.0,
                        duty: 0.5,
                        phase: 0.0,
                        contrast: 0.9,
                        gray: 0.5,
                    },
                },
                position: (220.0 * angle.cos(), 220.0 * angle.sin()),
                z: i,
                blend: BlendMode::Normal,
                alpha: 1.0,
                rotation_deg: 0.0,
                fill: Fill::Gray(0.5),
                filled: true,
                stroke_width: 2.0,
                mask: Mask::Gaussian { sigma: 16.0 },
                index: i as usize,
            }
        })
        .collect()
}

pub fn bench_gabor_array(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_trial");
    g.sample_size(40);

    let items = gabor_array();
    g.bench_function("eight_gabors", |b| {
        b.iter_batched(
            || {
                let ctx = TrialContext {
                    canvas_width: 1280,
                    canvas_height: 720,
                    gamma: 2.2,
                    ..TrialContext::default()
                };
                let compositor = Compositor::new(ctx, HighPrecisionTimer::new());
                let surface = compositor.new_surface().expect("surface");
                (compositor, surface)
            },
            |(mut c, mut s)| {
                let stats = c.render(black_box(&items), &mut s);
                black_box(stats)
            },
            BatchSize::SmallInput,
        )
    });

    g.finish();
}

criterion_group!(benches, bench_gabor_array);
criterion_main!(benches);
