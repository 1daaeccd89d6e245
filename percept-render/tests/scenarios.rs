use percept_core::{BlendMode, Fill, Mask, Pattern, Shape, StimulusItem, TrialContext};
use percept_render::{Compositor, StimulusRenderer, Surface, render_trial};
use percept_timing::ManualTimer;

fn canvas() -> TrialContext {
    TrialContext {
        canvas_width: 800,
        canvas_height: 600,
        background_gray: 0.5,
        pixels_per_degree: None,
        gamma: 1.0,
        ..TrialContext::default()
    }
}

fn item(shape: Shape, gray: f64, z: i32, index: usize) -> StimulusItem {
    StimulusItem {
        shape,
        position: (0.0, 0.0),
        z,
        blend: BlendMode::Normal,
        alpha: 1.0,
        rotation_deg: 0.0,
        fill: Fill::Gray(gray),
        filled: true,
        stroke_width: 2.0,
        mask: Mask::None,
        index,
    }
}

fn dist(x: u32, y: u32, cx: f64, cy: f64) -> f64 {
    (x as f64 + 0.5 - cx).hypot(y as f64 + 0.5 - cy)
}

#[test]
fn disc_on_mid_gray() {
    let disc = item(Shape::Disc { radius: 40.0 }, 0.8, 0, 0);
    let surface = render_trial(&canvas(), &[disc]).unwrap();

    for y in (0..600).step_by(3) {
        for x in (0..800).step_by(3) {
            let r = dist(x, y, 400.0, 300.0);
            let v = surface.gray_at(x, y).unwrap();
            if r < 39.0 {
                assert_eq!(v, 204, "inside at ({x},{y})");
            } else if r > 41.0 {
                assert_eq!(v, 128, "outside at ({x},{y})");
            }
        }
    }
}

#[test]
fn grating_tile_alternates_in_bands_of_ten() {
    let tex = item(
        Shape::Texture {
            width: 100,
            height: 100,
            pattern: Pattern::Grating {
                orientation_deg: 0.0,
                bar_width: 10.0,
                duty: 0.5,
                phase: 0.0,
                contrast: 0.4,
                gray: 0.5,
            },
        },
        0.5,
        0,
        0,
    );
    let surface = render_trial(&canvas(), &[tex]).unwrap();

    let (x0, y0) = (350u32, 250u32);
    let mut prev = None;
    for band in 0..10 {
        let v = surface.gray_at(x0 + band * 10, y0).unwrap();
        assert!(v == 76 || v == 178, "band {band} = {v}");
        for dx in 0..10 {
            for dy in [0, 50, 99] {
                assert_eq!(surface.gray_at(x0 + band * 10 + dx, y0 + dy), Some(v));
            }
        }
        if let Some(p) = prev {
            assert_ne!(p, v);
        }
        prev = Some(v);
    }
    assert_eq!(surface.gray_at(x0 - 1, y0), Some(128));
    assert_eq!(surface.gray_at(x0 + 100, y0 + 99), Some(128));
}

#[test]
fn higher_z_wins_and_swapping_swaps() {
    let rect = |gray, z, index| {
        item(
            Shape::Rect {
                width: 100.0,
                height: 100.0,
                corner_radius: 0.0,
            },
            gray,
            z,
            index,
        )
    };

    let a = render_trial(&canvas(), &[rect(0.2, 0, 0), rect(0.9, 1, 1)]).unwrap();
    assert_eq!(a.gray_at(400, 300), Some(230));

    let b = render_trial(&canvas(), &[rect(0.2, 1, 0), rect(0.9, 0, 1)]).unwrap();
    assert_eq!(b.gray_at(400, 300), Some(51));
}

#[test]
fn lighter_saturates() {
    let mut first = item(Shape::Disc { radius: 30.0 }, 0.6, 0, 0);
    first.blend = BlendMode::Lighter;
    let mut second = first.clone();
    second.index = 1;

    let one = render_trial(&canvas(), &[first.clone()]).unwrap();
    assert_eq!(one.gray_at(400, 300), Some(255));

    let two = render_trial(&canvas(), &[first, second]).unwrap();
    assert_eq!(two.gray_at(400, 300), Some(255));
    assert_eq!(two.gray_at(10, 10), Some(128));
}

#[test]
fn lighter_on_black_adds() {
    let ctx = TrialContext {
        background_gray: 0.0,
        ..canvas()
    };
    let mut a = item(Shape::Disc { radius: 30.0 }, 0.2, 0, 0);
    a.blend = BlendMode::Lighter;
    let mut b = a.clone();
    b.index = 1;
    let surface = render_trial(&ctx, &[a, b]).unwrap();
    // 51 + 51
    assert_eq!(surface.gray_at(400, 300), Some(102));
}

#[test]
fn multiply_darkens() {
    let mut m = item(Shape::Disc { radius: 30.0 }, 0.5, 0, 0);
    m.blend = BlendMode::Multiply;
    let surface = render_trial(&canvas(), &[m]).unwrap();
    let v = surface.gray_at(400, 300).unwrap();
    assert!((63..=65).contains(&v), "got {v}");
}

#[test]
fn masked_noise_patch_is_reproducible() {
    let noise = |seed| {
        let mut it = item(
            Shape::Texture {
                width: 64,
                height: 64,
                pattern: Pattern::Noise {
                    cell: 2,
                    seed,
                    contrast: 0.8,
                    gray: 0.5,
                },
            },
            0.5,
            0,
            0,
        );
        it.mask = Mask::Gaussian { sigma: 10.0 };
        it
    };
    let a = render_trial(&canvas(), &[noise(42)]).unwrap();
    let b = render_trial(&canvas(), &[noise(42)]).unwrap();
    let c = render_trial(&canvas(), &[noise(43)]).unwrap();
    assert_eq!(a.to_rgba8(), b.to_rgba8());
    assert_ne!(a.to_rgba8(), c.to_rgba8());
}

#[test]
fn compositor_reuses_caller_surface() {
    let mut compositor = Compositor::new(canvas(), ManualTimer::new());
    let mut surface = Surface::filled(800, 600, 0).unwrap();
    let stats = compositor
        .render(&[item(Shape::Disc { radius: 10.0 }, 1.0, 0, 0)], &mut surface)
        .unwrap();
    assert_eq!(stats.items, 1);
    assert_eq!(stats.offscreen, 0);
    assert_eq!(surface.gray_at(400, 300), Some(255));
    assert_eq!(surface.gray_at(0, 0), Some(0));
}
