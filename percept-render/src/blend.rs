//! Merge operators.

use bytemuck::{cast_slice, cast_slice_mut};
use percept_core::BlendMode;
use tiny_skia::Pixmap;

pub fn skia_blend_mode(mode: BlendMode) -> tiny_skia::BlendMode {
    use tiny_skia::BlendMode as Skia;
    match mode {
        BlendMode::Normal => Skia::SourceOver,
        BlendMode::Lighter => Skia::Plus,
        BlendMode::Multiply => Skia::Multiply,
        BlendMode::Screen => Skia::Screen,
        BlendMode::Overlay => Skia::Overlay,
        BlendMode::Darken => Skia::Darken,
        BlendMode::Lighten => Skia::Lighten,
        BlendMode::ColorDodge => Skia::ColorDodge,
        BlendMode::ColorBurn => Skia::ColorBurn,
        BlendMode::HardLight => Skia::HardLight,
        BlendMode::SoftLight => Skia::SoftLight,
        BlendMode::Difference => Skia::Difference,
        BlendMode::Exclusion => Skia::Exclusion,
    }
}

/// Elementwise max of the existing pixel and the candidate a plain
/// source-over of `layer` at `opacity` would produce. Pixels the layer does
/// not cover are left alone.
pub fn merge_max(dst: &mut Pixmap, layer: &Pixmap, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let src: &[[u8; 4]] = cast_slice(layer.data());
    let dst: &mut [[u8; 4]] = cast_slice_mut(dst.data_mut());

    for (d, s) in dst.iter_mut().zip(src) {
        if s[3] == 0 {
            continue;
        }
        let inv = 1.0 - f32::from(s[3]) / 255.0 * opacity;
        for c in 0..4 {
            let candidate = f32::from(s[c]) * opacity + f32::from(d[c]) * inv;
            let candidate = candidate.round().clamp(0.0, 255.0) as u8;
            d[c] = d[c].max(candidate);
        }
    }
}
