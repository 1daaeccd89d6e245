//! Grating and noise fields.
//!
//! Both write opaque pixels; alpha is the compositor's business.

use bytemuck::cast_slice_mut;
use percept_core::color::{clamp_unit, encode};
use percept_core::context::fits_surface_budget;
use percept_core::{Pattern, PerceptError, PerceptResult};
use rand::{Rng, RngCore, SeedableRng};
use tiny_skia::Pixmap;

/// Synthesizes a `width × height` tile of `pattern`, gamma-encoded.
pub fn synthesize(width: u32, height: u32, pattern: &Pattern, gamma: f64) -> PerceptResult<Pixmap> {
    if !fits_surface_budget(width, height) {
        return Err(PerceptError::render(format!(
            "a {width}x{height} texture is too large"
        )));
    }
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        PerceptError::render(format!("cannot allocate a {width}x{height} texture"))
    })?;
    let w = width as usize;
    let pixels: &mut [[u8; 4]] = cast_slice_mut(pixmap.data_mut());

    match *pattern {
        Pattern::Grating {
            orientation_deg,
            bar_width,
            duty,
            phase,
            contrast,
            gray,
        } => {
            let field = GratingField::new(orientation_deg, bar_width, duty, phase, contrast, gray);
            let dark = encode(field.dark, gamma);
            let light = encode(field.light, gamma);
            let (hw, hh) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
            for (i, px) in pixels.iter_mut().enumerate() {
                let x = (i % w) as f64 + 0.5 - hw;
                let y = (i / w) as f64 + 0.5 - hh;
                let v = if field.is_dark(x, y) { dark } else { light };
                *px = [v, v, v, 255];
            }
        }
        Pattern::Noise {
            cell,
            seed,
            contrast,
            gray,
        } => {
            let cell = cell.max(1) as usize;
            let cells_x = w.div_ceil(cell);
            let levels = noise_levels(seed, cells_x * (height as usize).div_ceil(cell), contrast, gray);
            for (i, px) in pixels.iter_mut().enumerate() {
                let (x, y) = (i % w, i / w);
                let v = encode(levels[(y / cell) * cells_x + x / cell], gamma);
                *px = [v, v, v, 255];
            }
        }
    }
    Ok(pixmap)
}

/// Square-wave grating evaluated at a point relative to the tile center.
#[derive(Debug, Clone, Copy)]
pub struct GratingField {
    cos: f64,
    sin: f64,
    period: f64,
    duty: f64,
    phase: f64,
    pub dark: f64,
    pub light: f64,
}

impl GratingField {
    pub fn new(
        orientation_deg: f64,
        bar_width: f64,
        duty: f64,
        phase: f64,
        contrast: f64,
        gray: f64,
    ) -> Self {
        let theta = orientation_deg.to_radians();
        let half = contrast / 2.0;
        Self {
            cos: theta.cos(),
            sin: theta.sin(),
            period: (2.0 * bar_width).max(f64::MIN_POSITIVE),
            duty,
            phase,
            dark: clamp_unit(gray - half),
            light: clamp_unit(gray + half),
        }
    }

    pub fn is_dark(&self, x: f64, y: f64) -> bool {
        let d = x * self.cos + y * self.sin;
        let t = (d / self.period + self.phase).rem_euclid(1.0);
        t < self.duty
    }

    /// Linear intensity at `(x, y)`.
    pub fn level(&self, x: f64, y: f64) -> f64 {
        if self.is_dark(x, y) { self.dark } else { self.light }
    }
}

/// One linear level per noise cell, drawn in row-major order.
pub fn noise_levels(seed: u32, count: usize, contrast: f64, gray: f64) -> Vec<f64> {
    let mut rng = Mulberry32::new(seed);
    (0..count)
        .map(|_| clamp_unit(gray + rng.random_range(-0.5..0.5) * contrast))
        .collect()
}

/// Mulberry32: a 32-bit generator whose output depends only on the seed.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
