//! Spatial windows.
//!
//! Coverage is evaluated at pixel centers in the item's local frame, the same
//! frame its content was drawn in, then multiplied into the layer.

use std::f64::consts::PI;

use percept_core::color::clamp_unit;
use percept_core::{Mask, PerceptError, PerceptResult};
use tiny_skia::{Mask as CoverageMask, Pixmap};

/// Coverage in `[0, 1]` at local point `(x, y)`.
pub fn coverage(mask: &Mask, x: f64, y: f64) -> f64 {
    let r = x.hypot(y);
    let c = match *mask {
        Mask::None => 1.0,
        Mask::Circular { radius } => {
            if r <= radius {
                1.0
            } else {
                0.0
            }
        }
        Mask::Rectangular {
            half_width,
            half_height,
        } => {
            if x.abs() <= half_width && y.abs() <= half_height {
                1.0
            } else {
                0.0
            }
        }
        Mask::RaisedCosine { radius } => {
            if radius > 0.0 && r < radius {
                0.5 * (1.0 + (PI * r / radius).cos())
            } else {
                0.0
            }
        }
        Mask::Gaussian { sigma } => {
            if sigma > 0.0 {
                (-(r * r) / (2.0 * sigma * sigma)).exp()
            } else if r == 0.0 {
                1.0
            } else {
                0.0
            }
        }
    };
    clamp_unit(c)
}

/// Places a window on a `width × height` layer: local origin at `origin`
/// (canvas pixels), rotated by `rotation_deg`.
#[derive(Debug, Clone, Copy)]
pub struct WindowFrame {
    pub origin: (f64, f64),
    pub rotation_deg: f64,
}

impl WindowFrame {
    /// Canvas pixel center → local coordinates.
    pub fn to_local(&self, px: u32, py: u32) -> (f64, f64) {
        let dx = f64::from(px) + 0.5 - self.origin.0;
        let dy = f64::from(py) + 0.5 - self.origin.1;
        let theta = self.rotation_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        (dx * cos + dy * sin, -dx * sin + dy * cos)
    }
}

/// Rasterizes `mask` into an 8-bit coverage mask sized to the layer.
pub fn build_mask(
    mask: &Mask,
    frame: WindowFrame,
    width: u32,
    height: u32,
) -> PerceptResult<CoverageMask> {
    let mut out = CoverageMask::new(width, height).ok_or_else(|| {
        PerceptError::render(format!("cannot allocate a {width}x{height} mask"))
    })?;
    let w = width as usize;
    for (i, m) in out.data_mut().iter_mut().enumerate() {
        let (x, y) = frame.to_local((i % w) as u32, (i / w) as u32);
        *m = (coverage(mask, x, y) * 255.0).round() as u8;
    }
    Ok(out)
}

/// Keeps the layer only where the window is non-zero, scaling it by coverage.
pub fn apply(layer: &mut Pixmap, mask: &Mask, frame: WindowFrame) -> PerceptResult<()> {
    if matches!(mask, Mask::None) {
        return Ok(());
    }
    let coverage = build_mask(mask, frame, layer.width(), layer.height())?;
    layer.apply_mask(&coverage);
    Ok(())
}
