//! Gamma codec and item fill.
//!
//! Linear intensities live in `[0, 1]`. They are encoded exactly once, when an
//! item's level becomes a pixel value: `round(255 · linear^(1/γ))`, rounding
//! half to even.

use serde::{Deserialize, Serialize};

/// Clamps to `[0, 1]`; NaN maps to 0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Linear intensity to an 8-bit display value.
pub fn encode(linear: f64, gamma: f64) -> u8 {
    let v = clamp_unit(linear);
    let v = if gamma == 1.0 || !(gamma > 0.0) {
        v
    } else {
        v.powf(1.0 / gamma)
    };
    (v * 255.0).round_ties_even() as u8
}

/// 8-bit display value back to linear intensity.
pub fn decode(value: u8, gamma: f64) -> f64 {
    let v = f64::from(value) / 255.0;
    if gamma == 1.0 || !(gamma > 0.0) {
        v
    } else {
        v.powf(gamma)
    }
}

/// What an item is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// Linear gray level, gamma-encoded at draw time.
    Gray(f64),
    /// Display-space color, written as given.
    Rgb([u8; 3]),
}

impl Fill {
    pub fn to_rgb(self, gamma: f64) -> [u8; 3] {
        match self {
            Fill::Gray(g) => {
                let v = encode(g, gamma);
                [v, v, v]
            }
            Fill::Rgb(rgb) => rgb,
        }
    }
}
