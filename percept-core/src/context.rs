use serde::{Deserialize, Serialize};

/// How items are merged onto the shared surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Each item's own blend mode and alpha.
    #[default]
    Composite,
    /// Elementwise max of the candidate and the existing value.
    Max,
}

/// Upper bound on any one RGBA8 buffer: canvas, layer or texture tile.
pub const MAX_SURFACE_BYTES: u64 = 1 << 30;

/// Longest texture side normalization will produce; a square of this side
/// exactly fills [`MAX_SURFACE_BYTES`].
pub const MAX_TEXTURE_SIDE: u32 = 16_384;

/// Whether a `width × height` RGBA8 buffer stays within [`MAX_SURFACE_BYTES`].
pub fn fits_surface_budget(width: u32, height: u32) -> bool {
    (u64::from(width) * u64::from(height))
        .checked_mul(4)
        .is_some_and(|bytes| bytes <= MAX_SURFACE_BYTES)
}

/// Read-only state shared by every item of one presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialContext {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background_gray: f64,
    pub pixels_per_degree: Option<f64>,
    pub gamma: f64,
    pub combine: Combine,
    pub antialias: bool,
}

impl TrialContext {
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.canvas_width) / 2.0,
            f64::from(self.canvas_height) / 2.0,
        )
    }
}

impl Default for TrialContext {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            background_gray: 0.5,
            pixels_per_degree: None,
            gamma: 1.0,
            combine: Combine::Composite,
            antialias: true,
        }
    }
}
