//! Trial parameters as the host supplies them.
//!
//! Everything is optional and loosely named; [`crate::normalize`] turns it
//! into canonical items. Field names are accepted in camelCase or snake_case.

use std::path::Path;

use percept_core::color::clamp_unit;
use percept_core::{Combine, PerceptError, PerceptResult, TrialContext};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrialParams {
    #[serde(alias = "trial_id")]
    pub trial_id: Option<usize>,
    #[serde(alias = "canvas_width")]
    pub canvas_width: Option<u32>,
    #[serde(alias = "canvas_height")]
    pub canvas_height: Option<u32>,
    #[serde(alias = "background_gray", alias = "background")]
    pub background_gray: Option<f64>,
    #[serde(alias = "pixels_per_degree", alias = "ppd")]
    pub pixels_per_degree: Option<f64>,
    pub gamma: Option<f64>,
    /// `"max"` selects elementwise max; anything else per-item compositing.
    pub combine: Option<String>,
    pub antialias: Option<bool>,
    pub items: Option<OneOrMany<RawItem>>,

    /// Single-shape fields from older trial configurations.
    #[serde(flatten)]
    pub legacy: LegacyFields,

    /// Accepted response keys; `None` accepts any key.
    pub choices: Option<Vec<String>>,
    #[serde(alias = "trial_duration")]
    pub trial_duration: Option<u64>,
    #[serde(alias = "stimulus_duration")]
    pub stimulus_duration: Option<u64>,
    #[serde(alias = "response_ends_trial")]
    pub response_ends_trial: Option<bool>,
}

impl TrialParams {
    pub fn from_json(json: &str) -> PerceptResult<Self> {
        serde_json::from_str(json).map_err(|e| PerceptError::params(e.to_string()))
    }

    pub fn from_path(path: &Path) -> PerceptResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PerceptError::params(format!("read '{}': {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Trial-wide settings with defaults filled in and fractions clamped.
    pub fn context(&self) -> TrialContext {
        let defaults = TrialContext::default();
        TrialContext {
            canvas_width: self.canvas_width.unwrap_or(defaults.canvas_width),
            canvas_height: self.canvas_height.unwrap_or(defaults.canvas_height),
            background_gray: self
                .background_gray
                .filter(|g| g.is_finite())
                .map(clamp_unit)
                .unwrap_or(defaults.background_gray),
            pixels_per_degree: self
                .pixels_per_degree
                .filter(|p| p.is_finite() && *p > 0.0),
            gamma: self
                .gamma
                .filter(|g| g.is_finite() && *g > 0.0)
                .unwrap_or(defaults.gamma),
            combine: match self.combine.as_deref().map(str::trim) {
                Some(c) if c.eq_ignore_ascii_case("max") => Combine::Max,
                _ => Combine::Composite,
            },
            antialias: self.antialias.unwrap_or(defaults.antialias),
        }
    }

    /// The raw item list, empty when the trial uses legacy fields.
    pub fn raw_items(&self) -> Vec<RawItem> {
        match &self.items {
            Some(OneOrMany::One(item)) => vec![(**item).clone()],
            Some(OneOrMany::Many(items)) => items.clone(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    // Tried first: a derived struct would also accept a sequence.
    Many(Vec<T>),
    One(Box<T>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyFields {
    #[serde(alias = "shape")]
    pub kind: Option<String>,
    /// Overall size in pixels: diameter for round shapes, side otherwise.
    #[serde(alias = "size_px", alias = "sizePx")]
    pub size: Option<f64>,
    #[serde(alias = "size_deg")]
    pub size_deg: Option<f64>,
    pub gray: Option<f64>,
    pub color: Option<RawColor>,
}

impl LegacyFields {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.size.is_none()
            && self.size_deg.is_none()
            && self.gray.is_none()
            && self.color.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawColor {
    Rgb([u8; 3]),
    Css(String),
}

impl RawColor {
    /// `[r, g, b]` or `#rgb` / `#rrggbb`. Anything else is ignored.
    pub fn to_rgb(&self) -> Option<[u8; 3]> {
        match self {
            RawColor::Rgb(rgb) => Some(*rgb),
            RawColor::Css(s) => {
                let hex = s.trim().strip_prefix('#')?;
                let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
                match hex.len() {
                    3 => Some([digit(0, 1)? * 17, digit(1, 1)? * 17, digit(2, 1)? * 17]),
                    6 => Some([digit(0, 2)?, digit(2, 2)?, digit(4, 2)?]),
                    _ => None,
                }
            }
        }
    }
}

/// One loosely specified item. Pixel fields take precedence over their
/// `*Deg` counterparts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItem {
    #[serde(alias = "shape", alias = "type")]
    pub kind: Option<String>,

    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(alias = "x_deg")]
    pub x_deg: Option<f64>,
    #[serde(alias = "y_deg")]
    pub y_deg: Option<f64>,
    pub z: Option<i32>,

    #[serde(alias = "blendMode", alias = "blend_mode", alias = "composite")]
    pub blend: Option<String>,
    #[serde(alias = "opacity")]
    pub alpha: Option<f64>,
    #[serde(alias = "rotationDeg", alias = "rotation_deg")]
    pub rotation: Option<f64>,
    pub gray: Option<f64>,
    pub color: Option<RawColor>,
    #[serde(alias = "fill")]
    pub filled: Option<bool>,
    #[serde(alias = "stroke_width", alias = "lineWidth", alias = "line_width")]
    pub stroke_width: Option<f64>,

    #[serde(alias = "radius_px")]
    pub radius: Option<f64>,
    #[serde(alias = "radius_deg")]
    pub radius_deg: Option<f64>,
    #[serde(alias = "inner_radius")]
    pub inner_radius: Option<f64>,
    #[serde(alias = "inner_radius_deg")]
    pub inner_radius_deg: Option<f64>,
    #[serde(alias = "outer_radius")]
    pub outer_radius: Option<f64>,
    #[serde(alias = "outer_radius_deg")]
    pub outer_radius_deg: Option<f64>,
    pub width: Option<f64>,
    #[serde(alias = "width_deg")]
    pub width_deg: Option<f64>,
    pub height: Option<f64>,
    #[serde(alias = "height_deg")]
    pub height_deg: Option<f64>,
    #[serde(alias = "corner_radius")]
    pub corner_radius: Option<f64>,
    #[serde(alias = "corner_radius_deg")]
    pub corner_radius_deg: Option<f64>,
    pub length: Option<f64>,
    #[serde(alias = "length_deg")]
    pub length_deg: Option<f64>,
    pub edge: Option<f64>,
    #[serde(alias = "edge_deg")]
    pub edge_deg: Option<f64>,
    #[serde(alias = "arm_length")]
    pub arm_length: Option<f64>,
    #[serde(alias = "arm_length_deg")]
    pub arm_length_deg: Option<f64>,
    #[serde(alias = "arm_width")]
    pub arm_width: Option<f64>,
    #[serde(alias = "arm_width_deg")]
    pub arm_width_deg: Option<f64>,

    /// `"grating"` (alias `"stripes"`) or `"noise"`.
    pub mode: Option<String>,
    /// `"canvas"` or `"cover-window"`; otherwise `width`/`height` size the box.
    #[serde(rename = "box", alias = "coverage")]
    pub box_size: Option<String>,
    #[serde(alias = "orientation_deg", alias = "orientationDeg")]
    pub orientation: Option<f64>,
    #[serde(alias = "bar_width")]
    pub bar_width: Option<f64>,
    #[serde(alias = "bar_width_deg")]
    pub bar_width_deg: Option<f64>,
    pub duty: Option<f64>,
    pub phase: Option<f64>,
    pub contrast: Option<f64>,
    #[serde(alias = "noise_cell")]
    pub cell: Option<f64>,
    #[serde(alias = "cell_deg")]
    pub cell_deg: Option<f64>,
    pub seed: Option<u32>,

    #[serde(alias = "window")]
    pub mask: Option<String>,
    #[serde(alias = "mask_radius", alias = "windowRadius", alias = "window_radius")]
    pub mask_radius: Option<f64>,
    #[serde(alias = "mask_radius_deg", alias = "windowRadiusDeg")]
    pub mask_radius_deg: Option<f64>,
    #[serde(alias = "mask_sigma", alias = "sigma")]
    pub mask_sigma: Option<f64>,
    #[serde(alias = "mask_sigma_deg", alias = "sigmaDeg")]
    pub mask_sigma_deg: Option<f64>,
    #[serde(alias = "mask_width", alias = "windowWidth")]
    pub mask_width: Option<f64>,
    #[serde(alias = "mask_width_deg")]
    pub mask_width_deg: Option<f64>,
    #[serde(alias = "mask_height", alias = "windowHeight")]
    pub mask_height: Option<f64>,
    #[serde(alias = "mask_height_deg")]
    pub mask_height_deg: Option<f64>,
}
