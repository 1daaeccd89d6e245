//! Raw items → canonical [`StimulusItem`]s.
//!
//! Every length leaves here in pixels. Missing values get per-shape defaults,
//! fractions are clamped and the result is ordered by `z`.

use percept_core::color::clamp_unit;
use percept_core::context::MAX_TEXTURE_SIDE;
use percept_core::units::resolve_length;
use percept_core::{BlendMode, Fill, Mask, Pattern, Shape, StimulusItem, TrialContext};
use rand::Rng;
use tracing::debug;

use crate::legacy::legacy_items;
use crate::params::{RawItem, TrialParams};

pub const DISC_RADIUS: f64 = 40.0;
pub const ANNULUS_OUTER: f64 = 40.0;
pub const ANNULUS_INNER: f64 = 20.0;
pub const RECT_SIZE: (f64, f64) = (80.0, 60.0);
pub const TRIANGLE_EDGE: f64 = 80.0;
pub const BAR_SIZE: (f64, f64) = (120.0, 12.0);
pub const CROSS_ARM: (f64, f64) = (40.0, 6.0);
pub const TEXTURE_BOX: f64 = 200.0;
pub const BAR_WIDTH_DEG: f64 = 0.2;
pub const BAR_WIDTH_PX: f64 = 10.0;
pub const STROKE_WIDTH: f64 = 2.0;

/// A trial ready for the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub context: TrialContext,
    pub items: Vec<StimulusItem>,
}

/// Normalizes with the thread RNG drawing seeds for unseeded noise.
pub fn normalize(params: &TrialParams) -> Normalized {
    normalize_with_rng(params, &mut rand::rng())
}

#[tracing::instrument(skip_all, fields(items = tracing::field::Empty))]
pub fn normalize_with_rng<R: Rng>(params: &TrialParams, rng: &mut R) -> Normalized {
    let context = params.context();
    let mut raw = params.raw_items();
    if raw.is_empty() {
        raw = legacy_items(params);
    }

    let mut items: Vec<StimulusItem> = raw
        .iter()
        .enumerate()
        .map(|(index, item)| ItemBuilder::new(&context, item, index).build(rng))
        .collect();
    // `sort_by_key` is stable, so ties keep input order.
    items.sort_by_key(|item| item.z);

    tracing::Span::current().record("items", items.len());
    Normalized { context, items }
}

/// Canonical kind names after alias folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Disc,
    Annulus,
    Rect,
    RectOutline,
    Triangle,
    Bar,
    Cross,
    Grating { gabor: bool },
    Noise,
}

fn parse_kind(raw: Option<&str>, mode: Option<&str>) -> Kind {
    let Some(name) = raw.map(|s| s.trim().to_ascii_lowercase().replace(['_', '-'], "")) else {
        debug!("item has no kind, drawing a disc");
        return Kind::Disc;
    };
    match name.as_str() {
        "disc" | "disk" | "circle" | "dot" => Kind::Disc,
        "annulus" | "ring" => Kind::Annulus,
        "rect" | "rectangle" | "square" => Kind::Rect,
        "rectoutline" | "outline" | "frame" => Kind::RectOutline,
        "triangle" => Kind::Triangle,
        "bar" | "line" | "stripe" => Kind::Bar,
        "cross" | "plus" | "fixation" => Kind::Cross,
        "grating" | "stripes" => Kind::Grating { gabor: false },
        "gabor" => Kind::Grating { gabor: true },
        "noise" => Kind::Noise,
        "texture" => match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("noise") => Kind::Noise,
            _ => Kind::Grating { gabor: false },
        },
        other => {
            debug!(kind = other, "unknown kind, drawing a disc");
            Kind::Disc
        }
    }
}

/// Mask family requested by name, before sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaskKind {
    None,
    Circular,
    Rectangular,
    RaisedCosine,
    Gaussian,
}

fn parse_mask_kind(item: &RawItem) -> MaskKind {
    match item.mask.as_deref().map(|m| m.trim().to_ascii_lowercase().replace(['_', '-'], "")) {
        Some(name) => match name.as_str() {
            "" | "none" => MaskKind::None,
            "circular" | "circle" => MaskKind::Circular,
            "rectangular" | "rect" | "rectangle" | "box" => MaskKind::Rectangular,
            "raisedcosine" | "cosine" | "hann" => MaskKind::RaisedCosine,
            "gaussian" | "gauss" => MaskKind::Gaussian,
            other => {
                debug!(mask = other, "unknown mask, leaving item unmasked");
                MaskKind::None
            }
        },
        None if item.mask_radius.is_some() || item.mask_radius_deg.is_some() => MaskKind::Circular,
        None if item.mask_width.is_some()
            || item.mask_height.is_some()
            || item.mask_width_deg.is_some()
            || item.mask_height_deg.is_some() =>
        {
            MaskKind::Rectangular
        }
        None if item.mask_sigma.is_some() || item.mask_sigma_deg.is_some() => MaskKind::Gaussian,
        None => MaskKind::None,
    }
}

struct ItemBuilder<'a> {
    ctx: &'a TrialContext,
    raw: &'a RawItem,
    index: usize,
}

impl<'a> ItemBuilder<'a> {
    fn new(ctx: &'a TrialContext, raw: &'a RawItem, index: usize) -> Self {
        Self { ctx, raw, index }
    }

    /// Pixel length with px > deg × ppd > default precedence. Negative
    /// lengths collapse to zero.
    fn length(&self, name: &str, px: Option<f64>, deg: Option<f64>, default: f64) -> f64 {
        if px.is_none() && deg.is_some() && self.ctx.pixels_per_degree.is_none() {
            debug!(index = self.index, field = name, "degree value without calibration, using default");
        }
        resolve_length(px, deg, self.ctx.pixels_per_degree, default).max(0.0)
    }

    fn fraction(value: Option<f64>, default: f64) -> f64 {
        value.filter(|v| v.is_finite()).map(clamp_unit).unwrap_or(default)
    }

    fn gray(&self) -> f64 {
        Self::fraction(self.raw.gray, self.ctx.background_gray)
    }

    fn build<R: Rng>(self, rng: &mut R) -> StimulusItem {
        let raw = self.raw;
        let kind = parse_kind(raw.kind.as_deref(), raw.mode.as_deref());
        let mut mask_kind = parse_mask_kind(raw);
        if kind == (Kind::Grating { gabor: true }) && mask_kind == MaskKind::None {
            mask_kind = MaskKind::Gaussian;
        }

        let shape = self.shape(kind, mask_kind, rng);
        let mask = self.mask(mask_kind, shape.extent());

        let fill = match raw.color.as_ref().and_then(|c| c.to_rgb()) {
            Some(rgb) if !shape.is_texture() => Fill::Rgb(rgb),
            _ => Fill::Gray(self.gray()),
        };
        let blend = match raw.blend.as_deref() {
            Some(name) => BlendMode::parse(name).unwrap_or_else(|| {
                debug!(index = self.index, blend = name, "unknown blend mode, using normal");
                BlendMode::Normal
            }),
            None => BlendMode::Normal,
        };

        StimulusItem {
            position: (
                self.length_signed(raw.x, raw.x_deg),
                self.length_signed(raw.y, raw.y_deg),
            ),
            z: raw.z.unwrap_or(0),
            blend,
            alpha: Self::fraction(raw.alpha, 1.0),
            rotation_deg: raw.rotation.filter(|r| r.is_finite()).unwrap_or(0.0),
            fill,
            filled: raw.filled.unwrap_or(true),
            stroke_width: raw
                .stroke_width
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(STROKE_WIDTH),
            mask,
            index: self.index,
            shape,
        }
    }

    fn length_signed(&self, px: Option<f64>, deg: Option<f64>) -> f64 {
        resolve_length(px, deg, self.ctx.pixels_per_degree, 0.0)
    }

    fn shape<R: Rng>(&self, kind: Kind, mask_kind: MaskKind, rng: &mut R) -> Shape {
        let r = self.raw;
        match kind {
            Kind::Disc => Shape::Disc {
                radius: self.length("radius", r.radius, r.radius_deg, DISC_RADIUS),
            },
            Kind::Annulus => {
                let outer = self.length("outer_radius", r.outer_radius, r.outer_radius_deg, ANNULUS_OUTER);
                let inner = self.length("inner_radius", r.inner_radius, r.inner_radius_deg, ANNULUS_INNER);
                Shape::Annulus {
                    inner_radius: inner.min(outer),
                    outer_radius: outer,
                }
            }
            Kind::Rect | Kind::RectOutline => {
                let width = self.length("width", r.width, r.width_deg, RECT_SIZE.0);
                let height = self.length("height", r.height, r.height_deg, RECT_SIZE.1);
                let corner_radius = self.length("corner_radius", r.corner_radius, r.corner_radius_deg, 0.0);
                if kind == Kind::Rect {
                    Shape::Rect { width, height, corner_radius }
                } else {
                    Shape::RectOutline { width, height, corner_radius }
                }
            }
            Kind::Triangle => Shape::Triangle {
                edge: self.length("edge", r.edge, r.edge_deg, TRIANGLE_EDGE),
            },
            Kind::Bar => Shape::Bar {
                length: self.length("length", r.length, r.length_deg, BAR_SIZE.0),
                width: self.length("width", r.width, r.width_deg, BAR_SIZE.1),
            },
            Kind::Cross => Shape::Cross {
                arm_length: self.length("arm_length", r.arm_length, r.arm_length_deg, CROSS_ARM.0),
                arm_width: self.length("arm_width", r.arm_width, r.arm_width_deg, CROSS_ARM.1),
            },
            Kind::Grating { .. } | Kind::Noise => {
                let (width, height) = self.texture_box(mask_kind);
                let gray = self.gray();
                let pattern = if kind == Kind::Noise {
                    Pattern::Noise {
                        cell: self.length("cell", r.cell, r.cell_deg, 1.0).round().max(1.0) as u32,
                        seed: r.seed.unwrap_or_else(|| rng.random()),
                        contrast: Self::fraction(r.contrast, 1.0),
                        gray,
                    }
                } else {
                    let default_bar = match self.ctx.pixels_per_degree {
                        Some(ppd) => BAR_WIDTH_DEG * ppd,
                        None => BAR_WIDTH_PX,
                    };
                    Pattern::Grating {
                        orientation_deg: r.orientation.filter(|o| o.is_finite()).unwrap_or(0.0),
                        bar_width: self.length("bar_width", r.bar_width, r.bar_width_deg, default_bar),
                        duty: Self::fraction(r.duty, 0.5),
                        phase: r.phase.filter(|p| p.is_finite()).unwrap_or(0.0),
                        contrast: Self::fraction(r.contrast, 1.0),
                        gray,
                    }
                };
                Shape::Texture { width, height, pattern }
            }
        }
    }

    /// Texture tile size in whole pixels, at least 1×1.
    fn texture_box(&self, mask_kind: MaskKind) -> (u32, u32) {
        let r = self.raw;
        let mode = r.box_size.as_deref().map(|b| b.trim().to_ascii_lowercase().replace('_', "-"));
        let (w, h) = match mode.as_deref() {
            Some("canvas") => (
                f64::from(self.ctx.canvas_width),
                f64::from(self.ctx.canvas_height),
            ),
            Some("cover-window" | "cover") => match self.window_radius(mask_kind) {
                Some(radius) => {
                    let side = cover_window_side(radius);
                    (side, side)
                }
                None => {
                    debug!(index = self.index, "cover-window box without a round window radius");
                    (TEXTURE_BOX, TEXTURE_BOX)
                }
            },
            _ => (
                self.length("width", r.width, r.width_deg, TEXTURE_BOX),
                self.length("height", r.height, r.height_deg, TEXTURE_BOX),
            ),
        };
        let max = f64::from(MAX_TEXTURE_SIDE);
        if w > max || h > max {
            debug!(index = self.index, width = w, height = h, "texture box clamped to {MAX_TEXTURE_SIDE} px");
        }
        let to_px = |v: f64| v.round().clamp(1.0, max) as u32;
        (to_px(w), to_px(h))
    }

    /// Explicit radius of a round window, used to size `cover-window` boxes.
    fn window_radius(&self, mask_kind: MaskKind) -> Option<f64> {
        let r = self.raw;
        let ppd = self.ctx.pixels_per_degree;
        let explicit = || {
            r.mask_radius
                .filter(|v| v.is_finite())
                .or_else(|| percept_core::units::to_pixels(r.mask_radius_deg, ppd))
        };
        match mask_kind {
            MaskKind::Circular | MaskKind::RaisedCosine => explicit(),
            MaskKind::Gaussian => explicit().or_else(|| {
                r.mask_sigma
                    .filter(|v| v.is_finite())
                    .or_else(|| percept_core::units::to_pixels(r.mask_sigma_deg, ppd))
                    .map(|sigma| sigma * 3.0)
            }),
            MaskKind::None | MaskKind::Rectangular => None,
        }
    }

    fn mask(&self, kind: MaskKind, extent: (f64, f64)) -> Mask {
        let r = self.raw;
        let half_min = extent.0.min(extent.1) / 2.0;
        let radius = || self.length("mask_radius", r.mask_radius, r.mask_radius_deg, half_min);
        match kind {
            MaskKind::None => Mask::None,
            MaskKind::Circular => Mask::Circular { radius: radius() },
            MaskKind::RaisedCosine => Mask::RaisedCosine { radius: radius() },
            MaskKind::Gaussian => {
                let radius = radius();
                Mask::Gaussian {
                    sigma: self.length("mask_sigma", r.mask_sigma, r.mask_sigma_deg, radius / 3.0),
                }
            }
            MaskKind::Rectangular => {
                let width = self.length("mask_width", r.mask_width, r.mask_width_deg, half_min * 2.0);
                let height = self.length("mask_height", r.mask_height, r.mask_height_deg, width);
                Mask::Rectangular {
                    half_width: width / 2.0,
                    half_height: height / 2.0,
                }
            }
        }
    }
}

/// Side of a square that covers a round window of `radius` at any rotation.
pub fn cover_window_side(radius: f64) -> f64 {
    (2.0 * radius * std::f64::consts::SQRT_2).ceil() + 2.0
}
