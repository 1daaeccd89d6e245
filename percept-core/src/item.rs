use serde::{Deserialize, Serialize};

use crate::color::Fill;

/// One canonical visual layer. All geometry is in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusItem {
    pub shape: Shape,
    /// Offset from the canvas center, +y down.
    pub position: (f64, f64),
    pub z: i32,
    pub blend: BlendMode,
    pub alpha: f64,
    pub rotation_deg: f64,
    pub fill: Fill,
    pub filled: bool,
    pub stroke_width: f64,
    pub mask: Mask,
    /// Index in the raw input list.
    pub index: usize,
}

impl StimulusItem {
    /// Items that must be drawn through a private layer before merging.
    pub fn needs_offscreen(&self) -> bool {
        self.shape.is_texture() || !matches!(self.mask, Mask::None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Disc {
        radius: f64,
    },
    Annulus {
        inner_radius: f64,
        outer_radius: f64,
    },
    Rect {
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    RectOutline {
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    Triangle {
        edge: f64,
    },
    Bar {
        length: f64,
        width: f64,
    },
    Cross {
        arm_length: f64,
        arm_width: f64,
    },
    Texture {
        width: u32,
        height: u32,
        pattern: Pattern,
    },
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Disc { .. } => "disc",
            Shape::Annulus { .. } => "annulus",
            Shape::Rect { .. } => "rect",
            Shape::RectOutline { .. } => "rectOutline",
            Shape::Triangle { .. } => "triangle",
            Shape::Bar { .. } => "bar",
            Shape::Cross { .. } => "cross",
            Shape::Texture { .. } => "texture",
        }
    }

    pub fn is_texture(&self) -> bool {
        matches!(self, Shape::Texture { .. })
    }

    /// Unrotated bounding box (width, height) around the local origin.
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            Shape::Disc { radius } => (radius * 2.0, radius * 2.0),
            Shape::Annulus { outer_radius, .. } => (outer_radius * 2.0, outer_radius * 2.0),
            Shape::Rect { width, height, .. } | Shape::RectOutline { width, height, .. } => {
                (width, height)
            }
            Shape::Triangle { edge } => (edge, edge * 3f64.sqrt() / 2.0),
            Shape::Bar { length, width } => (width, length),
            Shape::Cross { arm_length, .. } => (arm_length * 2.0, arm_length * 2.0),
            Shape::Texture { width, height, .. } => (f64::from(width), f64::from(height)),
        }
    }
}

/// Texture content.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Square-wave stripes. `bar_width` is half the period; `phase` is a
    /// fraction of the period.
    Grating {
        orientation_deg: f64,
        bar_width: f64,
        duty: f64,
        phase: f64,
        contrast: f64,
        gray: f64,
    },
    /// Seeded uniform jitter around `gray`, constant over `cell × cell` blocks.
    Noise {
        cell: u32,
        seed: u32,
        contrast: f64,
        gray: f64,
    },
}

/// Spatial window, in pixels, centered on the item and rotated with it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mask {
    #[default]
    None,
    Circular {
        radius: f64,
    },
    Rectangular {
        half_width: f64,
        half_height: f64,
    },
    RaisedCosine {
        radius: f64,
    },
    Gaussian {
        sigma: f64,
    },
}

impl Mask {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Mask::None => "none",
            Mask::Circular { .. } => "circular",
            Mask::Rectangular { .. } => "rectangular",
            Mask::RaisedCosine { .. } => "raisedCosine",
            Mask::Gaussian { .. } => "gaussian",
        }
    }
}

/// Compositing operator applied when an item lands on the shared surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Lighter,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    /// Accepts canvas operator names and the usual aliases, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('_', "-");
        Some(match name.as_str() {
            "normal" | "source-over" | "over" => BlendMode::Normal,
            "lighter" | "add" | "additive" | "plus" => BlendMode::Lighter,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "darken" | "min" => BlendMode::Darken,
            "lighten" => BlendMode::Lighten,
            "color-dodge" => BlendMode::ColorDodge,
            "color-burn" => BlendMode::ColorBurn,
            "hard-light" | "hardlight" => BlendMode::HardLight,
            "soft-light" | "softlight" => BlendMode::SoftLight,
            "difference" => BlendMode::Difference,
            "exclusion" => BlendMode::Exclusion,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(mask: Mask) -> StimulusItem {
        StimulusItem {
            shape: Shape::Disc { radius: 10.0 },
            position: (0.0, 0.0),
            z: 0,
            blend: BlendMode::Normal,
            alpha: 1.0,
            rotation_deg: 0.0,
            fill: Fill::Gray(0.5),
            filled: true,
            stroke_width: 2.0,
            mask,
            index: 0,
        }
    }

    #[test]
    fn offscreen_only_for_textures_and_masks() {
        assert!(!disc(Mask::None).needs_offscreen());
        assert!(disc(Mask::Circular { radius: 5.0 }).needs_offscreen());

        let mut tex = disc(Mask::None);
        tex.shape = Shape::Texture {
            width: 4,
            height: 4,
            pattern: Pattern::Noise {
                cell: 1,
                seed: 1,
                contrast: 0.5,
                gray: 0.5,
            },
        };
        assert!(tex.needs_offscreen());
    }

    #[test]
    fn blend_aliases() {
        assert_eq!(BlendMode::parse("source-over"), Some(BlendMode::Normal));
        assert_eq!(BlendMode::parse("Add"), Some(BlendMode::Lighter));
        assert_eq!(BlendMode::parse("hard_light"), Some(BlendMode::HardLight));
        assert_eq!(BlendMode::parse("xor"), None);
    }

    #[test]
    fn blend_serializes_kebab_case() {
        let s = serde_json::to_string(&BlendMode::SoftLight).unwrap();
        assert_eq!(s, "\"soft-light\"");
    }
}
