//! Geometric primitives in the item's local frame.
//!
//! Every path is built around the local origin; the caller supplies the
//! transform that places and rotates it on the canvas.

use percept_core::{Shape, StimulusItem};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::debug;

// Cubic Bézier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Draws one non-texture item. Returns `false` when nothing was drawn
/// (degenerate geometry or a texture).
pub fn draw_primitive(
    pixmap: &mut Pixmap,
    item: &StimulusItem,
    paint: &Paint<'_>,
    transform: Transform,
) -> bool {
    let Some(path) = primitive_path(&item.shape) else {
        debug!(
            kind = item.shape.kind_name(),
            index = item.index,
            "skipping degenerate primitive"
        );
        return false;
    };

    let stroke_only = matches!(item.shape, Shape::RectOutline { .. }) || !item.filled;
    if stroke_only {
        let stroke = Stroke {
            width: item.stroke_width.max(0.0) as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, paint, &stroke, transform, None);
    } else {
        pixmap.fill_path(&path, paint, fill_rule(&item.shape), transform, None);
    }
    true
}

/// Annulus relies on even-odd to punch out the inner disc; everything else
/// is a union of its sub-paths.
pub fn fill_rule(shape: &Shape) -> FillRule {
    match shape {
        Shape::Annulus { .. } => FillRule::EvenOdd,
        _ => FillRule::Winding,
    }
}

pub fn primitive_path(shape: &Shape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    match *shape {
        Shape::Disc { radius } => {
            pb.push_circle(0.0, 0.0, positive(radius)?);
        }
        Shape::Annulus {
            inner_radius,
            outer_radius,
        } => {
            let outer = positive(outer_radius)?;
            pb.push_circle(0.0, 0.0, outer);
            // Even-odd fill: an inner circle as large as the outer one empties the ring.
            if inner_radius > 0.0 {
                pb.push_circle(0.0, 0.0, (inner_radius as f32).min(outer));
            }
        }
        Shape::Rect {
            width,
            height,
            corner_radius,
        }
        | Shape::RectOutline {
            width,
            height,
            corner_radius,
        } => {
            push_rounded_rect(&mut pb, positive(width)?, positive(height)?, corner_radius as f32);
        }
        Shape::Triangle { edge } => {
            let edge = positive(edge)?;
            let circumradius = edge / 3f32.sqrt();
            pb.move_to(0.0, -circumradius);
            pb.line_to(edge / 2.0, circumradius / 2.0);
            pb.line_to(-edge / 2.0, circumradius / 2.0);
            pb.close();
        }
        Shape::Bar { length, width } => {
            let (l, w) = (positive(length)?, positive(width)?);
            pb.push_rect(Rect::from_xywh(-w / 2.0, -l / 2.0, w, l)?);
        }
        Shape::Cross {
            arm_length,
            arm_width,
        } => {
            let (l, w) = (positive(arm_length)?, positive(arm_width)?);
            pb.push_rect(Rect::from_xywh(-w / 2.0, -l, w, 2.0 * l)?);
            pb.push_rect(Rect::from_xywh(-l, -w / 2.0, 2.0 * l, w)?);
        }
        Shape::Texture { .. } => return None,
    }
    pb.finish()
}

fn positive(v: f64) -> Option<f32> {
    (v.is_finite() && v > 0.0).then_some(v as f32)
}

fn push_rounded_rect(pb: &mut PathBuilder, w: f32, h: f32, corner_radius: f32) {
    let (x0, y0, x1, y1) = (-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);
    let r = corner_radius.clamp(0.0, w.min(h) / 2.0);
    if r <= 0.0 {
        pb.move_to(x0, y0);
        pb.line_to(x1, y0);
        pb.line_to(x1, y1);
        pb.line_to(x0, y1);
        pb.close();
        return;
    }
    let k = r * KAPPA;
    pb.move_to(x0 + r, y0);
    pb.line_to(x1 - r, y0);
    pb.cubic_to(x1 - r + k, y0, x1, y0 + r - k, x1, y0 + r);
    pb.line_to(x1, y1 - r);
    pb.cubic_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1);
    pb.line_to(x0 + r, y1);
    pb.cubic_to(x0 + r - k, y1, x0, y1 - r + k, x0, y1 - r);
    pb.line_to(x0, y0 + r);
    pb.cubic_to(x0, y0 + r - k, x0 + r - k, y0, x0 + r, y0);
    pb.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use percept_core::{BlendMode, Fill, Mask};
    use tiny_skia::Color;

    fn item(shape: Shape) -> StimulusItem {
        StimulusItem {
            shape,
            position: (0.0, 0.0),
            z: 0,
            blend: BlendMode::Normal,
            alpha: 1.0,
            rotation_deg: 0.0,
            fill: Fill::Gray(1.0),
            filled: true,
            stroke_width: 2.0,
            mask: Mask::None,
            index: 0,
        }
    }

    fn draw(shape: Shape, filled: bool) -> Pixmap {
        let mut pm = Pixmap::new(100, 100).unwrap();
        pm.fill(Color::BLACK);
        let mut it = item(shape);
        it.filled = filled;
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::WHITE);
        assert!(draw_primitive(&mut pm, &it, &paint, Transform::from_translate(50.0, 50.0)));
        pm
    }

    fn lit(pm: &Pixmap, x: u32, y: u32) -> bool {
        pm.pixel(x, y).unwrap().red() == 255
    }

    #[test]
    fn annulus_leaves_hole() {
        let pm = draw(
            Shape::Annulus {
                inner_radius: 10.0,
                outer_radius: 30.0,
            },
            true,
        );
        assert!(!lit(&pm, 50, 50));
        assert!(lit(&pm, 70, 50));
        assert!(!lit(&pm, 95, 50));
    }

    #[test]
    fn annulus_without_width_leaves_no_solid_disc() {
        for inner_radius in [30.0, 45.0] {
            let pm = draw(
                Shape::Annulus {
                    inner_radius,
                    outer_radius: 30.0,
                },
                true,
            );
            assert!(!lit(&pm, 50, 50), "inner {inner_radius}");
            assert!(!lit(&pm, 65, 50), "inner {inner_radius}");
        }
    }

    #[test]
    fn unfilled_disc_is_an_outline() {
        let pm = draw(Shape::Disc { radius: 30.0 }, false);
        assert!(!lit(&pm, 50, 50));
        assert!(lit(&pm, 80, 50) || lit(&pm, 79, 50));
    }

    #[test]
    fn cross_has_arms_not_corners() {
        let pm = draw(
            Shape::Cross {
                arm_length: 30.0,
                arm_width: 6.0,
            },
            true,
        );
        assert!(lit(&pm, 50, 25));
        assert!(lit(&pm, 75, 50));
        assert!(!lit(&pm, 70, 30));
    }

    #[test]
    fn triangle_points_up() {
        let pm = draw(Shape::Triangle { edge: 60.0 }, true);
        assert!(lit(&pm, 50, 40));
        assert!(lit(&pm, 30, 62));
        assert!(!lit(&pm, 30, 30));
    }

    #[test]
    fn rounded_corners_are_clamped() {
        let pm = draw(
            Shape::Rect {
                width: 40.0,
                height: 20.0,
                corner_radius: 500.0,
            },
            true,
        );
        // Radius clamps to 10: a stadium, corners cut, center solid.
        assert!(lit(&pm, 50, 50));
        assert!(lit(&pm, 68, 50));
        assert!(!lit(&pm, 31, 41));
    }

    #[test]
    fn rect_outline_is_hollow() {
        let pm = draw(
            Shape::RectOutline {
                width: 40.0,
                height: 40.0,
                corner_radius: 0.0,
            },
            true,
        );
        assert!(!lit(&pm, 50, 50));
        assert!(lit(&pm, 50, 30) || lit(&pm, 50, 29));
    }

    #[test]
    fn degenerate_shapes_draw_nothing() {
        assert!(primitive_path(&Shape::Disc { radius: 0.0 }).is_none());
        assert!(
            primitive_path(&Shape::Bar {
                length: f64::NAN,
                width: 2.0
            })
            .is_none()
        );
    }
}
