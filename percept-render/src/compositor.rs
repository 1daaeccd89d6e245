use std::time::Duration;

use percept_core::color::encode;
use percept_core::context::fits_surface_budget;
use percept_core::{Combine, PerceptError, PerceptResult, Shape, StimulusItem, TrialContext};
use percept_timing::Timer;
use tiny_skia::{Color, FilterQuality, Paint, Pixmap, PixmapPaint, Transform};
use tracing::{debug, trace};

use crate::blend::{merge_max, skia_blend_mode};
use crate::mask::{self, WindowFrame};
use crate::raster::draw_primitive;
use crate::surface::Surface;
use crate::texture::synthesize;

#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    /// Rasterizing and synthesizing item content, masks included.
    pub synth: Duration,
    /// Merging layers onto the shared surface.
    pub composite: Duration,
    pub total: Duration,
    pub items: usize,
    pub offscreen: usize,
}

pub trait StimulusRenderer {
    fn render(&mut self, items: &[StimulusItem], surface: &mut Surface)
        -> PerceptResult<RenderStats>;
}

/// Draws canonical items in z order onto a shared surface.
///
/// Holds nothing between calls but the trial context and the clock used for
/// [`RenderStats`].
pub struct Compositor<T: Timer<Timestamp = u64>> {
    ctx: TrialContext,
    timer: T,
}

impl<T: Timer<Timestamp = u64>> Compositor<T> {
    pub fn new(ctx: TrialContext, timer: T) -> Self {
        Self { ctx, timer }
    }

    pub fn context(&self) -> &TrialContext {
        &self.ctx
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// A surface of the trial's size filled with the background level.
    pub fn new_surface(&self) -> PerceptResult<Surface> {
        Surface::filled(
            self.ctx.canvas_width,
            self.ctx.canvas_height,
            encode(self.ctx.background_gray, self.ctx.gamma),
        )
    }

    /// Local frame → canvas: rotate about the item center, then move it to
    /// canvas center + position.
    pub fn item_transform(&self, item: &StimulusItem) -> Transform {
        let (cx, cy) = self.ctx.center();
        Transform::from_rotate(item.rotation_deg as f32).post_translate(
            (cx + item.position.0) as f32,
            (cy + item.position.1) as f32,
        )
    }

    fn window_frame(&self, item: &StimulusItem) -> WindowFrame {
        let (cx, cy) = self.ctx.center();
        WindowFrame {
            origin: (cx + item.position.0, cy + item.position.1),
            rotation_deg: item.rotation_deg,
        }
    }

    fn item_paint(&self, item: &StimulusItem, direct: bool) -> Paint<'static> {
        let [r, g, b] = item.fill.to_rgb(self.ctx.gamma);
        let mut paint = Paint::default();
        paint.anti_alias = self.ctx.antialias;
        if direct {
            paint.set_color(Color::from_rgba8(r, g, b, alpha_u8(item.alpha)));
            paint.blend_mode = skia_blend_mode(item.blend);
        } else {
            paint.set_color(Color::from_rgba8(r, g, b, 255));
        }
        paint
    }

    /// Renders one item into a transparent full-surface layer and applies its
    /// window.
    fn render_layer(&self, item: &StimulusItem) -> PerceptResult<Pixmap> {
        let (w, h) = (self.ctx.canvas_width, self.ctx.canvas_height);
        if !fits_surface_budget(w, h) {
            return Err(PerceptError::render(format!("a {w}x{h} layer is too large")));
        }
        let mut layer = Pixmap::new(w, h)
            .ok_or_else(|| PerceptError::render(format!("cannot allocate a {w}x{h} layer")))?;
        let transform = self.item_transform(item);

        match &item.shape {
            Shape::Texture {
                width,
                height,
                pattern,
            } => {
                let tile = synthesize(*width, *height, pattern, self.ctx.gamma)?;
                // Nearest at any rotation: a tile holds only its synthesized
                // levels, so a rotated grating stays a two-level square wave.
                let paint = PixmapPaint {
                    quality: FilterQuality::Nearest,
                    ..PixmapPaint::default()
                };
                layer.draw_pixmap(
                    0,
                    0,
                    tile.as_ref(),
                    &paint,
                    tile_origin(*width, *height).post_concat(transform),
                    None,
                );
            }
            _ => {
                draw_primitive(&mut layer, item, &self.item_paint(item, false), transform);
            }
        }

        mask::apply(&mut layer, &item.mask, self.window_frame(item))?;
        Ok(layer)
    }

    fn merge_layer(&self, surface: &mut Surface, layer: &Pixmap, item: &StimulusItem) {
        match self.ctx.combine {
            Combine::Composite => {
                let paint = PixmapPaint {
                    opacity: item.alpha as f32,
                    blend_mode: skia_blend_mode(item.blend),
                    quality: FilterQuality::Nearest,
                };
                surface.pixmap_mut().draw_pixmap(
                    0,
                    0,
                    layer.as_ref(),
                    &paint,
                    Transform::identity(),
                    None,
                );
            }
            Combine::Max => merge_max(surface.pixmap_mut(), layer, item.alpha as f32),
        }
    }
}

impl<T: Timer<Timestamp = u64>> StimulusRenderer for Compositor<T> {
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    fn render(
        &mut self,
        items: &[StimulusItem],
        surface: &mut Surface,
    ) -> PerceptResult<RenderStats> {
        if (surface.width(), surface.height()) != (self.ctx.canvas_width, self.ctx.canvas_height)
        {
            return Err(PerceptError::surface(format!(
                "surface is {}x{}, trial expects {}x{}",
                surface.width(),
                surface.height(),
                self.ctx.canvas_width,
                self.ctx.canvas_height
            )));
        }

        let mut order: Vec<&StimulusItem> = items.iter().collect();
        order.sort_by_key(|item| item.z);

        let mut stats = RenderStats {
            items: order.len(),
            ..RenderStats::default()
        };
        let start = self.timer.now();

        for item in order {
            trace!(
                kind = item.shape.kind_name(),
                index = item.index,
                z = item.z,
                "drawing item"
            );
            if item.needs_offscreen() || self.ctx.combine == Combine::Max {
                let t = self.timer.now();
                let layer = self.render_layer(item)?;
                stats.synth += self.timer.elapsed(t);

                let t = self.timer.now();
                self.merge_layer(surface, &layer, item);
                stats.composite += self.timer.elapsed(t);
                stats.offscreen += 1;
            } else {
                let t = self.timer.now();
                let paint = self.item_paint(item, true);
                let transform = self.item_transform(item);
                draw_primitive(surface.pixmap_mut(), item, &paint, transform);
                stats.composite += self.timer.elapsed(t);
            }
        }

        stats.total = self.timer.elapsed(start);
        self.timer.record_frame(stats.total);
        debug!(
            items = stats.items,
            offscreen = stats.offscreen,
            total_us = stats.total.as_micros() as u64,
            "trial rendered"
        );
        Ok(stats)
    }
}

fn alpha_u8(alpha: f64) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Moves a tile's center to the item origin. Odd sides land on half pixels,
/// matching the grating phase and the mask window.
fn tile_origin(width: u32, height: u32) -> Transform {
    Transform::from_translate(-(width as f32) / 2.0, -(height as f32) / 2.0)
}
