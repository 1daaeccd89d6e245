pub mod blend;
pub mod compositor;
pub mod mask;
pub mod raster;
pub mod surface;
pub mod texture;

pub use compositor::{Compositor, RenderStats, StimulusRenderer};
pub use surface::Surface;

use percept_core::{PerceptResult, StimulusItem, TrialContext};
use percept_timing::HighPrecisionTimer;

/// Renders `items` onto a fresh background-filled surface.
pub fn render_trial(ctx: &TrialContext, items: &[StimulusItem]) -> PerceptResult<Surface> {
    let mut compositor = Compositor::new(ctx.clone(), HighPrecisionTimer::new());
    let mut surface = compositor.new_surface()?;
    compositor.render(items, &mut surface)?;
    Ok(surface)
}
