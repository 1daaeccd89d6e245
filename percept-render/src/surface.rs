use percept_core::context::{MAX_SURFACE_BYTES, fits_surface_budget};
use percept_core::{PerceptError, PerceptResult};
use tiny_skia::{Color, Pixmap};

/// The shared output buffer: premultiplied RGBA8, row-major.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Fails when the host cannot provide a drawable surface of this size.
    pub fn new(width: u32, height: u32) -> PerceptResult<Self> {
        if !fits_surface_budget(width, height) {
            return Err(PerceptError::surface(format!(
                "a {width}x{height} surface exceeds {MAX_SURFACE_BYTES} bytes"
            )));
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            PerceptError::surface(format!("cannot allocate a {width}x{height} pixel surface"))
        })?;
        Ok(Self { pixmap })
    }

    pub fn filled(width: u32, height: u32, value: u8) -> PerceptResult<Self> {
        let mut surface = Self::new(width, height)?;
        surface.fill_gray(value);
        Ok(surface)
    }

    pub fn fill_gray(&mut self, value: u8) {
        self.pixmap
            .fill(Color::from_rgba8(value, value, value, 255));
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Straight (demultiplied) RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Red channel at `(x, y)`; the whole value for gray content.
    pub fn gray_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixel(x, y).map(|p| p[0])
    }

    /// Straight RGBA8 copy of the whole surface.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Copies the surface into a host frame buffer of identical layout.
    pub fn copy_to_frame(&self, frame: &mut [u8]) -> PerceptResult<()> {
        let src = self.pixmap.data();
        if frame.len() != src.len() {
            return Err(PerceptError::surface(format!(
                "frame buffer holds {} bytes, surface needs {}",
                frame.len(),
                src.len()
            )));
        }
        frame.copy_from_slice(src);
        Ok(())
    }
}
